use crate::Term;
use oxrdf::{BlankNode, NamedNode};
use uuid::Uuid;

/// The IRI prefix of resources that replace blank nodes.
pub const SKOLEM_IRI_PREFIX: &str = "urn:x-bnode:";

/// Replaces blank nodes with resources that are stable for the lifetime of one session.
///
/// Two blank nodes with the same label are mapped to the same resource within a session. Labels
/// of different sessions never collide, as every session draws a random identifier.
#[derive(Clone, Debug)]
pub struct BlankNodeSkolemizer {
    session: String,
}

impl BlankNodeSkolemizer {
    pub fn new() -> Self {
        Self {
            session: Uuid::new_v4().simple().to_string(),
        }
    }

    pub fn skolemize(&self, blank_node: &BlankNode) -> NamedNode {
        NamedNode::new_unchecked(format!(
            "{SKOLEM_IRI_PREFIX}{}:{}",
            self.session,
            blank_node.as_str()
        ))
    }

    /// Converts a term of the RDF model into a storable [Term].
    ///
    /// Returns `None` for terms without a counterpart, such as quoted triples.
    pub fn to_term(&self, term: oxrdf::Term) -> Option<Term> {
        match term {
            oxrdf::Term::NamedNode(node) => Some(Term::NamedNode(node)),
            oxrdf::Term::BlankNode(blank_node) => Some(Term::NamedNode(self.skolemize(&blank_node))),
            oxrdf::Term::Literal(literal) => Some(Term::Literal(literal)),
            #[allow(unreachable_patterns, reason = "Only reachable with the rdf-star feature")]
            _ => None,
        }
    }
}

impl Default for BlankNodeSkolemizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_label_same_resource() {
        let skolemizer = BlankNodeSkolemizer::new();
        let first = skolemizer.skolemize(&BlankNode::new_unchecked("b1"));
        let second = skolemizer.skolemize(&BlankNode::new_unchecked("b1"));
        assert_eq!(first, second);
        assert!(first.as_str().starts_with(SKOLEM_IRI_PREFIX));
    }

    #[test]
    fn sessions_do_not_collide() {
        let blank_node = BlankNode::new_unchecked("b1");
        assert_ne!(
            BlankNodeSkolemizer::new().skolemize(&blank_node),
            BlankNodeSkolemizer::new().skolemize(&blank_node)
        );
    }
}
