use oxrdf::{Literal, LiteralRef, NamedNode, NamedNodeRef, Variable};
use std::fmt;

/// A value that can be stored in a triple store or bound to a variable.
///
/// Resources are identified by their IRI. Literals with different datatypes or language tags are
/// different values, even if their lexical forms are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    NamedNode(NamedNode),
    Literal(Literal),
}

impl Term {
    pub fn as_named_node(&self) -> Option<&NamedNode> {
        match self {
            Term::NamedNode(node) => Some(node),
            Term::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::NamedNode(_) => None,
            Term::Literal(literal) => Some(literal),
        }
    }

    pub fn into_named_node(self) -> Option<NamedNode> {
        match self {
            Term::NamedNode(node) => Some(node),
            Term::Literal(_) => None,
        }
    }

    pub fn is_named_node(&self) -> bool {
        matches!(self, Term::NamedNode(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    /// Returns the IRI of a resource or the lexical form of a literal.
    ///
    /// This is the string that regex filters and keyword constraints are evaluated against.
    pub fn lexical_form(&self) -> &str {
        match self {
            Term::NamedNode(node) => node.as_str(),
            Term::Literal(literal) => literal.value(),
        }
    }
}

impl fmt::Display for Term {
    /// Writes the term in N-Triples syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::NamedNode(node) => write!(f, "{node}"),
            Term::Literal(literal) => write!(f, "{literal}"),
        }
    }
}

impl From<NamedNode> for Term {
    fn from(node: NamedNode) -> Self {
        Term::NamedNode(node)
    }
}

impl From<NamedNodeRef<'_>> for Term {
    fn from(node: NamedNodeRef<'_>) -> Self {
        Term::NamedNode(node.into_owned())
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

impl From<LiteralRef<'_>> for Term {
    fn from(literal: LiteralRef<'_>) -> Self {
        Term::Literal(literal.into_owned())
    }
}

impl From<Term> for oxrdf::Term {
    fn from(term: Term) -> Self {
        match term {
            Term::NamedNode(node) => node.into(),
            Term::Literal(literal) => literal.into(),
        }
    }
}

/// A term of a where clause: a variable, a resource, or a literal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TermPattern {
    Variable(Variable),
    NamedNode(NamedNode),
    Literal(Literal),
}

impl TermPattern {
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            TermPattern::Variable(variable) => Some(variable),
            TermPattern::NamedNode(_) | TermPattern::Literal(_) => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, TermPattern::Variable(_))
    }

    /// Returns the constant term of this pattern, if it is not a variable.
    pub fn as_term(&self) -> Option<Term> {
        match self {
            TermPattern::Variable(_) => None,
            TermPattern::NamedNode(node) => Some(Term::NamedNode(node.clone())),
            TermPattern::Literal(literal) => Some(Term::Literal(literal.clone())),
        }
    }
}

impl fmt::Display for TermPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermPattern::Variable(variable) => write!(f, "{variable}"),
            TermPattern::NamedNode(node) => write!(f, "{node}"),
            TermPattern::Literal(literal) => write!(f, "{literal}"),
        }
    }
}

impl From<Variable> for TermPattern {
    fn from(variable: Variable) -> Self {
        TermPattern::Variable(variable)
    }
}

impl From<NamedNode> for TermPattern {
    fn from(node: NamedNode) -> Self {
        TermPattern::NamedNode(node)
    }
}

impl From<NamedNodeRef<'_>> for TermPattern {
    fn from(node: NamedNodeRef<'_>) -> Self {
        TermPattern::NamedNode(node.into_owned())
    }
}

impl From<Literal> for TermPattern {
    fn from(literal: Literal) -> Self {
        TermPattern::Literal(literal)
    }
}

impl From<Term> for TermPattern {
    fn from(term: Term) -> Self {
        match term {
            Term::NamedNode(node) => TermPattern::NamedNode(node),
            Term::Literal(literal) => TermPattern::Literal(literal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_ntriples_syntax() {
        let node = Term::from(NamedNode::new_unchecked("http://example.com/a"));
        let literal = Term::from(Literal::new_simple_literal("say \"hi\""));
        let tagged = Term::from(Literal::new_language_tagged_literal_unchecked("hallo", "de"));

        assert_eq!(node.to_string(), "<http://example.com/a>");
        assert_eq!(literal.to_string(), "\"say \\\"hi\\\"\"");
        assert_eq!(tagged.to_string(), "\"hallo\"@de");
    }

    #[test]
    fn lexical_form_of_resource_is_iri() {
        let node = Term::from(NamedNode::new_unchecked("http://example.com/a"));
        assert_eq!(node.lexical_form(), "http://example.com/a");
    }

    #[test]
    fn literals_with_different_datatypes_differ() {
        let plain = Term::from(Literal::new_simple_literal("30"));
        let typed = Term::from(Literal::new_typed_literal("30", oxrdf::vocab::xsd::INTEGER));
        assert_ne!(plain, typed);
    }
}
