use crate::Term;
use oxrdf::NamedNode;
use std::fmt;

/// A stored statement. Subjects and predicates are always resources.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: NamedNode,
    pub predicate: NamedNode,
    pub object: Term,
}

impl Triple {
    pub fn new(
        subject: impl Into<NamedNode>,
        predicate: impl Into<NamedNode>,
        object: impl Into<Term>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for Triple {
    /// Writes the triple as a single N-Triples statement.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// Selects stored statements. Every position left as `None` matches any value.
///
/// A pattern without a context matches statements of every context, including the default one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StatementPattern {
    pub subject: Option<NamedNode>,
    pub predicate: Option<NamedNode>,
    pub object: Option<Term>,
    pub context: Option<NamedNode>,
}

impl StatementPattern {
    /// A pattern that matches every statement.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn new(
        subject: Option<NamedNode>,
        predicate: Option<NamedNode>,
        object: Option<Term>,
    ) -> Self {
        Self {
            subject,
            predicate,
            object,
            context: None,
        }
    }

    #[must_use]
    pub fn in_context(mut self, context: NamedNode) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns true if no position of the pattern is restricted.
    pub fn is_wildcard(&self) -> bool {
        self.subject.is_none()
            && self.predicate.is_none()
            && self.object.is_none()
            && self.context.is_none()
    }

    pub fn matches(&self, triple: &Triple, context: Option<&NamedNode>) -> bool {
        self.subject.as_ref().map_or(true, |s| *s == triple.subject)
            && self.predicate.as_ref().map_or(true, |p| *p == triple.predicate)
            && self.object.as_ref().map_or(true, |o| *o == triple.object)
            && self.context.as_ref().map_or(true, |c| Some(c) == context)
    }
}

impl From<&Triple> for StatementPattern {
    fn from(triple: &Triple) -> Self {
        Self::new(
            Some(triple.subject.clone()),
            Some(triple.predicate.clone()),
            Some(triple.object.clone()),
        )
    }
}
