use rdf_federation_model::{Literal, VariableNameParseError};
use std::fmt;

/// The position of a term in a where clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatternPosition {
    Subject,
    Predicate,
    Object,
}

impl fmt::Display for PatternPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternPosition::Subject => f.write_str("subject"),
            PatternPosition::Predicate => f.write_str("predicate"),
            PatternPosition::Object => f.write_str("object"),
        }
    }
}

/// An error raised while building or compiling a query.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum QueryError {
    #[error("Invalid variable name '{name}': {source}")]
    InvalidVariable {
        name: String,
        #[source]
        source: VariableNameParseError,
    },
    #[error("The variable name '{0}' is reserved for anonymous variables")]
    ReservedVariable(String),
    #[error("A literal cannot be used as the {position} of a where clause: {literal}")]
    LiteralInPosition {
        position: PatternPosition,
        literal: Literal,
    },
    #[error("Invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("The {dialect} query dialect does not support {feature}")]
    Unsupported {
        dialect: &'static str,
        feature: &'static str,
    },
    #[error("A query without where clauses cannot be compiled to the {0} query dialect")]
    EmptyPattern(&'static str),
}
