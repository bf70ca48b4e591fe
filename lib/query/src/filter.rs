use crate::QueryError;
use rdf_federation_model::{compare_terms, NamedNode, Term, Variable};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A comparison between a bound value and a constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl ComparisonOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::Less => "<",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::Greater => ">",
            ComparisonOperator::GreaterOrEqual => ">=",
        }
    }

    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            ComparisonOperator::Equal => ordering.is_eq(),
            ComparisonOperator::NotEqual => ordering.is_ne(),
            ComparisonOperator::Less => ordering.is_lt(),
            ComparisonOperator::LessOrEqual => ordering.is_le(),
            ComparisonOperator::Greater => ordering.is_gt(),
            ComparisonOperator::GreaterOrEqual => ordering.is_ge(),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated regular expression that keeps its source text.
#[derive(Clone, Debug)]
pub struct RegexPattern {
    regex: Regex,
}

impl RegexPattern {
    pub fn new(pattern: &str) -> Result<Self, QueryError> {
        let regex = Regex::new(pattern).map_err(|source| QueryError::InvalidRegex {
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for RegexPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for RegexPattern {}

impl Hash for RegexPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

/// A constraint on the value bound to a variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Filter {
    /// The lexical form of the value matches the regular expression.
    Regex(RegexPattern),
    /// The value is a literal with the given language tag. If `exact` is false, sub-tags of `tag`
    /// match as well.
    Lang { tag: String, exact: bool },
    /// The value is a literal with the given datatype.
    Datatype(NamedNode),
    /// The value compares to the operand as requested. See [compare_terms] for the ordering.
    Compare {
        operator: ComparisonOperator,
        operand: Term,
    },
}

impl Filter {
    pub fn matches(&self, value: &Term) -> bool {
        match self {
            Filter::Regex(regex) => regex.is_match(value.lexical_form()),
            Filter::Lang { tag, exact } => value
                .as_literal()
                .and_then(|literal| literal.language())
                .is_some_and(|language| language_matches(language, tag, *exact)),
            Filter::Datatype(datatype) => value
                .as_literal()
                .is_some_and(|literal| literal.datatype() == datatype.as_ref()),
            Filter::Compare { operator, operand } => {
                operator.accepts(compare_terms(value, operand))
            }
        }
    }
}

fn language_matches(language: &str, tag: &str, exact: bool) -> bool {
    if language.eq_ignore_ascii_case(tag) {
        return true;
    }
    !exact
        && language.len() > tag.len()
        && language.as_bytes()[tag.len()] == b'-'
        && language[..tag.len()].eq_ignore_ascii_case(tag)
}

/// A [Filter] applied to a variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FilterClause {
    pub variable: Variable,
    pub filter: Filter,
}

/// A free-text constraint on a variable.
///
/// The constraint matches if every whitespace-separated word of the text occurs in the lexical
/// form of the value, ignoring case.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeywordClause {
    pub variable: Variable,
    pub text: String,
}

impl KeywordClause {
    pub fn matches(&self, value: &Term) -> bool {
        let haystack = value.lexical_form().to_lowercase();
        self.text
            .split_whitespace()
            .all(|word| haystack.contains(&word.to_lowercase()))
    }
}
