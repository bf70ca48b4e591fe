//! Compiles queries to the N3-based query language of YARS stores.
//!
//! The language has no filters, ordering, or slicing. The compiler therefore asks for every
//! variable that the remaining evaluation needs, and the caller finishes the query on the
//! response with [SolutionSet::finish](crate::SolutionSet::finish).

use crate::sparql::string_literal;
use crate::{Query, QueryError, WhereClause};
use rdf_federation_model::Variable;
use std::fmt::Write;

pub const YARS_NAMESPACE: &str = "http://sw.deri.org/2004/06/yars#";
pub const QL_NAMESPACE: &str = "http://www.w3.org/2004/12/ql#";

const DIALECT: &str = "N3 query";

/// How the store lays out the response to a compiled query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum N3ResponseShape {
    /// One triple per line, matching the given pattern. Used when at most one variable is
    /// requested.
    Triples(WhereClause),
    /// One parenthesized tuple per line with a value for every requested variable.
    Tuples,
}

/// A compiled query together with the information needed to read the response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct N3Query {
    text: String,
    variables: Vec<Variable>,
    shape: N3ResponseShape,
}

impl N3Query {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The variables of every response row, in order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn shape(&self) -> &N3ResponseShape {
        &self.shape
    }
}

/// Compiles a [Query] into the N3 query language.
///
/// The output is byte-exact: one statement per line, the select block before the where block, a
/// `.` after the final block and a single trailing empty line.
#[derive(Clone, Copy, Debug, Default)]
pub struct N3QueryCompiler;

impl N3QueryCompiler {
    pub fn compile(&self, query: &Query) -> Result<N3Query, QueryError> {
        let Some(first_clause) = query.where_clauses().first() else {
            return Err(QueryError::EmptyPattern(DIALECT));
        };
        if query.where_clauses().iter().any(|c| c.context.is_some()) {
            return Err(QueryError::Unsupported {
                dialect: DIALECT,
                feature: "named contexts",
            });
        }

        let variables = evaluation_variables(query);
        let shape = if variables.len() <= 1 {
            let pattern = variables
                .first()
                .and_then(|v| query.where_clauses().iter().find(|c| c.binds(v)))
                .unwrap_or(first_clause);
            N3ResponseShape::Triples(pattern.clone())
        } else {
            N3ResponseShape::Tuples
        };

        let mut text = String::new();
        let _ = writeln!(text, "@prefix yars: <{YARS_NAMESPACE}> .");
        let _ = writeln!(text, "@prefix ql: <{QL_NAMESPACE}> .");
        let form = if query.is_distinct() { "distinct" } else { "select" };
        let _ = writeln!(text, "<> ql:{form} {{");
        match &shape {
            N3ResponseShape::Triples(pattern) => {
                let _ = writeln!(text, "{pattern} .");
            }
            N3ResponseShape::Tuples => {
                let tuple = variables
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = writeln!(text, "( {tuple} ) .");
            }
        }
        text.push_str("} ;\nql:where {\n");
        for clause in query.where_clauses() {
            let _ = writeln!(text, "{clause} .");
        }
        for keyword in query.keywords() {
            let _ = writeln!(
                text,
                "{} yars:keyword {} .",
                keyword.variable,
                string_literal(&keyword.text)
            );
        }
        text.push_str("} .\n\n");

        Ok(N3Query {
            text,
            variables,
            shape,
        })
    }
}

/// Returns the projection followed by every other bound variable used by filters, ordering, or
/// keywords.
fn evaluation_variables(query: &Query) -> Vec<Variable> {
    let bound = query.bound_variables();
    let mut variables = Vec::new();
    let needed = query
        .projection()
        .into_iter()
        .chain(query.filter_clauses().iter().map(|f| f.variable.clone()))
        .chain(query.order_clauses().iter().map(|o| o.variable.clone()))
        .chain(query.keywords().iter().map(|k| k.variable.clone()));
    for variable in needed {
        if bound.contains(&&variable) && !variables.contains(&variable) {
            variables.push(variable);
        }
    }
    variables
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_federation_model::{NamedNode, TermPattern};

    fn var(name: &str) -> Option<TermPattern> {
        Some(Variable::new_unchecked(name).into())
    }

    fn ex(name: &str) -> Option<TermPattern> {
        Some(NamedNode::new_unchecked(format!("http://example.com/{name}")).into())
    }

    #[test]
    fn single_variable_selects_triples() -> Result<(), QueryError> {
        let mut query = Query::new();
        query
            .select(["s"])?
            .where_pattern(var("s"), ex("age"), ex("thirty"))?;
        let compiled = N3QueryCompiler.compile(&query)?;
        assert_eq!(
            compiled.text(),
            "@prefix yars: <http://sw.deri.org/2004/06/yars#> .\n\
             @prefix ql: <http://www.w3.org/2004/12/ql#> .\n\
             <> ql:select {\n\
             ?s <http://example.com/age> <http://example.com/thirty> .\n\
             } ;\n\
             ql:where {\n\
             ?s <http://example.com/age> <http://example.com/thirty> .\n\
             } .\n\n"
        );
        assert_eq!(compiled.variables(), [Variable::new_unchecked("s")]);
        assert!(matches!(compiled.shape(), N3ResponseShape::Triples(_)));
        Ok(())
    }

    #[test]
    fn distinct_tuples_with_keyword() -> Result<(), QueryError> {
        let mut query = Query::new();
        query
            .distinct(["s", "o"])?
            .where_pattern(var("s"), ex("name"), var("o"))?
            .where_pattern(var("s"), ex("age"), None)?
            .keyword_where("o", "Bernhard")?;
        let compiled = N3QueryCompiler.compile(&query)?;
        assert_eq!(
            compiled.text(),
            "@prefix yars: <http://sw.deri.org/2004/06/yars#> .\n\
             @prefix ql: <http://www.w3.org/2004/12/ql#> .\n\
             <> ql:distinct {\n\
             ( ?s ?o ) .\n\
             } ;\n\
             ql:where {\n\
             ?s <http://example.com/name> ?o .\n\
             ?s <http://example.com/age> ?_anon0 .\n\
             ?o yars:keyword \"Bernhard\" .\n\
             } .\n\n"
        );
        assert_eq!(compiled.shape(), &N3ResponseShape::Tuples);
        Ok(())
    }

    #[test]
    fn filter_variables_are_requested() -> Result<(), QueryError> {
        let mut query = Query::new();
        query
            .select(["s"])?
            .where_pattern(var("s"), ex("name"), var("name"))?
            .regex("name", "^E")?
            .sort(["name"])?;
        let compiled = N3QueryCompiler.compile(&query)?;
        assert_eq!(
            compiled.variables(),
            [Variable::new_unchecked("s"), Variable::new_unchecked("name")]
        );
        assert!(compiled.text().contains("( ?s ?name ) .\n"));
        Ok(())
    }

    #[test]
    fn empty_and_contextual_queries_are_rejected() -> Result<(), QueryError> {
        assert!(matches!(
            N3QueryCompiler.compile(&Query::new()),
            Err(QueryError::EmptyPattern(_))
        ));
        let mut query = Query::new();
        query.where_in_context(
            var("s"),
            var("p"),
            var("o"),
            NamedNode::new_unchecked("http://example.com/g"),
        )?;
        assert!(matches!(
            N3QueryCompiler.compile(&query),
            Err(QueryError::Unsupported { .. })
        ));
        Ok(())
    }
}
