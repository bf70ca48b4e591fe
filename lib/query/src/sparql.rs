//! Compiles queries to SPARQL text.

use crate::{Filter, FilterClause, KeywordClause, Query, QueryError, SortDirection};
use rdf_federation_model::{Literal, NamedNode};
use std::fmt::Write;

/// The predicate that YARS2 endpoints evaluate as a full-text search.
pub const YARS_KEYWORD_PREDICATE: &str = "http://sw.deri.org/2004/06/yars#keyword";

/// The flavour of SPARQL understood by an endpoint.
///
/// Dialects only differ in how they express keyword constraints. Standard SPARQL has no
/// full-text search, so compiling a query with keywords fails for it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SparqlDialect {
    #[default]
    Standard,
    Yars2,
    Virtuoso,
}

impl SparqlDialect {
    pub fn name(self) -> &'static str {
        match self {
            SparqlDialect::Standard => "standard",
            SparqlDialect::Yars2 => "yars2",
            SparqlDialect::Virtuoso => "virtuoso",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" | "sparql" => Some(SparqlDialect::Standard),
            "yars2" => Some(SparqlDialect::Yars2),
            "virtuoso" => Some(SparqlDialect::Virtuoso),
            _ => None,
        }
    }
}

/// Compiles a [Query] into a SPARQL query string.
///
/// The output has a fixed layout: `SELECT [DISTINCT ]vars[ FROM <c>] WHERE { p . p .[ FILTER (..)]}`
/// followed by optional ` ORDER BY`, ` LIMIT` and ` OFFSET` parts. Ask queries compile to
/// `ASK { .. }`. Count queries wrap a distinct sub-select and need a SPARQL 1.1 endpoint.
#[derive(Clone, Copy, Debug, Default)]
pub struct SparqlCompiler {
    dialect: SparqlDialect,
}

impl SparqlCompiler {
    pub fn new(dialect: SparqlDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> SparqlDialect {
        self.dialect
    }

    pub fn compile(&self, query: &Query) -> Result<String, QueryError> {
        let group = self.group_graph_pattern(query)?;
        let dataset = dataset_clause(query);
        if query.is_ask() {
            return Ok(format!("ASK{dataset} {group}"));
        }

        let projection = projection_clause(query);
        if query.is_count() {
            return Ok(format!(
                "SELECT (COUNT(*) AS ?count){dataset} WHERE {{ SELECT DISTINCT {projection} WHERE {group} }}"
            ));
        }

        let mut sparql = String::from("SELECT ");
        if query.is_distinct() {
            sparql.push_str("DISTINCT ");
        }
        sparql.push_str(&projection);
        sparql.push_str(&dataset);
        sparql.push_str(" WHERE ");
        sparql.push_str(&group);
        write_solution_modifiers(&mut sparql, query);
        Ok(sparql)
    }

    fn group_graph_pattern(&self, query: &Query) -> Result<String, QueryError> {
        let mut patterns = query
            .where_clauses()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        let mut conditions = query
            .filter_clauses()
            .iter()
            .map(filter_expression)
            .collect::<Vec<_>>();
        for keyword in query.keywords() {
            match self.dialect {
                SparqlDialect::Standard => {
                    return Err(QueryError::Unsupported {
                        dialect: "standard SPARQL",
                        feature: "keyword constraints",
                    })
                }
                SparqlDialect::Yars2 => patterns.push(yars_keyword_pattern(keyword)),
                SparqlDialect::Virtuoso => conditions.push(virtuoso_contains(keyword)),
            }
        }

        let mut group = String::from("{");
        if !patterns.is_empty() {
            group.push(' ');
            group.push_str(&patterns.join(" . "));
            group.push_str(" .");
        }
        if !conditions.is_empty() {
            group.push_str(" FILTER (");
            group.push_str(&conditions.join(" && "));
            group.push(')');
        }
        group.push('}');
        Ok(group)
    }
}

fn projection_clause(query: &Query) -> String {
    let projection = query.projection();
    if projection.is_empty() {
        return "*".to_owned();
    }
    projection
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn dataset_clause(query: &Query) -> String {
    let mut contexts: Vec<&NamedNode> = Vec::new();
    for context in query.where_clauses().iter().filter_map(|c| c.context.as_ref()) {
        if !contexts.contains(&context) {
            contexts.push(context);
        }
    }
    contexts.iter().fold(String::new(), |mut clause, context| {
        let _ = write!(clause, " FROM {context}");
        clause
    })
}

fn write_solution_modifiers(sparql: &mut String, query: &Query) {
    if !query.order_clauses().is_empty() {
        sparql.push_str(" ORDER BY");
        for clause in query.order_clauses() {
            let _ = match clause.direction {
                SortDirection::Ascending => write!(sparql, " ASC({})", clause.variable),
                SortDirection::Descending => write!(sparql, " DESC({})", clause.variable),
            };
        }
    }
    if let Some(limit) = query.limit_clause() {
        let _ = write!(sparql, " LIMIT {limit}");
    }
    if let Some(offset) = query.offset_clause() {
        let _ = write!(sparql, " OFFSET {offset}");
    }
}

fn filter_expression(clause: &FilterClause) -> String {
    let variable = &clause.variable;
    match &clause.filter {
        Filter::Regex(regex) => format!("regex(str({variable}), {})", string_literal(regex.as_str())),
        Filter::Lang { tag, exact: true } => format!("lang({variable}) = {}", string_literal(tag)),
        Filter::Lang { tag, exact: false } => {
            format!("langMatches(lang({variable}), {})", string_literal(tag))
        }
        Filter::Datatype(datatype) => format!("datatype({variable}) = {datatype}"),
        Filter::Compare { operator, operand } => format!("{variable} {operator} {operand}"),
    }
}

fn yars_keyword_pattern(keyword: &KeywordClause) -> String {
    format!(
        "{} <{YARS_KEYWORD_PREDICATE}> {}",
        keyword.variable,
        string_literal(&keyword.text)
    )
}

fn virtuoso_contains(keyword: &KeywordClause) -> String {
    let expression = format!("'{}'", keyword.text.replace('\'', " "));
    format!(
        "bif:contains({}, {})",
        keyword.variable,
        string_literal(&expression)
    )
}

/// Renders a quoted and escaped string literal.
pub(crate) fn string_literal(value: &str) -> String {
    Literal::new_simple_literal(value).to_string()
}
