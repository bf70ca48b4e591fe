use crate::AdapterError;
use rdf_federation_model::{BlankNodeSkolemizer, DecodedTerm};
use rdf_federation_query::{Query, Row, Solutions};
use sparesults::{QueryResultsFormat, QueryResultsParser, ReaderQueryResultsParserOutput};

/// The serialization requested from a SPARQL endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SparqlResultFormat {
    Json,
    #[default]
    Xml,
}

impl SparqlResultFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" | "sparql_json" => Some(SparqlResultFormat::Json),
            "xml" | "sparql_xml" => Some(SparqlResultFormat::Xml),
            _ => None,
        }
    }

    pub fn media_type(self) -> &'static str {
        self.results_format().media_type()
    }

    fn results_format(self) -> QueryResultsFormat {
        match self {
            SparqlResultFormat::Json => QueryResultsFormat::Json,
            SparqlResultFormat::Xml => QueryResultsFormat::Xml,
        }
    }
}

/// Reads a SPARQL results document into the answer to `query`.
///
/// Rows are ordered by [Query::projection]. Blank nodes become resources of the skolemizer's
/// session.
pub(crate) fn parse_results(
    endpoint: &str,
    format: SparqlResultFormat,
    body: &[u8],
    query: &Query,
    skolemizer: &BlankNodeSkolemizer,
) -> Result<Solutions, AdapterError> {
    let invalid = |reason: String| AdapterError::InvalidResponse {
        endpoint: endpoint.to_owned(),
        reason,
    };

    let output = QueryResultsParser::from_format(format.results_format())
        .for_reader(body)
        .map_err(|e| invalid(e.to_string()))?;
    let solutions = match output {
        ReaderQueryResultsParserOutput::Boolean(value) => {
            return if query.is_ask() {
                Ok(Solutions::Boolean(value))
            } else {
                Err(invalid("unexpected boolean result".to_owned()))
            };
        }
        ReaderQueryResultsParserOutput::Solutions(solutions) => solutions,
    };

    if query.is_count() {
        let mut count = 0;
        for solution in solutions {
            let solution = solution.map_err(|e| invalid(e.to_string()))?;
            if let Some(value) = solution.get("count") {
                count += parse_count(value).ok_or_else(|| {
                    invalid(format!("'{value}' is not a valid count"))
                })?;
            }
        }
        return Ok(Solutions::Count(count));
    }

    if query.is_ask() {
        // Some endpoints answer ask queries with a solution sequence.
        let mut solutions = solutions;
        let any = match solutions.next() {
            Some(solution) => {
                solution.map_err(|e| invalid(e.to_string()))?;
                true
            }
            None => false,
        };
        return Ok(Solutions::Boolean(any));
    }

    let projection = query.projection();
    let mut rows = Vec::new();
    for solution in solutions {
        let solution = solution.map_err(|e| invalid(e.to_string()))?;
        rows.push(
            projection
                .iter()
                .map(|variable| {
                    solution
                        .get(variable.as_str())
                        .cloned()
                        .and_then(|term| skolemizer.to_term(term))
                })
                .collect::<Row>(),
        );
    }
    Ok(Solutions::Rows(rows))
}

fn parse_count(term: &DecodedTerm) -> Option<usize> {
    match term {
        DecodedTerm::Literal(literal) => literal.value().trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_federation_model::{Literal, NamedNode, Term, TermPattern, Variable};

    const JSON_ROWS: &str = r#"{
      "head": { "vars": ["o", "s"] },
      "results": { "bindings": [
        { "s": { "type": "uri", "value": "http://e/a" },
          "o": { "type": "literal", "value": "x", "xml:lang": "en" } },
        { "s": { "type": "bnode", "value": "b0" } }
      ] }
    }"#;

    fn select_s_o() -> Query {
        let mut query = Query::new();
        query
            .select(["s", "o"])
            .unwrap()
            .where_pattern(
                Some(TermPattern::from(Variable::new_unchecked("s"))),
                Some(NamedNode::new_unchecked("http://e/p").into()),
                Some(TermPattern::from(Variable::new_unchecked("o"))),
            )
            .unwrap();
        query
    }

    #[test]
    fn rows_follow_the_projection_order() {
        let skolemizer = BlankNodeSkolemizer::new();
        let solutions = parse_results(
            "test",
            SparqlResultFormat::Json,
            JSON_ROWS.as_bytes(),
            &select_s_o(),
            &skolemizer,
        )
        .unwrap();
        let Solutions::Rows(rows) = solutions else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            vec![
                Some(NamedNode::new_unchecked("http://e/a").into()),
                Some(Literal::new_language_tagged_literal_unchecked("x", "en").into()),
            ]
        );
        let Some(Term::NamedNode(node)) = &rows[1][0] else {
            panic!("expected a skolemized resource");
        };
        assert!(node.as_str().starts_with("urn:x-bnode:"));
        assert!(node.as_str().ends_with(":b0"));
        assert_eq!(rows[1][1], None);
    }

    #[test]
    fn xml_boolean() {
        let body = r#"<?xml version="1.0"?>
<sparql xmlns="http://www.w3.org/2005/sparql-results#"><head></head><boolean>true</boolean></sparql>"#;
        let mut query = select_s_o();
        query.ask();
        let solutions = parse_results(
            "test",
            SparqlResultFormat::Xml,
            body.as_bytes(),
            &query,
            &BlankNodeSkolemizer::new(),
        )
        .unwrap();
        assert_eq!(solutions, Solutions::Boolean(true));
    }

    #[test]
    fn count_reads_the_count_binding() {
        let body = r#"{ "head": { "vars": ["count"] }, "results": { "bindings": [
          { "count": { "type": "literal", "value": "42",
            "datatype": "http://www.w3.org/2001/XMLSchema#integer" } } ] } }"#;
        let mut query = select_s_o();
        query.count(["s"]).unwrap();
        let solutions = parse_results(
            "test",
            SparqlResultFormat::Json,
            body.as_bytes(),
            &query,
            &BlankNodeSkolemizer::new(),
        )
        .unwrap();
        assert_eq!(solutions, Solutions::Count(42));
    }

    #[test]
    fn malformed_documents_are_invalid_responses() {
        let err = parse_results(
            "test",
            SparqlResultFormat::Json,
            b"{ not json",
            &select_s_o(),
            &BlankNodeSkolemizer::new(),
        )
        .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidResponse { .. }));
    }
}
