use rdf_federation_model::{BlankNodeSkolemizer, DecodedTerm, Term, TermPattern, Variable};
use rdf_federation_query::n3::{N3Query, N3ResponseShape};
use rdf_federation_query::Row;
use std::str::FromStr;

/// Reads the body of an N3 query response into rows over [N3Query::variables].
///
/// Lines are either triples (`<s> <p> "o" .`) or tuples (`( <a> "b" ) .`), depending on
/// [N3Query::shape]. Blank lines and `#` comments are skipped.
pub(crate) fn parse_response(
    body: &str,
    compiled: &N3Query,
    skolemizer: &BlankNodeSkolemizer,
) -> Result<Vec<Row>, String> {
    let mut rows = Vec::new();
    for (index, line) in body.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("@prefix") {
            continue;
        }
        let row = parse_line(line, compiled, skolemizer)
            .map_err(|reason| format!("line {}: {reason}", index + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

fn parse_line(
    line: &str,
    compiled: &N3Query,
    skolemizer: &BlankNodeSkolemizer,
) -> Result<Row, String> {
    let line = line
        .strip_suffix('.')
        .ok_or_else(|| "missing the final '.'".to_owned())?
        .trim_end();
    match compiled.shape() {
        N3ResponseShape::Tuples => {
            let inner = line
                .strip_prefix('(')
                .and_then(|l| l.strip_suffix(')'))
                .ok_or_else(|| "expected a parenthesized tuple".to_owned())?;
            let terms = parse_terms(inner, skolemizer)?;
            if terms.len() != compiled.variables().len() {
                return Err(format!(
                    "expected {} values, found {}",
                    compiled.variables().len(),
                    terms.len()
                ));
            }
            Ok(terms.into_iter().map(Some).collect())
        }
        N3ResponseShape::Triples(pattern) => {
            let terms = parse_terms(line, skolemizer)?;
            let [subject, predicate, object]: [Term; 3] = terms
                .try_into()
                .map_err(|terms: Vec<Term>| format!("expected a triple, found {} terms", terms.len()))?;
            let statement = [subject, predicate, object];
            Ok(compiled
                .variables()
                .iter()
                .map(|variable| value_of(variable, pattern.terms(), &statement))
                .collect())
        }
    }
}

fn value_of(variable: &Variable, pattern: [&TermPattern; 3], statement: &[Term; 3]) -> Option<Term> {
    pattern
        .iter()
        .position(|term| term.as_variable() == Some(variable))
        .map(|position| statement[position].clone())
}

fn parse_terms(text: &str, skolemizer: &BlankNodeSkolemizer) -> Result<Vec<Term>, String> {
    tokenize(text)?
        .into_iter()
        .map(|token| {
            let term = DecodedTerm::from_str(token).map_err(|e| format!("'{token}': {e}"))?;
            skolemizer
                .to_term(term)
                .ok_or_else(|| format!("'{token}' is not a resource or literal"))
        })
        .collect()
}

/// Splits a line into term tokens: `<iri>`, `_:label`, and literals with an optional language
/// tag or datatype.
fn tokenize(text: &str) -> Result<Vec<&str>, String> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut position = 0;
    while position < bytes.len() {
        let start = position;
        match bytes[position] {
            b' ' | b'\t' => {
                position += 1;
                continue;
            }
            b'<' => position = end_of_iri(text, position)?,
            b'"' => {
                position = end_of_string(text, position)?;
                if text[position..].starts_with("^^<") {
                    position = end_of_iri(text, position + 2)?;
                } else if bytes.get(position) == Some(&b'@') {
                    position = end_of_word(bytes, position + 1);
                }
            }
            b'_' if text[position..].starts_with("_:") => {
                position = end_of_word(bytes, position + 2);
            }
            _ => return Err(format!("unexpected input at '{}'", &text[position..])),
        }
        tokens.push(&text[start..position]);
    }
    Ok(tokens)
}

fn end_of_iri(text: &str, start: usize) -> Result<usize, String> {
    text[start..]
        .find('>')
        .map(|offset| start + offset + 1)
        .ok_or_else(|| "unterminated IRI".to_owned())
}

fn end_of_string(text: &str, start: usize) -> Result<usize, String> {
    let bytes = text.as_bytes();
    let mut position = start + 1;
    while position < bytes.len() {
        match bytes[position] {
            b'\\' => position += 2,
            b'"' => return Ok(position + 1),
            _ => position += 1,
        }
    }
    Err("unterminated string".to_owned())
}

fn end_of_word(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| b.is_ascii_whitespace() || *b == b')')
        .map_or(bytes.len(), |offset| start + offset)
}
