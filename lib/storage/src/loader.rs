use crate::LoaderError;
use oxrdfio::{RdfFormat, RdfParser, RdfSerializer};
use rdf_federation_model::{BlankNodeSkolemizer, GraphName, NamedNode, Quad, Term, Triple};
use std::io::{BufRead, Write};

/// A triple together with its context. `None` is the default context.
pub type Statement = (Triple, Option<NamedNode>);

/// Parses N-Triples or N-Quads, one statement per line.
///
/// Empty lines and lines starting with `#` are skipped. Every other line must hold exactly one
/// statement, otherwise the whole input is rejected with an error naming the line. Blank nodes
/// are replaced by resources of the skolemizer's session.
pub fn parse_statements(
    reader: impl BufRead,
    skolemizer: &BlankNodeSkolemizer,
) -> Result<Vec<Statement>, LoaderError> {
    let mut statements = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let content = line.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }
        statements.push(parse_line(content, index + 1, skolemizer)?);
    }
    Ok(statements)
}

fn parse_line(
    content: &str,
    line: usize,
    skolemizer: &BlankNodeSkolemizer,
) -> Result<Statement, LoaderError> {
    let syntax_error = |message: &str| LoaderError::Syntax {
        line,
        content: content.to_owned(),
        message: message.to_owned(),
    };

    let mut quads = RdfParser::from_format(RdfFormat::NQuads).for_reader(content.as_bytes());
    let quad = match quads.next() {
        Some(Ok(quad)) => quad,
        Some(Err(error)) => return Err(syntax_error(&error.to_string())),
        None => return Err(syntax_error("no statement found")),
    };
    if quads.next().is_some() {
        return Err(syntax_error("more than one statement on a single line"));
    }

    let subject = skolemizer
        .to_term(quad.subject.into())
        .and_then(Term::into_named_node)
        .ok_or_else(|| syntax_error("unsupported subject"))?;
    let object = skolemizer
        .to_term(quad.object)
        .ok_or_else(|| syntax_error("unsupported object"))?;
    let context = match quad.graph_name {
        GraphName::NamedNode(context) => Some(context),
        GraphName::BlankNode(context) => Some(skolemizer.skolemize(&context)),
        GraphName::DefaultGraph => None,
    };
    Ok((Triple::new(subject, quad.predicate, object), context))
}

/// Writes statements as N-Quads. Statements of the default context are plain N-Triples lines.
pub fn write_statements<W: Write>(
    writer: W,
    statements: impl IntoIterator<Item = Statement>,
) -> std::io::Result<W> {
    let mut serializer = RdfSerializer::from_format(RdfFormat::NQuads).for_writer(writer);
    for (triple, context) in statements {
        let graph_name = match context {
            Some(context) => GraphName::NamedNode(context),
            None => GraphName::DefaultGraph,
        };
        let quad = Quad::new(
            triple.subject,
            triple.predicate,
            oxrdf_term(triple.object),
            graph_name,
        );
        serializer.serialize_quad(&quad)?;
    }
    serializer.finish()
}

fn oxrdf_term(term: Term) -> rdf_federation_model::DecodedTerm {
    term.into()
}
