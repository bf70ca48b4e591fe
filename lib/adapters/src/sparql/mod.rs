//! The read-only adapter for SPARQL protocol endpoints.

mod results;

pub use results::SparqlResultFormat;

use crate::http::{build_client, endpoint_url, error_for_status, map_request_error, timeout_option};
use crate::{Adapter, AdapterError, ConnectionParams};
use async_trait::async_trait;
use rdf_federation_model::BlankNodeSkolemizer;
use rdf_federation_query::sparql::{SparqlCompiler, SparqlDialect};
use rdf_federation_query::{Query, Solutions};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const SPARQL_ADAPTER_TYPE: &str = "sparql";

const KNOWN_OPTIONS: &[&str] = &[
    "host",
    "port",
    "path",
    "context",
    "result_format",
    "engine",
    "timeout_secs",
];

/// Queries a remote SPARQL endpoint over HTTP GET.
///
/// | option          | default    |                                                    |
/// |-----------------|------------|----------------------------------------------------|
/// | `host`          | required   | host name, or a base URL with scheme               |
/// | `port`          | `80`       |                                                    |
/// | `path`          | `sparql`   |                                                    |
/// | `context`       | empty      | appended to the path                               |
/// | `result_format` | `xml`      | `json` or `xml`                                    |
/// | `engine`        | `standard` | the keyword dialect: `standard`, `yars2`, `virtuoso` |
/// | `timeout_secs`  | `30`       |                                                    |
#[derive(Debug)]
pub struct SparqlAdapter {
    client: Client,
    endpoint: String,
    timeout: Duration,
    format: SparqlResultFormat,
    compiler: SparqlCompiler,
    skolemizer: BlankNodeSkolemizer,
}

impl SparqlAdapter {
    pub fn from_params(params: &ConnectionParams) -> Result<Self, AdapterError> {
        params.ensure_known_options(SPARQL_ADAPTER_TYPE, KNOWN_OPTIONS)?;
        let host = params.required(SPARQL_ADAPTER_TYPE, "host")?;
        let port = params.parse_optional::<u16>("port")?.unwrap_or(80);
        let path = params.option("path").unwrap_or("sparql");
        let context = params.option("context").unwrap_or_default();
        let format = match params.option("result_format") {
            Some(name) => SparqlResultFormat::from_name(name).ok_or_else(|| {
                AdapterError::InvalidOption {
                    option: "result_format".to_owned(),
                    value: name.to_owned(),
                    reason: "expected 'json' or 'xml'".to_owned(),
                }
            })?,
            None => SparqlResultFormat::default(),
        };
        let dialect = match params.option("engine") {
            Some(name) => {
                SparqlDialect::from_name(name).ok_or_else(|| AdapterError::InvalidOption {
                    option: "engine".to_owned(),
                    value: name.to_owned(),
                    reason: "expected 'standard', 'yars2' or 'virtuoso'".to_owned(),
                })?
            }
            None => SparqlDialect::default(),
        };
        let timeout = timeout_option(params)?;

        Ok(Self {
            client: build_client(timeout)?,
            endpoint: format!("{}{context}", endpoint_url(host, port, path)),
            timeout,
            format,
            compiler: SparqlCompiler::new(dialect),
            skolemizer: BlankNodeSkolemizer::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn result_format(&self) -> SparqlResultFormat {
        self.format
    }
}

#[async_trait]
impl Adapter for SparqlAdapter {
    fn adapter_type(&self) -> &'static str {
        SPARQL_ADAPTER_TYPE
    }

    fn reads(&self) -> bool {
        true
    }

    fn writes(&self) -> bool {
        false
    }

    fn translate(&self, query: &Query) -> Result<String, AdapterError> {
        Ok(self.compiler.compile(query)?)
    }

    async fn query(&self, query: &Query) -> Result<Solutions, AdapterError> {
        if !query.unbound_variables().is_empty() {
            return Ok(Solutions::empty_for(query));
        }
        let text = self.translate(query)?;
        tracing::debug!(endpoint = %self.endpoint, query = %text, "Sending SPARQL query");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", text.as_str())])
            .header(ACCEPT, self.format.media_type())
            .send()
            .await
            .map_err(|e| map_request_error(&self.endpoint, self.timeout, e))?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Solutions::empty_for(query));
        }
        let response = error_for_status(&self.endpoint, response).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| map_request_error(&self.endpoint, self.timeout, e))?;
        results::parse_results(&self.endpoint, self.format, &body, query, &self.skolemizer)
    }
}
