//! The read-write adapter for stores that speak the N3 query protocol.
//!
//! Queries are sent as `GET ?q=`, deletions as `DELETE ?q=` and new statements are uploaded with
//! `PUT`. The store evaluates only the basic graph pattern, so filters, ordering, and slicing
//! are applied to the response on the client.

mod response;

use crate::http::{build_client, endpoint_url, error_for_status, map_request_error, timeout_option};
use crate::{Adapter, AdapterError, ConnectionParams};
use async_trait::async_trait;
use rdf_federation_model::{BlankNodeSkolemizer, NamedNode, StatementPattern, Triple};
use rdf_federation_query::n3::{N3Query, N3QueryCompiler};
use rdf_federation_query::{Query, SolutionSet, Solutions};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use std::time::Duration;

pub const N3QL_ADAPTER_TYPE: &str = "n3ql";

pub const N3_MEDIA_TYPE: &str = "application/rdf+n3";

const KNOWN_OPTIONS: &[&str] = &["host", "port", "context", "timeout_secs"];

/// Reads from and writes to a remote N3 query store.
///
/// Options are `host` (required), `port` (default `8080`), `context` (a path below the host) and
/// `timeout_secs`.
#[derive(Debug)]
pub struct N3qlAdapter {
    client: Client,
    endpoint: String,
    timeout: Duration,
    skolemizer: BlankNodeSkolemizer,
}

impl N3qlAdapter {
    pub fn from_params(params: &ConnectionParams) -> Result<Self, AdapterError> {
        params.ensure_known_options(N3QL_ADAPTER_TYPE, KNOWN_OPTIONS)?;
        let host = params.required(N3QL_ADAPTER_TYPE, "host")?;
        let port = params.parse_optional::<u16>("port")?.unwrap_or(8080);
        let context = params.option("context").unwrap_or_default();
        let timeout = timeout_option(params)?;

        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint_url(host, port, context),
            timeout,
            skolemizer: BlankNodeSkolemizer::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn compile(&self, query: &Query) -> Result<N3Query, AdapterError> {
        Ok(N3QueryCompiler.compile(query)?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, AdapterError> {
        request
            .send()
            .await
            .map_err(|e| map_request_error(&self.endpoint, self.timeout, e))
    }

    fn request_with_query(&self, method: Method, compiled: &N3Query) -> RequestBuilder {
        self.client
            .request(method, &self.endpoint)
            .query(&[("q", compiled.text())])
            .header(ACCEPT, N3_MEDIA_TYPE)
    }
}

#[async_trait]
impl Adapter for N3qlAdapter {
    fn adapter_type(&self) -> &'static str {
        N3QL_ADAPTER_TYPE
    }

    fn reads(&self) -> bool {
        true
    }

    fn writes(&self) -> bool {
        true
    }

    fn translate(&self, query: &Query) -> Result<String, AdapterError> {
        Ok(self.compile(query)?.text().to_owned())
    }

    async fn query(&self, query: &Query) -> Result<Solutions, AdapterError> {
        if !query.unbound_variables().is_empty() {
            return Ok(Solutions::empty_for(query));
        }
        let compiled = self.compile(query)?;
        tracing::debug!(endpoint = %self.endpoint, query = %compiled.text(), "Sending N3 query");

        let response = self
            .send(self.request_with_query(Method::GET, &compiled))
            .await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Solutions::empty_for(query));
        }
        let body = error_for_status(&self.endpoint, response)
            .await?
            .text()
            .await
            .map_err(|e| map_request_error(&self.endpoint, self.timeout, e))?;

        let rows = response::parse_response(&body, &compiled, &self.skolemizer).map_err(
            |reason| AdapterError::InvalidResponse {
                endpoint: self.endpoint.clone(),
                reason,
            },
        )?;
        Ok(SolutionSet::new(compiled.variables().to_vec(), rows).finish(query))
    }

    async fn add(&self, triple: &Triple, context: Option<&NamedNode>) -> Result<bool, AdapterError> {
        if context.is_some() {
            return Err(AdapterError::Unsupported {
                adapter_type: N3QL_ADAPTER_TYPE,
                feature: "named contexts",
            });
        }
        let response = self
            .send(
                self.client
                    .put(&self.endpoint)
                    .header(CONTENT_TYPE, N3_MEDIA_TYPE)
                    .body(format!("{triple}\n")),
            )
            .await?;
        error_for_status(&self.endpoint, response).await?;
        tracing::debug!(endpoint = %self.endpoint, %triple, "Uploaded statement");
        Ok(true)
    }

    async fn remove(&self, pattern: &StatementPattern) -> Result<Option<usize>, AdapterError> {
        let Some(query) = pattern_query(pattern)? else {
            return Err(AdapterError::Unsupported {
                adapter_type: N3QL_ADAPTER_TYPE,
                feature: "named contexts",
            });
        };
        let compiled = self.compile(&query)?;
        let response = self
            .send(self.request_with_query(Method::DELETE, &compiled))
            .await?;
        error_for_status(&self.endpoint, response).await?;
        Ok(None)
    }
}

/// Builds the query that selects the statements matching `pattern`.
///
/// Returns `None` if the pattern is restricted to a context.
fn pattern_query(pattern: &StatementPattern) -> Result<Option<Query>, AdapterError> {
    if pattern.context.is_some() {
        return Ok(None);
    }
    let mut query = Query::new();
    query.where_pattern(
        pattern.subject.clone().map(Into::into),
        pattern.predicate.clone().map(Into::into),
        pattern.object.clone().map(Into::into),
    )?;
    Ok(Some(query))
}
