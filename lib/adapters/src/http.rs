use crate::{AdapterError, ConnectionParams};
use reqwest::{Client, Response};
use std::time::Duration;

/// The request timeout of remote adapters without a `timeout_secs` option.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn build_client(timeout: Duration) -> Result<Client, AdapterError> {
    Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .timeout(timeout)
        .build()
        .map_err(AdapterError::Client)
}

pub(crate) fn map_request_error(
    endpoint: &str,
    timeout: Duration,
    error: reqwest::Error,
) -> AdapterError {
    if error.is_timeout() {
        AdapterError::Timeout {
            endpoint: endpoint.to_owned(),
            timeout,
        }
    } else {
        AdapterError::Unreachable {
            endpoint: endpoint.to_owned(),
            source: error,
        }
    }
}

/// Turns a non-success response into [AdapterError::Backend].
pub(crate) async fn error_for_status(
    endpoint: &str,
    response: Response,
) -> Result<Response, AdapterError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(AdapterError::Backend {
        endpoint: endpoint.to_owned(),
        status,
        message,
    })
}

/// Reads the timeout option shared by the remote adapters.
pub(crate) fn timeout_option(params: &ConnectionParams) -> Result<Duration, AdapterError> {
    Ok(params
        .parse_optional::<u64>("timeout_secs")?
        .map_or(DEFAULT_HTTP_TIMEOUT, Duration::from_secs))
}

/// Joins a host, port and path into a base URL. Hosts that carry a scheme keep it.
pub(crate) fn endpoint_url(host: &str, port: u16, path: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        let has_port = host
            .rsplit_once(':')
            .is_some_and(|(_, tail)| tail.chars().all(|c| c.is_ascii_digit()));
        if has_port {
            format!("{host}/{path}")
        } else {
            format!("{host}:{port}/{path}")
        }
    } else {
        format!("http://{host}:{port}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_forms() {
        assert_eq!(
            endpoint_url("dbpedia.org", 80, "sparql"),
            "http://dbpedia.org:80/sparql"
        );
        assert_eq!(
            endpoint_url("http://127.0.0.1:1234/", 80, "/sparql"),
            "http://127.0.0.1:1234/sparql"
        );
        assert_eq!(
            endpoint_url("https://example.org", 443, "query"),
            "https://example.org:443/query"
        );
    }
}
