//! HTTP transport shared by the service and tool clients
//!
//! Each call is a single POST with a JSON body. The transport reads the whole
//! reply body before returning; callers decide how to interpret it from the
//! status and content type.

use reqwest::{ Client as HttpClient, ClientBuilder, header };
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

use crate::errors::Error;
use crate::utils::logging;

/// A fully-read HTTP reply
#[derive(Debug, Clone)]
pub struct HttpReply {
    /// Status code
    pub status: u16,
    /// Value of the `Content-Type` header, empty when absent
    pub content_type: String,
    /// Body decoded as text
    pub body: String,
}

impl HttpReply {
    /// Whether the server answered 200
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Whether the reply is framed as an event stream
    pub fn is_event_stream(&self) -> bool {
        self.content_type.contains(crate::protocol::EVENT_STREAM_CONTENT_TYPE)
    }
}

/// POST-only JSON transport with a fixed timeout
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// HTTP client
    http_client: HttpClient,
    /// Timeout applied to every request
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let http_client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!("HTTP client configured with timeout: {:?}", timeout);

        Ok(Self { http_client, timeout })
    }

    /// POST `body` as JSON to `url` with optional extra headers.
    ///
    /// `label` and `api_key` are only used for logging; the key is masked.
    pub async fn post_json(
        &self,
        url: &str,
        body: &Value,
        extra_headers: &[(header::HeaderName, String)],
        label: &str,
        api_key: &str
    ) -> Result<HttpReply, Error> {
        logging::log_request(url, label, api_key, body);

        let mut request = self.http_client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(body);
        for (name, value) in extra_headers {
            request = request.header(name.clone(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            Error::Transport(describe_send_error(&e, self.timeout))
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .text().await
            .map_err(|e| Error::Transport(format!("Failed to read response body: {}", e)))?;

        logging::log_response(url, status, &content_type, &body);
        if status != 200 {
            warn!("{} answered HTTP {}", url, status);
        }

        Ok(HttpReply { status, content_type, body })
    }
}

/// Join a base URL and an endpoint suffix without doubling the slash
pub fn join_url(base: &str, endpoint: &str) -> String {
    if endpoint.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), endpoint.trim_start_matches('/'))
}

fn describe_send_error(err: &reqwest::Error, timeout: Duration) -> String {
    if err.is_timeout() {
        format!("request timed out after {}s: {}", timeout.as_secs(), err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{ body_json, header as header_matcher, method, path };
    use wiremock::{ Mock, MockServer, ResponseTemplate };

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://a.dev", "/coordinator"), "http://a.dev/coordinator");
        assert_eq!(join_url("http://a.dev/", "/coordinator"), "http://a.dev/coordinator");
        assert_eq!(join_url("http://a.dev/mcp", ""), "http://a.dev/mcp");
    }

    #[test]
    fn test_event_stream_detection() {
        let reply = HttpReply {
            status: 200,
            content_type: "text/event-stream; charset=utf-8".to_string(),
            body: String::new(),
        };
        assert!(reply.is_ok());
        assert!(reply.is_event_stream());
    }

    #[tokio::test]
    async fn test_post_json_reads_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(header_matcher("content-type", "application/json"))
            .and(body_json(json!({ "a": 1 })))
            .respond_with(ResponseTemplate::new(418).set_body_string("teapot"))
            .expect(1)
            .mount(&server).await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let reply = transport
            .post_json(&join_url(&server.uri(), "/echo"), &json!({ "a": 1 }), &[], "echo", "").await
            .unwrap();
        assert_eq!(reply.status, 418);
        assert_eq!(reply.body, "teapot");
        assert!(!reply.is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
        let err = transport
            .post_json("http://127.0.0.1:9/unreachable", &json!({}), &[], "test", "").await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
