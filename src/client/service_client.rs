//! Agent service client
//!
//! Translates a logical service call into the coordinator payload, posts it,
//! and normalizes the reply into a [`ServiceResponse`]. The client is
//! stateless across calls; it only holds its configuration and HTTP client.

use chrono::Utc;
use serde_json::{ Value, json };
use tracing::debug;

use crate::client::services::{ Service, ServiceParams, ServiceRequest, ServiceResponse };
use crate::client::transport::{ HttpReply, HttpTransport, join_url };
use crate::config::{ ConsoleConfig, EndpointPolicy };
use crate::errors::Error;
use crate::utils::json::excerpt;

/// Characters of an undecodable body quoted in a protocol error
const INVALID_BODY_EXCERPT_CHARS: usize = 200;

/// Client for the Tides agent coordinator
#[derive(Debug, Clone)]
pub struct ServiceClient {
    /// HTTP transport with the configured timeout
    transport: HttpTransport,
    /// Base URL of the agent
    base_url: String,
    /// Endpoint routing
    endpoint_policy: EndpointPolicy,
    /// Tide used when a call passes an empty one
    default_tide_id: String,
    /// User id sent with free-text chat
    default_user_id: String,
}

impl ServiceClient {
    /// Create a client from the console configuration
    pub fn new(config: &ConsoleConfig) -> Result<Self, Error> {
        Ok(Self {
            transport: HttpTransport::new(config.request_timeout)?,
            base_url: config.agent_url.clone(),
            endpoint_policy: config.endpoint_policy,
            default_tide_id: config.tide_id.clone(),
            default_user_id: config.user_id.clone(),
        })
    }

    /// Base URL this client posts to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call a service by its wire name.
    ///
    /// An empty API key, an unknown service, or a missing required parameter
    /// fails with a validation error before any request is made.
    pub async fn invoke(
        &self,
        service: &str,
        api_key: &str,
        context_id: &str,
        params: ServiceParams
    ) -> ServiceResponse {
        if api_key.is_empty() {
            return Error::Validation("API key required".to_string()).into();
        }
        match service.parse::<Service>() {
            Ok(service) => self.invoke_service(service, api_key, context_id, params).await,
            Err(e) => e.into(),
        }
    }

    /// Call a known service
    pub async fn invoke_service(
        &self,
        service: Service,
        api_key: &str,
        context_id: &str,
        params: ServiceParams
    ) -> ServiceResponse {
        let tide_id = self.resolve_tide(context_id);
        let request = ServiceRequest::new(service, api_key, tide_id, params);
        let endpoint = self.endpoint_policy.endpoint_for(service.as_str());

        match self.send(&request, endpoint).await {
            Ok(body) => ServiceResponse::Success { body },
            Err(e) => e.into(),
        }
    }

    /// Send free text to the coordinator and let it pick the service.
    pub async fn chat(
        &self,
        message: &str,
        api_key: &str,
        context_id: &str,
        user_id: Option<&str>
    ) -> ServiceResponse {
        match self.send_chat(message, api_key, context_id, user_id).await {
            Ok(body) => ServiceResponse::Success { body },
            Err(e) => e.into(),
        }
    }

    /// Check the agent is reachable by chatting `ping` on the default tide
    pub async fn test_connection(&self, api_key: &str) -> ServiceResponse {
        self.chat("ping", api_key, "", None).await
    }

    async fn send(&self, request: &ServiceRequest, endpoint: &str) -> Result<Value, Error> {
        let payload = request.payload()?;
        let url = join_url(&self.base_url, endpoint);
        let reply = self.transport.post_json(
            &url,
            &payload,
            &[],
            request.service.as_str(),
            &request.api_key
        ).await?;
        decode_reply(reply)
    }

    async fn send_chat(
        &self,
        message: &str,
        api_key: &str,
        context_id: &str,
        user_id: Option<&str>
    ) -> Result<Value, Error> {
        if api_key.is_empty() {
            return Err(Error::Validation("API key required".to_string()));
        }
        if message.trim().is_empty() {
            return Err(Error::Validation("Message required".to_string()));
        }

        let user_id = user_id.filter(|u| !u.is_empty()).unwrap_or(&self.default_user_id);
        let payload =
            json!({
            "message": message,
            "userId": user_id,
            "api_key": api_key,
            "tides_id": self.resolve_tide(context_id),
            "timestamp": Utc::now().to_rfc3339(),
        });

        let url = join_url(&self.base_url, self.endpoint_policy.endpoint_for("chat"));
        let reply = self.transport.post_json(&url, &payload, &[], "chat", api_key).await?;
        decode_reply(reply)
    }

    fn resolve_tide<'a>(&'a self, context_id: &'a str) -> &'a str {
        if context_id.trim().is_empty() {
            debug!("No tide id given, using {}", self.default_tide_id);
            &self.default_tide_id
        } else {
            context_id
        }
    }
}

fn decode_reply(reply: HttpReply) -> Result<Value, Error> {
    if !reply.is_ok() {
        return Err(Error::Http { status: reply.status, body: reply.body });
    }
    serde_json::from_str(&reply.body).map_err(|e| {
        Error::Protocol(
            format!(
                "Invalid JSON response ({}): {}",
                e,
                excerpt(&reply.body, INVALID_BODY_EXCERPT_CHARS)
            )
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use serde_json::Map;
    use std::time::Duration;
    use wiremock::matchers::{ body_partial_json, method, path };
    use wiremock::{ Mock, MockServer, ResponseTemplate };

    fn client_for(server: &MockServer, policy: EndpointPolicy) -> ServiceClient {
        let config = ConsoleConfig::builder()
            .with_agent_url(server.uri())
            .with_endpoint_policy(policy)
            .with_request_timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        ServiceClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_empty_api_key_never_hits_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let client = client_for(&server, EndpointPolicy::Coordinator);
        let response = client.invoke("insights", "", "tide_1", Map::new()).await;
        assert_eq!(response.failure_kind(), Some(ErrorKind::ValidationError));
        assert_eq!(response, ServiceResponse::Failure {
            kind: ErrorKind::ValidationError,
            message: "API key required".to_string(),
            detail: None,
        });
    }

    #[tokio::test]
    async fn test_empty_tide_uses_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/coordinator"))
            .and(body_partial_json(json!({ "tides_id": "daily-tide-default", "service": "preferences" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server).await;

        let client = client_for(&server, EndpointPolicy::Coordinator);
        let response = client.invoke("preferences", "key", "", Map::new()).await;
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_chat_payload_and_routing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/coordinator"))
            .and(body_partial_json(json!({ "message": "ping", "userId": "demo_user", "api_key": "key" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "message": "pong" } }))
            )
            .expect(1)
            .mount(&server).await;

        let client = client_for(&server, EndpointPolicy::Coordinator);
        let response = client.test_connection("key").await;
        assert_eq!(response.data().unwrap()["message"], "pong");

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body.get("service").is_none());
        assert!(body["timestamp"].as_str().unwrap().contains('T'));
    }

    #[tokio::test]
    async fn test_legacy_policy_routes_chat_to_chat_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "ok" })))
            .expect(2)
            .mount(&server).await;

        let client = client_for(&server, EndpointPolicy::Legacy);
        assert!(client.invoke("chat", "key", "t", Map::new()).await.is_success());
        assert!(client.chat("hello", "key", "t", None).await.is_success());
    }

    #[tokio::test]
    async fn test_empty_chat_message_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let client = client_for(&server, EndpointPolicy::Coordinator);
        let response = client.chat("   ", "key", "t", None).await;
        assert_eq!(response.failure_kind(), Some(ErrorKind::ValidationError));
    }

    #[tokio::test]
    async fn test_non_json_success_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server).await;

        let client = client_for(&server, EndpointPolicy::Coordinator);
        let response = client.invoke("insights", "key", "t", Map::new()).await;
        match response {
            ServiceResponse::Failure { kind, message, .. } => {
                assert_eq!(kind, ErrorKind::ProtocolError);
                assert!(message.contains("<html>oops</html>"));
            }
            _ => panic!("Expected failure"),
        }
    }
}
