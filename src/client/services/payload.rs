//! Coordinator payload construction
//!
//! A pure mapping from a service invocation to the JSON body the coordinator
//! expects. Nothing here touches the network.

use serde_json::{ Map, Value, json };

use crate::errors::Error;
use super::catalog::Service;

/// Service-specific parameters, keyed by name
pub type ServiceParams = Map<String, Value>;

/// Question sent when `questions` is called without one
pub const DEFAULT_QUESTION: &str = "How can I improve my productivity?";
/// Message sent when `chat` is called without one
pub const DEFAULT_CHAT_MESSAGE: &str = "How productive was I today?";
/// Scheduling preference attached to `optimize` when a timeframe is given
pub const OPTIMIZE_FOCUS_TIME_BLOCKS: u64 = 90;

/// A single service call, built fresh for each invocation
#[derive(Debug, Clone)]
pub struct ServiceRequest {
    /// Target service
    pub service: Service,
    /// API key sent as `api_key`
    pub api_key: String,
    /// Tide id sent as `tides_id`
    pub context_id: String,
    /// Service-specific fields
    pub params: ServiceParams,
}

impl ServiceRequest {
    /// Create a request; validation happens in [`ServiceRequest::payload`]
    pub fn new(
        service: Service,
        api_key: impl Into<String>,
        context_id: impl Into<String>,
        params: ServiceParams
    ) -> Self {
        Self {
            service,
            api_key: api_key.into(),
            context_id: context_id.into(),
            params,
        }
    }

    /// Build the wire payload.
    ///
    /// Fails with [`Error::Validation`] when the API key is empty or a
    /// required parameter is missing.
    pub fn payload(&self) -> Result<Value, Error> {
        if self.api_key.is_empty() {
            return Err(Error::Validation("API key required".to_string()));
        }

        if self.service == Service::R2Test {
            let path = self.params
                .get("r2_path")
                .ok_or_else(|| {
                    Error::Validation("r2_path is required for r2-test service".to_string())
                })?;
            return Ok(json!({ "r2_test_path": path }));
        }

        let mut payload = Map::new();
        payload.insert("api_key".to_string(), Value::String(self.api_key.clone()));
        payload.insert("tides_id".to_string(), Value::String(self.context_id.clone()));
        payload.insert("service".to_string(), Value::String(self.service.as_str().to_string()));

        let timeframe = self.params.get("timeframe");
        match self.service {
            Service::Insights => {
                if let Some(timeframe) = timeframe {
                    payload.insert("timeframe".to_string(), timeframe.clone());
                }
            }
            Service::Optimize => {
                if timeframe.is_some() {
                    payload.insert(
                        "preferences".to_string(),
                        json!({ "focus_time_blocks": OPTIMIZE_FOCUS_TIME_BLOCKS })
                    );
                }
            }
            Service::Reports => {
                payload.insert("report_type".to_string(), json!("summary"));
                if let Some(timeframe) = timeframe {
                    payload.insert("period".to_string(), timeframe.clone());
                }
            }
            Service::Questions => {
                payload.insert("question".to_string(), self.param_or("question", DEFAULT_QUESTION));
            }
            Service::Chat => {
                payload.insert("message".to_string(), self.param_or("message", DEFAULT_CHAT_MESSAGE));
            }
            Service::Preferences | Service::R2Test => {}
        }

        Ok(Value::Object(payload))
    }

    fn param_or(&self, name: &str, default: &str) -> Value {
        self.params
            .get(name)
            .cloned()
            .unwrap_or_else(|| Value::String(default.to_string()))
    }
}
