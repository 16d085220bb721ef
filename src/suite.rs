//! Quick test suite
//!
//! Runs a fixed list of service calls one after another against the same
//! tide and reports each outcome as it completes. Calls are never issued in
//! parallel.

use serde_json::{ Value, json };
use std::time::{ Duration, Instant };
use tracing::info;

use crate::client::ServiceClient;
use crate::client::services::{ Service, ServiceParams, ServiceResponse, summarize };

/// One call of the suite
#[derive(Debug, Clone)]
pub struct SuiteStep {
    /// Service to call
    pub service: Service,
    /// Parameters to send
    pub params: ServiceParams,
}

/// Result of one suite step
#[derive(Debug, Clone)]
pub struct SuiteOutcome {
    /// Service that was called
    pub service: Service,
    /// Normalized response
    pub response: ServiceResponse,
    /// Round-trip time
    pub elapsed: Duration,
    /// Human-readable digest of the response
    pub digest: String,
}

impl SuiteOutcome {
    /// Whether the step succeeded
    pub fn passed(&self) -> bool {
        self.response.is_success()
    }
}

fn params(value: Value) -> ServiceParams {
    match value {
        Value::Object(map) => map,
        _ => ServiceParams::new(),
    }
}

/// The fixed quick suite
pub fn quick_suite() -> Vec<SuiteStep> {
    vec![
        SuiteStep { service: Service::Insights, params: params(json!({ "timeframe": "7d" })) },
        SuiteStep {
            service: Service::Questions,
            params: params(json!({ "question": "How can I be more productive?" })),
        },
        SuiteStep { service: Service::Preferences, params: ServiceParams::new() },
        SuiteStep {
            service: Service::Chat,
            params: params(json!({ "message": "Hello, how are you?" })),
        }
    ]
}

/// Run `steps` in order, calling `on_step` with (index, total, outcome)
/// after each one.
pub async fn run_suite<F>(
    client: &ServiceClient,
    steps: &[SuiteStep],
    api_key: &str,
    tide_id: &str,
    mut on_step: F
) -> Vec<SuiteOutcome>
    where F: FnMut(usize, usize, &SuiteOutcome)
{
    let mut outcomes = Vec::with_capacity(steps.len());

    for (index, step) in steps.iter().enumerate() {
        info!("Suite step {}/{}: {}", index + 1, steps.len(), step.service);
        let started = Instant::now();
        let response = client.invoke_service(step.service, api_key, tide_id, step.params.clone()).await;
        let outcome = SuiteOutcome {
            service: step.service,
            digest: summarize(&response),
            response,
            elapsed: started.elapsed(),
        };
        on_step(index, steps.len(), &outcome);
        outcomes.push(outcome);
    }

    outcomes
}
