//! Service response normalization
//!
//! [`ServiceResponse`] is what every service call returns. Successful bodies
//! are kept whole; presentation helpers decode them into a [`ResponseShape`]
//! in a fixed priority order, falling back to a generic payload. All field
//! access is optional: a missing field moves on to the next shape.

use serde::Serialize;
use serde_json::{ Value, json };

use crate::errors::{ Error, ErrorKind };
use crate::utils::json::{ excerpt, str_field, value_excerpt };

/// Characters of a generic payload shown in a digest
const GENERIC_EXCERPT_CHARS: usize = 500;
/// Characters of an error body shown in a chat reply
const ERROR_EXCERPT_CHARS: usize = 200;
/// Recommendations listed in an insights digest
const MAX_RECOMMENDATIONS: usize = 2;

/// Normalized outcome of a service call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServiceResponse {
    /// HTTP 200 with a JSON body, kept verbatim
    Success {
        /// The full decoded body
        body: Value,
    },
    /// Anything else
    Failure {
        /// Failure classification
        kind: ErrorKind,
        /// Short message, e.g. `HTTP 500`
        message: String,
        /// Extra detail such as the raw error body
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

impl From<Error> for ServiceResponse {
    fn from(err: Error) -> Self {
        ServiceResponse::Failure {
            kind: err.kind(),
            message: err.to_string(),
            detail: err.detail(),
        }
    }
}

impl ServiceResponse {
    /// Whether the call succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, ServiceResponse::Success { .. })
    }

    /// The full body of a successful response
    pub fn body(&self) -> Option<&Value> {
        match self {
            ServiceResponse::Success { body } => Some(body),
            ServiceResponse::Failure { .. } => None,
        }
    }

    /// The `data` member of a successful response
    pub fn data(&self) -> Option<&Value> {
        self.body().and_then(|body| body.get("data"))
    }

    /// The `metadata` member of a successful response
    pub fn metadata(&self) -> Option<&Value> {
        self.body().and_then(|body| body.get("metadata"))
    }

    /// The service the backend reports having routed to, if any
    pub fn routed_service(&self) -> Option<&str> {
        self.metadata().and_then(|metadata| str_field(metadata, "service"))
    }

    /// Failure classification, if this is a failure
    pub fn failure_kind(&self) -> Option<ErrorKind> {
        match self {
            ServiceResponse::Failure { kind, .. } => Some(*kind),
            ServiceResponse::Success { .. } => None,
        }
    }

    /// Render the response as JSON for raw display
    pub fn to_json(&self) -> Value {
        match self {
            ServiceResponse::Success { body } => body.clone(),
            ServiceResponse::Failure { kind, message, detail } =>
                json!({ "error": message, "kind": kind, "details": detail }),
        }
    }
}

/// Known shapes of a successful coordinator body
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// `data.message`, typically from chat
    Message(String),
    /// Insights with a score and/or recommendations
    Insights {
        /// `data.productivity_score`
        productivity_score: Option<Value>,
        /// `data.recommendations`
        recommendations: Vec<Value>,
    },
    /// `data.answer`, typically from questions
    Answer(String),
    /// `data.summary`, typically from reports
    Summary(Value),
    /// A `response` field in `data` or at top level
    Response(Value),
    /// Nothing recognized; the `data` member if present, else the whole body
    Generic(Value),
}

impl ResponseShape {
    /// Decode a body, letting `metadata.service` pick the preferred shape first
    pub fn decode(body: &Value) -> Self {
        let service = body
            .get("metadata")
            .and_then(|metadata| str_field(metadata, "service"));

        if let Some(data) = body.get("data").filter(|data| data.is_object()) {
            let preferred = match service {
                Some("chat") => Self::message(data),
                Some("insights") => Self::insights(data),
                Some("questions") => Self::answer(data),
                Some("reports") => Self::summary(data),
                _ => None,
            };
            let shape = preferred
                .or_else(|| Self::message(data))
                .or_else(|| Self::insights(data))
                .or_else(|| Self::answer(data))
                .or_else(|| Self::summary(data))
                .or_else(|| data.get("response").cloned().map(ResponseShape::Response));
            if let Some(shape) = shape {
                return shape;
            }
        }

        if let Some(response) = body.get("response") {
            return ResponseShape::Response(response.clone());
        }

        ResponseShape::Generic(body.get("data").unwrap_or(body).clone())
    }

    fn message(data: &Value) -> Option<Self> {
        str_field(data, "message").map(|m| ResponseShape::Message(m.to_string()))
    }

    fn insights(data: &Value) -> Option<Self> {
        let productivity_score = data.get("productivity_score").cloned();
        let recommendations = data
            .get("recommendations")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if productivity_score.is_none() && recommendations.is_empty() {
            return None;
        }
        Some(ResponseShape::Insights { productivity_score, recommendations })
    }

    fn answer(data: &Value) -> Option<Self> {
        str_field(data, "answer").map(|a| ResponseShape::Answer(a.to_string()))
    }

    fn summary(data: &Value) -> Option<Self> {
        data.get("summary").cloned().map(ResponseShape::Summary)
    }
}

/// Produce a short human-readable digest of a response
pub fn summarize(response: &ServiceResponse) -> String {
    match response {
        ServiceResponse::Success { body } => summarize_shape(&ResponseShape::decode(body)),
        ServiceResponse::Failure { kind, message, detail } =>
            match detail {
                Some(detail) if !detail.is_empty() => format!("{}: {}\n{}", kind, message, detail),
                _ => format!("{}: {}", kind, message),
            }
    }
}

fn summarize_shape(shape: &ResponseShape) -> String {
    match shape {
        ResponseShape::Message(message) => message.clone(),
        ResponseShape::Insights { productivity_score, recommendations } => {
            let mut lines = Vec::new();
            if let Some(score) = productivity_score {
                lines.push(format!("Productivity score: {}", display_value(score)));
            }
            if !recommendations.is_empty() {
                lines.push("Recommendations:".to_string());
                for rec in recommendations.iter().take(MAX_RECOMMENDATIONS) {
                    lines.push(format!("• {}", display_value(rec)));
                }
            }
            lines.join("\n")
        }
        ResponseShape::Answer(answer) => format!("Answer: {}", answer),
        ResponseShape::Summary(summary) => format!("Summary: {}", display_value(summary)),
        ResponseShape::Response(response) => format!("Response: {}", display_value(response)),
        ResponseShape::Generic(value) => {
            let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            let cut = excerpt(&pretty, GENERIC_EXCERPT_CHARS);
            if cut.len() < pretty.len() { format!("{}...", cut) } else { cut }
        }
    }
}

/// Extract the reply text of a free-text chat call
pub fn reply_text(response: &ServiceResponse) -> String {
    match response {
        ServiceResponse::Success { body } => chat_reply_from_body(body),
        ServiceResponse::Failure { kind: ErrorKind::HttpError, message, detail } => {
            let body = detail.as_deref().unwrap_or_default();
            format!("Agent error ({}): {}", message, excerpt(body, ERROR_EXCERPT_CHARS))
        }
        ServiceResponse::Failure { kind: ErrorKind::TransportError, message, .. } => {
            format!("Connection failed: {}", message)
        }
        ServiceResponse::Failure { message, .. } => message.clone(),
    }
}

fn chat_reply_from_body(body: &Value) -> String {
    let Some(object) = body.as_object() else {
        return display_value(body);
    };

    if let Some(data) = object.get("data").filter(|data| data.is_object()) {
        for field in ["message", "response", "answer"] {
            if let Some(value) = data.get(field) {
                return display_value(value);
            }
        }
    }

    for field in ["response", "message", "text", "content"] {
        if let Some(value) = object.get(field) {
            return display_value(value);
        }
    }

    let succeeded = object.get("success").and_then(Value::as_bool).unwrap_or(false);
    if let (true, Some(data)) = (succeeded, object.get("data")) {
        return format!(
            "Got response but couldn't extract message: {}...",
            value_excerpt(data, GENERIC_EXCERPT_CHARS)
        );
    }

    format!("Unexpected response format: {}...", value_excerpt(body, ERROR_EXCERPT_CHARS))
}

/// Strings render bare; everything else as compact JSON
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
