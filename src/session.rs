//! Console Session
//!
//! Holds what the console remembers while it runs: the chat history, the
//! last service test, and call counters for the monitoring view. A session
//! is an explicit value owned by the console loop; nothing is global and
//! nothing is persisted.

use chrono::{ DateTime, Utc };
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

use crate::client::services::{ ServiceParams, ServiceResponse, reply_text };
use crate::utils::json::excerpt;

/// Entries shown in the activity log
const ACTIVITY_LOG_LEN: usize = 10;
/// Characters of a message shown in the activity log
const ACTIVITY_PREVIEW_CHARS: usize = 50;

/// The sender of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the chat history
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Who sent it
    pub role: Role,
    /// Text shown to the user
    pub content: String,
    /// Raw response for assistant messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<Value>,
    /// Round-trip time for assistant messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u128>,
    /// Whether the call behind an assistant message succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub succeeded: Option<bool>,
    /// When the message was recorded
    pub timestamp: DateTime<Utc>,
}

/// The most recent single-service test
#[derive(Debug, Clone, Serialize)]
pub struct TestRecord {
    /// Service name
    pub service: String,
    /// Parameters sent
    pub params: ServiceParams,
    /// Tide the test ran against
    pub tide_id: String,
    /// Normalized response
    pub response: ServiceResponse,
    /// Round-trip time
    pub processing_time_ms: u128,
    /// When the test finished
    pub timestamp: DateTime<Utc>,
}

/// A line of the activity log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    /// When the message was recorded
    pub timestamp: DateTime<Utc>,
    /// Sender
    pub role: Role,
    /// Shortened content
    pub preview: String,
}

/// Everything the monitoring view shows
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringSnapshot {
    /// Session id
    pub session_id: Uuid,
    /// User id
    pub user_id: String,
    /// Messages in the chat history
    pub message_count: usize,
    /// Latest activity, oldest first
    pub recent_activity: Vec<ActivityEntry>,
    /// Calls made through this session
    pub total_calls: u64,
    /// Calls that succeeded
    pub successful_calls: u64,
    /// Successful share of calls, as a percentage
    pub success_rate: Option<f64>,
    /// Mean round-trip time
    pub average_response_ms: Option<f64>,
    /// Last service test, if any
    pub last_test: Option<LastTestSummary>,
}

/// Compact form of the last test for the monitoring view
#[derive(Debug, Clone, Serialize)]
pub struct LastTestSummary {
    /// Service name
    pub service: String,
    /// Whether it succeeded
    pub succeeded: bool,
    /// Round-trip time
    pub processing_time_ms: u128,
    /// When it finished
    pub timestamp: DateTime<Utc>,
}

/// State of one console run
#[derive(Debug, Clone)]
pub struct Session {
    /// Session id
    id: Uuid,
    /// User id sent with chat
    user_id: String,
    /// Chat history
    messages: Vec<ChatMessage>,
    /// Last service test
    last_test: Option<TestRecord>,
    /// Calls made
    total_calls: u64,
    /// Calls that succeeded
    successful_calls: u64,
    /// Sum of round-trip times
    total_elapsed: Duration,
}

impl Session {
    /// Start an empty session
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            messages: Vec::new(),
            last_test: None,
            total_calls: 0,
            successful_calls: 0,
            total_elapsed: Duration::ZERO,
        }
    }

    /// Session id
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// User id
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Chat history, oldest first
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Last service test
    pub fn last_test(&self) -> Option<&TestRecord> {
        self.last_test.as_ref()
    }

    /// Append a user message
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: Role::User,
            content: content.into(),
            raw_response: None,
            processing_time_ms: None,
            succeeded: None,
            timestamp: Utc::now(),
        });
    }

    /// Append the assistant reply for a chat call and count the call
    pub fn push_assistant(&mut self, response: &ServiceResponse, elapsed: Duration) -> &ChatMessage {
        self.record_call(response.is_success(), elapsed);
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content: reply_text(response),
            raw_response: Some(response.to_json()),
            processing_time_ms: Some(elapsed.as_millis()),
            succeeded: Some(response.is_success()),
            timestamp: Utc::now(),
        });
        &self.messages[self.messages.len() - 1]
    }

    /// Store the result of a single-service test and count the call
    pub fn record_test(
        &mut self,
        service: &str,
        params: ServiceParams,
        tide_id: &str,
        response: ServiceResponse,
        elapsed: Duration
    ) {
        self.record_call(response.is_success(), elapsed);
        self.last_test = Some(TestRecord {
            service: service.to_string(),
            params,
            tide_id: tide_id.to_string(),
            response,
            processing_time_ms: elapsed.as_millis(),
            timestamp: Utc::now(),
        });
    }

    /// Count a call that is not otherwise recorded (tool runs, suite steps)
    pub fn record_call(&mut self, succeeded: bool, elapsed: Duration) {
        self.total_calls += 1;
        if succeeded {
            self.successful_calls += 1;
        }
        self.total_elapsed += elapsed;
    }

    /// Forget the chat history
    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    /// Forget the last test result
    pub fn clear_results(&mut self) {
        self.last_test = None;
    }

    /// The latest messages as shortened log entries, oldest first
    pub fn recent_activity(&self) -> Vec<ActivityEntry> {
        let start = self.messages.len().saturating_sub(ACTIVITY_LOG_LEN);
        self.messages[start..]
            .iter()
            .map(|message| {
                let preview = excerpt(&message.content, ACTIVITY_PREVIEW_CHARS);
                let truncated = preview.len() < message.content.len();
                ActivityEntry {
                    timestamp: message.timestamp,
                    role: message.role,
                    preview: if truncated { format!("{}...", preview) } else { preview },
                }
            })
            .collect()
    }

    /// Build the monitoring view
    pub fn monitoring(&self) -> MonitoringSnapshot {
        let (success_rate, average_response_ms) = if self.total_calls == 0 {
            (None, None)
        } else {
            let calls = self.total_calls as f64;
            (
                Some(((self.successful_calls as f64) * 100.0) / calls),
                Some((self.total_elapsed.as_millis() as f64) / calls),
            )
        };

        MonitoringSnapshot {
            session_id: self.id,
            user_id: self.user_id.clone(),
            message_count: self.messages.len(),
            recent_activity: self.recent_activity(),
            total_calls: self.total_calls,
            successful_calls: self.successful_calls,
            success_rate,
            average_response_ms,
            last_test: self.last_test.as_ref().map(|test| LastTestSummary {
                service: test.service.clone(),
                succeeded: test.response.is_success(),
                processing_time_ms: test.processing_time_ms,
                timestamp: test.timestamp,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use serde_json::json;

    #[test]
    fn test_chat_history_and_counters() {
        let mut session = Session::new("demo_user");
        session.push_user("How was my week?");
        let reply = session.push_assistant(
            &(ServiceResponse::Success { body: json!({ "data": { "message": "Busy." } }) }),
            Duration::from_millis(120)
        );
        assert_eq!(reply.content, "Busy.");
        assert_eq!(reply.succeeded, Some(true));

        session.push_assistant(
            &ServiceResponse::from(Error::Transport("refused".into())),
            Duration::from_millis(80)
        );

        let snapshot = session.monitoring();
        assert_eq!(snapshot.message_count, 3);
        assert_eq!(snapshot.total_calls, 2);
        assert_eq!(snapshot.successful_calls, 1);
        assert_eq!(snapshot.success_rate, Some(50.0));
        assert_eq!(snapshot.average_response_ms, Some(100.0));
    }

    #[test]
    fn test_activity_log_window_and_preview() {
        let mut session = Session::new("u");
        for i in 0..12 {
            session.push_user(format!("message {}", i));
        }
        session.push_user("y".repeat(80));

        let activity = session.recent_activity();
        assert_eq!(activity.len(), 10);
        assert_eq!(activity[0].preview, "message 3");
        let last = &activity[9];
        assert_eq!(last.preview, format!("{}...", "y".repeat(50)));
    }

    #[test]
    fn test_last_test_and_clear() {
        let mut session = Session::new("u");
        assert!(session.monitoring().last_test.is_none());
        assert!(session.monitoring().success_rate.is_none());

        session.record_test(
            "insights",
            ServiceParams::new(),
            "tide_1",
            ServiceResponse::Success { body: json!({}) },
            Duration::from_millis(5)
        );
        let summary = session.monitoring().last_test.unwrap();
        assert_eq!(summary.service, "insights");
        assert!(summary.succeeded);

        session.clear_results();
        assert!(session.last_test().is_none());
        session.push_user("hi");
        session.clear_messages();
        assert!(session.messages().is_empty());
    }
}
