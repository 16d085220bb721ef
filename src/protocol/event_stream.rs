//! Event-stream reply parsing
//!
//! A `text/event-stream` reply is read as a whole body. Every line starting
//! with `data: ` carries one JSON event; anything else, including `data:`
//! lines that fail to decode, is ignored. Only the last decoded event decides
//! the outcome.

use serde_json::Value;
use tracing::trace;

/// Prefix of a data line
const DATA_PREFIX: &str = "data: ";

/// What the final event of a stream carried
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalEvent {
    /// The last event had a `result` member
    Result(Value),
    /// The last event had an `error` member but no `result`
    Error(Value),
    /// No events, or the last one had neither member
    Missing,
}

/// Decode every well-formed `data: ` line of an event-stream body, in order
pub fn parse_events(body: &str) -> Vec<Value> {
    body.trim()
        .lines()
        .filter_map(|line| line.strip_prefix(DATA_PREFIX))
        .filter_map(|data| {
            match serde_json::from_str::<Value>(data) {
                Ok(event) => Some(event),
                Err(e) => {
                    trace!("Skipping malformed event-stream line ({}): {}", e, data);
                    None
                }
            }
        })
        .collect()
}

/// Pick the outcome carried by the last event. `result` is checked before
/// `error`.
pub fn terminal_event(events: &[Value]) -> TerminalEvent {
    let Some(last) = events.last() else {
        return TerminalEvent::Missing;
    };
    if let Some(result) = last.get("result") {
        TerminalEvent::Result(result.clone())
    } else if let Some(error) = last.get("error") {
        TerminalEvent::Error(error.clone())
    } else {
        TerminalEvent::Missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_last_event_result() {
        let body =
            "event: message\ndata: {\"jsonrpc\":\"2.0\",\"method\":\"notifications/progress\"}\n\n\
             event: message\ndata: {\"result\": {\"ok\": true}}\n\n";
        let events = parse_events(body);
        assert_eq!(events.len(), 2);
        assert_eq!(terminal_event(&events), TerminalEvent::Result(json!({ "ok": true })));
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let body = "data: {not json\ndata: {\"error\": {\"code\": 1}}\ndata: [oops\n";
        let events = parse_events(body);
        assert_eq!(events, vec![json!({ "error": { "code": 1 } })]);
        assert_eq!(terminal_event(&events), TerminalEvent::Error(json!({ "code": 1 })));
    }

    #[test]
    fn test_prefix_requires_space() {
        let events = parse_events("data:{\"result\":1}\n: comment\nid: 7\n");
        assert!(events.is_empty());
        assert_eq!(terminal_event(&events), TerminalEvent::Missing);
    }

    #[test]
    fn test_crlf_lines() {
        let events = parse_events("data: {\"result\": 2}\r\n\r\n");
        assert_eq!(terminal_event(&events), TerminalEvent::Result(json!(2)));
    }

    #[test]
    fn test_only_last_event_counts() {
        let events = parse_events("data: {\"result\": 1}\ndata: {\"progress\": 50}\n");
        assert_eq!(terminal_event(&events), TerminalEvent::Missing);
    }

    #[test]
    fn test_result_checked_before_error() {
        let events = parse_events("data: {\"result\": null, \"error\": \"x\"}\n");
        assert_eq!(terminal_event(&events), TerminalEvent::Result(Value::Null));
    }
}
