//! Console Utilities
//!
//! This module provides helpers used across the crate: JSON excerpts for
//! diagnostics, authentication header handling and request logging.

use serde::Serialize;
use serde_json::Value;
use tracing::{ debug, trace };

use crate::errors::Error;

//=============================================================================
// 1. JSON Utilities
//=============================================================================

/// JSON utility functions for working with response bodies
pub mod json {
    use super::*;

    /// Serialize a value to a JSON string with pretty formatting
    pub fn to_pretty_string<T: Serialize>(value: &T) -> Result<String, Error> {
        serde_json::to_string_pretty(value).map_err(Error::Json)
    }

    /// Take at most `max_chars` characters of `text`, respecting UTF-8 boundaries
    pub fn excerpt(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((end, _)) => text[..end].to_string(),
            None => text.to_string(),
        }
    }

    /// Render a JSON value compactly and cut it down to `max_chars`
    pub fn value_excerpt(value: &Value, max_chars: usize) -> String {
        excerpt(&value.to_string(), max_chars)
    }

    /// Look up a string field, accepting only JSON strings
    pub fn str_field<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
        value.get(field).and_then(Value::as_str)
    }
}

//=============================================================================
// 2. Authentication
//=============================================================================

/// Helpers for the static API keys the backends accept
pub mod auth {
    /// Generate a bearer authentication header value
    pub fn bearer_header(api_key: &str) -> String {
        format!("Bearer {}", api_key)
    }

    /// Mask an API key for display and logs, keeping a short prefix and suffix
    pub fn mask_key(api_key: &str) -> String {
        let chars: Vec<char> = api_key.chars().collect();
        if chars.len() <= 12 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

//=============================================================================
// 3. Logging
//=============================================================================

/// Logging helpers for outbound requests
pub mod logging {
    use super::*;

    /// Log an outbound POST at debug level, body at trace level
    pub fn log_request(url: &str, label: &str, api_key: &str, body: &Value) {
        debug!("POST {} ({}) key={}", url, label, super::auth::mask_key(api_key));
        trace!("Request body: {}", body);
    }

    /// Log a received response at debug level, body at trace level
    pub fn log_response(url: &str, status: u16, content_type: &str, body: &str) {
        debug!("Response from {}: status={} content-type={}", url, status, content_type);
        trace!("Response body: {}", body);
    }
}
