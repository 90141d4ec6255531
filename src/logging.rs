//! Configurable log line layout
//!
//! A `log_format` template names the parts of a log line with placeholders:
//! `{timestamp}`, `{level}`, `{target}` and `{message}`. Anything else is
//! copied through as-is.

use std::fmt::Display;

use crate::error::{BridgeError, Result};

const PLACEHOLDERS: [&str; 4] = ["timestamp", "level", "target", "message"];

/// A validated log line template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFormat {
    template: String,
}

impl LogFormat {
    /// Reject templates with unknown or unterminated placeholders
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        let mut rest = template.as_str();
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let end = after.find('}').ok_or_else(|| {
                BridgeError::Configuration(format!("log_format has an unterminated placeholder: {}", template))
            })?;
            let name = &after[..end];
            if !PLACEHOLDERS.contains(&name) {
                return Err(BridgeError::Configuration(format!(
                    "log_format placeholder '{{{}}}' is not one of {{timestamp}}, {{level}}, {{target}}, {{message}}",
                    name
                )));
            }
            rest = &after[end + 1..];
        }
        Ok(Self { template })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Fill the template for one record
    pub fn render(&self, timestamp: impl Display, level: impl Display, target: &str, message: impl Display) -> String {
        // message last so braces inside it are never expanded
        self.template
            .replace("{timestamp}", &timestamp.to_string())
            .replace("{level}", &level.to_string())
            .replace("{target}", target)
            .replace("{message}", &message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_all_placeholders() {
        let format = LogFormat::new("{timestamp} - {level} - {target} - {message}").unwrap();
        let line = format.render("2026-10-16T12:00:00Z", log::Level::Warn, "casebridge", "hello");
        assert_eq!(line, "2026-10-16T12:00:00Z - WARN - casebridge - hello");
    }

    #[test]
    fn test_render_keeps_braces_in_message() {
        let format = LogFormat::new("[{level}] {message}").unwrap();
        let line = format.render("", log::Level::Info, "t", "tags {level} {\"a\":1}");
        assert_eq!(line, "[INFO] tags {level} {\"a\":1}");
    }

    #[test]
    fn test_placeholders_optional() {
        let format = LogFormat::new("{message}").unwrap();
        assert_eq!(format.render("ts", log::Level::Error, "t", "only"), "only");
    }

    #[test]
    fn test_unknown_placeholder_rejected() {
        let err = LogFormat::new("%(asctime)s {asctime} {message}").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("asctime"));
    }

    #[test]
    fn test_unterminated_placeholder_rejected() {
        assert!(LogFormat::new("{level} {message").is_err());
    }
}
