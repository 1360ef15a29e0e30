//! Validation for palette configuration.

use serde::{Deserialize, Serialize};

use crate::config::PaletteConfig;
use crate::messages::MessageKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub level: ValidationLevel,
    pub code: &'static str,
    pub message: String,
}

pub trait Validate {
    fn validate(&self) -> Vec<ValidationIssue>;
}

impl Validate for PaletteConfig {
    fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.store.sqlite_path.as_os_str().is_empty() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "store.sqlite_path.empty",
                message: "store.sqlite_path must not be empty".to_string(),
            });
        }

        if self.log.filter.trim().is_empty() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "log.filter.empty",
                message: "log.filter must not be empty".to_string(),
            });
        }

        for (key, text) in &self.messages {
            if key.parse::<MessageKey>().is_err() {
                issues.push(ValidationIssue {
                    level: ValidationLevel::Warning,
                    code: "messages.key.unknown",
                    message: format!("unknown message key '{key}' is ignored"),
                });
            } else if text.trim().is_empty() {
                issues.push(ValidationIssue {
                    level: ValidationLevel::Warning,
                    code: "messages.value.blank",
                    message: format!("message '{key}' is blank, the default text is used"),
                });
            }
        }

        issues
    }
}

pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues
        .iter()
        .any(|issue| issue.level == ValidationLevel::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config_is_valid() {
        assert!(PaletteConfig::default().validate().is_empty());
    }

    #[test]
    fn empty_store_path_and_filter_are_errors() {
        let mut config = PaletteConfig::default();
        config.store.sqlite_path = PathBuf::new();
        config.log.filter = "  ".to_string();

        let issues = config.validate();
        assert!(has_errors(&issues));
        assert!(issues
            .iter()
            .any(|issue| issue.code == "store.sqlite_path.empty"));
        assert!(issues.iter().any(|issue| issue.code == "log.filter.empty"));
    }

    #[test]
    fn message_problems_are_warnings_only() {
        let mut config = PaletteConfig::default();
        config
            .messages
            .insert("bogus".to_string(), "text".to_string());
        config
            .messages
            .insert("task_deleted".to_string(), String::new());

        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(!has_errors(&issues));
        assert!(issues.iter().any(|issue| issue.code == "messages.key.unknown"));
        assert!(issues.iter().any(|issue| issue.code == "messages.value.blank"));
    }
}
