//! One-shot notifications carried in the session to the next rendered page.

use serde::{Deserialize, Serialize};

/// Display severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlashSeverity {
    #[default]
    Info,
    Success,
    Error,
    Warning,
}

impl FlashSeverity {
    /// CSS class the layouts use for the alert box.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Info => "alert-info",
            Self::Success => "alert-success",
            Self::Error => "alert-error",
            Self::Warning => "alert-warning",
        }
    }
}

/// A flash message waiting to be shown once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub message: String,
    pub severity: FlashSeverity,
}

impl Flash {
    #[must_use]
    pub fn new(message: impl Into<String>, severity: FlashSeverity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    /// CSS class for this message's severity.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        self.severity.css_class()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_classes_are_distinct() {
        let classes = [
            FlashSeverity::Info.css_class(),
            FlashSeverity::Success.css_class(),
            FlashSeverity::Error.css_class(),
            FlashSeverity::Warning.css_class(),
        ];
        for (i, a) in classes.iter().enumerate() {
            for b in classes.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_flash_uses_severity_class() {
        let flash = Flash::new("no", FlashSeverity::Error);
        assert_eq!(flash.message, "no");
        assert_eq!(flash.css_class(), "alert-error");
    }
}
