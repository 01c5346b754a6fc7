//! Collaborator capabilities
//!
//! Language, navigation and user notification are passed to the engine
//! explicitly instead of being read from ambient context.

use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{error, info};

const BUILTIN_MESSAGES: &str = include_str!("messages.toml");

/// Translates message keys for the current language
pub trait Localizer {
    /// Current language code
    fn language(&self) -> &str;

    /// Text for `key`, or the key itself if there is none
    fn translate(&self, key: &str) -> String;
}

/// Changes the displayed view
pub trait Navigator {
    /// Show the view at `path`
    fn navigate(&mut self, path: &str);
}

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Action completed
    Success,
    /// Neutral information
    Info,
    /// Action failed; nothing was changed
    Error,
}

/// Shows non-blocking notices to the user
pub trait Notifier {
    /// Show `message`
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Message tables keyed by language, then message key
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
struct MessageTables(BTreeMap<String, BTreeMap<String, String>>);

/// [`Localizer`] over fixed message tables
#[derive(Debug, Clone)]
pub struct StaticLocalizer {
    language: String,
    tables: MessageTables,
}

impl StaticLocalizer {
    /// Create a localizer without messages
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            tables: MessageTables::default(),
        }
    }

    /// Localizer with the messages shipped in this crate
    #[must_use]
    pub fn builtin(language: impl Into<String>) -> Self {
        let tables = toml::from_str(BUILTIN_MESSAGES).unwrap_or_else(|e| {
            error!("Embedded message tables are invalid: {}", e);
            MessageTables::default()
        });
        Self {
            language: language.into(),
            tables,
        }
    }

    /// Add or replace one message
    #[must_use]
    pub fn with_message(mut self, language: &str, key: &str, text: &str) -> Self {
        self.tables
            .0
            .entry(language.to_string())
            .or_default()
            .insert(key.to_string(), text.to_string());
        self
    }

    /// Switch the current language
    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }
}

impl Localizer for StaticLocalizer {
    fn language(&self) -> &str {
        &self.language
    }

    fn translate(&self, key: &str) -> String {
        self.tables
            .0
            .get(&self.language)
            .and_then(|table| table.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

/// [`Navigator`] that remembers visited paths
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    visited: Vec<String>,
}

impl RecordingNavigator {
    /// Create a navigator with no history
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths in navigation order
    #[inline]
    #[must_use]
    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    /// Most recent path
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.visited.last().map(String::as_str)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, path: &str) {
        self.visited.push(path.to_string());
    }
}

/// [`Notifier`] that writes notices to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Error => error!(notice = true, "{}", message),
            NoticeLevel::Success | NoticeLevel::Info => info!(notice = true, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_messages_cover_both_languages() {
        for language in ["en", "de"] {
            let localizer = StaticLocalizer::builtin(language);
            for key in [
                "workflow.export.success",
                "workflow.export.failed",
                "workflow.import.success",
                "workflow.import.failed",
                "workflow.step.blocked",
            ] {
                assert_ne!(localizer.translate(key), key, "{language} lacks {key}");
            }
        }
    }

    #[test]
    fn test_falls_back_to_key() {
        let mut localizer = StaticLocalizer::new("en").with_message("de", "greeting", "Hallo");
        assert_eq!(localizer.translate("greeting"), "greeting");
        localizer.set_language("de");
        assert_eq!(localizer.translate("greeting"), "Hallo");
    }

    #[test]
    fn test_recording_navigator() {
        let mut nav = RecordingNavigator::new();
        assert_eq!(nav.current(), None);
        nav.navigate("/a");
        nav.navigate("/b");
        assert_eq!(nav.visited(), ["/a", "/b"]);
        assert_eq!(nav.current(), Some("/b"));
    }
}
