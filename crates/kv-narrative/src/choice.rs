//! Choice lists as the UI sees them.

use serde::Serialize;

/// One entry in a rendered choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceView {
    /// Target id.
    pub id: String,
    /// Label to display.
    pub text: String,
    /// Whether the player may pick it.
    pub enabled: bool,
    /// Why it is disabled, phrased for the player.
    pub disabled_reason: Option<String>,
}

impl ChoiceView {
    /// An enabled entry.
    pub fn enabled(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            enabled: true,
            disabled_reason: None,
        }
    }

    /// A disabled entry with its reason.
    pub fn disabled(
        id: impl Into<String>,
        text: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            enabled: false,
            disabled_reason: Some(reason.into()),
        }
    }
}

impl std::fmt::Display for ChoiceView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.disabled_reason {
            Some(reason) => write!(f, "{} ({reason})", self.text),
            None => write!(f, "{}", self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(ChoiceView::enabled("a", "Knock").to_string(), "Knock");
        assert_eq!(
            ChoiceView::disabled("b", "Pick the lock", "requires lockpick").to_string(),
            "Pick the lock (requires lockpick)"
        );
    }

    #[test]
    fn serializes_for_ui() {
        let json = serde_json::to_string(&ChoiceView::disabled("b", "Pick", "no")).unwrap();
        assert_eq!(
            json,
            r#"{"id":"b","text":"Pick","enabled":false,"disabled_reason":"no"}"#
        );
    }
}
