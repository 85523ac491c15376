//! Transcript session state

use crate::transcript_service::{LanguageOption, TranscriptResponse};

/// Label of the placeholder entry at the top of the language selector
pub(crate) const LANGUAGE_PLACEHOLDER: &str = "Available languages";

/// Shown while a fetch is in flight
pub(crate) const LOADING_MESSAGE: &str = "Fetching transcript... This may take a few seconds.";

/// Where the controller is in its fetch cycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum Phase {
    /// No video resolved yet
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed { message: String },
}

/// The one thing the presentation layer should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum View {
    Empty,
    Loading { message: &'static str },
    Transcript { title: String, text: String },
    Error { message: String },
}

/// Data for one activation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    pub(crate) canonical_video_url: Option<String>,
    pub(crate) transcript_text: String,
    pub(crate) video_title: String,
    pub(crate) available_languages: Vec<LanguageOption>,
    /// Empty means the service's default language
    pub(crate) selected_language_code: String,
}

impl Session {
    pub(crate) fn for_video(url: String) -> Self {
        Self {
            canonical_video_url: Some(url),
            ..Self::default()
        }
    }

    pub(crate) fn has_transcript(&self) -> bool {
        !self.transcript_text.is_empty()
    }

    /// Title, a blank line, then the transcript
    pub(crate) fn clipboard_text(&self) -> String {
        format!("{}\n\n{}", self.video_title, self.transcript_text)
    }

    pub(crate) fn apply_response(&mut self, response: TranscriptResponse) {
        self.transcript_text = response.transcript;
        self.video_title = response.title;
        self.available_languages = response.languages;
        self.selected_language_code = response.transcript_language_code;
    }

    /// Drop the displayed transcript after the current fetch failed.
    ///
    /// The URL and language list stay so another selection can retry.
    pub(crate) fn clear_transcript(&mut self) {
        self.transcript_text.clear();
        self.video_title.clear();
    }
}

/// Entry in the language selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LanguageChoice {
    /// Empty for the placeholder
    pub(crate) code: String,
    pub(crate) label: String,
    pub(crate) selected: bool,
}

/// Read-only copy of the controller state
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SessionSnapshot {
    pub(crate) session: Session,
    pub(crate) phase: Phase,
    pub(crate) copy_acknowledged: bool,
}

impl SessionSnapshot {
    pub(crate) fn has_transcript(&self) -> bool {
        self.session.has_transcript()
    }

    /// Loading indicator, transcript and error are mutually exclusive.
    pub(crate) fn view(&self) -> View {
        match &self.phase {
            Phase::Idle => View::Empty,
            Phase::Loading => View::Loading {
                message: LOADING_MESSAGE,
            },
            Phase::Loaded => View::Transcript {
                title: self.session.video_title.clone(),
                text: self.session.transcript_text.clone(),
            },
            Phase::Failed { message } => View::Error {
                message: message.clone(),
            },
        }
    }

    /// Selector entries, or nothing while the selector is hidden.
    ///
    /// The selector is shown once languages are known and no fetch is in
    /// flight, including after a failed re-selection so the user can retry.
    pub(crate) fn language_choices(&self) -> Vec<LanguageChoice> {
        let languages = &self.session.available_languages;
        if languages.is_empty() || matches!(self.phase, Phase::Loading | Phase::Idle) {
            return Vec::new();
        }

        let selected = &self.session.selected_language_code;
        std::iter::once(LanguageChoice {
            code: String::new(),
            label: LANGUAGE_PLACEHOLDER.to_string(),
            selected: selected.is_empty(),
        })
        .chain(languages.iter().map(|lang| LanguageChoice {
            code: lang.code.clone(),
            label: lang.display_name.clone(),
            selected: lang.code == *selected,
        }))
        .collect()
    }

    pub(crate) fn copy_label(&self) -> &'static str {
        if self.copy_acknowledged {
            "Copied!"
        } else {
            "Copy"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> SessionSnapshot {
        let mut session = Session::for_video("https://www.youtube.com/watch?v=abc123".into());
        session.apply_response(TranscriptResponse {
            transcript: "Hello world".into(),
            title: "Demo".into(),
            languages: vec![
                LanguageOption::new("en", "English"),
                LanguageOption::new("es", "Spanish"),
            ],
            transcript_language_code: "en".into(),
        });
        SessionSnapshot {
            session,
            phase: Phase::Loaded,
            copy_acknowledged: false,
        }
    }

    #[test]
    fn test_clipboard_text_joins_title_and_transcript() {
        assert_eq!(loaded().session.clipboard_text(), "Demo\n\nHello world");
    }

    #[test]
    fn test_language_choices_mark_service_language() {
        let choices = loaded().language_choices();
        let labels: Vec<_> = choices.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec![LANGUAGE_PLACEHOLDER, "English", "Spanish"]);
        let selected: Vec<_> = choices.iter().filter(|c| c.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].code, "en");
    }

    #[test]
    fn test_language_choices_hidden_while_loading() {
        let mut snapshot = loaded();
        snapshot.phase = Phase::Loading;
        assert!(snapshot.language_choices().is_empty());
        assert_eq!(
            snapshot.view(),
            View::Loading {
                message: LOADING_MESSAGE
            }
        );
    }

    #[test]
    fn test_failure_keeps_languages_but_drops_transcript() {
        let mut snapshot = loaded();
        snapshot.session.clear_transcript();
        snapshot.phase = Phase::Failed {
            message: "Error: boom".into(),
        };
        assert!(!snapshot.has_transcript());
        assert_eq!(snapshot.language_choices().len(), 3);
        assert_eq!(
            snapshot.view(),
            View::Error {
                message: "Error: boom".into()
            }
        );
    }

    #[test]
    fn test_copy_label() {
        let mut snapshot = loaded();
        assert_eq!(snapshot.copy_label(), "Copy");
        snapshot.copy_acknowledged = true;
        assert_eq!(snapshot.copy_label(), "Copied!");
    }
}
