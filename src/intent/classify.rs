//! Transcript-to-intent classification
//!
//! An ordered table of phrase rules evaluated top to bottom; the first
//! match wins and declaration order is the only tie-break. Matching is
//! case-insensitive substring search, never NLP. A rule may be guarded
//! by a mode: "upload file" is a real upload request while summarizing
//! and a mode switch everywhere else.

use crate::session::Mode;

/// The classified, typed meaning of a transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Append the canned function snippet to the code buffer
    AddFunction,
    /// Append the canned variable snippet
    AddVariable,
    /// Append the canned loop snippet
    AddLoop,
    /// Reset the code buffer to its cleared placeholder
    ClearCode,
    /// Switch the active mode
    SwitchMode(Mode),
    /// Begin a file upload for summarization
    UploadFile,
    /// Play the finished summary aloud
    PlaySummary,
    /// Pause summary playback
    PauseSummary,
    /// Push the code buffer to the remote repository
    PushRepo,
    /// No rule matched; carries the raw transcript
    Unrecognized(String),
}

/// One entry in the rule table
struct Rule {
    phrase: &'static str,
    only_in: Option<Mode>,
    intent: Intent,
}

/// Ordered rule table. "push to github" sits ahead of the bare
/// "github" switch so a push phrase is never swallowed by it.
const RULES: &[Rule] = &[
    Rule { phrase: "push to github", only_in: None, intent: Intent::PushRepo },
    Rule { phrase: "add a function", only_in: None, intent: Intent::AddFunction },
    Rule { phrase: "add a variable", only_in: None, intent: Intent::AddVariable },
    Rule { phrase: "add a loop", only_in: None, intent: Intent::AddLoop },
    Rule { phrase: "clear code", only_in: None, intent: Intent::ClearCode },
    Rule { phrase: "upload file", only_in: Some(Mode::Summarize), intent: Intent::UploadFile },
    Rule { phrase: "summarize", only_in: None, intent: Intent::SwitchMode(Mode::Summarize) },
    Rule { phrase: "upload file", only_in: None, intent: Intent::SwitchMode(Mode::Summarize) },
    Rule { phrase: "play", only_in: None, intent: Intent::PlaySummary },
    Rule { phrase: "pause", only_in: None, intent: Intent::PauseSummary },
    Rule { phrase: "github", only_in: None, intent: Intent::SwitchMode(Mode::Repo) },
    Rule { phrase: "commit", only_in: None, intent: Intent::SwitchMode(Mode::Repo) },
    Rule { phrase: "code mode", only_in: None, intent: Intent::SwitchMode(Mode::Code) },
];

/// Classify a transcript against the rule table.
///
/// Total and pure: every input maps to some intent, with
/// `Unrecognized` as the fallback, and identical input always yields
/// identical output.
pub fn classify(transcript: &str, mode: Mode) -> Intent {
    let text = transcript.to_lowercase();

    for rule in RULES {
        if let Some(required) = rule.only_in {
            if required != mode {
                continue;
            }
        }
        if text.contains(rule.phrase) {
            return rule.intent.clone();
        }
    }

    Intent::Unrecognized(transcript.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrase_embedded_in_sentence_matches() {
        let intent = classify("please add a function now", Mode::Code);
        assert_eq!(intent, Intent::AddFunction);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let intent = classify("ADD A VARIABLE please", Mode::Code);
        assert_eq!(intent, Intent::AddVariable);
    }

    #[test]
    fn push_phrase_beats_github_switch() {
        // "push to github" contains "github"; declaration order decides.
        let intent = classify("push to github", Mode::Repo);
        assert_eq!(intent, Intent::PushRepo);
    }

    #[test]
    fn bare_github_switches_mode() {
        let intent = classify("open github for me", Mode::Code);
        assert_eq!(intent, Intent::SwitchMode(Mode::Repo));
    }

    #[test]
    fn upload_file_depends_on_mode() {
        assert_eq!(classify("upload file", Mode::Summarize), Intent::UploadFile);
        assert_eq!(
            classify("upload file", Mode::Code),
            Intent::SwitchMode(Mode::Summarize)
        );
    }

    #[test]
    fn summarize_switches_mode_from_anywhere() {
        assert_eq!(
            classify("summarize this for me", Mode::Repo),
            Intent::SwitchMode(Mode::Summarize)
        );
    }

    #[test]
    fn unmatched_transcript_is_unrecognized_with_raw_text() {
        let intent = classify("make me a sandwich", Mode::Code);
        assert_eq!(intent, Intent::Unrecognized("make me a sandwich".to_string()));
    }

    #[test]
    fn classify_is_total_on_empty_input() {
        let intent = classify("", Mode::Code);
        assert_eq!(intent, Intent::Unrecognized(String::new()));
    }

    #[test]
    fn classify_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(classify("pause that", Mode::Summarize), Intent::PauseSummary);
        }
    }
}
