//! Intent application
//!
//! `apply` is the session's only transition function: it validates an
//! intent against the active mode, mutates the state, and produces the
//! response the user reads or hears. Invalid-for-mode intents degrade
//! to a no-op with an explanatory response; misheard input is the
//! common case here, so nothing in this module can fail.

use crate::intent::Intent;
use crate::summary::SummaryStatus;
use crate::sync::{CommandKind, PendingCommand};

use super::state::{Mode, SessionState};

/// Snippet appended by "add a function"
const FUNCTION_SNIPPET: &str = "\n\nfunction newFunction() {\n  // Your code here\n}";
/// Snippet appended by "add a variable"
const VARIABLE_SNIPPET: &str = "\n\nlet newVariable = \"Hello World\";";
/// Snippet appended by "add a loop"
const LOOP_SNIPPET: &str = "\n\nfor (let i = 0; i < 10; i++) {\n  console.log(i);\n}";
/// Buffer contents after "clear code"
const CLEARED_CODE: &str = "// Code cleared! Ready for new commands.";

const HELP_RESPONSE: &str =
    "I'm learning that command. Try \"add a function\", \"summarize file\", or \"github mode\"!";
const WRONG_MODE_RESPONSE: &str =
    "That command belongs to a different mode. Try switching modes first!";

/// Outcome of applying one intent
#[derive(Debug)]
pub struct Applied {
    pub response: String,
    /// Present when a connectivity-requiring command was deferred;
    /// the orchestrator moves it into the queue.
    pub queued: Option<PendingCommand>,
}

impl Applied {
    fn respond(text: &str) -> Self {
        Self {
            response: text.to_string(),
            queued: None,
        }
    }
}

/// Apply `intent` to `state`, returning the response text and any
/// deferred command.
pub fn apply(state: &mut SessionState, intent: &Intent) -> Applied {
    match intent {
        Intent::SwitchMode(mode) => switch_mode(state, *mode),
        Intent::AddFunction => {
            append_snippet(state, FUNCTION_SNIPPET, "Added a new function for you!")
        }
        Intent::AddVariable => append_snippet(state, VARIABLE_SNIPPET, "Added a new variable!"),
        Intent::AddLoop => append_snippet(state, LOOP_SNIPPET, "Added a for loop!"),
        Intent::ClearCode => clear_code(state),
        Intent::UploadFile => upload_file(state),
        Intent::PlaySummary => play_summary(state),
        Intent::PauseSummary => pause_summary(state),
        Intent::PushRepo => push_repo(state),
        Intent::Unrecognized(_) => Applied::respond(HELP_RESPONSE),
    }
}

/// Mode switches never touch substate; everything survives the switch.
fn switch_mode(state: &mut SessionState, mode: Mode) -> Applied {
    state.mode = mode;
    let greeting = match mode {
        Mode::Code => "Back to coding mode!",
        Mode::Summarize => "Switching to TL;DR mode. Upload a file to get started!",
        Mode::Repo => "Switching to GitHub mode!",
    };
    Applied::respond(greeting)
}

/// Code edits are valid only while in Code mode.
fn append_snippet(state: &mut SessionState, snippet: &str, confirmation: &str) -> Applied {
    if state.mode != Mode::Code {
        return Applied::respond(WRONG_MODE_RESPONSE);
    }
    state.code.push_str(snippet);
    Applied::respond(confirmation)
}

fn clear_code(state: &mut SessionState) -> Applied {
    state.code = CLEARED_CODE.to_string();
    Applied::respond("Code cleared and ready!")
}

fn upload_file(state: &mut SessionState) -> Applied {
    if state.mode != Mode::Summarize {
        return Applied::respond(WRONG_MODE_RESPONSE);
    }
    state.summary.begin_upload();
    Applied::respond("Upload started! Your summary is on the way.")
}

/// Play is valid only once a non-empty final summary exists.
fn play_summary(state: &mut SessionState) -> Applied {
    let ready = state.summary.status == SummaryStatus::Complete
        && state
            .summary
            .final_text
            .as_deref()
            .map_or(false, |text| !text.is_empty());

    if ready {
        state.summary.playing = true;
        Applied::respond("Playing your summary!")
    } else {
        Applied::respond("No summary ready to play yet!")
    }
}

fn pause_summary(state: &mut SessionState) -> Applied {
    if state.summary.playing {
        state.summary.playing = false;
        Applied::respond("Paused playback.")
    } else {
        Applied::respond("Nothing is playing right now.")
    }
}

/// Online pushes apply immediately (the orchestrator talks to the
/// provider); offline ones defer a snapshot of the code buffer.
fn push_repo(state: &mut SessionState) -> Applied {
    let kind = CommandKind::Push;
    if state.online || !state.repo.requires_connectivity(&kind) {
        return Applied::respond("Pushing changes to GitHub!");
    }

    let command = PendingCommand::new(kind, state.code.clone());
    Applied {
        response: "Offline - changes queued for sync".to_string(),
        queued: Some(command),
    }
}

#[cfg(test)]
mod tests {
    use super::super::state::WELCOME_CODE;
    use super::*;
    use crate::summary::FileId;

    #[test]
    fn add_function_appends_snippet_in_code_mode() {
        let mut state = SessionState::new();
        let applied = apply(&mut state, &Intent::AddFunction);

        assert!(state.code.starts_with(WELCOME_CODE));
        assert!(state.code.ends_with(FUNCTION_SNIPPET));
        assert_eq!(applied.response, "Added a new function for you!");
        assert!(applied.queued.is_none());
    }

    #[test]
    fn code_edits_outside_code_mode_are_no_ops() {
        let mut state = SessionState::new();
        state.mode = Mode::Summarize;

        for intent in [Intent::AddFunction, Intent::AddVariable, Intent::AddLoop] {
            let applied = apply(&mut state, &intent);
            assert_eq!(applied.response, WRONG_MODE_RESPONSE);
        }
        assert_eq!(state.code, WELCOME_CODE);
    }

    #[test]
    fn clear_code_replaces_buffer_with_placeholder() {
        let mut state = SessionState::new();
        apply(&mut state, &Intent::AddLoop);
        let applied = apply(&mut state, &Intent::ClearCode);

        assert_eq!(state.code, CLEARED_CODE);
        assert_eq!(applied.response, "Code cleared and ready!");
    }

    #[test]
    fn mode_switches_preserve_the_code_buffer() {
        let mut state = SessionState::new();
        apply(&mut state, &Intent::AddVariable);
        let edited = state.code.clone();

        apply(&mut state, &Intent::SwitchMode(Mode::Summarize));
        assert_eq!(state.mode, Mode::Summarize);
        assert_eq!(state.code, edited);

        apply(&mut state, &Intent::SwitchMode(Mode::Code));
        assert_eq!(state.mode, Mode::Code);
        assert_eq!(state.code, edited);
    }

    #[test]
    fn switch_responses_are_per_mode_greetings() {
        let mut state = SessionState::new();
        assert!(apply(&mut state, &Intent::SwitchMode(Mode::Repo))
            .response
            .contains("GitHub"));
        assert!(apply(&mut state, &Intent::SwitchMode(Mode::Summarize))
            .response
            .contains("TL;DR"));
        assert!(apply(&mut state, &Intent::SwitchMode(Mode::Code))
            .response
            .contains("coding"));
    }

    #[test]
    fn offline_push_defers_exactly_one_command() {
        let mut state = SessionState::new();
        state.mode = Mode::Repo;
        state.online = false;

        let applied = apply(&mut state, &Intent::PushRepo);

        assert!(applied.response.contains("queued"));
        let command = applied.queued.expect("command should be deferred");
        assert_eq!(command.kind, CommandKind::Push);
        assert_eq!(command.code_snapshot, state.code);

        // Applying the intent touched neither the buffer nor repo state.
        assert_eq!(state.code, WELCOME_CODE);
        assert_eq!(state.repo.branch, "main");
        assert!(!state.repo.connected);
    }

    #[test]
    fn online_push_defers_nothing() {
        let mut state = SessionState::new();
        state.mode = Mode::Repo;

        let applied = apply(&mut state, &Intent::PushRepo);
        assert_eq!(applied.response, "Pushing changes to GitHub!");
        assert!(applied.queued.is_none());
    }

    #[test]
    fn upload_file_streams_only_in_summarize_mode() {
        let mut state = SessionState::new();
        let applied = apply(&mut state, &Intent::UploadFile);
        assert_eq!(applied.response, WRONG_MODE_RESPONSE);
        assert_eq!(state.summary.status, SummaryStatus::Idle);

        state.mode = Mode::Summarize;
        let applied = apply(&mut state, &Intent::UploadFile);
        assert!(applied.response.contains("Upload started"));
        assert_eq!(state.summary.status, SummaryStatus::Streaming);
    }

    #[test]
    fn play_requires_a_finished_summary() {
        let mut state = SessionState::new();
        let applied = apply(&mut state, &Intent::PlaySummary);
        assert_eq!(applied.response, "No summary ready to play yet!");
        assert!(!state.summary.playing);

        state.summary.start(FileId(1));
        state.summary.accept_fragment(FileId(1), "the gist");
        state.summary.complete(FileId(1));

        let applied = apply(&mut state, &Intent::PlaySummary);
        assert_eq!(applied.response, "Playing your summary!");
        assert!(state.summary.playing);
    }

    #[test]
    fn pause_only_acts_while_playing() {
        let mut state = SessionState::new();
        let applied = apply(&mut state, &Intent::PauseSummary);
        assert_eq!(applied.response, "Nothing is playing right now.");

        state.summary.start(FileId(1));
        state.summary.accept_fragment(FileId(1), "text");
        state.summary.complete(FileId(1));
        apply(&mut state, &Intent::PlaySummary);

        let applied = apply(&mut state, &Intent::PauseSummary);
        assert_eq!(applied.response, "Paused playback.");
        assert!(!state.summary.playing);
    }

    #[test]
    fn unrecognized_input_gets_the_help_response() {
        let mut state = SessionState::new();
        let before = state.code.clone();

        let applied = apply(
            &mut state,
            &Intent::Unrecognized("what is the weather".to_string()),
        );

        assert_eq!(applied.response, HELP_RESPONSE);
        assert_eq!(state.code, before);
        assert_eq!(state.mode, Mode::Code);
    }
}
