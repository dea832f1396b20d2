//! Speech output collaborator
//!
//! The daemon never produces audio itself. `speak` is fire-and-forget;
//! the production implementation forwards the utterance to subscribed
//! front-ends over the event bus. The session only speaks on offline
//! paths, where no visible UI round trip is guaranteed.

use tokio::sync::broadcast;
use tracing::debug;

use crate::events::SessionEvent;

/// Utterance parameters passed through to the engine
#[derive(Debug, Clone, Copy)]
pub struct SpeechParams {
    pub rate: f32,
    pub pitch: f32,
}

impl Default for SpeechParams {
    /// The product's confirmation voice: slightly slow, slightly bright.
    fn default() -> Self {
        Self {
            rate: 0.9,
            pitch: 1.1,
        }
    }
}

/// Accepts text and performs audio output somewhere else
pub trait SpeechOutput: Send + Sync {
    fn speak(&self, text: &str, params: SpeechParams);
}

/// Forwards utterances to subscribed clients as `Speak` events
pub struct EventSpeech {
    events: broadcast::Sender<SessionEvent>,
}

impl EventSpeech {
    pub fn new(events: broadcast::Sender<SessionEvent>) -> Self {
        Self { events }
    }
}

impl SpeechOutput for EventSpeech {
    fn speak(&self, text: &str, params: SpeechParams) {
        debug!(chars = text.len(), "forwarding utterance to subscribers");
        let _ = self.events.send(SessionEvent::Speak {
            text: text.to_string(),
            rate: params.rate,
            pitch: params.pitch,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speak_reaches_subscribers() {
        let (tx, mut rx) = broadcast::channel(4);
        let speech = EventSpeech::new(tx);

        speech.speak("Back to coding mode!", SpeechParams::default());

        match rx.try_recv().unwrap() {
            SessionEvent::Speak { text, rate, pitch } => {
                assert_eq!(text, "Back to coding mode!");
                assert!((rate - 0.9).abs() < f32::EPSILON);
                assert!((pitch - 1.1).abs() < f32::EPSILON);
            }
            other => panic!("unexpected event: {other}"),
        }
    }

    #[test]
    fn speak_without_subscribers_is_harmless() {
        let (tx, _) = broadcast::channel(4);
        let speech = EventSpeech::new(tx);
        speech.speak("nobody listening", SpeechParams::default());
    }
}
