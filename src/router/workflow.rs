use std::time::Duration;

use crate::mapping::model::{Action, ActionKind};
use crate::midi::model::{DataByte, MidiEvent};

/// Knobs for the interactive setup session. The defaults accept any
/// answer and never give up waiting for one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SetupPolicy {
    pub reject_empty_bindings: bool,
    pub cancel_command: Option<String>,
    pub timeout: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupState {
    /// Waiting for the note to bind.
    Armed,
    /// A note was captured and the operator has been asked what to bind it to.
    AwaitingKeyName { note: DataByte },
}

#[derive(Debug, PartialEq, Eq)]
pub enum Answer {
    Commit { note: DataByte, action: Action },
    /// The answer can't be used; ask again for the same note.
    Retry { note: DataByte, reason: String },
}

/// The setup session. Only ever consulted while the router is armed.
pub struct MappingWorkflow {
    state: SetupState,
    session: u64,
    kind: ActionKind,
    reject_empty_bindings: bool,
}

impl MappingWorkflow {
    pub fn new(kind: ActionKind, reject_empty_bindings: bool) -> MappingWorkflow {
        MappingWorkflow {
            state: SetupState::Armed,
            session: 0,
            kind,
            reject_empty_bindings,
        }
    }

    pub fn state(&self) -> SetupState {
        self.state
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Id of the most recently armed session.
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Starts a fresh session and returns its id.
    pub fn arm(&mut self) -> u64 {
        self.state = SetupState::Armed;
        self.session += 1;
        self.session
    }

    pub fn disarm(&mut self) {
        self.state = SetupState::Armed;
    }

    /// Captures the note of the first genuine press. Returns the note when
    /// the operator has to be asked about it; every other event is dropped,
    /// including presses that arrive while an answer is still outstanding.
    pub fn on_event(&mut self, event: &MidiEvent) -> Option<DataByte> {
        match self.state {
            SetupState::Armed if event.is_press() => {
                self.state = SetupState::AwaitingKeyName { note: event.note };
                Some(event.note)
            }
            _ => None,
        }
    }

    /// `None` when no question is outstanding.
    pub fn on_answer(&mut self, answer: &str) -> Option<Answer> {
        let note = match self.state {
            SetupState::AwaitingKeyName { note } => note,
            SetupState::Armed => return None,
        };

        if self.reject_empty_bindings && answer.is_empty() {
            return Some(Answer::Retry {
                note,
                reason: "Empty bindings are not allowed.".to_owned(),
            });
        }

        match self.kind.parse_answer(answer) {
            Ok(action) => {
                self.disarm();
                Some(Answer::Commit { note, action })
            }
            Err(e) => Some(Answer::Retry {
                note,
                reason: e.to_string(),
            }),
        }
    }
}
