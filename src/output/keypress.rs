use log::{debug, error, info, warn};

use crate::mapping::model::{Action, ActionKind, MappingTable};
use crate::midi::model::MidiEvent;
use crate::output::{KeyPressSink, OutputHandler};

/// Taps the bound key on every press. Releases are ignored.
pub struct KeyPressHandler<S> {
    sink: S,
}

impl<S: KeyPressSink> KeyPressHandler<S> {
    pub fn new(sink: S) -> KeyPressHandler<S> {
        KeyPressHandler { sink }
    }
}

impl<S: KeyPressSink> OutputHandler for KeyPressHandler<S> {
    fn action_kind(&self) -> ActionKind {
        ActionKind::KeyPress
    }

    fn handle(&mut self, event: &MidiEvent, table: &MappingTable) {
        if !event.is_note_on() {
            return;
        }

        match table.lookup(event.note) {
            None => warn!("No key mapping found for MIDI note: {}", event.note),
            Some(Action::KeyPress(key)) if key.is_empty() => {
                warn!("No key mapping found for MIDI note: {}", event.note)
            }
            Some(Action::KeyPress(key)) => {
                if event.velocity.as_u8() == 0 {
                    debug!("Note {} released, nothing to press", event.note);
                    return;
                }
                info!("Pressing key: {key}");
                if let Err(e) = self.sink.press(key) {
                    error!("{e}");
                }
            }
            Some(other) => warn!(
                "MIDI note {} is bound to {other}, which a keyboard can't play",
                event.note
            ),
        }
    }
}
