use log::{error, info, warn};

use crate::mapping::model::{Action, ActionKind, MappingTable};
use crate::midi::model::MidiEvent;
use crate::output::{JoystickSink, OutputHandler, SinkError};

/// Holds the bound button down for as long as the note is held.
pub struct JoystickHandler<S> {
    sink: S,
}

impl<S: JoystickSink> JoystickHandler<S> {
    pub fn new(sink: S) -> JoystickHandler<S> {
        JoystickHandler { sink }
    }

    fn apply(&mut self, index: u32, pressed: bool) -> Result<(), SinkError> {
        self.sink.set_button(index, pressed)?;
        self.sink.flush()
    }
}

impl<S: JoystickSink> OutputHandler for JoystickHandler<S> {
    fn action_kind(&self) -> ActionKind {
        ActionKind::JoystickButton
    }

    fn handle(&mut self, event: &MidiEvent, table: &MappingTable) {
        if !event.is_note_on() {
            return;
        }

        match table.lookup(event.note) {
            None => warn!("No button mapping found for MIDI note: {}", event.note),
            Some(Action::JoystickButton(index)) => {
                let pressed = event.velocity.as_u8() > 0;
                info!("Setting joystick button {index} to {pressed}");
                if let Err(e) = self.apply(*index, pressed) {
                    error!("{e}");
                }
            }
            Some(other) => warn!(
                "MIDI note {} is bound to {other}, which a joystick can't play",
                event.note
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::model::DataByte;
    use crate::output::recording::{RecordingSink, SinkCall};

    fn table() -> MappingTable {
        MappingTable::default().upsert(DataByte::from_u8(60).unwrap(), Action::JoystickButton(2))
    }

    fn event(status: u8, note: u8, velocity: u8) -> MidiEvent {
        MidiEvent::new(status, note, velocity).unwrap()
    }

    #[test]
    fn tracks_press_and_release() {
        let sink = RecordingSink::default();
        let mut handler = JoystickHandler::new(sink.clone());

        handler.handle(&event(144, 60, 100), &table());
        handler.handle(&event(144, 60, 0), &table());

        assert_eq!(
            sink.calls(),
            vec![
                SinkCall::SetButton(2, true),
                SinkCall::Flush,
                SinkCall::SetButton(2, false),
                SinkCall::Flush,
            ]
        );
    }

    #[test]
    fn repeated_release_stays_released() {
        let sink = RecordingSink::default();
        let mut handler = JoystickHandler::new(sink.clone());

        handler.handle(&event(144, 60, 0), &table());
        handler.handle(&event(144, 60, 0), &table());

        assert_eq!(
            sink.calls(),
            vec![
                SinkCall::SetButton(2, false),
                SinkCall::Flush,
                SinkCall::SetButton(2, false),
                SinkCall::Flush,
            ]
        );
    }

    #[test]
    fn key_bindings_and_unmapped_notes_do_nothing() {
        let sink = RecordingSink::default();
        let mut handler = JoystickHandler::new(sink.clone());
        let table = table().upsert(DataByte::from_u8(61).unwrap(), Action::KeyPress("a".into()));

        handler.handle(&event(144, 61, 100), &table);
        handler.handle(&event(144, 70, 100), &table);

        assert!(sink.calls().is_empty());
    }
}
