pub mod joystick;
pub mod keypress;
#[cfg(not(all(feature = "uinput", target_os = "linux")))]
pub mod stubs;
#[cfg(all(feature = "uinput", target_os = "linux"))]
pub mod uinput;

use crate::mapping::model::{ActionKind, MappingTable};
use crate::midi::model::MidiEvent;

#[derive(Debug, thiserror::Error)]
#[error("Output sink failed. Reason: {human_friendly_description}. Details: {underlying_error:?}")]
pub struct SinkError {
    pub human_friendly_description: String,
    pub underlying_error: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Presses a key by name.
pub trait KeyPressSink {
    fn press(&mut self, key: &str) -> Result<(), SinkError>;
}

/// A virtual joystick whose button changes become visible on `flush`.
pub trait JoystickSink {
    fn set_button(&mut self, index: u32, pressed: bool) -> Result<(), SinkError>;

    fn flush(&mut self) -> Result<(), SinkError>;
}

/// Plays events while the router is not in setup. Failures are the
/// handler's to report; nothing propagates back into the router.
pub trait OutputHandler {
    /// What the setup answer has to be turned into for this handler.
    fn action_kind(&self) -> ActionKind;

    fn handle(&mut self, event: &MidiEvent, table: &MappingTable);
}

impl OutputHandler for Box<dyn OutputHandler> {
    fn action_kind(&self) -> ActionKind {
        (**self).action_kind()
    }

    fn handle(&mut self, event: &MidiEvent, table: &MappingTable) {
        (**self).handle(event, table)
    }
}
