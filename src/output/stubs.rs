use log::info;

use crate::output::{JoystickSink, KeyPressSink, SinkError};

/// Stands in for a real output device and only logs.
pub struct JustLog;

impl KeyPressSink for JustLog {
    fn press(&mut self, key: &str) -> Result<(), SinkError> {
        info!("[no keyboard backend] tap {key}");
        Ok(())
    }
}

impl JoystickSink for JustLog {
    fn set_button(&mut self, index: u32, pressed: bool) -> Result<(), SinkError> {
        info!("[no joystick backend] button {index} -> {pressed}");
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
