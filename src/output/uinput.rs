use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key};

use crate::output::{JoystickSink, KeyPressSink, SinkError};

const BUTTON_COUNT: u16 = 40;

fn io_failure(description: &str, e: std::io::Error) -> SinkError {
    SinkError {
        human_friendly_description: description.to_owned(),
        underlying_error: Some(Box::new(e)),
    }
}

fn rejected(description: String) -> SinkError {
    SinkError {
        human_friendly_description: description,
        underlying_error: None,
    }
}

/// Names accepted at the setup prompt, e.g. `a`, `7`, `space`, `f5`.
pub fn key_by_name(name: &str) -> Option<Key> {
    let name = name.trim().to_ascii_lowercase();
    let key = match name.as_str() {
        "a" => Key::KEY_A,
        "b" => Key::KEY_B,
        "c" => Key::KEY_C,
        "d" => Key::KEY_D,
        "e" => Key::KEY_E,
        "f" => Key::KEY_F,
        "g" => Key::KEY_G,
        "h" => Key::KEY_H,
        "i" => Key::KEY_I,
        "j" => Key::KEY_J,
        "k" => Key::KEY_K,
        "l" => Key::KEY_L,
        "m" => Key::KEY_M,
        "n" => Key::KEY_N,
        "o" => Key::KEY_O,
        "p" => Key::KEY_P,
        "q" => Key::KEY_Q,
        "r" => Key::KEY_R,
        "s" => Key::KEY_S,
        "t" => Key::KEY_T,
        "u" => Key::KEY_U,
        "v" => Key::KEY_V,
        "w" => Key::KEY_W,
        "x" => Key::KEY_X,
        "y" => Key::KEY_Y,
        "z" => Key::KEY_Z,
        "0" => Key::KEY_0,
        "1" => Key::KEY_1,
        "2" => Key::KEY_2,
        "3" => Key::KEY_3,
        "4" => Key::KEY_4,
        "5" => Key::KEY_5,
        "6" => Key::KEY_6,
        "7" => Key::KEY_7,
        "8" => Key::KEY_8,
        "9" => Key::KEY_9,
        "space" => Key::KEY_SPACE,
        "enter" | "return" => Key::KEY_ENTER,
        "tab" => Key::KEY_TAB,
        "escape" | "esc" => Key::KEY_ESC,
        "backspace" => Key::KEY_BACKSPACE,
        "up" => Key::KEY_UP,
        "down" => Key::KEY_DOWN,
        "left" => Key::KEY_LEFT,
        "right" => Key::KEY_RIGHT,
        "shift" => Key::KEY_LEFTSHIFT,
        "control" | "ctrl" => Key::KEY_LEFTCTRL,
        "alt" => Key::KEY_LEFTALT,
        "f1" => Key::KEY_F1,
        "f2" => Key::KEY_F2,
        "f3" => Key::KEY_F3,
        "f4" => Key::KEY_F4,
        "f5" => Key::KEY_F5,
        "f6" => Key::KEY_F6,
        "f7" => Key::KEY_F7,
        "f8" => Key::KEY_F8,
        "f9" => Key::KEY_F9,
        "f10" => Key::KEY_F10,
        "f11" => Key::KEY_F11,
        "f12" => Key::KEY_F12,
        _ => return None,
    };
    Some(key)
}

/// Virtual keyboard device. Every name `key_by_name` knows is registered.
pub struct UinputKeyboard {
    device: VirtualDevice,
}

impl UinputKeyboard {
    pub fn new(name: &str) -> anyhow::Result<UinputKeyboard> {
        let names = (b'a'..=b'z')
            .chain(b'0'..=b'9')
            .map(|c| (c as char).to_string())
            .chain(
                [
                    "space", "enter", "tab", "escape", "backspace", "up", "down", "left",
                    "right", "shift", "control", "alt",
                ]
                .iter()
                .map(|s| s.to_string()),
            )
            .chain((1..=12).map(|n| format!("f{n}")));

        let mut keys = AttributeSet::<Key>::new();
        for key in names.filter_map(|n| key_by_name(&n)) {
            keys.insert(key);
        }

        let device = VirtualDeviceBuilder::new()?
            .name(name)
            .with_keys(&keys)?
            .build()?;
        Ok(UinputKeyboard { device })
    }
}

impl KeyPressSink for UinputKeyboard {
    fn press(&mut self, key: &str) -> Result<(), SinkError> {
        let key = key_by_name(key)
            .ok_or_else(|| rejected(format!("unknown key name {key:?}")))?;
        self.device
            .emit(&[
                InputEvent::new(EventType::KEY, key.code(), 1),
                InputEvent::new(EventType::KEY, key.code(), 0),
            ])
            .map_err(|e| io_failure("tapping key failed", e))
    }
}

/// Virtual gamepad with `BTN_TRIGGER_HAPPY1..40` as buttons 0 to 39.
pub struct UinputJoystick {
    device: VirtualDevice,
    pending: Vec<InputEvent>,
}

impl UinputJoystick {
    pub fn new(name: &str) -> anyhow::Result<UinputJoystick> {
        let mut buttons = AttributeSet::<Key>::new();
        for index in 0..BUTTON_COUNT {
            buttons.insert(Key::new(Key::BTN_TRIGGER_HAPPY1.code() + index));
        }

        let device = VirtualDeviceBuilder::new()?
            .name(name)
            .with_keys(&buttons)?
            .build()?;
        Ok(UinputJoystick {
            device,
            pending: Vec::new(),
        })
    }
}

impl JoystickSink for UinputJoystick {
    fn set_button(&mut self, index: u32, pressed: bool) -> Result<(), SinkError> {
        let offset = u16::try_from(index)
            .ok()
            .filter(|i| *i < BUTTON_COUNT)
            .ok_or_else(|| rejected(format!("no joystick button {index}")))?;
        let code = Key::BTN_TRIGGER_HAPPY1.code() + offset;
        self.pending
            .push(InputEvent::new(EventType::KEY, code, i32::from(pressed)));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let events = std::mem::take(&mut self.pending);
        self.device
            .emit(&events)
            .map_err(|e| io_failure("updating joystick failed", e))
    }
}
