use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::midi::model::DataByte;

/// What a note is bound to. Stored as a bare string (key name) or a bare
/// integer (joystick button) in the mapping file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Action {
    KeyPress(String),
    JoystickButton(u32),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::KeyPress(key) => write!(f, "key {key}"),
            Action::JoystickButton(index) => write!(f, "joystick button {index}"),
        }
    }
}

/// The kind of action a deployment binds notes to. Chosen once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    KeyPress,
    JoystickButton,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAnswer {
    #[error("Expected a joystick button number. Got: {0:?}.")]
    NotAButton(String),
}

impl ActionKind {
    /// Turns the operator's answer to the setup prompt into an action.
    /// Key names are taken verbatim, empty ones included.
    pub fn parse_answer(&self, answer: &str) -> Result<Action, InvalidAnswer> {
        match self {
            ActionKind::KeyPress => Ok(Action::KeyPress(answer.to_owned())),
            ActionKind::JoystickButton => answer
                .parse::<u32>()
                .map(Action::JoystickButton)
                .map_err(|_| InvalidAnswer::NotAButton(answer.to_owned())),
        }
    }
}

/// Note number to action. At most one action per note.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTable(BTreeMap<DataByte, Action>);

impl MappingTable {
    pub fn lookup(&self, note: DataByte) -> Option<&Action> {
        self.0.get(&note)
    }

    /// New table with `note` bound to `action`, everything else untouched.
    pub fn upsert(&self, note: DataByte, action: Action) -> MappingTable {
        let mut entries = self.0.clone();
        entries.insert(note, action);
        MappingTable(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(DataByte, Action)> for MappingTable {
    fn from_iter<I: IntoIterator<Item = (DataByte, Action)>>(iter: I) -> Self {
        MappingTable(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(n: u8) -> DataByte {
        DataByte::from_u8(n).unwrap()
    }

    fn key(k: &str) -> Action {
        Action::KeyPress(k.to_owned())
    }

    #[test]
    fn upsert_binds_note_and_keeps_the_rest() {
        let table: MappingTable = [(note(60), key("a")), (note(62), key("b"))]
            .into_iter()
            .collect();

        let updated = table.upsert(note(60), key("z"));

        assert_eq!(updated.lookup(note(60)), Some(&key("z")));
        assert_eq!(updated.lookup(note(62)), Some(&key("b")));
        assert_eq!(updated.len(), 2);
        // The source table is left alone.
        assert_eq!(table.lookup(note(60)), Some(&key("a")));
    }

    #[test]
    fn upsert_into_empty_table() {
        let table = MappingTable::default().upsert(note(0), Action::JoystickButton(2));
        assert_eq!(table.lookup(note(0)), Some(&Action::JoystickButton(2)));
        assert_eq!(table.lookup(note(1)), None);
    }

    #[test]
    fn file_shape_uses_string_note_keys() {
        let table: MappingTable = [(note(62), key("b")), (note(60), key("a"))]
            .into_iter()
            .collect();

        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"60":"a","62":"b"}"#);
    }

    #[test]
    fn reads_key_names_and_button_indexes() {
        let table: MappingTable = serde_json::from_str(r#"{"60": "a", "61": 3}"#).unwrap();
        assert_eq!(table.lookup(note(60)), Some(&key("a")));
        assert_eq!(table.lookup(note(61)), Some(&Action::JoystickButton(3)));
    }

    #[test]
    fn rejects_notes_out_of_range() {
        assert!(serde_json::from_str::<MappingTable>(r#"{"128": "a"}"#).is_err());
        assert!(serde_json::from_str::<MappingTable>(r#"{"C4": "a"}"#).is_err());
    }

    #[test]
    fn parses_answers_per_kind() {
        assert_eq!(ActionKind::KeyPress.parse_answer("space"), Ok(key("space")));
        assert_eq!(ActionKind::KeyPress.parse_answer(""), Ok(key("")));
        assert_eq!(
            ActionKind::JoystickButton.parse_answer("4"),
            Ok(Action::JoystickButton(4))
        );
        assert_eq!(
            ActionKind::JoystickButton.parse_answer("x"),
            Err(InvalidAnswer::NotAButton("x".to_owned()))
        );
    }
}
