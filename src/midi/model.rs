use serde::de::{Error, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fmt::Formatter;

const U8_MSB_EXTRACTOR: u8 = 0x80;

/// Status byte of a "note on" message on the first channel.
pub const NOTE_ON: u8 = 0x90;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status(u8);

impl Status {
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn from_u8(status: u8) -> Option<Status> {
        (status & U8_MSB_EXTRACTOR == U8_MSB_EXTRACTOR).then(|| Status(status))
    }

    pub fn is_note_on(&self) -> bool {
        self.0 == NOTE_ON
    }
}

/// 7-bit data byte. Used both as note number and velocity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[repr(transparent)]
pub struct DataByte(u8);

impl DataByte {
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn from_u8(db: u8) -> Option<DataByte> {
        (db & U8_MSB_EXTRACTOR == 0).then(|| DataByte(db))
    }
}

impl fmt::Display for DataByte {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct DataByteVisitor;

impl<'de> Visitor<'de> for DataByteVisitor {
    type Value = DataByte;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("Expecting data byte to be u8 between 0x00 and 0x7F.")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: Error,
    {
        let parse_res = u8::try_from(v).ok().and_then(DataByte::from_u8);

        match parse_res {
            None => Err(E::custom(format!(
                "Expecting data byte to be u8 between 0x00 and 0x7F. Got: {}.",
                v
            ))),
            Some(db) => Ok(db),
        }
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: Error,
    {
        match u64::try_from(v) {
            Ok(v) => self.visit_u64(v),
            Err(_) => Err(E::custom(format!(
                "Expecting data byte to be u8 between 0x00 and 0x7F. Got: {}.",
                v
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for DataByte {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_u8(DataByteVisitor)
    }
}

/// One channel message as delivered by the input port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiEvent {
    pub status: Status,
    pub note: DataByte,
    pub velocity: DataByte,
}

impl MidiEvent {
    pub fn new(status: u8, note: u8, velocity: u8) -> Option<MidiEvent> {
        Some(MidiEvent {
            status: Status::from_u8(status)?,
            note: DataByte::from_u8(note)?,
            velocity: DataByte::from_u8(velocity)?,
        })
    }

    /// Decodes a raw three byte message. Shorter or longer messages
    /// (realtime, sysex, program change) are not routed.
    pub fn from_bytes(bytes: &[u8]) -> Option<MidiEvent> {
        match *bytes {
            [status, note, velocity] => MidiEvent::new(status, note, velocity),
            _ => None,
        }
    }

    pub fn is_note_on(&self) -> bool {
        self.status.is_note_on()
    }

    /// A genuine press: note-on status with a non-zero velocity.
    pub fn is_press(&self) -> bool {
        self.is_note_on() && self.velocity.as_u8() > 0
    }
}

impl fmt::Display for MidiEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status={}, data1={}, data2={}",
            self.status.as_u8(),
            self.note,
            self.velocity
        )
    }
}
