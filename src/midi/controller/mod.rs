pub mod midir;
#[cfg(test)]
pub mod stubs;

use async_channel::Sender;

use crate::router::Input;

/// Where input events come from. Implementations push every decoded
/// message into `events` from whatever thread their driver calls back on.
pub trait MidiSource {
    /// Keeps the subscription alive for as long as it is held.
    type Connection;

    fn port_count(&self) -> usize;

    fn port_name(&self, index: usize) -> Option<String>;

    fn open(self, index: usize, events: Sender<Input>) -> anyhow::Result<Self::Connection>;
}

/// How the input port is chosen when more than one is available.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PortSelector {
    #[default]
    First,
    Index(usize),
    NameContains(String),
}

impl PortSelector {
    pub fn resolve<S: MidiSource>(&self, source: &S) -> Option<usize> {
        let count = source.port_count();
        match self {
            PortSelector::First => (count > 0).then_some(0),
            PortSelector::Index(index) => (*index < count).then_some(*index),
            PortSelector::NameContains(name) => (0..count).find(|&i| {
                source
                    .port_name(i)
                    .filter(|port_name| port_name.contains(name.as_str()))
                    .is_some()
            }),
        }
    }
}
