use async_channel::Sender;

use crate::midi::controller::MidiSource;
use crate::midi::model::MidiEvent;
use crate::router::Input;

/// Replays a fixed list of events as soon as a port is opened.
pub struct StubSource {
    pub ports: Vec<String>,
    pub events: Vec<MidiEvent>,
}

impl StubSource {
    pub fn with_ports(ports: &[&str]) -> StubSource {
        StubSource {
            ports: ports.iter().map(|p| p.to_string()).collect(),
            events: Vec::new(),
        }
    }
}

impl MidiSource for StubSource {
    type Connection = ();

    fn port_count(&self) -> usize {
        self.ports.len()
    }

    fn port_name(&self, index: usize) -> Option<String> {
        self.ports.get(index).cloned()
    }

    fn open(self, _index: usize, events: Sender<Input>) -> anyhow::Result<()> {
        for (timestamp, event) in self.events.into_iter().enumerate() {
            events.try_send(Input::Midi {
                timestamp: timestamp as u64,
                event,
            })?;
        }
        Ok(())
    }
}
