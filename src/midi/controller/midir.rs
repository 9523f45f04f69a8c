use async_channel::Sender;
use log::{debug, warn};

use crate::midi::controller::MidiSource;
use crate::midi::model::MidiEvent;
use crate::router::Input;

/// Input ports of the platform MIDI backend.
pub struct MidirBased {
    midi_in: midir::MidiInput,
    ports: Vec<midir::MidiInputPort>,
}

impl MidirBased {
    pub fn new(client_name: &str) -> anyhow::Result<MidirBased> {
        let mut midi_in = midir::MidiInput::new(&format!("{client_name}-client"))?;
        // Sysex, clock and active sensing are never routed.
        midi_in.ignore(midir::Ignore::All);
        let ports = midi_in.ports();
        Ok(MidirBased { midi_in, ports })
    }
}

impl MidiSource for MidirBased {
    type Connection = midir::MidiInputConnection<()>;

    fn port_count(&self) -> usize {
        self.ports.len()
    }

    fn port_name(&self, index: usize) -> Option<String> {
        self.ports
            .get(index)
            .and_then(|p| self.midi_in.port_name(p).ok())
    }

    fn open(self, index: usize, events: Sender<Input>) -> anyhow::Result<Self::Connection> {
        let port = self
            .ports
            .get(index)
            .ok_or_else(|| anyhow::Error::msg(format!("No MIDI input port {index}.")))?
            .clone();

        self.midi_in
            .connect(
                &port,
                "midi-keymap-input",
                move |timestamp, bytes, _| match MidiEvent::from_bytes(bytes) {
                    Some(event) => {
                        // Unbounded, so this only fails once the router is gone.
                        if events.try_send(Input::Midi { timestamp, event }).is_err() {
                            warn!("Router stopped, dropping {event}");
                        }
                    }
                    None => debug!("Ignoring non channel message {bytes:?}"),
                },
                (),
            )
            .map_err(|e| anyhow::Error::msg(format!("Couldn't open MIDI input port: {e}.")))
    }
}
