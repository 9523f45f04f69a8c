pub mod workflow;

use async_channel::{Receiver, Sender};
use log::{debug, error, info, warn};
use std::time::Duration;

use crate::console::{LineSource, Prompter};
use crate::mapping::model::{Action, ActionKind, MappingTable};
use crate::mapping::store::MappingStore;
use crate::midi::controller::{MidiSource, PortSelector};
use crate::midi::model::{DataByte, MidiEvent};
use crate::output::OutputHandler;
use crate::router::workflow::{Answer, MappingWorkflow, SetupPolicy};

const SETUP_TRIGGER: &str = "setup";

/// Everything the router reacts to, in arrival order.
#[derive(Debug)]
pub enum Input {
    Midi { timestamp: u64, event: MidiEvent },
    Line(String),
    SetupExpired { session: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouterMode {
    Normal,
    ArmedForMapping,
}

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("No MIDI input devices found.")]
    NoDevice,
    #[error("No MIDI input port matches {0}.")]
    PortNotFound(String),
    #[error("Couldn't open MIDI input port {name}. Reason: {reason}")]
    Port { name: String, reason: String },
}

/// Single consumer of all inputs and sole owner of the mode and the table.
/// Each input is fully handled before the next one is looked at.
pub struct Router<H, S, P> {
    mode: RouterMode,
    workflow: MappingWorkflow,
    table: MappingTable,
    handler: H,
    store: S,
    prompter: P,
    cancel_command: Option<String>,
    timeout: Option<Duration>,
    expiry: Option<Sender<Input>>,
}

impl<H, S, P> Router<H, S, P>
where
    H: OutputHandler,
    S: MappingStore,
    P: Prompter,
{
    pub fn new(handler: H, store: S, prompter: P, policy: SetupPolicy) -> Router<H, S, P> {
        let table = store.load();
        let workflow = MappingWorkflow::new(handler.action_kind(), policy.reject_empty_bindings);
        Router {
            mode: RouterMode::Normal,
            workflow,
            table,
            handler,
            store,
            prompter,
            cancel_command: policy.cancel_command,
            timeout: policy.timeout,
            expiry: None,
        }
    }

    pub fn mode(&self) -> RouterMode {
        self.mode
    }

    /// Opens the selected port, subscribes to the console and routes until
    /// every input source has gone away.
    pub async fn start<M, L>(
        &mut self,
        source: M,
        selector: &PortSelector,
        lines: L,
    ) -> Result<(), RouterError>
    where
        M: MidiSource,
        L: LineSource,
    {
        let port_count = source.port_count();
        if port_count == 0 {
            return Err(RouterError::NoDevice);
        }

        info!("Found {port_count} MIDI input ports:");
        for i in 0..port_count {
            info!("{i}: {}", source.port_name(i).unwrap_or_default());
        }

        let index = selector
            .resolve(&source)
            .ok_or_else(|| RouterError::PortNotFound(format!("{selector:?}")))?;
        let name = source.port_name(index).unwrap_or_default();

        let (sender, receiver) = async_channel::unbounded();
        let _connection = source
            .open(index, sender.clone())
            .map_err(|e| RouterError::Port {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        info!("Opened MIDI input port: {name}");

        lines.subscribe(sender.clone());
        self.expiry = self.timeout.map(|_| sender);

        info!("Listening for MIDI inputs...");
        self.run(receiver).await;
        Ok(())
    }

    pub async fn run(&mut self, inputs: Receiver<Input>) {
        while let Ok(input) = inputs.recv().await {
            self.dispatch(input);
        }
        debug!("All input sources closed");
    }

    pub fn dispatch(&mut self, input: Input) {
        match input {
            Input::Midi { timestamp, event } => {
                debug!("[{timestamp}] Received MIDI message: {event}");
                self.on_midi(event);
            }
            Input::Line(line) => self.on_line(line.trim()),
            Input::SetupExpired { session } => self.on_setup_expired(session),
        }
    }

    fn on_midi(&mut self, event: MidiEvent) {
        match self.mode() {
            RouterMode::Normal => {
                debug!("Routing {event} to the output handler");
                self.handler.handle(&event, &self.table);
            }
            RouterMode::ArmedForMapping => match self.workflow.on_event(&event) {
                Some(note) => {
                    debug!("Captured MIDI note {note} for mapping");
                    self.ask_for_binding(note);
                }
                None => debug!("Setup {:?}, dropping {event}", self.workflow.state()),
            },
        }
    }

    fn on_line(&mut self, line: &str) {
        if self.mode() == RouterMode::ArmedForMapping && self.is_cancel(line) {
            self.leave_setup("Setup cancelled. No mapping changed.");
            return;
        }

        if let Some(answer) = self.workflow.on_answer(line) {
            match answer {
                Answer::Commit { note, action } => self.commit(note, action),
                Answer::Retry { note, reason } => {
                    warn!("{reason}");
                    self.ask_for_binding(note);
                }
            }
            return;
        }

        if line.eq_ignore_ascii_case(SETUP_TRIGGER) {
            match self.mode() {
                RouterMode::Normal => self.enter_setup(),
                RouterMode::ArmedForMapping => info!("Already in setup mapping mode."),
            }
        } else {
            debug!("Ignoring console input {line:?}");
        }
    }

    fn on_setup_expired(&mut self, session: u64) {
        if self.mode() == RouterMode::ArmedForMapping && self.workflow.session() == session {
            self.leave_setup("Setup timed out. No mapping changed.");
        } else {
            debug!("Ignoring expiry of finished setup session {session}");
        }
    }

    fn is_cancel(&self, line: &str) -> bool {
        self.cancel_command
            .as_deref()
            .map_or(false, |cmd| line.eq_ignore_ascii_case(cmd))
    }

    fn enter_setup(&mut self) {
        let session = self.workflow.arm();
        self.mode = RouterMode::ArmedForMapping;
        let target = match self.workflow.kind() {
            ActionKind::KeyPress => "a keyboard key",
            ActionKind::JoystickButton => "a joystick button",
        };
        info!("Entered setup mapping mode. Press a button on the controller to map it to {target}.");

        if let (Some(timeout), Some(expiry)) = (self.timeout, self.expiry.clone()) {
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                let _ = expiry.send(Input::SetupExpired { session }).await;
            });
        }
    }

    fn leave_setup(&mut self, reason: &str) {
        self.workflow.disarm();
        self.mode = RouterMode::Normal;
        info!("{reason}");
    }

    fn ask_for_binding(&mut self, note: DataByte) {
        let question = match self.workflow.kind() {
            ActionKind::KeyPress => format!("Press the key you want to map to MIDI note {note}: "),
            ActionKind::JoystickButton => {
                format!("Enter the joystick button number to map to MIDI note {note}: ")
            }
        };
        self.prompter.prompt(&question);
    }

    fn commit(&mut self, note: DataByte, action: Action) {
        self.table = self.table.upsert(note, action.clone());
        // The new binding is live either way; the next commit saves again.
        if let Err(e) = self.store.save(&self.table) {
            error!("{e}");
        }
        info!("Mapped MIDI note {note} to {action}.");
        self.mode = RouterMode::Normal;
    }
}

#[cfg(test)]
impl<H, S, P> Router<H, S, P> {
    fn table(&self) -> &MappingTable {
        &self.table
    }

    fn setup_state(&self) -> workflow::SetupState {
        self.workflow.state()
    }
}
