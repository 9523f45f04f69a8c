use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::midi::controller::PortSelector;
use crate::router::workflow::SetupPolicy;

const DEFAULT_MAPPING_FILE: &str = "config.json";
const DEFAULT_CLIENT_NAME: &str = "midi-keymap";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Keyboard,
    Joystick,
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Plays keyboard keys or joystick buttons from a MIDI controller", long_about = None)]
pub struct Args {
    /// YAML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where note bindings are kept
    #[arg(short, long)]
    pub mapping_file: Option<PathBuf>,

    /// What notes are turned into
    #[arg(long, value_enum)]
    pub mode: Option<OutputMode>,

    /// Input port index
    #[arg(short, long)]
    pub port: Option<usize>,

    /// Use the first input port whose name contains this
    #[arg(short, long)]
    pub device: Option<String>,

    /// List input ports and exit
    #[arg(short, long)]
    pub list: bool,

    /// Log every event and routing decision
    #[arg(short, long)]
    pub verbose: bool,
}

// YAML specific configuration

#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SetupSettings {
    pub reject_empty_bindings: bool,
    pub cancel_command: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub controller_name: Option<String>,
    pub port: Option<usize>,
    pub mapping_file: Option<PathBuf>,
    pub mode: Option<OutputMode>,
    pub setup: SetupSettings,
}

// Parsed part - settings and flags merged, flags win

#[derive(Debug, PartialEq, Eq)]
pub struct ParsedConfig {
    pub client_name: String,
    pub port: PortSelector,
    pub mapping_file: PathBuf,
    pub mode: OutputMode,
    pub policy: SetupPolicy,
}

impl From<SetupSettings> for SetupPolicy {
    fn from(value: SetupSettings) -> Self {
        SetupPolicy {
            reject_empty_bindings: value.reject_empty_bindings,
            cancel_command: value
                .cancel_command
                .map(|cmd| cmd.trim().to_owned())
                .filter(|cmd| !cmd.is_empty()),
            timeout: value
                .timeout_seconds
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

pub fn parse(args: &Args, settings: Settings) -> ParsedConfig {
    let device = args.device.clone().or(settings.controller_name);
    let port = match (args.port.or(settings.port), device) {
        (Some(index), _) => PortSelector::Index(index),
        (None, Some(name)) => PortSelector::NameContains(name),
        (None, None) => PortSelector::First,
    };

    ParsedConfig {
        client_name: DEFAULT_CLIENT_NAME.to_owned(),
        port,
        mapping_file: args
            .mapping_file
            .clone()
            .or(settings.mapping_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MAPPING_FILE)),
        mode: args.mode.or(settings.mode).unwrap_or_default(),
        policy: settings.setup.into(),
    }
}

pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> anyhow::Result<Settings> {
    let conf_file = std::fs::File::open(path)?;
    Ok(serde_yaml::from_reader(conf_file)?)
}
