mod configuration;
mod console;
mod mapping;
mod midi;
mod output;
mod router;

use clap::Parser;
use env_logger::Env;
use log::info;

use crate::configuration::{Args, OutputMode, Settings};
use crate::console::{StdinLines, StdoutPrompter};
use crate::mapping::store::JsonFileStore;
use crate::midi::controller::midir::MidirBased;
use crate::midi::controller::MidiSource;
use crate::output::OutputHandler;
use crate::router::Router;

#[cfg(all(feature = "uinput", target_os = "linux"))]
fn output_handler(mode: OutputMode, name: &str) -> anyhow::Result<Box<dyn OutputHandler>> {
    use crate::output::joystick::JoystickHandler;
    use crate::output::keypress::KeyPressHandler;
    use crate::output::uinput::{UinputJoystick, UinputKeyboard};

    Ok(match mode {
        OutputMode::Keyboard => Box::new(KeyPressHandler::new(UinputKeyboard::new(name)?)),
        OutputMode::Joystick => Box::new(JoystickHandler::new(UinputJoystick::new(name)?)),
    })
}

#[cfg(not(all(feature = "uinput", target_os = "linux")))]
fn output_handler(mode: OutputMode, _name: &str) -> anyhow::Result<Box<dyn OutputHandler>> {
    use crate::output::joystick::JoystickHandler;
    use crate::output::keypress::KeyPressHandler;
    use crate::output::stubs::JustLog;

    Ok(match mode {
        OutputMode::Keyboard => Box::new(KeyPressHandler::new(JustLog)),
        OutputMode::Joystick => Box::new(JoystickHandler::new(JustLog)),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(filter)).init();

    let settings = match &args.config {
        Some(path) => configuration::load_from_yaml(path)?,
        None => Settings::default(),
    };
    let config = configuration::parse(&args, settings);

    let source = MidirBased::new(&config.client_name)?;
    if args.list {
        for i in 0..source.port_count() {
            println!("{i}: {}", source.port_name(i).unwrap_or_default());
        }
        return Ok(());
    }

    let handler = output_handler(config.mode, &config.client_name)?;
    let store = JsonFileStore::new(&config.mapping_file);
    info!("Using mapping file {:?}", store.path());
    let mut router = Router::new(handler, store, StdoutPrompter, config.policy);

    tokio::select! {
        result = router.start(source, &config.port, StdinLines) => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down."),
    }

    Ok(())
}
