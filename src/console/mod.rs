use async_channel::Sender;
use log::{debug, warn};
use std::io::{BufRead, ErrorKind, Write};
use std::thread;

use crate::router::Input;

/// Where console lines come from. Every line is trimmed before it is sent.
pub trait LineSource {
    fn subscribe(self, lines: Sender<Input>);
}

/// Reads stdin on its own thread until EOF or until the router goes away.
pub struct StdinLines;

impl LineSource for StdinLines {
    fn subscribe(self, lines: Sender<Input>) {
        thread::spawn(move || {
            forward_lines(std::io::stdin().lock(), &lines);
            debug!("Console input closed");
        });
    }
}

/// Sends every line of `reader` until EOF, a read failure or a closed
/// router. Lines that aren't UTF-8 are reported and skipped.
pub fn forward_lines<R: BufRead>(mut reader: R, lines: &Sender<Input>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return,
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Reading console input failed: {e}");
                return;
            }
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim().to_owned(),
            Err(e) => {
                warn!("Ignoring console input that is not UTF-8: {e}");
                continue;
            }
        };
        if lines.try_send(Input::Line(line)).is_err() {
            return;
        }
    }
}

/// The asking half of the console: shows a question, the answer comes back
/// as the next line.
pub trait Prompter {
    fn prompt(&mut self, text: &str);
}

pub struct StdoutPrompter;

impl Prompter for StdoutPrompter {
    fn prompt(&mut self, text: &str) {
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "{text}");
        let _ = stdout.flush();
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn received(input: &'static [u8]) -> Vec<String> {
        let (sender, receiver) = async_channel::unbounded();
        forward_lines(Cursor::new(input), &sender);
        drop(sender);

        let mut lines = Vec::new();
        while let Ok(input) = receiver.try_recv() {
            match input {
                Input::Line(line) => lines.push(line),
                other => panic!("unexpected {other:?}"),
            }
        }
        lines
    }

    #[test]
    fn lines_are_trimmed() {
        assert_eq!(received(b"  setup \r\na\n\nlast"), vec!["setup", "a", "", "last"]);
    }

    #[test]
    fn undecodable_line_does_not_stop_the_console() {
        assert_eq!(received(b"a\n\xff\xfe\n setup\n"), vec!["a", "setup"]);
    }

    #[test]
    fn stops_once_the_router_is_gone() {
        let (sender, receiver) = async_channel::unbounded();
        drop(receiver);

        // Returns instead of spinning on a closed channel.
        forward_lines(Cursor::new(&b"setup\nsetup\n"[..]), &sender);
    }
}
