//! Remote control via Unix socket
//!
//! Accepts one command per line:
//!
//! - `brightness N` (0-255, also `b N`)
//! - `rotate N` (quarter turns, also `r N`; bare `rotate` steps once)
//! - `quit`

use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Brightness(u8),
    /// Absolute rotation
    Rotate(u8),
    /// One quarter turn from wherever it is now
    RotateNext,
    Quit,
}

/// Controller that listens for commands on a Unix socket
pub struct Controller {
    receiver: Receiver<Command>,
    path: PathBuf,
    _listener_thread: thread::JoinHandle<()>,
}

impl Controller {
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        // A stale socket from an earlier run blocks bind
        let _ = std::fs::remove_file(&path);

        let listener = UnixListener::bind(&path)
            .with_context(|| format!("binding control socket {}", path.display()))?;
        listener
            .set_nonblocking(true)
            .context("setting control socket non-blocking")?;

        let (sender, receiver) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("control".into())
            .spawn(move || listener_loop(listener, sender))
            .context("spawning control thread")?;

        Ok(Self {
            receiver,
            path,
            _listener_thread: handle,
        })
    }

    /// Pending commands, oldest first (non-blocking)
    pub fn poll(&self) -> Vec<Command> {
        self.receiver.try_iter().collect()
    }

    pub fn socket_path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn listener_loop(listener: UnixListener, sender: Sender<Command>) {
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                let sender = sender.clone();
                thread::spawn(move || handle_client(stream, sender));
            },
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(50));
            },
            Err(e) => {
                warn!("control socket closed: {}", e);
                break;
            },
        }
    }
}

fn handle_client(stream: UnixStream, sender: Sender<Command>) {
    // Accepted sockets inherit non-blocking mode on some platforms
    let _ = stream.set_nonblocking(false);
    let reader = BufReader::new(stream);
    for line in reader.lines().map_while(std::result::Result::ok) {
        match parse_command(&line) {
            Some(cmd) => {
                if sender.send(cmd).is_err() {
                    break;
                }
            },
            None => debug!("ignoring control line {:?}", line),
        }
    }
}

pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim().to_lowercase();
    let mut words = line.split_whitespace();
    let verb = words.next()?;
    let arg = words.next();
    if words.next().is_some() {
        return None;
    }

    match (verb, arg) {
        ("q" | "quit" | "exit", None) => Some(Command::Quit),
        ("b" | "brightness", Some(n)) => n.parse().ok().map(Command::Brightness),
        ("r" | "rotate", None) => Some(Command::RotateNext),
        ("r" | "rotate", Some(n)) => n.parse::<u8>().ok().filter(|&r| r < 4).map(Command::Rotate),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("quit"), Some(Command::Quit));
        assert_eq!(parse_command("  Brightness 128 "), Some(Command::Brightness(128)));
        assert_eq!(parse_command("b 0"), Some(Command::Brightness(0)));
        assert_eq!(parse_command("rotate 3"), Some(Command::Rotate(3)));
        assert_eq!(parse_command("rotate"), Some(Command::RotateNext));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for line in ["", "brightness", "brightness 256", "rotate 4", "quit now", "dance"] {
            assert_eq!(parse_command(line), None, "{:?}", line);
        }
    }

    #[test]
    fn test_socket_round_trip() {
        let path = std::env::temp_dir().join(format!("skyframe-test-{}.sock", std::process::id()));
        let controller = Controller::bind(&path).unwrap();

        let mut client = UnixStream::connect(&path).unwrap();
        writeln!(client, "brightness 40").unwrap();
        writeln!(client, "nonsense").unwrap();
        writeln!(client, "quit").unwrap();
        drop(client);

        let mut received = Vec::new();
        for _ in 0..100 {
            received.extend(controller.poll());
            if received.len() >= 2 {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(received, vec![Command::Brightness(40), Command::Quit]);

        drop(controller);
        assert!(!path.exists());
    }
}
