//! # Serial Console Client
//!
//! Reads command lines from the serial console (stdin of the executable) in a background thread,
//! so that the control loop never blocks waiting for the operator.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    io::BufRead,
    sync::mpsc::{channel, Receiver, TryRecvError},
    thread::{self, JoinHandle},
};

use log::{debug, warn};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct SerialClient {
    line_rx: Receiver<String>,

    /// False once the reader has reached the end of its input.
    connected: bool,

    _bg_jh: JoinHandle<()>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SerialClient {
    /// Start reading lines from stdin.
    pub fn from_stdin() -> Self {
        Self::new(std::io::BufReader::new(std::io::stdin()))
    }

    /// Start reading lines from the given reader in a background thread.
    pub fn new<B: BufRead + Send + 'static>(reader: B) -> Self {
        let (tx, line_rx) = channel();

        let bg_jh = thread::spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(l) => l,
                    Err(e) => {
                        warn!("Serial console read failed: {}", e);
                        break
                    }
                };

                // Blank lines are keep-alives from some terminals
                if line.trim().is_empty() {
                    continue
                }

                if tx.send(line).is_err() {
                    break
                }
            }

            debug!("Serial console reader stopped");
        });

        Self {
            line_rx,
            connected: true,
            _bg_jh: bg_jh,
        }
    }

    /// All lines received since the last call, oldest first.
    pub fn try_recv_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();

        loop {
            match self.line_rx.try_recv() {
                Ok(l) => lines.push(l),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.connected {
                        warn!("Serial console closed");
                        self.connected = false;
                    }
                    break
                }
            }
        }

        lines
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}
