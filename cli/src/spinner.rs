//! Progress indicator shown while a request is in flight.

use std::io::{Write, stdout};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, execute};

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_INTERVAL: Duration = Duration::from_millis(80);

struct Running {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Animated spinner on a background thread.
///
/// `start` and `stop` are idempotent. `stop` returns only after the thread
/// has exited and cleared its line.
pub struct Spinner {
    message: String,
    running: Mutex<Option<Running>>,
}

impl Spinner {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            running: Mutex::new(None),
        }
    }

    pub fn start(&self) {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.is_some() {
            return;
        }

        let (stop, stop_rx) = mpsc::channel();
        let message = self.message.clone();
        let handle = thread::spawn(move || {
            let mut out = stdout();
            for frame in FRAMES.iter().cycle() {
                let _ = write!(out, "\r{} {}", (*frame).cyan(), message.as_str().dim());
                let _ = out.flush();
                match stop_rx.recv_timeout(FRAME_INTERVAL) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            let _ = execute!(out, Clear(ClearType::CurrentLine), cursor::MoveToColumn(0));
        });
        *running = Some(Running { stop, handle });
    }

    pub fn stop(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(Running { stop, handle }) = running {
            let _ = stop.send(());
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::Spinner;

    #[test]
    fn start_and_stop_are_idempotent() {
        let spinner = Spinner::new("Thinking...");
        assert!(!spinner.is_running());

        spinner.stop();
        assert!(!spinner.is_running());

        spinner.start();
        spinner.start();
        assert!(spinner.is_running());

        spinner.stop();
        assert!(!spinner.is_running());
        spinner.stop();

        spinner.start();
        assert!(spinner.is_running());
        spinner.stop();
        assert!(!spinner.is_running());
    }
}
