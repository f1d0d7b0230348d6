//! Scoped suppression of terminal echo while keys are being recorded

use std::io;

#[cfg(target_os = "linux")]
use nix::sys::termios::{self, LocalFlags, SetArg, Termios};
#[cfg(target_os = "linux")]
use std::io::IsTerminal;

#[cfg(target_os = "linux")]
type SavedMode = Termios;
#[cfg(not(target_os = "linux"))]
type SavedMode = ();

/// Turns off local echo on stdin until dropped.
///
/// Typed keys would otherwise pile up on screen during collection. The
/// saved terminal attributes are restored on every exit path, including
/// Ctrl-C, because the collection loop returns normally on interrupt.
pub struct EchoGuard {
    saved: Option<SavedMode>,
}

impl EchoGuard {
    /// Disable echo if stdin is a terminal; otherwise do nothing
    #[cfg(target_os = "linux")]
    pub fn suppress() -> io::Result<Self> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return Ok(Self { saved: None });
        }

        let saved = termios::tcgetattr(&stdin).map_err(io::Error::from)?;
        let mut quiet = saved.clone();
        quiet.local_flags.remove(LocalFlags::ECHO);
        termios::tcsetattr(stdin, SetArg::TCSANOW, &quiet).map_err(io::Error::from)?;
        log::debug!("Terminal echo disabled");

        Ok(Self { saved: Some(saved) })
    }

    #[cfg(not(target_os = "linux"))]
    pub fn suppress() -> io::Result<Self> {
        Ok(Self { saved: None })
    }

    /// Whether echo was actually changed
    pub fn is_active(&self) -> bool {
        self.saved.is_some()
    }
}

#[cfg(target_os = "linux")]
fn restore(saved: SavedMode) {
    if let Err(e) = termios::tcsetattr(io::stdin(), SetArg::TCSANOW, &saved) {
        log::warn!("Failed to restore terminal echo: {}", e);
    }
}

#[cfg(not(target_os = "linux"))]
fn restore(_saved: SavedMode) {}

impl Drop for EchoGuard {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            restore(saved);
        }
    }
}
