//! evdev-backed event source for Linux
//!
//! Reads raw key events straight from a `/dev/input/event*` node, so the
//! timestamps are the kernel's rather than the time we happened to poll.

use super::{EventKind, EventSource, RawEvent, SourceError, StopFlag};
use evdev::{Device, Key};
use nix::libc;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A keyboard must report at least this many keys to be auto-selected
const MIN_KEYBOARD_KEYS: usize = 50;

fn looks_like_keyboard(device: &Device) -> bool {
    device.supported_keys().is_some_and(|keys| {
        keys.contains(Key::KEY_A)
            && keys.contains(Key::KEY_SPACE)
            && keys.iter().count() > MIN_KEYBOARD_KEYS
    })
}

nix::ioctl_write_ptr!(eviocsclockid, b'E', 0xa0, libc::c_int);

/// Number of `event*` nodes under `dir`, readable or not
fn count_event_nodes(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.file_name().to_string_lossy().starts_with("event"))
                .count()
        })
        .unwrap_or(0)
}

/// Why no keyboard was picked: nodes we could not open point at
/// permissions, otherwise there simply is no keyboard
fn no_keyboard_error(nodes: usize, opened: usize) -> SourceError {
    if nodes > opened {
        SourceError::PermissionDenied(
            "/dev/input (no readable keyboard; try sudo or add user to 'input' group)".to_string(),
        )
    } else {
        SourceError::NoDevice
    }
}

/// Find the first accessible keyboard under `/dev/input`
pub fn find_keyboard() -> Result<(PathBuf, Device), SourceError> {
    let dir = Path::new("/dev/input");
    if !dir.exists() {
        return Err(SourceError::NoDevice);
    }

    let opened: Vec<(PathBuf, Device)> = evdev::enumerate().collect();
    let opened_count = opened.len();
    let mut candidates: Vec<(PathBuf, Device)> = opened
        .into_iter()
        .filter(|(_, device)| looks_like_keyboard(device))
        .collect();
    // enumerate() order follows readdir; sort so event0 wins over event10
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| no_keyboard_error(count_event_nodes(dir), opened_count))
}

/// Ask the kernel to stamp events with CLOCK_MONOTONIC instead of wall time
fn use_monotonic_clock(fd: libc::c_int) -> io::Result<()> {
    let clock: libc::c_int = libc::CLOCK_MONOTONIC;
    unsafe { eviocsclockid(fd, &clock) }
        .map(|_| ())
        .map_err(io::Error::from)
}

/// Convert a kernel event timestamp to microseconds.
///
/// With the monotonic clock selected the kernel time is relative to boot,
/// which evdev still hands out as an offset from `UNIX_EPOCH`.
fn timestamp_us(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Keyboard event source reading one evdev device
pub struct EvdevSource {
    device: Device,
    path: PathBuf,
    pending: VecDeque<RawEvent>,
    poll_interval: Duration,
}

impl EvdevSource {
    /// Open a specific device node
    pub fn open(path: &Path, poll_interval: Duration) -> Result<Self, SourceError> {
        let device = Device::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => {
                SourceError::PermissionDenied(path.display().to_string())
            }
            _ => SourceError::Io(e),
        })?;
        Self::from_device(device, path.to_path_buf(), poll_interval)
    }

    /// Open the first keyboard found under `/dev/input`
    pub fn autodetect(poll_interval: Duration) -> Result<Self, SourceError> {
        let (path, device) = find_keyboard()?;
        Self::from_device(device, path, poll_interval)
    }

    fn from_device(
        device: Device,
        path: PathBuf,
        poll_interval: Duration,
    ) -> Result<Self, SourceError> {
        // Reads must not block so the stop flag is seen between polls
        let fd = device.as_raw_fd();
        unsafe {
            let flags = libc::fcntl(fd, libc::F_GETFL);
            if flags < 0 || libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) < 0 {
                return Err(SourceError::Io(io::Error::last_os_error()));
            }
        }
        if let Err(e) = use_monotonic_clock(fd) {
            log::warn!(
                "{}: monotonic timestamps unavailable, using wall clock: {}",
                path.display(),
                e
            );
        }

        log::debug!(
            "Using {} ({})",
            path.display(),
            device.name().unwrap_or("unnamed device")
        );

        Ok(Self {
            device,
            path,
            pending: VecDeque::new(),
            poll_interval,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn device_name(&self) -> Option<&str> {
        self.device.name()
    }

    fn fill(&mut self) -> io::Result<()> {
        for event in self.device.fetch_events()? {
            self.pending.push_back(RawEvent::new(
                EventKind::from_type(event.event_type().0),
                event.code(),
                event.value(),
                timestamp_us(event.timestamp()),
            ));
        }
        Ok(())
    }
}

impl EventSource for EvdevSource {
    fn next_event(&mut self, stop: &StopFlag) -> Result<Option<RawEvent>, SourceError> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }
            if stop.is_raised() {
                return Ok(None);
            }
            match self.fill() {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(self.poll_interval)
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(SourceError::Io(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_keyboard() {
        // Depends on the machine; must not panic either way
        match find_keyboard() {
            Ok((path, _)) => println!("Found {}", path.display()),
            Err(e) => println!("Expected error in test environment: {}", e),
        }
    }

    #[test]
    fn timestamps_convert_to_micros() {
        let t = UNIX_EPOCH + Duration::from_micros(1_234_567);
        assert_eq!(timestamp_us(t), 1_234_567);
    }

    #[test]
    fn boot_relative_timestamps_convert_to_micros() {
        let t = UNIX_EPOCH + Duration::new(86_400, 250_000_000);
        assert_eq!(timestamp_us(t), 86_400_250_000);
    }

    #[test]
    fn unreadable_nodes_mean_permission_problem() {
        assert!(matches!(
            no_keyboard_error(4, 1),
            SourceError::PermissionDenied(_)
        ));
    }

    #[test]
    fn readable_nodes_without_keyboard_mean_no_device() {
        assert!(matches!(no_keyboard_error(3, 3), SourceError::NoDevice));
        assert!(matches!(no_keyboard_error(0, 0), SourceError::NoDevice));
    }

    #[test]
    fn missing_directory_has_no_event_nodes() {
        assert_eq!(count_event_nodes(Path::new("/nonexistent/input")), 0);
    }

    #[test]
    fn open_missing_device_fails() {
        let result = EvdevSource::open(
            Path::new("/nonexistent/event99"),
            Duration::from_millis(5),
        );
        assert!(result.is_err());
    }
}
