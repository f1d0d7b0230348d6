//! Event sources feeding the timing engine, and the shared stop flag

use super::{EventKind, RawEvent};
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Error type for event source operations
#[derive(Debug, Error)]
pub enum SourceError {
    /// No usable keyboard device found
    #[error("No keyboard devices found")]
    NoDevice,
    /// Permission denied accessing a device
    #[error("Permission denied accessing {0}")]
    PermissionDenied(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Malformed line in a replay log
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Something that yields raw input events one at a time.
pub trait EventSource {
    /// Block until the next event arrives.
    ///
    /// Returns `Ok(None)` once the source is exhausted, or as soon as it
    /// notices `stop` was raised while waiting.
    fn next_event(&mut self, stop: &StopFlag) -> Result<Option<RawEvent>, SourceError>;
}

/// Cancellation signal shared between the collection loop and a signal handler
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raise this flag when the process receives Ctrl-C
    pub fn install_ctrlc_handler(&self) -> Result<(), ctrlc::Error> {
        let flag = self.clone();
        ctrlc::set_handler(move || {
            log::info!("Interrupt received, stopping collection");
            flag.raise();
        })
    }
}

/// Replays a fixed sequence of events
pub struct ReplaySource<I> {
    events: I,
}

impl<I> ReplaySource<I>
where
    I: Iterator<Item = RawEvent>,
{
    pub fn new<T>(events: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            events: events.into_iter(),
        }
    }
}

impl ReplaySource<std::vec::IntoIter<RawEvent>> {
    /// Parse a text event log.
    ///
    /// One event per line: `[kind] <timestamp_us> <code> <value>`, where the
    /// optional kind is `key` or `other:<type>`. Blank lines and lines
    /// starting with `#` are ignored.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, SourceError> {
        let mut events = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            events.push(parse_line(trimmed, idx + 1)?);
        }
        Ok(Self::new(events))
    }
}

impl<I> EventSource for ReplaySource<I>
where
    I: Iterator<Item = RawEvent>,
{
    fn next_event(&mut self, stop: &StopFlag) -> Result<Option<RawEvent>, SourceError> {
        if stop.is_raised() {
            return Ok(None);
        }
        Ok(self.events.next())
    }
}

fn parse_line(line: &str, line_no: usize) -> Result<RawEvent, SourceError> {
    let parse_err = |message: String| SourceError::Parse {
        line: line_no,
        message,
    };

    let fields: Vec<&str> = line.split_whitespace().collect();
    let (kind, rest) = match fields.as_slice() {
        [kind, rest @ ..] if rest.len() == 3 => (parse_kind(kind).map_err(parse_err)?, rest),
        rest if rest.len() == 3 => (EventKind::Key, rest),
        _ => {
            return Err(parse_err(format!(
                "expected `[kind] timestamp code value`, got {} fields",
                fields.len()
            )))
        }
    };

    let timestamp_us = rest[0]
        .parse::<u64>()
        .map_err(|e| parse_err(format!("bad timestamp {:?}: {}", rest[0], e)))?;
    let code = rest[1]
        .parse::<u16>()
        .map_err(|e| parse_err(format!("bad code {:?}: {}", rest[1], e)))?;
    let value = rest[2]
        .parse::<i32>()
        .map_err(|e| parse_err(format!("bad value {:?}: {}", rest[2], e)))?;

    Ok(RawEvent::new(kind, code, value, timestamp_us))
}

fn parse_kind(field: &str) -> Result<EventKind, String> {
    if field == "key" {
        return Ok(EventKind::Key);
    }
    match field.strip_prefix("other:") {
        Some(ty) => ty
            .parse::<u16>()
            .map(EventKind::from_type)
            .map_err(|e| format!("bad event type {:?}: {}", ty, e)),
        None => Err(format!("unknown event kind {:?}", field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn drain(source: &mut impl EventSource) -> Vec<RawEvent> {
        let stop = StopFlag::new();
        let mut out = Vec::new();
        while let Some(event) = source.next_event(&stop).unwrap() {
            out.push(event);
        }
        out
    }

    #[test]
    fn replay_yields_events_in_order() {
        let mut source = ReplaySource::new(vec![
            RawEvent::key(30, 1, 100),
            RawEvent::key(30, 0, 150),
        ]);
        let events = drain(&mut source);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].timestamp_us, 100);
        assert_eq!(events[1].timestamp_us, 150);
    }

    #[test]
    fn replay_stops_when_flag_raised() {
        let mut source = ReplaySource::new(vec![RawEvent::key(30, 1, 100)]);
        let stop = StopFlag::new();
        stop.raise();
        assert!(source.next_event(&stop).unwrap().is_none());
    }

    #[test]
    fn stop_flag_clones_share_state() {
        let stop = StopFlag::new();
        let other = stop.clone();
        assert!(!stop.is_raised());
        other.raise();
        assert!(stop.is_raised());
    }

    #[test]
    fn parses_text_log() {
        let log = "\
# recorded session
100 30 1
key 150 30 0

other:0 150 0 0
";
        let mut source = ReplaySource::from_reader(Cursor::new(log)).unwrap();
        let events = drain(&mut source);
        assert_eq!(
            events,
            vec![
                RawEvent::key(30, 1, 100),
                RawEvent::key(30, 0, 150),
                RawEvent::new(EventKind::Other(0), 0, 0, 150),
            ]
        );
    }

    #[test]
    fn reports_line_of_malformed_entry() {
        let log = "100 30 1\n150 thirty 0\n";
        match ReplaySource::from_reader(Cursor::new(log)) {
            Err(SourceError::Parse { line, .. }) => assert_eq!(line, 2),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("malformed log parsed"),
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = parse_line("mouse 100 1 1", 4).unwrap_err();
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(parse_line("100 30", 1).is_err());
        assert!(parse_line("key 100 30 1 9", 1).is_err());
    }
}
