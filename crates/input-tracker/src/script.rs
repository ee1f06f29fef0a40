//! Timed pointer scripts for replaying gestures during a recording.
//!
//! A script is JSONL: one `{"t_ms": .., "kind": "down|move|up", "x": .., "y": ..}`
//! object per line, coordinates in container pixels. Blank lines and lines
//! starting with `#` are ignored.

use std::path::Path;

use boardcast_common::error::{BoardcastError, BoardcastResult};
use boardcast_layout::Point;
use serde::{Deserialize, Serialize};

/// Pointer button transition or motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// A pointer event in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    pub fn down(x: f64, y: f64) -> Self {
        Self {
            kind: PointerKind::Down,
            x,
            y,
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            kind: PointerKind::Move,
            x,
            y,
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self {
            kind: PointerKind::Up,
            x,
            y,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A pointer event scheduled at an offset from replay start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedPointerEvent {
    pub t_ms: u64,
    #[serde(flatten)]
    pub event: PointerEvent,
}

/// Pointer events ordered by time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerScript {
    events: Vec<TimedPointerEvent>,
}

impl PointerScript {
    /// Build a script, sorting events by time (stable for equal times).
    pub fn new(mut events: Vec<TimedPointerEvent>) -> Self {
        events.sort_by_key(|e| e.t_ms);
        Self { events }
    }

    /// Parse a JSONL script.
    pub fn parse_jsonl(content: &str) -> BoardcastResult<Self> {
        let mut events = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let event: TimedPointerEvent = serde_json::from_str(trimmed).map_err(|e| {
                BoardcastError::config(format!("Pointer script line {}: {e}", index + 1))
            })?;
            events.push(event);
        }
        Ok(Self::new(events))
    }

    /// Load a JSONL script from disk.
    pub fn load(path: impl AsRef<Path>) -> BoardcastResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BoardcastError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Self::parse_jsonl(&std::fs::read_to_string(path)?)
    }

    pub fn events(&self) -> &[TimedPointerEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Offset of the last event in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.events.last().map(|e| e.t_ms).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_sorts_lines() {
        let script = PointerScript::parse_jsonl(
            r#"
# drag the bubble to the right
{"t_ms": 40, "kind": "move", "x": 300.0, "y": 250.0}
{"t_ms": 0, "kind": "down", "x": 150.0, "y": 250.0}
{"t_ms": 80, "kind": "up", "x": 300.0, "y": 250.0}
"#,
        )
        .unwrap();

        let kinds: Vec<_> = script.events().iter().map(|e| e.event.kind).collect();
        assert_eq!(
            kinds,
            vec![PointerKind::Down, PointerKind::Move, PointerKind::Up]
        );
        assert_eq!(script.duration_ms(), 80);
    }

    #[test]
    fn reports_offending_line() {
        let err = PointerScript::parse_jsonl("{\"t_ms\": 0, \"kind\": \"down\", \"x\": 1, \"y\": 2}\nnope")
            .unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = PointerScript::load("/nonexistent/gestures.jsonl").unwrap_err();
        assert!(matches!(err, BoardcastError::FileNotFound { .. }));
    }
}
