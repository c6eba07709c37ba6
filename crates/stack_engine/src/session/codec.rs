//! Session file format
//!
//! A session is a sequence of vessel blocks:
//!
//! ```text
//! VESSEL_BEGIN
//! FILE = ShuttleA
//! POS = 1.5 -2 3.25
//! ROT = 0 90 0
//! VESSEL_END
//! ```
//!
//! `POS` is the absolute position and `ROT` the Euler angles in degrees
//! (X, then Y, then Z). Inside a block the keys may come in any order and
//! unknown keys are skipped. Lines outside blocks are ignored.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::assets::line_reader::{parse_floats, LineReader};
use crate::assets::PartError;
use crate::foundation::math::Vec3;

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// A vessel block is incomplete or has a bad field
    #[error("malformed session record at line {line}: {reason}")]
    MalformedSessionRecord {
        /// 1-based line number
        line: usize,
        /// What was wrong
        reason: String,
    },

    /// A record names a part that cannot be loaded
    #[error("unknown part '{class_name}': {source}")]
    UnknownPart {
        /// Class name from the `FILE` entry
        class_name: String,
        /// Why the part could not be loaded
        #[source]
        source: PartError,
    },

    /// Session file could not be read or written
    #[error("session file {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// One vessel as stored in a session file
#[derive(Debug, Clone, PartialEq)]
pub struct VesselRecord {
    /// Part class name
    pub class_name: String,
    /// Absolute position
    pub position: Vec3,
    /// Euler angles in degrees
    pub rotation: Vec3,
}

impl fmt::Display for VesselRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (p, r) = (self.position, self.rotation);
        writeln!(f, "VESSEL_BEGIN")?;
        writeln!(f, "FILE = {}", self.class_name)?;
        writeln!(f, "POS = {} {} {}", p.x, p.y, p.z)?;
        writeln!(f, "ROT = {} {} {}", r.x, r.y, r.z)?;
        writeln!(f, "VESSEL_END")
    }
}

/// Read the next vessel block. Returns `Ok(None)` when the input ends
/// outside a block.
pub fn read_record(reader: &mut LineReader<'_>) -> Result<Option<VesselRecord>, SessionError> {
    loop {
        let Some(tokens) = reader.next_tokens() else {
            return Ok(None);
        };
        if tokens.first() == Some(&"VESSEL_BEGIN") {
            break;
        }
    }

    let begin_line = reader.line_number();
    let mut class_name = None;
    let mut position = Vec3::zeros();
    let mut rotation = Vec3::zeros();

    loop {
        let tokens = reader.next_tokens().ok_or_else(|| malformed(
            reader.line_number(),
            format!("unexpected end of input in vessel block opened at line {begin_line}"),
        ))?;
        let Some((key, fields)) = tokens.split_first() else {
            continue;
        };

        match *key {
            "VESSEL_END" => break,
            "FILE" => {
                let name = fields.join(" ");
                if name.is_empty() {
                    return Err(malformed(reader.line_number(), "FILE without a part name"));
                }
                class_name = Some(name);
            }
            "POS" => position = read_vector(reader, key, fields)?,
            "ROT" => rotation = read_vector(reader, key, fields)?,
            _ => {}
        }
    }

    let class_name = class_name.ok_or_else(|| malformed(
        reader.line_number(),
        format!("vessel block opened at line {begin_line} has no FILE entry"),
    ))?;
    Ok(Some(VesselRecord {
        class_name,
        position,
        rotation,
    }))
}

/// Parse every record of a session. Fails on the first malformed block.
pub fn read_session(text: &str) -> Result<Vec<VesselRecord>, SessionError> {
    let mut reader = LineReader::new(text);
    let mut records = Vec::new();
    while let Some(record) = read_record(&mut reader)? {
        records.push(record);
    }
    Ok(records)
}

/// Render records as session text
pub fn write_session(records: &[VesselRecord]) -> String {
    records.iter().map(ToString::to_string).collect()
}

fn read_vector(reader: &LineReader<'_>, key: &str, fields: &[&str]) -> Result<Vec3, SessionError> {
    let [x, y, z] = parse_floats::<3>(fields).ok_or_else(|| malformed(
        reader.line_number(),
        format!("{key} needs three numbers, got '{}'", fields.join(" ")),
    ))?;
    Ok(Vec3::new(x, y, z))
}

fn malformed(line: usize, reason: impl Into<String>) -> SessionError {
    SessionError::MalformedSessionRecord {
        line,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> VesselRecord {
        VesselRecord {
            class_name: "ShuttleA".to_string(),
            position: Vec3::new(1.5, -2.0, 3.25),
            rotation: Vec3::new(0.0, 90.0, 0.0),
        }
    }

    #[test]
    fn test_writer_emits_exact_block() {
        assert_eq!(
            record().to_string(),
            "VESSEL_BEGIN\nFILE = ShuttleA\nPOS = 1.5 -2 3.25\nROT = 0 90 0\nVESSEL_END\n"
        );
    }

    #[test]
    fn test_written_session_reads_back() {
        let second = VesselRecord {
            class_name: "Tank".to_string(),
            position: Vec3::new(-0.1, 1e-3, 250.0),
            rotation: Vec3::new(12.5, -33.0, 179.9),
        };
        let records = vec![record(), second];
        assert_eq!(read_session(&write_session(&records)).unwrap(), records);
    }

    #[test]
    fn test_reader_accepts_any_key_order_and_comments() {
        let text = "\
; saved by hand
VESSEL_BEGIN
ROT 0 0 45   ; spaces instead of '='
COLOR = red
POS = 1 2 3
FILE = Tank
VESSEL_END
";
        let records = read_session(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].class_name, "Tank");
        assert_eq!(records[0].position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(records[0].rotation, Vec3::new(0.0, 0.0, 45.0));
    }

    #[test]
    fn test_malformed_records() {
        let unterminated = "VESSEL_BEGIN\nFILE = Tank\nPOS = 1 2 3\n";
        assert!(matches!(
            read_session(unterminated),
            Err(SessionError::MalformedSessionRecord { line: 3, .. })
        ));

        let short = "VESSEL_BEGIN\nFILE = Tank\nPOS = 1 2\nVESSEL_END\n";
        assert!(matches!(
            read_session(short),
            Err(SessionError::MalformedSessionRecord { line: 3, .. })
        ));

        let not_numeric = "VESSEL_BEGIN\nFILE = Tank\nROT = 1 x 3\nVESSEL_END\n";
        assert!(matches!(
            read_session(not_numeric),
            Err(SessionError::MalformedSessionRecord { line: 3, .. })
        ));

        let no_file = "VESSEL_BEGIN\nPOS = 1 2 3\nVESSEL_END\n";
        assert!(matches!(
            read_session(no_file),
            Err(SessionError::MalformedSessionRecord { line: 3, .. })
        ));
    }

    #[test]
    fn test_empty_session() {
        assert!(read_session("").unwrap().is_empty());
        assert!(read_session("; nothing here\n\n").unwrap().is_empty());
    }
}
