//! On-disk line format shared by the writer and the scanner.
//!
//! `<timestamp> [<SEVERITY>] ProducerID:<id> Message:<text>\n`

use std::fmt::Write as _;

use crate::error::MalformedLine;

/// Typical serialized line length; used to pre-size the line buffer
const LINE_CAPACITY_HINT: usize = 100;

/// One log record before serialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine<'a> {
    pub timestamp: &'a str,
    pub severity: &'a str,
    pub producer_id: u32,
    pub message: &'a str,
}

impl LogLine<'_> {
    /// Serialize into `buf`, replacing its contents
    pub fn write_into(&self, buf: &mut String) {
        buf.clear();
        buf.reserve(LINE_CAPACITY_HINT);
        buf.push_str(self.timestamp);
        buf.push_str(" [");
        buf.push_str(self.severity);
        buf.push_str("] ProducerID:");
        // Writing to a String cannot fail
        let _ = write!(buf, "{}", self.producer_id);
        buf.push_str(" Message:");
        buf.push_str(self.message);
        buf.push('\n');
    }

    pub fn serialize(&self) -> String {
        let mut buf = String::new();
        self.write_into(&mut buf);
        buf
    }
}

/// Extract the severity token: the bytes strictly between the first `[` and
/// the first `]` after it.
pub fn parse_severity(line: &[u8]) -> Result<&[u8], MalformedLine> {
    let open = line
        .iter()
        .position(|&b| b == b'[')
        .ok_or(MalformedLine::MissingOpen)?;
    let rest = &line[open + 1..];
    let close = rest
        .iter()
        .position(|&b| b == b']')
        .ok_or(MalformedLine::MissingClose)?;
    if close == 0 {
        return Err(MalformedLine::EmptyTag);
    }
    Ok(&rest[..close])
}

/// Check a catalog token can be written without breaking the line format
pub fn validate_severity(token: &str) -> Result<(), String> {
    if token.is_empty() {
        return Err("severity must not be empty".to_string());
    }
    if token.contains(['[', ']', '\n']) {
        return Err(format!(
            "severity '{}' must not contain '[', ']' or newlines",
            token.escape_default()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_layout() {
        let line = LogLine {
            timestamp: "2024-01-01 00:00:00",
            severity: "WARN",
            producer_id: 42,
            message: "disk almost full",
        };
        assert_eq!(
            line.serialize(),
            "2024-01-01 00:00:00 [WARN] ProducerID:42 Message:disk almost full\n"
        );
    }

    #[test]
    fn test_write_into_reuses_buffer() {
        let mut buf = String::from("leftover");
        LogLine {
            timestamp: "t",
            severity: "INFO",
            producer_id: 0,
            message: "m",
        }
        .write_into(&mut buf);
        assert_eq!(buf, "t [INFO] ProducerID:0 Message:m\n");
    }

    #[test]
    fn test_parse_error_severity() {
        let line = "2024-01-01 00:00:00 [ERROR] ProducerID:7 Message:x\n";
        assert_eq!(parse_severity(line.as_bytes()), Ok(&b"ERROR"[..]));
    }

    #[test]
    fn test_parse_takes_first_tag() {
        assert_eq!(parse_severity(b"t [INFO] Message:[x]"), Ok(&b"INFO"[..]));
    }

    #[test]
    fn test_parse_malformed_lines() {
        assert_eq!(
            parse_severity(b"no tag here\n"),
            Err(MalformedLine::MissingOpen)
        );
        assert_eq!(
            parse_severity(b"t [INFO without close\n"),
            Err(MalformedLine::MissingClose)
        );
        // A ']' before the '[' does not close it
        assert_eq!(
            parse_severity(b"t ] [INFO\n"),
            Err(MalformedLine::MissingClose)
        );
        assert_eq!(parse_severity(b"t [] x\n"), Err(MalformedLine::EmptyTag));
        assert_eq!(parse_severity(b""), Err(MalformedLine::MissingOpen));
    }

    #[test]
    fn test_roundtrip_through_parser() {
        let line = LogLine {
            timestamp: "2024-01-01 00:00:00",
            severity: "DEBUG",
            producer_id: 99_999,
            message: "hello",
        }
        .serialize();
        assert_eq!(parse_severity(line.as_bytes()), Ok(&b"DEBUG"[..]));
    }

    #[test]
    fn test_validate_severity() {
        assert!(validate_severity("INFO").is_ok());
        assert!(validate_severity("").is_err());
        assert!(validate_severity("IN]FO").is_err());
        assert!(validate_severity("A\nB").is_err());
    }
}
