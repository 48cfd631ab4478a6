//! Streaming JSON array sink: one record in, one array element out.
//!
//! Records are written as soon as the parser closes them, so memory use stays
//! flat no matter how many purchase orders the report holds. The framing is
//! written by hand; each element is pretty-printed by `serde_json` with the
//! configured indent:
//!
//! ```text
//! [
//! {
//!     "po_number": "24-00017",
//!     ...
//! },
//! {
//!     ...
//! }
//! ]
//! ```
//!
//! An array with no elements is written as `[]`.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::{self, Write};

/// Incremental writer for a single top-level JSON array.
pub struct JsonArraySink<W: Write> {
    writer: W,
    indent: Vec<u8>,
    written: usize,
    state: SinkState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    NotStarted,
    Open,
    Closed,
}

impl<W: Write> JsonArraySink<W> {
    /// Wrap `writer`; `indent` is the number of spaces per nesting level.
    pub fn new(writer: W, indent: usize) -> Self {
        Self {
            writer,
            indent: vec![b' '; indent],
            written: 0,
            state: SinkState::NotStarted,
        }
    }

    /// Write the opening bracket. Called implicitly by the first element.
    pub fn begin_array(&mut self) -> io::Result<()> {
        if self.state == SinkState::NotStarted {
            self.writer.write_all(b"[")?;
            self.state = SinkState::Open;
        }
        Ok(())
    }

    /// Serialise one record as the next array element.
    pub fn write_element<T: Serialize>(&mut self, record: &T) -> Result<(), serde_json::Error> {
        if self.state == SinkState::Closed {
            return Err(serde_json::Error::io(io::Error::other(
                "write_element called after end_array",
            )));
        }
        self.begin_array().map_err(serde_json::Error::io)?;

        let separator: &[u8] = if self.written == 0 { b"\n" } else { b",\n" };
        self.writer.write_all(separator).map_err(serde_json::Error::io)?;

        let formatter = PrettyFormatter::with_indent(&self.indent);
        let mut ser = Serializer::with_formatter(&mut self.writer, formatter);
        record.serialize(&mut ser)?;

        self.written += 1;
        Ok(())
    }

    /// Write the closing bracket and flush. Further calls are no-ops.
    pub fn end_array(&mut self) -> io::Result<()> {
        match self.state {
            SinkState::Closed => return Ok(()),
            SinkState::NotStarted => self.begin_array()?,
            SinkState::Open => {}
        }
        if self.written > 0 {
            self.writer.write_all(b"\n")?;
        }
        self.writer.write_all(b"]\n")?;
        self.writer.flush()?;
        self.state = SinkState::Closed;
        Ok(())
    }

    /// Elements written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{LineItem, PurchaseOrder};

    fn render<F: FnOnce(&mut JsonArraySink<Vec<u8>>)>(indent: usize, f: F) -> String {
        let mut sink = JsonArraySink::new(Vec::new(), indent);
        f(&mut sink);
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn empty_array() {
        let out = render(4, |s| {
            s.begin_array().unwrap();
            s.end_array().unwrap();
        });
        assert_eq!(out, "[]\n");
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, serde_json::json!([]));
    }

    #[test]
    fn end_without_begin_still_frames() {
        assert_eq!(render(4, |s| s.end_array().unwrap()), "[]\n");
    }

    #[test]
    fn elements_are_pretty_printed_and_separated() {
        let out = render(4, |s| {
            s.write_element(&serde_json::json!({"a": 1})).unwrap();
            s.write_element(&serde_json::json!({"a": 2})).unwrap();
            s.end_array().unwrap();
        });
        assert_eq!(out, "[\n{\n    \"a\": 1\n},\n{\n    \"a\": 2\n}\n]\n");
    }

    #[test]
    fn custom_indent() {
        let out = render(2, |s| {
            s.write_element(&serde_json::json!({"a": [1]})).unwrap();
            s.end_array().unwrap();
        });
        assert_eq!(out, "[\n{\n  \"a\": [\n    1\n  ]\n}\n]\n");
    }

    #[test]
    fn purchase_orders_round_trip_as_array() {
        let mut po = PurchaseOrder::new("24-00017", "07/01/2024", 10.0);
        po.items.push(LineItem::new(1, "Parts"));
        let out = render(4, |s| {
            s.write_element(&po).unwrap();
            s.end_array().unwrap();
        });
        let parsed: Vec<PurchaseOrder> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, vec![po]);
    }

    #[test]
    fn write_after_end_is_an_error() {
        let mut sink = JsonArraySink::new(Vec::new(), 4);
        sink.end_array().unwrap();
        assert!(sink.write_element(&1).is_err());
        assert_eq!(sink.written(), 0);
        sink.end_array().unwrap();
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "[]\n");
    }
}
