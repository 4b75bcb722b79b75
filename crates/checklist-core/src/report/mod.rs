//! Record emission.

use std::io::{self, Write};

use crate::model::CheckRecord;

/// Where the executor hands finished records.
pub trait RecordSink {
    fn emit(&mut self, record: &CheckRecord) -> io::Result<()>;
}

/// Newline-delimited JSON: one compact object per line.
///
/// Flushes after every record so output from consecutive checks interleaves
/// in run order even when stdout is block-buffered.
pub struct JsonLines<W: Write> {
    out: W,
}

impl<W: Write> JsonLines<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for JsonLines<W> {
    fn emit(&mut self, record: &CheckRecord) -> io::Result<()> {
        let line = serde_json::to_string(record)?;
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_object_per_line() {
        let header: Vec<String> = ["section", "pass"].iter().map(|s| s.to_string()).collect();
        let mut sink = JsonLines::new(Vec::new());
        for pass in ["true", "false"] {
            let cells = vec!["Web Applications".to_string(), pass.to_string()];
            let record = CheckRecord::from_row(&header, &cells, 1).unwrap();
            sink.emit(&record).unwrap();
        }
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "{\"section\":\"Web Applications\",\"pass\":\"true\"}\n\
             {\"section\":\"Web Applications\",\"pass\":\"false\"}\n"
        );
    }
}
