//! `.counts`/`.freqs`/`.biases` umbrella-sampling sinks: a shared height
//! header, then one per-bin row per iteration.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::util::create_buffered;

/// Writer for one `.counts`/`.freqs`/`.biases` sink.
pub struct UsSink<W: Write> {
    writer: W,
}

impl UsSink<std::io::BufWriter<std::fs::File>> {
    /// Open `path` for writing and emit the height header.
    pub fn create(path: &Path, min_height: i64, max_height: i64) -> Result<Self> {
        let writer = create_buffered(path)?;
        Self::new(writer, min_height, max_height)
    }
}

impl<W: Write> UsSink<W> {
    /// Wrap an already-open writer and emit the height header: the integer
    /// heights `min_height..=max_height`, space-separated.
    pub fn new(mut writer: W, min_height: i64, max_height: i64) -> Result<Self> {
        let heights: Vec<String> = (min_height..=max_height).map(|h| h.to_string()).collect();
        writeln!(writer, "{}", heights.join(" ")).context("write US sink header")?;
        Ok(Self { writer })
    }

    /// Append one row of `u64` counts.
    pub fn write_counts_row(&mut self, counts: &[u64]) -> Result<()> {
        self.write_row(counts)
    }

    /// Append one row of `f64` values (freqs/probs/biases).
    pub fn write_f64_row(&mut self, values: &[f64]) -> Result<()> {
        self.write_row(values)
    }

    fn write_row(&mut self, values: &[impl std::fmt::Display]) -> Result<()> {
        for v in values {
            write!(self.writer, "{v} ").context("write US sink value")?;
        }
        writeln!(self.writer).context("write US sink row terminator")?;
        Ok(())
    }

    /// Flush buffered output.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("flush US sink")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_rows_roundtrip() {
        let mut buf = Vec::new();
        {
            let mut sink = UsSink::new(&mut buf, 3, 6).unwrap();
            sink.write_counts_row(&[10, 20, 30, 40]).unwrap();
            sink.write_f64_row(&[0.1, 0.2, 0.3, 0.4]).unwrap();
            sink.flush().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "3 4 5 6");
        assert_eq!(lines.next().unwrap(), "10 20 30 40 ");
        assert_eq!(lines.next().unwrap(), "0.1 0.2 0.3 0.4 ");
    }
}
