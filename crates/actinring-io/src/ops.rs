//! `.ops` order-parameter sink: one header line, then one row per write
//! interval (`step energy height radius`).

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::util::create_buffered;

/// Writer for the `.ops` sink.
pub struct OpsSink<W: Write> {
    writer: W,
}

impl OpsSink<std::io::BufWriter<std::fs::File>> {
    /// Open `path` for writing and emit the header line.
    pub fn create(path: &Path) -> Result<Self> {
        let writer = create_buffered(path)?;
        Self::new(writer)
    }
}

impl<W: Write> OpsSink<W> {
    /// Wrap an already-open writer and emit the header line.
    pub fn new(mut writer: W) -> Result<Self> {
        writeln!(writer, "step energy height radius").context("write .ops header")?;
        Ok(Self { writer })
    }

    /// Append one row.
    pub fn write_row(&mut self, step: u64, energy: f64, height: i64, radius: f64) -> Result<()> {
        writeln!(self.writer, "{step} {energy} {height} {radius}").context("write .ops row")?;
        Ok(())
    }

    /// Flush buffered output.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("flush .ops sink")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_then_rows() {
        let mut buf = Vec::new();
        {
            let mut sink = OpsSink::new(&mut buf).unwrap();
            sink.write_row(0, 1.5, 10, 2.3).unwrap();
            sink.write_row(1000, 1.4, 11, 2.4).unwrap();
            sink.flush().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "step energy height radius");
        assert_eq!(lines.next().unwrap(), "0 1.5 10 2.3");
        assert_eq!(lines.next().unwrap(), "1000 1.4 11 2.4");
    }
}
