//! `.vtf` trajectory sink: a topology block on open, one frame block per
//! write interval.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use actinring_core::System;

use crate::util::create_buffered;

/// Writer for the `.vtf` sink.
pub struct VtfSink<W: Write> {
    writer: W,
}

impl VtfSink<std::io::BufWriter<std::fs::File>> {
    /// Open `path` for writing and emit the topology block for `system`.
    pub fn create(path: &Path, system: &System) -> Result<Self> {
        let writer = create_buffered(path)?;
        Self::new(writer, system)
    }

    /// Open `path` for writing and emit the topology block from a
    /// `(index, lf)` pair per filament, without borrowing a [`System`].
    ///
    /// Filament topology (count and site length) is fixed for a run, so a
    /// caller that needs to open several per-iteration `.vtf` sinks (e.g.
    /// umbrella sampling) can snapshot it once up front instead of holding
    /// a live reference to `System` across the whole run.
    pub fn create_from_topology(path: &Path, topology: &[(u32, usize)]) -> Result<Self> {
        let writer = create_buffered(path)?;
        Self::new_from_topology(writer, topology)
    }
}

impl<W: Write> VtfSink<W> {
    /// Wrap an already-open writer and emit the topology block: one
    /// `a <start>:<end> c <index> r 2.5` line per filament (atoms numbered
    /// contiguously across filaments, in filament order), then a blank
    /// line.
    pub fn new(writer: W, system: &System) -> Result<Self> {
        let topology: Vec<(u32, usize)> =
            system.filaments.iter().map(|f| (f.index(), f.lf())).collect();
        Self::new_from_topology(writer, &topology)
    }

    /// As [`VtfSink::new`], but from a `(index, lf)` topology slice rather
    /// than a live [`System`].
    pub fn new_from_topology(mut writer: W, topology: &[(u32, usize)]) -> Result<Self> {
        let mut next_atom: usize = 0;
        for &(index, lf) in topology {
            let start = next_atom;
            let end = start + lf - 1;
            writeln!(writer, "a {start}:{end} c {index} r 2.5")
                .context("write .vtf topology line")?;
            next_atom = end + 1;
        }
        writeln!(writer).context("write .vtf topology blank line")?;
        Ok(Self { writer })
    }

    /// Append one frame: `t`, then one `<x*10> <y> 0` line per site in
    /// filament order (observable view), then a blank line.
    pub fn write_frame(&mut self, system: &System) -> Result<()> {
        writeln!(self.writer, "t").context("write .vtf frame marker")?;
        for f in &system.filaments {
            for p in f.coors() {
                writeln!(self.writer, "{} {} 0", p.x * 10, p.y).context("write .vtf site line")?;
            }
        }
        writeln!(self.writer).context("write .vtf frame blank line")?;
        Ok(())
    }

    /// Flush buffered output.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("flush .vtf sink")
    }
}
