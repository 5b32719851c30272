use std::io::{self, Write};

use tracing::warn;

use super::{ReportEvent, ReportKind, ResultSink};
use crate::models::{DataType, DecodedSymbol, RegionGeometry};

/// Human-readable console dump.
///
/// Located regions are printed as cell art followed by the decoded fields or
/// the failure cause; other events become one line each. Write failures are
/// logged and otherwise ignored so a closed terminal never stops the loop.
pub struct TextSink<W: Write> {
    out: W,
    show_cells: bool,
}

impl<W: Write> TextSink<W> {
    /// Dump to `out`, including cell art
    pub fn new(out: W) -> Self {
        Self {
            out,
            show_cells: true,
        }
    }

    /// Toggle the cell bitmap art
    pub fn show_cells(mut self, show: bool) -> Self {
        self.show_cells = show;
        self
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_event(&mut self, event: &ReportEvent) -> io::Result<()> {
        let cycle = event.cycle;
        match &event.kind {
            ReportKind::CaptureFailed(err) => writeln!(self.out, "[{cycle}] capture failed: {err}"),
            ReportKind::FrameTooLarge {
                width,
                height,
                max_width,
                max_height,
            } => writeln!(
                self.out,
                "[{cycle}] frame {width}x{height} exceeds {max_width}x{max_height}, skipped"
            ),
            ReportKind::FrameRejected(err) => writeln!(self.out, "[{cycle}] frame rejected: {err}"),
            ReportKind::DecoderProvisionFailed(err) => {
                writeln!(self.out, "[{cycle}] decoder provisioning failed: {err}")
            }
            ReportKind::NoSymbolFound => writeln!(self.out, "[{cycle}] no symbol found"),
            ReportKind::Decoded {
                index,
                geometry,
                symbol,
            } => {
                writeln!(self.out, "[{cycle}] symbol {index}:")?;
                self.write_cells(geometry)?;
                writeln!(self.out, "  Decoding successful:")?;
                self.write_symbol(symbol)?;
                writeln!(self.out)
            }
            ReportKind::DecodeFailed {
                index,
                geometry,
                error,
            } => {
                writeln!(self.out, "[{cycle}] symbol {index}:")?;
                self.write_cells(geometry)?;
                writeln!(self.out, "  Decoding FAILED: {error}")?;
                writeln!(self.out)
            }
        }
    }

    fn write_cells(&mut self, geometry: &RegionGeometry) -> io::Result<()> {
        write!(self.out, "    {} cells, corners:", geometry.size)?;
        for corner in &geometry.corners {
            let (x, y) = corner.rounded();
            write!(self.out, " ({x},{y})")?;
        }
        writeln!(self.out)?;

        if self.show_cells {
            for y in 0..geometry.size {
                let row: String = (0..geometry.size)
                    .map(|x| if geometry.cell(x, y) { "[]" } else { "  " })
                    .collect();
                writeln!(self.out, "    {row}")?;
            }
        }
        writeln!(self.out)
    }

    fn write_symbol(&mut self, symbol: &DecodedSymbol) -> io::Result<()> {
        let (code, label) = match symbol.data_type {
            Some(dt) => (mode_indicator(dt), dt.label()),
            None => (0, "unknown"),
        };
        writeln!(self.out, "    Version: {}", symbol.version)?;
        writeln!(self.out, "    ECC level: {}", symbol.ecc_level)?;
        writeln!(self.out, "    Mask: {}", symbol.mask.index())?;
        writeln!(self.out, "    Data type: {code} ({label})")?;
        writeln!(self.out, "    Length: {}", symbol.payload.len())?;
        writeln!(self.out, "    Payload: {}", symbol.payload_text())?;
        if let Some(eci) = symbol.eci {
            writeln!(self.out, "    ECI: {eci}")?;
        }
        Ok(())
    }
}

fn mode_indicator(data_type: DataType) -> u8 {
    match data_type {
        DataType::Numeric => 1,
        DataType::Alphanumeric => 2,
        DataType::Byte => 4,
        DataType::Kanji => 8,
    }
}

impl<W: Write> ResultSink for TextSink<W> {
    fn report(&mut self, event: ReportEvent) {
        if let Err(err) = self.write_event(&event).and_then(|_| self.out.flush()) {
            warn!(error = %err, "failed to write report");
        }
    }
}
