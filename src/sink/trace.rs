use tracing::{info, warn};

use super::{ReportEvent, ReportKind, ResultSink};

/// Emits every event as a structured `tracing` record under the `camqr::report` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ResultSink for TracingSink {
    fn report(&mut self, event: ReportEvent) {
        let cycle = event.cycle;
        match event.kind {
            ReportKind::CaptureFailed(err) => {
                warn!(target: "camqr::report", cycle, error = %err, "capture failed")
            }
            ReportKind::FrameTooLarge {
                width,
                height,
                max_width,
                max_height,
            } => warn!(
                target: "camqr::report",
                cycle, width, height, max_width, max_height, "frame too large"
            ),
            ReportKind::FrameRejected(err) => {
                warn!(target: "camqr::report", cycle, error = %err, "frame rejected")
            }
            ReportKind::DecoderProvisionFailed(err) => {
                warn!(target: "camqr::report", cycle, error = %err, "decoder provisioning failed")
            }
            ReportKind::NoSymbolFound => info!(target: "camqr::report", cycle, "no symbol found"),
            ReportKind::Decoded {
                index,
                geometry,
                symbol,
            } => info!(
                target: "camqr::report",
                cycle,
                index,
                size = geometry.size,
                version = symbol.version,
                ecc = %symbol.ecc_level,
                mask = symbol.mask.index(),
                data_type = symbol.data_type.map(|d| d.label()).unwrap_or("unknown"),
                eci = ?symbol.eci,
                payload = %symbol.payload_text(),
                "symbol decoded"
            ),
            ReportKind::DecodeFailed {
                index,
                geometry,
                error,
            } => warn!(
                target: "camqr::report",
                cycle, index, size = geometry.size, error = %error, "decode failed"
            ),
        }
    }
}
