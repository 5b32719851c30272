//! The per-frame capture/decode loop.
//!
//! One cycle walks a frame through
//! `acquire → validate → provision → load → detect → decode each → report → cleanup`.
//! Every per-frame failure becomes a [`ReportEvent`] and the loop carries on;
//! the only way out besides [`Shutdown`] is a [`PipelineError`] raised by the
//! provisioning escalation policy.

pub mod lease;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use crate::config::PipelineConfig;
use crate::decoder::DecodeError;
use crate::engine::DecoderEngine;
use crate::error::{FrameError, PipelineError, ProvisionError};
use crate::models::{DecodedSymbol, RegionGeometry};
use crate::sink::{ReportEvent, ReportKind, ResultSink};
use crate::source::FrameSource;
use crate::utils::grayscale;
use lease::{DecoderLease, FrameLease};

/// Cooperative stop flag, honoured between cycles only
#[derive(Debug, Clone, Default)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    /// A flag that has not been raised
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop before its next cycle
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a single cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No frame was captured
    CaptureFailed,
    /// The frame exceeded the size ceiling
    FrameTooLarge,
    /// The frame broke its format contract
    FrameRejected,
    /// The decoder could not be provisioned
    ProvisionFailed,
    /// Detection located nothing
    NoSymbolFound,
    /// At least one region was located and attempted
    Processed {
        /// Regions that decoded
        decoded: usize,
        /// Regions that failed to decode
        failed: usize,
    },
}

/// Running totals over the lifetime of a controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Cycles started
    pub cycles: u64,
    /// Cycles without a frame
    pub capture_failures: u64,
    /// Frames over the size ceiling
    pub oversized_frames: u64,
    /// Frames with a broken format contract
    pub rejected_frames: u64,
    /// Failed decoder provisionings
    pub provision_failures: u64,
    /// Frames with no located region
    pub empty_frames: u64,
    /// Regions decoded
    pub symbols_decoded: u64,
    /// Regions that failed to decode
    pub decode_failures: u64,
}

impl CycleStats {
    fn record(&mut self, outcome: CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::CaptureFailed => self.capture_failures += 1,
            CycleOutcome::FrameTooLarge => self.oversized_frames += 1,
            CycleOutcome::FrameRejected => self.rejected_frames += 1,
            CycleOutcome::ProvisionFailed => self.provision_failures += 1,
            CycleOutcome::NoSymbolFound => self.empty_frames += 1,
            CycleOutcome::Processed { decoded, failed } => {
                self.symbols_decoded += decoded as u64;
                self.decode_failures += failed as u64;
            }
        }
    }
}

/// Drives one source, one engine and one sink through the frame cycle.
///
/// Exactly one frame is in flight at a time: the frame and the engine are
/// leased to the running cycle and given back before the next capture.
///
/// ```
/// use camqr::config::PipelineConfig;
/// use camqr::engine::QrEngine;
/// use camqr::models::Frame;
/// use camqr::pipeline::{CycleOutcome, PipelineController};
/// use camqr::sink::CollectingSink;
/// use camqr::source::frame_channel;
/// use std::time::Duration;
///
/// let (producer, source) = frame_channel(1, Duration::from_millis(10));
/// producer.send(Frame::grayscale(32, 32, vec![255; 32 * 32]).unwrap()).unwrap();
///
/// let config = PipelineConfig { cycle_delay_ms: 0, ..PipelineConfig::default() };
/// let mut controller =
///     PipelineController::new(source, QrEngine::new(), CollectingSink::new(), config);
/// assert_eq!(controller.step().unwrap(), CycleOutcome::NoSymbolFound);
/// assert_eq!(controller.step().unwrap(), CycleOutcome::CaptureFailed);
/// ```
pub struct PipelineController<S, E, K> {
    source: S,
    engine: E,
    sink: K,
    config: PipelineConfig,
    cycle: u64,
    stats: CycleStats,
    consecutive_provision_failures: u32,
    last_provision_error: Option<ProvisionError>,
}

impl<S, E, K> PipelineController<S, E, K>
where
    S: FrameSource,
    E: DecoderEngine + Sync,
    K: ResultSink,
{
    /// Assemble a controller; nothing runs until [`Self::step`] or [`Self::run`]
    pub fn new(source: S, engine: E, sink: K, config: PipelineConfig) -> Self {
        Self {
            source,
            engine,
            sink,
            config,
            cycle: 0,
            stats: CycleStats::default(),
            consecutive_provision_failures: 0,
            last_provision_error: None,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Totals so far
    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// Take the collaborators back
    pub fn into_parts(self) -> (S, E, K) {
        (self.source, self.engine, self.sink)
    }

    /// Run one complete cycle, pacing delays included.
    ///
    /// # Errors
    ///
    /// [`PipelineError::ProvisionExhausted`] once provisioning has failed in
    /// as many consecutive cycles as `escalate_after_provision_failures`.
    pub fn step(&mut self) -> Result<CycleOutcome, PipelineError> {
        if self.cycle == 0 && !self.config.startup_delay().is_zero() {
            debug!(delay = ?self.config.startup_delay(), "waiting for sensor warm-up");
            thread::sleep(self.config.startup_delay());
        }
        if !self.config.cycle_delay().is_zero() {
            thread::sleep(self.config.cycle_delay());
        }

        self.cycle += 1;
        let span = info_span!("cycle", seq = self.cycle);
        let _entered = span.enter();

        let outcome = self.run_cycle();
        self.stats.record(outcome);
        debug!(?outcome, "cycle finished");

        if let (Some(limit), Some(last)) = (
            self.config.escalate_after_provision_failures,
            &self.last_provision_error,
        ) {
            if self.consecutive_provision_failures >= limit {
                warn!(
                    consecutive = self.consecutive_provision_failures,
                    "giving up after repeated provisioning failures"
                );
                return Err(PipelineError::ProvisionExhausted {
                    consecutive: self.consecutive_provision_failures,
                    last: last.clone(),
                });
            }
        }
        Ok(outcome)
    }

    /// Cycle until `shutdown` is requested or escalation stops the loop
    pub fn run(&mut self, shutdown: &Shutdown) -> Result<CycleStats, PipelineError> {
        info!("pipeline started");
        while !shutdown.is_requested() {
            self.step()?;
        }
        info!(cycles = self.stats.cycles, "pipeline stopped");
        Ok(self.stats)
    }

    /// Like [`Self::run`] but stops after at most `cycles` cycles
    pub fn run_cycles(
        &mut self,
        cycles: u64,
        shutdown: &Shutdown,
    ) -> Result<CycleStats, PipelineError> {
        for _ in 0..cycles {
            if shutdown.is_requested() {
                break;
            }
            self.step()?;
        }
        Ok(self.stats)
    }

    fn run_cycle(&mut self) -> CycleOutcome {
        let cycle = self.cycle;
        let Self {
            source,
            engine,
            sink,
            config,
            consecutive_provision_failures,
            last_provision_error,
            ..
        } = self;
        let mut report = |captured_at: Option<Instant>, kind: ReportKind| {
            sink.report(ReportEvent {
                cycle,
                captured_at,
                kind,
            })
        };

        let frame = match source.acquire() {
            Ok(frame) => frame,
            Err(err) => {
                warn!(error = %err, "capture failed");
                report(None, ReportKind::CaptureFailed(err));
                return CycleOutcome::CaptureFailed;
            }
        };
        let frame = FrameLease::new(source, frame);
        let (width, height) = (frame.width(), frame.height());
        let stamp = Some(frame.captured_at());
        debug!(
            width,
            height,
            format = %frame.pixel_format(),
            age = ?frame.captured_at().elapsed(),
            "frame acquired"
        );

        if !config.max_frame_size.admits(width, height) {
            let (max_width, max_height) = config.max_frame_size.dimensions();
            warn!(width, height, ceiling = %config.max_frame_size, "frame too large");
            report(stamp, ReportKind::FrameTooLarge {
                width,
                height,
                max_width,
                max_height,
            });
            return CycleOutcome::FrameTooLarge;
        }
        if frame.pixel_format() != config.pixel_format {
            let err = FrameError::UnexpectedFormat {
                expected: config.pixel_format,
                actual: frame.pixel_format(),
            };
            warn!(error = %err, "frame rejected");
            report(stamp, ReportKind::FrameRejected(err));
            return CycleOutcome::FrameRejected;
        }

        let mut decoder = DecoderLease::new(engine);
        if let Err(err) = decoder.resize(width, height) {
            *consecutive_provision_failures += 1;
            *last_provision_error = Some(err.clone());
            warn!(error = %err, "decoder provisioning failed");
            report(stamp, ReportKind::DecoderProvisionFailed(err));
            return CycleOutcome::ProvisionFailed;
        }
        *consecutive_provision_failures = 0;

        if let Err(err) = grayscale::convert_into(&frame, decoder.load()) {
            warn!(error = %err, "frame rejected");
            report(stamp, ReportKind::FrameRejected(err));
            return CycleOutcome::FrameRejected;
        }

        let count = decoder.detect();
        debug!(candidates = count, "detection finished");
        if count == 0 {
            report(stamp, ReportKind::NoSymbolFound);
            return CycleOutcome::NoSymbolFound;
        }

        let (mut decoded, mut failed) = (0, 0);
        for (index, geometry, result) in decode_all(&*decoder, count, config.parallel_decode) {
            match result {
                Ok(symbol) => {
                    decoded += 1;
                    info!(
                        index,
                        version = symbol.version,
                        payload = %symbol.payload_text(),
                        latency = ?frame.captured_at().elapsed(),
                        "symbol decoded"
                    );
                    report(stamp, ReportKind::Decoded {
                        index,
                        geometry,
                        symbol,
                    });
                }
                Err(error) => {
                    failed += 1;
                    warn!(index, %error, "decode failed");
                    report(stamp, ReportKind::DecodeFailed {
                        index,
                        geometry,
                        error,
                    });
                }
            }
        }
        CycleOutcome::Processed { decoded, failed }
    }
}

type Attempt = (usize, RegionGeometry, Result<DecodedSymbol, DecodeError>);

/// One decode attempt per candidate, returned in detection order
fn decode_all<E: DecoderEngine + Sync + ?Sized>(
    engine: &E,
    count: usize,
    parallel: bool,
) -> Vec<Attempt> {
    let attempt = |index: usize| {
        let region = engine.extract(index);
        (index, region.geometry(), engine.decode(&region))
    };
    if parallel {
        (0..count).into_par_iter().map(attempt).collect()
    } else {
        (0..count).map(attempt).collect()
    }
}
