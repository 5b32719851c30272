//! Shared helpers for the integration tests.

#![allow(dead_code)]

pub mod synthetic_qr;

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use camqr::config::PipelineConfig;
use camqr::decoder::DecodeError;
use camqr::engine::DecoderEngine;
use camqr::error::{CaptureError, ProvisionError};
use camqr::models::{
    BitMatrix, CandidateRegion, DataType, DecodedSymbol, EcLevel, Frame, MaskPattern, Point,
};
use camqr::source::FrameSource;

/// Config with pacing switched off
pub fn fast_config() -> PipelineConfig {
    PipelineConfig {
        cycle_delay_ms: 0,
        startup_delay_ms: 0,
        ..PipelineConfig::default()
    }
}

/// Mid-grey luma frame
pub fn gray_frame(width: usize, height: usize) -> Frame {
    Frame::grayscale(width, height, vec![128; width * height]).unwrap()
}

/// A byte-mode symbol carrying `text`
pub fn symbol(text: &str) -> DecodedSymbol {
    DecodedSymbol {
        version: 1,
        ecc_level: EcLevel::M,
        mask: MaskPattern::Pattern0,
        data_type: Some(DataType::Byte),
        payload: text.as_bytes().to_vec(),
        eci: None,
    }
}

/// Replays a fixed list of capture results, then reports exhaustion
#[derive(Default)]
pub struct ScriptedSource {
    script: VecDeque<Result<Frame, CaptureError>>,
    pub acquired: usize,
    pub released: usize,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = Result<Frame, CaptureError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// `count` identical grey frames
    pub fn frames(count: usize, width: usize, height: usize) -> Self {
        Self::new((0..count).map(|_| Ok(gray_frame(width, height))))
    }

    /// Frames handed out and not yet returned
    pub fn outstanding(&self) -> usize {
        self.acquired - self.released
    }
}

impl FrameSource for ScriptedSource {
    fn acquire(&mut self) -> Result<Frame, CaptureError> {
        let next = self.script.pop_front().unwrap_or(Err(CaptureError::Exhausted));
        if next.is_ok() {
            self.acquired += 1;
        }
        next
    }

    fn release(&mut self, _frame: Frame) {
        self.released += 1;
    }
}

/// What the mock engine does for one candidate
#[derive(Debug, Clone)]
pub struct MockRegion {
    pub outcome: Result<DecodedSymbol, DecodeError>,
    pub delay: Duration,
}

impl MockRegion {
    pub fn ok(text: &str) -> Self {
        Self {
            outcome: Ok(symbol(text)),
            delay: Duration::ZERO,
        }
    }

    pub fn err(error: DecodeError) -> Self {
        Self {
            outcome: Err(error),
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Call counters shared between a [`MockEngine`] and the test body
#[derive(Debug, Default)]
pub struct Calls {
    pub resize: AtomicUsize,
    pub load: AtomicUsize,
    pub detect: AtomicUsize,
    pub extract: AtomicUsize,
    pub decode: AtomicUsize,
    pub release: AtomicUsize,
    /// Highest number of provisionings seen without a matching release
    pub max_outstanding: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Instrumented engine returning a scripted list of regions for every frame
pub struct MockEngine {
    regions: Vec<MockRegion>,
    cells: BitMatrix,
    buffer: Vec<u8>,
    fail_resize: Option<ProvisionError>,
    reallocations: usize,
    pub calls: Arc<Calls>,
}

impl MockEngine {
    pub fn new(regions: Vec<MockRegion>) -> Self {
        Self {
            regions,
            cells: BitMatrix::new(21, 21),
            buffer: Vec::new(),
            fail_resize: None,
            reallocations: 0,
            calls: Arc::new(Calls::default()),
        }
    }

    /// Make every `resize` fail with `error`
    pub fn failing_resize(mut self, error: ProvisionError) -> Self {
        self.fail_resize = Some(error);
        self
    }

    /// Times `resize` had to allocate a new buffer
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }
}

impl DecoderEngine for MockEngine {
    fn resize(&mut self, width: usize, height: usize) -> Result<(), ProvisionError> {
        let calls = &self.calls;
        let resizes = calls.resize.fetch_add(1, Ordering::SeqCst) + 1;
        let outstanding = resizes - Calls::get(&calls.release);
        calls.max_outstanding.fetch_max(outstanding, Ordering::SeqCst);

        if let Some(err) = &self.fail_resize {
            return Err(err.clone());
        }
        if self.buffer.len() != width * height {
            self.buffer = vec![0; width * height];
            self.reallocations += 1;
        }
        Ok(())
    }

    fn load(&mut self) -> &mut [u8] {
        self.calls.load.fetch_add(1, Ordering::SeqCst);
        &mut self.buffer
    }

    fn detect(&mut self) -> usize {
        self.calls.detect.fetch_add(1, Ordering::SeqCst);
        self.regions.len()
    }

    fn extract(&self, index: usize) -> CandidateRegion<'_> {
        assert!(index < self.regions.len(), "candidate {index} out of range");
        self.calls.extract.fetch_add(1, Ordering::SeqCst);
        CandidateRegion {
            index,
            corners: [Point::new(index as f32, 0.0); 4],
            size: 21,
            cells: &self.cells,
        }
    }

    fn decode(&self, region: &CandidateRegion<'_>) -> Result<DecodedSymbol, DecodeError> {
        self.calls.decode.fetch_add(1, Ordering::SeqCst);
        let plan = &self.regions[region.index];
        if !plan.delay.is_zero() {
            thread::sleep(plan.delay);
        }
        plan.outcome.clone()
    }

    fn release(&mut self) {
        self.calls.release.fetch_add(1, Ordering::SeqCst);
    }
}
