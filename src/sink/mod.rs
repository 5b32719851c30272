//! Result reporting.
//!
//! The controller turns every outcome of a cycle, good or bad, into a
//! [`ReportEvent`] and hands it to a [`ResultSink`].

mod text;
mod trace;

pub use text::TextSink;
pub use trace::TracingSink;

use std::time::Instant;

use crossbeam_channel::Sender;

use crate::decoder::DecodeError;
use crate::error::{CaptureError, FrameError, ProvisionError};
use crate::models::{DecodedSymbol, RegionGeometry};

/// One reportable outcome, tagged with the cycle that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEvent {
    /// Sequence number of the cycle, starting at 1
    pub cycle: u64,
    /// Capture time of the frame the event is about; `None` when no frame arrived
    pub captured_at: Option<Instant>,
    /// What happened
    pub kind: ReportKind,
}

/// Per-frame outcomes; none of them stops the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportKind {
    /// The source produced no frame
    CaptureFailed(CaptureError),
    /// Frame exceeds the configured ceiling and was discarded undecoded
    FrameTooLarge {
        /// Frame width
        width: usize,
        /// Frame height
        height: usize,
        /// Ceiling width
        max_width: usize,
        /// Ceiling height
        max_height: usize,
    },
    /// Frame violated its format contract
    FrameRejected(FrameError),
    /// The decoder could not be sized for the frame
    DecoderProvisionFailed(ProvisionError),
    /// Detection ran and located nothing
    NoSymbolFound,
    /// A region decoded successfully
    Decoded {
        /// Detection-order index
        index: usize,
        /// Where the symbol sits in the frame
        geometry: RegionGeometry,
        /// Decoded content
        symbol: DecodedSymbol,
    },
    /// A region was located but could not be decoded
    DecodeFailed {
        /// Detection-order index
        index: usize,
        /// Where the region sits in the frame
        geometry: RegionGeometry,
        /// Cause
        error: DecodeError,
    },
}

impl ReportKind {
    /// Whether this is a failure of any kind
    pub fn is_failure(&self) -> bool {
        !matches!(self, ReportKind::Decoded { .. } | ReportKind::NoSymbolFound)
    }

    /// The decoded symbol, if this is a success
    pub fn symbol(&self) -> Option<&DecodedSymbol> {
        match self {
            ReportKind::Decoded { symbol, .. } => Some(symbol),
            _ => None,
        }
    }
}

/// Receives report events from the controller.
pub trait ResultSink {
    /// Consume one event
    fn report(&mut self, event: ReportEvent);
}

impl<K: ResultSink + ?Sized> ResultSink for &mut K {
    fn report(&mut self, event: ReportEvent) {
        (**self).report(event)
    }
}

impl<K: ResultSink + ?Sized> ResultSink for Box<K> {
    fn report(&mut self, event: ReportEvent) {
        (**self).report(event)
    }
}

/// Forward events to another thread; events are dropped once the receiver is gone.
impl ResultSink for Sender<ReportEvent> {
    fn report(&mut self, event: ReportEvent) {
        if self.send(event).is_err() {
            tracing::trace!("report receiver dropped");
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    events: Vec<ReportEvent>,
}

impl CollectingSink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything reported so far
    pub fn events(&self) -> &[ReportEvent] {
        &self.events
    }

    /// Drain the collected events
    pub fn take(&mut self) -> Vec<ReportEvent> {
        std::mem::take(&mut self.events)
    }

    /// Successfully decoded symbols in report order
    pub fn symbols(&self) -> impl Iterator<Item = &DecodedSymbol> + '_ {
        self.events.iter().filter_map(|e| e.kind.symbol())
    }
}

impl ResultSink for CollectingSink {
    fn report(&mut self, event: ReportEvent) {
        self.events.push(event);
    }
}

/// Adapts a closure into a sink
pub struct FnSink<F>(pub F);

impl<F: FnMut(ReportEvent)> ResultSink for FnSink<F> {
    fn report(&mut self, event: ReportEvent) {
        (self.0)(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: ReportKind) -> ReportEvent {
        ReportEvent {
            cycle: 1,
            captured_at: None,
            kind,
        }
    }

    #[test]
    fn test_collecting_sink() {
        let mut sink = CollectingSink::new();
        sink.report(event(ReportKind::NoSymbolFound));
        sink.report(event(ReportKind::CaptureFailed(CaptureError::Disconnected)));
        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.symbols().count(), 0);
        assert_eq!(sink.take().len(), 2);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_fn_sink() {
        let mut cycles = Vec::new();
        {
            let mut sink = FnSink(|e: ReportEvent| cycles.push(e.cycle));
            sink.report(event(ReportKind::NoSymbolFound));
        }
        assert_eq!(cycles, vec![1]);
    }

    #[test]
    fn test_channel_sink() {
        let (mut tx, rx) = crossbeam_channel::unbounded();
        tx.report(event(ReportKind::NoSymbolFound));
        assert_eq!(rx.try_recv().unwrap().kind, ReportKind::NoSymbolFound);
        drop(rx);
        tx.report(event(ReportKind::NoSymbolFound));
    }

    #[test]
    fn test_failure_classification() {
        assert!(!ReportKind::NoSymbolFound.is_failure());
        assert!(ReportKind::CaptureFailed(CaptureError::Exhausted).is_failure());
    }
}
