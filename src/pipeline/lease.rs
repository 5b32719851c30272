//! Scope guards for the two resources a cycle holds.
//!
//! Both leases give their resource back on drop, so every exit path of a
//! cycle (including early returns and panics unwinding through it) returns
//! the frame to its source and the decoder memory to the allocator.

use std::ops::{Deref, DerefMut};

use crate::engine::DecoderEngine;
use crate::models::Frame;
use crate::source::FrameSource;

/// A frame on loan from its source
pub struct FrameLease<'s, S: FrameSource + ?Sized> {
    source: &'s mut S,
    frame: Option<Frame>,
}

impl<'s, S: FrameSource + ?Sized> FrameLease<'s, S> {
    /// Take ownership of `frame` until the lease drops
    pub fn new(source: &'s mut S, frame: Frame) -> Self {
        Self {
            source,
            frame: Some(frame),
        }
    }
}

impl<S: FrameSource + ?Sized> Deref for FrameLease<'_, S> {
    type Target = Frame;

    fn deref(&self) -> &Frame {
        // only `drop` empties the slot
        match &self.frame {
            Some(frame) => frame,
            None => unreachable!("frame lease used after release"),
        }
    }
}

impl<S: FrameSource + ?Sized> Drop for FrameLease<'_, S> {
    fn drop(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.source.release(frame);
        }
    }
}

/// Exclusive use of a decoder engine for one frame.
///
/// Created before the engine is resized: `release` runs on drop even when
/// provisioning failed half-way.
pub struct DecoderLease<'e, E: DecoderEngine + ?Sized> {
    engine: &'e mut E,
}

impl<'e, E: DecoderEngine + ?Sized> DecoderLease<'e, E> {
    /// Borrow `engine` for the rest of the cycle
    pub fn new(engine: &'e mut E) -> Self {
        Self { engine }
    }
}

impl<E: DecoderEngine + ?Sized> Deref for DecoderLease<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        self.engine
    }
}

impl<E: DecoderEngine + ?Sized> DerefMut for DecoderLease<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        self.engine
    }
}

impl<E: DecoderEngine + ?Sized> Drop for DecoderLease<'_, E> {
    fn drop(&mut self) {
        self.engine.release();
    }
}
