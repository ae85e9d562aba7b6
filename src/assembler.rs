//! Reassembly of notification fragments into frames.
//!
//! BLE notifications are short, so a BMS response usually arrives split over
//! several of them. On noisy links fragments get lost or duplicated; a frame
//! that is interrupted by the start of a new one is silently dropped.

use crate::decoder::{Decoder, FrameBoundary};
use crate::error::{BmsError, Result};
use tracing::{debug, trace};

/// One application message, built up fragment by fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
    complete: bool,
}

impl Frame {
    /// A finished frame holding `bytes`.
    pub fn complete(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into(), complete: true }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    Idle,
    Accumulating,
}

/// Per-connection frame buffer.
#[derive(Debug)]
pub struct FrameAssembler {
    frame: Frame,
    state: AssemblerState,
    max_len: usize,
}

impl FrameAssembler {
    pub fn new(max_len: usize) -> Self {
        Self { frame: Frame::default(), state: AssemblerState::Idle, max_len }
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Bytes collected for the frame in progress.
    pub fn in_progress(&self) -> &[u8] {
        self.frame.bytes()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Drop any partial frame and go back to idle.
    pub fn reset(&mut self) {
        self.frame = Frame::default();
        self.state = AssemblerState::Idle;
    }

    /// Classify `fragment` with the decoder and add it to the buffer.
    pub fn feed(&mut self, decoder: &dyn Decoder, fragment: &[u8]) -> Result<Option<Frame>> {
        let boundary = decoder.frame_boundary(fragment, self.in_progress());
        self.push(boundary, fragment)
    }

    /// Add an already classified fragment. Returns the frame once it is
    /// complete.
    pub fn push(&mut self, boundary: FrameBoundary, fragment: &[u8]) -> Result<Option<Frame>> {
        trace!(?boundary, state = ?self.state, len = fragment.len(), "fragment");
        match (boundary, self.state) {
            (FrameBoundary::Start, _) | (FrameBoundary::Complete, _) => {
                if self.state == AssemblerState::Accumulating {
                    debug!(
                        discarded = %hex::encode(self.in_progress()),
                        "new frame started before the previous one ended"
                    );
                }
                self.reset();
                self.append(fragment)?;
                if boundary == FrameBoundary::Complete {
                    return Ok(Some(self.finish()));
                }
                self.state = AssemblerState::Accumulating;
                Ok(None)
            }
            (FrameBoundary::Continuation, AssemblerState::Accumulating) => {
                self.append(fragment)?;
                Ok(None)
            }
            (FrameBoundary::End, AssemblerState::Accumulating) => {
                self.append(fragment)?;
                Ok(Some(self.finish()))
            }
            (FrameBoundary::Continuation, AssemblerState::Idle)
            | (FrameBoundary::End, AssemblerState::Idle) => {
                debug!(fragment = %hex::encode(fragment), "fragment outside of a frame, ignored");
                Ok(None)
            }
        }
    }

    fn append(&mut self, fragment: &[u8]) -> Result<()> {
        if self.frame.bytes.len() + fragment.len() > self.max_len {
            self.reset();
            return Err(BmsError::FrameTooLarge { limit: self.max_len });
        }
        self.frame.bytes.extend_from_slice(fragment);
        Ok(())
    }

    fn finish(&mut self) -> Frame {
        let mut frame = std::mem::take(&mut self.frame);
        frame.complete = true;
        self.state = AssemblerState::Idle;
        frame
    }
}
