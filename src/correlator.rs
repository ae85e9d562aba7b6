//! Pairs a command with the next frame the device sends back.
//!
//! All responses arrive on one notification characteristic, so a connection
//! can only have one command outstanding. Whatever happens first out of frame
//! completion, a failed frame, deadline expiry and disconnect resolves the
//! waiting caller; the others find the slot empty and do nothing.

use crate::assembler::Frame;
use crate::error::{BmsError, Result};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, trace};

struct PendingRequest {
    id: u64,
    command: Vec<u8>,
    deadline: Instant,
    waker: oneshot::Sender<Result<Frame>>,
}

/// The single outstanding-request slot of a connection.
#[derive(Default)]
pub struct ResponseCorrelator {
    pending: Option<PendingRequest>,
    next_id: u64,
}

impl ResponseCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the slot for `command`. Fails with `RequestInFlight` while another
    /// request is outstanding, leaving that request untouched.
    pub fn issue(&mut self, command: &[u8], timeout: Duration) -> Result<ResponseHandle> {
        if let Some(pending) = &self.pending {
            if !pending.waker.is_closed() {
                return Err(BmsError::RequestInFlight);
            }
            // the waiting caller went away without clearing the slot
            debug!(id = pending.id, "reclaiming abandoned request");
            self.pending = None;
        }

        self.next_id += 1;
        let deadline = Instant::now() + timeout;
        let (waker, receiver) = oneshot::channel();
        self.pending =
            Some(PendingRequest { id: self.next_id, command: command.to_vec(), deadline, waker });
        Ok(ResponseHandle { id: self.next_id, deadline, timeout, receiver })
    }

    /// Hand a completed frame to the waiting caller. Returns `false` when no
    /// one is waiting; the frame is dropped.
    pub fn complete(&mut self, frame: Frame) -> bool {
        match self.pending.take() {
            Some(pending) => {
                trace!(
                    id = pending.id,
                    command = %hex::encode(&pending.command),
                    "response received"
                );
                pending.waker.send(Ok(frame)).is_ok()
            }
            None => {
                debug!(frame = %hex::encode(frame.bytes()), "dropping unsolicited frame");
                false
            }
        }
    }

    /// Resolve the waiting caller with `err`, for a response that was lost
    /// on the way in. Returns `false` when no one is waiting.
    pub fn fail(&mut self, err: BmsError) -> bool {
        match self.pending.take() {
            Some(pending) => {
                debug!(id = pending.id, %err, "request failed");
                pending.waker.send(Err(err)).is_ok()
            }
            None => false,
        }
    }

    /// Clear the slot if it still belongs to request `id`.
    pub fn expire(&mut self, id: u64) -> bool {
        match &self.pending {
            Some(pending) if pending.id == id => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Resolve the outstanding request, if any, with `Disconnected`.
    pub fn disconnect(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn pending_command(&self) -> Option<&[u8]> {
        self.pending.as_ref().map(|p| p.command.as_slice())
    }
}

/// The caller's side of an issued request.
#[derive(Debug)]
pub struct ResponseHandle {
    id: u64,
    deadline: Instant,
    timeout: Duration,
    receiver: oneshot::Receiver<Result<Frame>>,
}

impl ResponseHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Suspend until the response frame arrives or fails, the deadline passes
    /// or the connection drops.
    pub async fn wait(self, correlator: &Mutex<ResponseCorrelator>) -> Result<Frame> {
        let ResponseHandle { id, deadline, timeout, mut receiver } = self;
        match tokio::time::timeout_at(deadline, &mut receiver).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(BmsError::Disconnected),
            Err(_) => {
                let expired =
                    correlator.lock().unwrap_or_else(PoisonError::into_inner).expire(id);
                if expired {
                    debug!(id, ?timeout, "request timed out");
                    return Err(BmsError::Timeout { duration: timeout });
                }
                // lost the race against completion or disconnect
                receiver.try_recv().unwrap_or(Err(BmsError::Disconnected))
            }
        }
    }
}
