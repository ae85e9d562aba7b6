//! One polled BMS: frame assembly, request correlation, decoding and
//! normalization over a [`Transport`].

use crate::assembler::{AssemblerState, Frame, FrameAssembler};
use crate::config::PollConfig;
use crate::correlator::ResponseCorrelator;
use crate::decoder::Decoder;
use crate::error::{BmsError, Result};
use crate::normalizer::normalize;
use crate::sample::{NormalizedSample, RawSample};
use crate::transport::Transport;
use bluest::Uuid;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, trace, warn};

struct Shared {
    decoder: Arc<dyn Decoder>,
    assembler: Mutex<FrameAssembler>,
    correlator: Mutex<ResponseCorrelator>,
}

impl Shared {
    fn assembler(&self) -> MutexGuard<'_, FrameAssembler> {
        self.assembler.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn correlator(&self) -> MutexGuard<'_, ResponseCorrelator> {
        self.correlator.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Where the transport delivers notifications for one connection.
#[derive(Clone)]
pub struct NotificationSink {
    shared: Arc<Shared>,
}

impl NotificationSink {
    /// Feed one notification into the frame assembler. A completed frame wakes
    /// the pending request, or is dropped when there is none. A frame the
    /// assembler had to discard fails the pending request.
    pub fn deliver(&self, characteristic: Uuid, data: &[u8]) {
        let decoder = &self.shared.decoder;
        if !decoder.accepts_characteristic(characteristic) {
            trace!(%characteristic, "notification ignored");
            return;
        }
        trace!(decoder = decoder.name(), rx = %hex::encode(data), "notification");

        let completed = self.shared.assembler().feed(decoder.as_ref(), data);
        match completed {
            Ok(Some(frame)) => {
                self.shared.correlator().complete(frame);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(decoder = decoder.name(), %err, "frame discarded");
                self.shared.correlator().fail(err);
            }
        }
    }

    /// The link is gone: fail the pending request and drop any partial frame.
    pub fn disconnected(&self) {
        if self.shared.correlator().disconnect() {
            debug!(decoder = self.shared.decoder.name(), "pending request cancelled by disconnect");
        }
        self.shared.assembler().reset();
    }
}

pub struct BmsConnection<T> {
    shared: Arc<Shared>,
    transport: T,
    timeout: Duration,
}

impl<T: Transport> BmsConnection<T> {
    /// Set up the frame engine for `decoder` and subscribe to the transport's
    /// notifications.
    pub async fn open(
        decoder: Arc<dyn Decoder>,
        transport: T,
        config: &PollConfig,
    ) -> Result<Self> {
        config.validate()?;
        let timeout = decoder.descriptor().request_timeout.unwrap_or(config.request_timeout());
        let shared = Arc::new(Shared {
            decoder,
            assembler: Mutex::new(FrameAssembler::new(config.max_frame_len)),
            correlator: Mutex::new(ResponseCorrelator::new()),
        });
        let connection = Self { shared, transport, timeout };
        connection.transport.subscribe(connection.notification_sink()).await?;
        Ok(connection)
    }

    pub fn decoder(&self) -> &Arc<dyn Decoder> {
        &self.shared.decoder
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn request_timeout(&self) -> Duration {
        self.timeout
    }

    pub fn notification_sink(&self) -> NotificationSink {
        NotificationSink { shared: Arc::clone(&self.shared) }
    }

    pub fn is_request_pending(&self) -> bool {
        self.shared.correlator().is_pending()
    }

    pub fn assembler_state(&self) -> AssemblerState {
        self.shared.assembler().state()
    }

    /// Send `command` and wait for the frame that answers it.
    ///
    /// A request that ends without its frame takes any partial frame with it,
    /// so the rest of a late response cannot answer the next request.
    pub async fn exchange(&self, command: &[u8]) -> Result<Frame> {
        let handle = self.shared.correlator().issue(command, self.timeout)?;

        let decoder = &self.shared.decoder;
        trace!(decoder = decoder.name(), tx = %hex::encode(command), "command");
        if let Err(err) = self.transport.write(decoder.tx_characteristic(), command).await {
            self.shared.correlator().expire(handle.id());
            return Err(err);
        }

        let response = handle.wait(&self.shared.correlator).await;
        if response.is_err() {
            self.shared.assembler().reset();
        }
        response
    }

    /// Send `command` and decode the response.
    pub async fn request(&self, command: &[u8]) -> Result<RawSample> {
        let frame = self.exchange(command).await?;
        if !frame.is_complete() {
            return Err(BmsError::malformed("incomplete frame"));
        }
        self.shared.decoder.decode(&frame).inspect_err(|err| {
            debug!(
                decoder = self.shared.decoder.name(),
                frame = %hex::encode(frame.bytes()),
                %err,
                "decode failed"
            )
        })
    }

    /// One command/response exchange, decoded and normalized.
    pub async fn poll(&self, command: &[u8]) -> Result<NormalizedSample> {
        let raw = self.request(command).await?;
        Ok(self.normalize(raw))
    }

    /// Run every command of the decoder's update cycle and combine the
    /// responses into one sample. Any failing command fails the cycle.
    pub async fn update(&self) -> Result<NormalizedSample> {
        let mut raw = RawSample::new();
        for command in self.shared.decoder.poll_commands() {
            raw.merge(self.request(&command).await?);
        }
        Ok(self.normalize(raw))
    }

    /// Fail any pending request with `Disconnected` and close the link.
    pub async fn disconnect(&self) -> Result<()> {
        self.notification_sink().disconnected();
        self.transport.disconnect().await
    }

    fn normalize(&self, raw: RawSample) -> NormalizedSample {
        let descriptor = self.shared.decoder.descriptor();
        normalize(raw, &descriptor.derived_keys, descriptor.polarity)
    }
}
