//! Selecting the decoder responsible for a discovered device.

use crate::advertisement::AdvertisementRecord;
use crate::decoder::Decoder;
use crate::error::{BmsError, Result};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// All decoders known to the process. Built once at startup.
#[derive(Clone, Default)]
pub struct DecoderRegistry {
    decoders: Vec<Arc<dyn Decoder>>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, decoder: Arc<dyn Decoder>) -> Result<()> {
        if self.get(decoder.name()).is_some() {
            return Err(BmsError::DuplicateDecoder { name: decoder.name() });
        }
        self.decoders.push(decoder);
        Ok(())
    }

    pub fn with(mut self, decoder: impl Decoder) -> Result<Self> {
        self.register(Arc::new(decoder))?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Decoder>> {
        self.decoders.iter().find(|d| d.name() == name)
    }

    pub fn decoders(&self) -> impl Iterator<Item = &Arc<dyn Decoder>> {
        self.decoders.iter()
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// The decoder for `record`, or `None` when the device is not supported.
    ///
    /// More than one matching decoder is a registry defect and fails with
    /// `AmbiguousMatch` instead of picking one.
    pub fn select(&self, record: &AdvertisementRecord) -> Result<Option<Arc<dyn Decoder>>> {
        let mut matching = self.decoders.iter().filter(|d| d.matches(record));
        let Some(first) = matching.next() else {
            debug!(device = %record.display_name(), "no decoder for device");
            return Ok(None);
        };
        let others: Vec<_> = matching.map(|d| d.name()).collect();
        if !others.is_empty() {
            let mut decoders = vec![first.name()];
            decoders.extend(others);
            return Err(BmsError::AmbiguousMatch { device: record.display_name(), decoders });
        }
        debug!(device = %record.display_name(), decoder = first.name(), "decoder selected");
        Ok(Some(Arc::clone(first)))
    }

    /// Run [`select`](Self::select) over a corpus of advertisements and fail
    /// on the first ambiguous one.
    pub fn validate<'a>(
        &self,
        records: impl IntoIterator<Item = &'a AdvertisementRecord>,
    ) -> Result<()> {
        for record in records {
            self.select(record)?;
        }
        Ok(())
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.decoders.iter().map(|d| d.name())).finish()
    }
}
