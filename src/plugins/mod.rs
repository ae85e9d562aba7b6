//! Built-in vendor decoders.

pub mod dummy;
pub mod ligen;

pub use dummy::DummyBms;
pub use ligen::LiGenBms;

use crate::error::Result;
use crate::registry::DecoderRegistry;

/// A registry holding every built-in decoder.
pub fn builtin_registry() -> Result<DecoderRegistry> {
    DecoderRegistry::new().with(LiGenBms::new())?.with(DummyBms::new())
}
