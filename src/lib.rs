//! Poll Battery Management Systems over Bluetooth Low Energy
//!
//! Every BMS vendor speaks its own binary protocol over BLE notifications. This crate
//! holds the parts that are the same for all of them:
//!
//! - matching a discovered device to the [`Decoder`] for its vendor ([`DecoderRegistry`])
//! - reassembling notification fragments into frames ([`FrameAssembler`])
//! - pairing each command with its response, with a deadline ([`ResponseCorrelator`])
//! - deriving power, charging state, runtime and friends from the decoded values ([`normalize`])
//!
//! New hardware is supported by implementing [`Decoder`]; see [`plugins`] for the built-in ones.
//!
//! # Example
//!
//! ```rust,no_run
//! # use std::time::Duration;
//! # use bms_reader::{ble, plugins, BmsConnection, PollConfig};
//! #
//! # #[tokio::main]
//! # pub async fn main() -> anyhow::Result<()> {
//!     let config = PollConfig::default();
//!     let registry = plugins::builtin_registry()?;
//!     let adapter = ble::default_adapter().await?;
//!     let device = ble::find_device(&adapter, "BT_HC6172", config.scan_timeout()).await?;
//!     let decoder = registry
//!         .select(&(&device).into())?
//!         .ok_or_else(|| anyhow::anyhow!("unsupported device"))?;
//!     let transport =
//!         ble::BleTransport::connect(&adapter, device.device, decoder.as_ref()).await?;
//!     let connection = BmsConnection::open(decoder, transport, &config).await?;
//!     loop {
//!         let sample = connection.update().await?;
//!         println!("{sample:?}");
//!         tokio::time::sleep(Duration::from_secs(5)).await;
//!     }
//! # }
//! ```

pub mod advertisement;
pub mod assembler;
pub mod ble;
pub mod config;
pub mod connection;
pub mod correlator;
pub mod decoder;
pub mod error;
pub mod normalizer;
pub mod plugins;
pub mod registry;
pub mod sample;
pub mod transport;

pub use advertisement::AdvertisementRecord;
pub use assembler::{AssemblerState, Frame, FrameAssembler};
pub use config::PollConfig;
pub use connection::{BmsConnection, NotificationSink};
pub use correlator::{ResponseCorrelator, ResponseHandle};
pub use decoder::{
    uuid16, CurrentPolarity, Decoder, DecoderDescriptor, FrameBoundary, Matcher, NamePattern,
};
pub use error::{BmsError, Result};
pub use normalizer::normalize;
pub use registry::DecoderRegistry;
pub use sample::{NormalizedSample, RawSample, SampleKey, SampleValue, VOCABULARY_VERSION};
pub use transport::Transport;
