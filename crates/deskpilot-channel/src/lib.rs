//! # deskpilot channel
//!
//! Asynchronous request channel between a caller and the native
//! automation host.
//!
//! ## Features
//!
//! - Host-side request table with bounded concurrent planning
//! - Submit / poll / cancel client over any [`HostTransport`]
//! - Native-messaging framing (4-byte little-endian length prefix)
//! - Child-process transport for talking to a spawned host

pub mod client;
pub mod codec;
pub mod config;
pub mod native;
pub mod request;
pub mod table;

pub use client::{ChannelClient, HostTransport};
pub use codec::{LenientMessageCodec, MAX_FRAME_BYTES, NativeMessageCodec};
pub use config::{PollOptions, TableConfig};
pub use native::NativeHostClient;
pub use request::{PollResponse, RequestStatus};
pub use table::RequestTable;

pub use deskpilot_protocols::ChannelError;
