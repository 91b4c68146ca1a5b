//! # Shared Bus - Stream Multiplexing
//!
//! The pieces every streaming service shares:
//!
//! - [`SubscriptionRegistry`]: routing key → live stream
//! - [`StreamSink`] / [`StreamSource`]: transport-neutral stream halves
//! - [`FinishedSignal`]: non-blocking one-shot stop signal
//!
//! ```text
//!  node "A" ──Connect──┐                       ┌──► node "B" stream
//!                      ▼                       │
//!              ┌──────────────────┐   Send     │
//!              │ SubscriptionReg. │ ───lookup──┘
//!              └──────────────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod registry;
pub mod signal;
pub mod stream;

pub use registry::{node_key, RegistryError, Subscription, SubscriptionRegistry};
pub use signal::{finished_signal, FinishedListener, FinishedSignal};
pub use stream::{
    channel_stream, ChannelSink, ChannelSource, PeerStream, ServerStream, StreamError, StreamSink,
    StreamSource,
};

/// Default per-stream outbound queue depth.
pub const DEFAULT_STREAM_BUFFER: usize = 256;
