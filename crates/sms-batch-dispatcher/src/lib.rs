//! Batching dispatcher for outbound SMS.
//!
//! This crate provides:
//! - BatchingDispatcher: registers messages, buffers them and hands full
//!   batches to a dedicated flush worker
//! - ProviderClient / HttpProviderClient: the bulk-send capability
//! - StatisticsSink / TracingStatisticsSink: one FlushReport per flush
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐ enqueue ┌────────────┐  batch  ┌──────────────┐  send  ┌──────────┐
//! │ Producer │────────▶│  Pending   │────────▶│ Flush worker │───────▶│ Provider │
//! └──────────┘         │ (Mutex)    │ (mpsc)  │ retry+backoff│        └──────────┘
//!                      └────────────┘         └──────┬───────┘
//!                                                    │ Delivered / Failed
//!                                             ┌──────▼───────┐
//!                                             │ Status store │
//!                                             └──────────────┘
//! ```

mod config;
mod dispatcher;
mod error;
mod message;
mod provider;
mod statistics;
mod worker;

pub use config::DispatcherConfig;
pub use dispatcher::BatchingDispatcher;
pub use error::{DispatchError, DispatchResult, ProviderError, ProviderResult};
pub use message::OutboundMessage;
pub use provider::{HttpProviderClient, ProviderClient, ProviderConfig};
pub use statistics::{FinalizationError, FlushReport, StatisticsSink, TracingStatisticsSink};
pub use worker::{backoff_delay, effective_max_attempts};
