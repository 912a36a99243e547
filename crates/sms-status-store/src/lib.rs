//! Message status tracking for the SMS proxy.
//!
//! This crate provides:
//! - MessageId / MessageStatus: identity and lifecycle vocabulary
//! - StatusStore: the trait shared by the dispatcher and the reconciler
//! - InMemoryStatusStore: process-lifetime store guarded by a single RwLock

mod error;
mod status;
mod store;

pub use error::{StoreError, StoreResult};
pub use status::{MessageId, MessageStatus, TransitionPolicy};
pub use store::{InMemoryStatusStore, StatusStore};
