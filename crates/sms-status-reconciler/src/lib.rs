//! Status reconciliation for provider delivery reports.
//!
//! The provider pushes batches of `{message id -> external status}` out of
//! band. The reconciler maps each entry onto the internal status vocabulary
//! and applies it to the status store. Entries that cannot be applied are
//! reported on a bounded error channel; one bad entry never stops the loop.

mod error;
mod reconciler;
mod vocabulary;

pub use error::{ReconcileError, StatusUpdateError, SubmitError};
pub use reconciler::{
    ReconcilerConfig, StatusReconciler, StatusUpdate, StatusUpdateBatch, StatusUpdateSender,
};
pub use vocabulary::ExternalStatus;
