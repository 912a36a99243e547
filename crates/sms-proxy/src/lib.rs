//! # SMS Proxy
//!
//! Accepts individual send requests, batches them towards a bulk-SMS
//! provider and tracks every message's delivery status.
//!
//! ## Overview
//!
//! - **[`SmsProxy`]**: the facade an HTTP layer talks to. `send` validates the
//!   request, assigns a fresh id and hands the message to the dispatcher;
//!   `get_status` reports the current status string.
//! - Provider delivery reports are pushed through
//!   [`SmsProxy::status_updates`] and reconciled in the background.
//!
//! ## Example
//!
//! ```ignore
//! use sms_proxy::{SendMessage, SmsProxy};
//! use sms_proxy_config_and_utils::{init_logging, Config};
//!
//! let config = Config::load(None)?;
//! init_logging(&config.log_level);
//!
//! let proxy = SmsProxy::from_config(&config)?;
//! let result = proxy.send(SendMessage::new("+48123456789", "hello")).await?;
//! let status = proxy.get_status(&result.id.to_string())?;
//! ```

mod api;
mod error;
mod proxy;
mod validation;

pub use api::{SendMessage, SendingResult, SmsStatusResponse};
pub use error::{ProxyError, ProxyResult, ValidationError};
pub use proxy::SmsProxy;
pub use validation::{validate_content, validate_phone_number};

pub use sms_batch_dispatcher::{FlushReport, ProviderClient, StatisticsSink};
pub use sms_status_reconciler::{StatusUpdate, StatusUpdateBatch, StatusUpdateError};
pub use sms_status_store::{MessageId, MessageStatus};
