//! Proxy facade wiring the store, dispatcher and reconciler together.

use crate::validation::{validate_content, validate_phone_number};
use crate::{ProxyResult, SendMessage, SendingResult, ValidationError};
use sms_batch_dispatcher::{
    BatchingDispatcher, DispatcherConfig, HttpProviderClient, OutboundMessage, ProviderClient,
    ProviderConfig, StatisticsSink, TracingStatisticsSink,
};
use sms_proxy_config_and_utils::{Config, DispatcherSection, ProviderSection, ReconcilerSection};
use sms_status_reconciler::{
    ReconcilerConfig, StatusReconciler, StatusUpdateError, StatusUpdateSender,
};
use sms_status_store::{InMemoryStatusStore, MessageId, MessageStatus, StatusStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Outbound SMS proxy.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct SmsProxy {
    store: Arc<InMemoryStatusStore>,
    dispatcher: BatchingDispatcher,
    reconciler: StatusReconciler,
    max_content_length: usize,
}

impl SmsProxy {
    /// Start the proxy with an explicit provider and statistics sink.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        config: &Config,
        provider: Arc<dyn ProviderClient>,
        statistics: Arc<dyn StatisticsSink>,
    ) -> Self {
        let store = Arc::new(InMemoryStatusStore::with_policy(
            config.store.transition_policy,
        ));

        let dispatcher = BatchingDispatcher::start(
            dispatcher_config(&config.dispatcher),
            store.clone(),
            provider,
            statistics,
        );
        let reconciler = StatusReconciler::start(store.clone(), reconciler_config(&config.reconciler));

        info!(
            min_batch_size = config.dispatcher.min_batch_size,
            transition_policy = ?store.policy(),
            "SMS proxy started"
        );

        Self {
            store,
            dispatcher,
            reconciler,
            max_content_length: config.validation.max_content_length,
        }
    }

    /// Start the proxy against the configured HTTP provider.
    pub fn from_config(config: &Config) -> ProxyResult<Self> {
        let provider = HttpProviderClient::new(provider_config(&config.provider))?;
        Ok(Self::start(
            config,
            Arc::new(provider),
            Arc::new(TracingStatisticsSink::new()),
        ))
    }

    /// Validate and enqueue a message under a freshly assigned id.
    pub async fn send(&self, message: SendMessage) -> ProxyResult<SendingResult> {
        validate_phone_number(&message.phone_number)?;
        validate_content(&message.content, self.max_content_length)?;

        let id = MessageId::new();
        self.dispatcher
            .enqueue(OutboundMessage::new(id, message.phone_number, message.content))
            .await?;

        debug!(message_id = %id, "Message accepted");
        Ok(SendingResult { id })
    }

    /// Current status of a message as its wire string (`NOT_FOUND` if unknown).
    pub fn get_status(&self, id: &str) -> ProxyResult<String> {
        let id: MessageId = id
            .parse()
            .map_err(|_| ValidationError::InvalidMessageId(id.to_string()))?;
        Ok(self.status(&id).to_string())
    }

    /// Typed status lookup.
    pub fn status(&self, id: &MessageId) -> MessageStatus {
        self.store.get_status(id)
    }

    /// Where the provider integration pushes delivery reports.
    pub fn status_updates(&self) -> StatusUpdateSender {
        self.reconciler.sender()
    }

    /// Take the receiver of failed status updates. `None` after the first call.
    pub fn take_status_update_errors(&self) -> Option<mpsc::Receiver<StatusUpdateError>> {
        self.reconciler.take_errors()
    }

    /// Messages waiting for the current batch to fill.
    pub async fn pending_count(&self) -> usize {
        self.dispatcher.pending_count().await
    }

    /// Flush pending messages, apply queued status updates and stop.
    pub async fn shutdown(&self) {
        self.dispatcher.shutdown().await;
        self.reconciler.shutdown().await;
        info!("SMS proxy stopped");
    }
}

fn dispatcher_config(section: &DispatcherSection) -> DispatcherConfig {
    DispatcherConfig {
        min_batch_size: section.min_batch_size,
        max_attempts: section.max_attempts,
        retry_base_delay: Duration::from_millis(section.retry_base_delay_ms),
        retry_max_delay: Duration::from_millis(section.retry_max_delay_ms),
        send_timeout: Duration::from_millis(section.send_timeout_ms),
        queue_capacity: section.queue_capacity,
        flush_interval: section.flush_interval_ms.map(Duration::from_millis),
    }
}

fn reconciler_config(section: &ReconcilerSection) -> ReconcilerConfig {
    ReconcilerConfig {
        input_capacity: section.input_capacity,
        error_capacity: section.error_capacity,
    }
}

fn provider_config(section: &ProviderSection) -> ProviderConfig {
    ProviderConfig {
        base_url: section.base_url.clone(),
        api_token: section.api_token.clone(),
        timeout_secs: section.timeout_secs,
    }
}
