//! Operations context for dependency injection

use polyenv_config::ProvisionParams;
use polyenv_errors::Error;
use polyenv_events::{EventEmitter, EventSender};
use polyenv_net::Fetcher;
use polyenv_platform::{Platform, PlatformContext};
use std::sync::Arc;
use uuid::Uuid;

/// Everything a provisioning run reads or touches
pub struct OpsCtx {
    /// Host capabilities
    pub platform: Platform,
    /// Remote content retrieval
    pub fetcher: Arc<dyn Fetcher>,
    /// Validated build-time parameters
    pub params: ProvisionParams,
    /// Event sender for progress reporting
    pub tx: EventSender,
    /// Correlates all events of one run
    pub run_id: Uuid,
}

impl OpsCtx {
    // No public constructor - use OpsContextBuilder instead

    /// Platform context that stamps events with this run's id
    #[must_use]
    pub fn platform_context(&self) -> PlatformContext {
        let mut ctx = self.platform.create_context(Some(self.tx.clone()));
        ctx.add_metadata("run_id", self.run_id.to_string());
        ctx
    }
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }

    fn correlation_id(&self) -> Option<String> {
        Some(self.run_id.to_string())
    }
}

/// Builder for operations context
#[derive(Default)]
pub struct OpsContextBuilder {
    platform: Option<Platform>,
    fetcher: Option<Arc<dyn Fetcher>>,
    params: Option<ProvisionParams>,
    tx: Option<EventSender>,
    run_id: Option<Uuid>,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set host capabilities
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Set remote fetcher
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Set validated parameters
    #[must_use]
    pub fn with_params(mut self, params: ProvisionParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Fix the run id instead of generating one
    #[must_use]
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if any required component is missing.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let missing = |component: &str| Error::internal(format!("missing component: {component}"));

        Ok(OpsCtx {
            platform: self.platform.ok_or_else(|| missing("platform"))?,
            fetcher: self.fetcher.ok_or_else(|| missing("fetcher"))?,
            params: self.params.ok_or_else(|| missing("params"))?,
            tx: self.tx.ok_or_else(|| missing("event_sender"))?,
            run_id: self.run_id.unwrap_or_else(Uuid::new_v4),
        })
    }
}
