//! The session façade.
//!
//! A [`Session`] owns one visitor and the split registry for the life of the
//! process. It is created by [`Session::initialize`], which resolves the
//! visitor before returning, so every call on a `Session` sees a ready
//! visitor.
//!
//! `vary` and `ab` are synchronous: the assignment is resolved and recorded
//! under the visitor lock, the lock is released, and only then does the
//! caller's handler run. Notifications for new assignments are spawned on
//! the current Tokio runtime and tracked so [`Session::flush`] can wait for
//! them.

use std::sync::Arc;

use parking_lot::Mutex;
use splitkit_core::{Assignment, CoreError, SplitRegistry, Visitor, VisitorId, calculate_variant};
use splitkit_settings::ClientSettings;
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, instrument, warn};

use crate::dispatch::{
    AbOptions, Handlers, VaryOptions, VaryOutcome, ab_variants, handler_mismatches,
    validate_handlers,
};
use crate::errors::{ClientError, Result};
use crate::notification::Notifier;
use crate::providers::{FileVisitorStorage, TracingAnalytics, TracingErrorLogger};
use crate::traits::{Analytics, ErrorLogger, VisitorStorage};
use crate::transport::{HttpTransport, Transport};

/// Host-provided collaborators for a session.
#[derive(Clone)]
pub struct Collaborators {
    /// Remote service transport.
    pub transport: Arc<dyn Transport>,
    /// Visitor ID persistence.
    pub storage: Arc<dyn VisitorStorage>,
    /// Analytics sink.
    pub analytics: Arc<dyn Analytics>,
    /// Diagnostics sink.
    pub error_logger: Arc<dyn ErrorLogger>,
}

impl Collaborators {
    /// Default collaborators for `settings`: HTTP transport, file storage at
    /// `storage_path`, and `tracing`-backed analytics and diagnostics.
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            transport: Arc::new(HttpTransport::from_settings(settings)),
            storage: Arc::new(FileVisitorStorage::new(settings.storage_path.clone())),
            analytics: Arc::new(TracingAnalytics),
            error_logger: Arc::new(TracingErrorLogger),
        }
    }

    /// Replace the transport.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the visitor ID storage.
    #[must_use]
    pub fn with_storage(mut self, storage: Arc<dyn VisitorStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// Replace the analytics sink.
    #[must_use]
    pub fn with_analytics(mut self, analytics: Arc<dyn Analytics>) -> Self {
        self.analytics = analytics;
        self
    }

    /// Replace the diagnostics sink.
    #[must_use]
    pub fn with_error_logger(mut self, error_logger: Arc<dyn ErrorLogger>) -> Self {
        self.error_logger = error_logger;
        self
    }
}

struct SessionInner {
    split_registry: SplitRegistry,
    visitor: Mutex<Visitor>,
    storage: Arc<dyn VisitorStorage>,
    notifier: Notifier,
    tasks: TaskTracker,
}

/// A visitor's assignment session. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Resolve the visitor and build a ready session.
    ///
    /// Fails only on invalid settings. An unreachable service leaves the
    /// visitor offline: the stored ID is kept, assignments start empty, and
    /// notifications are suppressed.
    #[instrument(skip_all, fields(url = %settings.base_url()))]
    pub async fn initialize(settings: &ClientSettings, collaborators: Collaborators) -> Result<Self> {
        let split_registry = settings.split_registry()?;
        let Collaborators {
            transport,
            storage,
            analytics,
            error_logger,
        } = collaborators;

        let stored = storage.visitor_id();
        let visitor = load_visitor(settings, transport.as_ref(), error_logger.as_ref(), stored).await;
        if let Err(e) = storage.set_visitor_id(visitor.id()) {
            error_logger.log(&format!("splitkit setVisitorId error: {e}"));
        }

        info!(
            visitor_id = %visitor.id(),
            offline = visitor.is_offline(),
            assignments = visitor.assignments().len(),
            splits = split_registry.len(),
            "session initialized"
        );

        Ok(Self {
            inner: Arc::new(SessionInner {
                split_registry,
                visitor: Mutex::new(visitor),
                storage,
                notifier: Notifier {
                    transport,
                    analytics,
                    error_logger,
                },
                tasks: TaskTracker::new(),
            }),
        })
    }

    /// Current visitor ID.
    pub fn visitor_id(&self) -> VisitorId {
        self.inner.visitor.lock().id().clone()
    }

    /// Whether the visitor could not be loaded and notifications are off.
    pub fn is_offline(&self) -> bool {
        self.inner.visitor.lock().is_offline()
    }

    /// Resolve the visitor's variant for `split_name`.
    ///
    /// An existing assignment is returned as is. Otherwise the variant is
    /// bucketed, recorded, and (for online visitors and non-gate splits)
    /// reported in the background.
    pub fn vary(&self, split_name: &str, options: &VaryOptions) -> Result<String> {
        options.validate(split_name)?;
        self.assign(split_name, options, |_| true)
            .map(|(variant, _)| variant)
    }

    /// Resolve the variant for `split_name` and run exactly one handler.
    ///
    /// The default variant must have a handler. A newly assigned variant
    /// without a handler is recorded as the default variant. Handlers run
    /// after the visitor lock is released and may call back into the
    /// session.
    pub fn vary_with<T>(
        &self,
        split_name: &str,
        options: &VaryOptions,
        handlers: Handlers<'_, T>,
    ) -> Result<VaryOutcome<T>> {
        options.validate(split_name)?;
        validate_handlers(split_name, &options.default_variant, &handlers)?;
        for message in handler_mismatches(split_name, handlers.variants(), &self.inner.split_registry) {
            self.log_error(&message);
        }

        let (variant, defaulted) = self.assign(split_name, options, |v| handlers.contains(v))?;
        let (value, _) = handlers
            .run(&variant, &options.default_variant)
            .ok_or_else(|| ClientError::invalid_vary(split_name, "no handler to run"))?;
        Ok(VaryOutcome {
            variant,
            value,
            defaulted,
        })
    }

    /// Resolve a two-variant split as a boolean.
    ///
    /// `true` when the visitor's variant is the true variant (`"true"` unless
    /// overridden). The false variant is the split's other variant.
    pub fn ab(&self, split_name: &str, options: &AbOptions) -> Result<bool> {
        let pair = ab_variants(
            split_name,
            options.true_variant.as_deref(),
            &self.inner.split_registry,
        );
        if pair.too_many {
            self.log_error(&format!(
                "A/B for \"{split_name}\" configures split with more than 2 variants"
            ));
        }

        let handlers = Handlers::new()
            .on(pair.false_variant.clone(), || ())
            .on(pair.true_variant.clone(), || ());
        let options = VaryOptions::new(options.context.clone(), pair.false_variant);
        let outcome = self.vary_with(split_name, &options, handlers)?;
        Ok(outcome.variant == pair.true_variant)
    }

    /// Wait for every notification spawned so far to finish.
    pub async fn flush(&self) {
        let tasks = &self.inner.tasks;
        let _ = tasks.close();
        tasks.wait().await;
        let _ = tasks.reopen();
    }

    /// Resolve and record the assignment for `split_name`.
    ///
    /// Returns the variant and whether it lacks a handler per `handled`.
    /// Diagnostics raised while the visitor is locked are logged after the
    /// lock is released.
    fn assign(
        &self,
        split_name: &str,
        options: &VaryOptions,
        handled: impl Fn(&str) -> bool,
    ) -> Result<(String, bool)> {
        let mut diagnostics = Vec::new();
        let (pending, variant, defaulted) = {
            let mut visitor = self.inner.visitor.lock();
            if let Some(existing) = visitor.assignments().variant(split_name) {
                debug!(split = split_name, variant = existing, "existing assignment");
                return Ok((existing.to_string(), !handled(existing)));
            }

            let (resolved, diagnostic) =
                self.calculate(visitor.id(), split_name, &options.default_variant)?;
            diagnostics.extend(diagnostic);
            let defaulted = !handled(&resolved);
            let variant = if defaulted {
                options.default_variant.clone()
            } else {
                resolved
            };
            let assignment = Assignment::new(
                split_name,
                Some(variant.clone()),
                Some(options.context.clone()),
                true,
            );

            let pending = if self.should_notify(&visitor, split_name) {
                match runtime() {
                    Some(handle) => {
                        visitor.record(assignment.synced());
                        Some((handle, visitor.id().clone(), assignment))
                    }
                    None => {
                        diagnostics.push(dropped_notification(split_name));
                        visitor.record(assignment);
                        None
                    }
                }
            } else {
                visitor.record(assignment);
                None
            };
            (pending, variant, defaulted)
        };

        for message in &diagnostics {
            self.log_error(message);
        }
        debug!(split = split_name, variant = %variant, defaulted, "new assignment");
        if let Some((handle, visitor_id, assignment)) = pending {
            self.spawn_notification(&handle, visitor_id, assignment);
        }
        Ok((variant, defaulted))
    }

    /// Bucket `split_name`, falling back to the default when the registry is
    /// unloaded or does not know the split. The second value is a diagnostic
    /// for the caller to log.
    fn calculate(
        &self,
        visitor_id: &VisitorId,
        split_name: &str,
        default_variant: &str,
    ) -> Result<(String, Option<String>)> {
        match calculate_variant(visitor_id, split_name, &self.inner.split_registry) {
            Ok(Some(variant)) => Ok((variant, None)),
            Ok(None) => Ok((default_variant.to_string(), None)),
            Err(e @ CoreError::UnknownSplit { .. }) => {
                Ok((default_variant.to_string(), Some(e.to_string())))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn should_notify(&self, visitor: &Visitor, split_name: &str) -> bool {
        !visitor.is_offline() && !self.is_feature_gate(split_name)
    }

    fn is_feature_gate(&self, split_name: &str) -> bool {
        self.inner
            .split_registry
            .get(split_name)
            .is_some_and(|split| split.is_feature_gate())
    }

    /// Report unsynced assignments of an online visitor, marking them synced.
    ///
    /// Outside a runtime nothing is sent and the assignments stay unsynced.
    pub(crate) fn notify_unsynced(&self) {
        let Some(handle) = runtime() else {
            self.log_error("splitkit unsynced assignments kept: no async runtime");
            return;
        };
        let (visitor_id, pending) = {
            let mut visitor = self.inner.visitor.lock();
            if visitor.is_offline() {
                return;
            }
            let pending: Vec<Assignment> = visitor
                .assignments()
                .unsynced()
                .into_iter()
                .filter(|a| a.variant().is_some() && !self.is_feature_gate(a.split_name()))
                .collect();
            for assignment in &pending {
                visitor.record(assignment.synced());
            }
            (visitor.id().clone(), pending)
        };

        for assignment in pending {
            self.spawn_notification(&handle, visitor_id.clone(), assignment);
        }
    }

    fn spawn_notification(&self, handle: &Handle, visitor_id: VisitorId, assignment: Assignment) {
        let notifier = self.inner.notifier.clone();
        let _ = self
            .inner
            .tasks
            .spawn_on(async move { notifier.send(visitor_id, assignment).await }, handle);
    }

    pub(crate) fn log_error(&self, message: &str) {
        self.inner.notifier.error_logger.log(message);
    }

    pub(crate) fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    pub(crate) fn storage(&self) -> &dyn VisitorStorage {
        self.inner.storage.as_ref()
    }

    pub(crate) fn split_registry(&self) -> &SplitRegistry {
        &self.inner.split_registry
    }

    pub(crate) fn with_visitor<R>(&self, f: impl FnOnce(&mut Visitor) -> R) -> R {
        f(&mut self.inner.visitor.lock())
    }
}

fn runtime() -> Option<Handle> {
    Handle::try_current().ok()
}

fn dropped_notification(split_name: &str) -> String {
    format!("splitkit notification for \"{split_name}\" deferred: no async runtime")
}

/// Resolve the starting visitor.
///
/// No stored ID yields a fresh anonymous visitor. A stored ID with bundled
/// assignments is trusted without a fetch. Otherwise the visitor is fetched
/// and a failed fetch leaves it offline.
async fn load_visitor(
    settings: &ClientSettings,
    transport: &dyn Transport,
    error_logger: &dyn ErrorLogger,
    stored: Option<VisitorId>,
) -> Visitor {
    let Some(visitor_id) = stored else {
        return Visitor::anonymous();
    };
    if let Some(assignments) = &settings.assignments {
        return Visitor::new(visitor_id, assignments.clone());
    }

    match transport.get_visitor(&visitor_id).await {
        Ok(response) => Visitor::new(response.id, response.assignments),
        Err(e) => {
            warn!(visitor_id = %visitor_id, timeout = e.is_timeout(), "visitor fetch failed, continuing offline");
            error_logger.log(&format!("splitkit loadVisitor error: {e}"));
            Visitor::offline(visitor_id)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
