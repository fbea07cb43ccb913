//! In-memory collaborator fakes for unit tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use splitkit_core::split::SplitConfig;
use splitkit_core::{Assignment, VisitorId};
use splitkit_settings::ClientSettings;

use crate::errors::{AnalyticsError, ClientError, Result};
use crate::providers::MemoryVisitorStorage;
use crate::session::Collaborators;
use crate::traits::{Analytics, ErrorLogger};
use crate::transport::{
    AssignmentEvent, AssignmentOverride, Credentials, IdentifierRequest, Transport,
    VisitorResponse,
};

/// Transport that records requests and answers from canned responses.
#[derive(Default)]
pub(crate) struct FakeTransport {
    visitor: Option<VisitorResponse>,
    linked: Option<VisitorResponse>,
    event_status: Option<u16>,
    events: Mutex<Vec<AssignmentEvent>>,
    overrides: Mutex<Vec<AssignmentOverride>>,
    identifiers: Mutex<Vec<IdentifierRequest>>,
    visitor_fetches: Mutex<Vec<VisitorId>>,
}

impl FakeTransport {
    pub(crate) fn failing_events(status: u16) -> Self {
        Self {
            event_status: Some(status),
            ..Self::default()
        }
    }

    pub(crate) fn with_visitor(visitor: VisitorResponse) -> Self {
        Self {
            visitor: Some(visitor),
            ..Self::default()
        }
    }

    pub(crate) fn with_linked(linked: VisitorResponse) -> Self {
        Self {
            linked: Some(linked),
            ..Self::default()
        }
    }

    pub(crate) fn events(&self) -> Vec<AssignmentEvent> {
        self.events.lock().clone()
    }

    pub(crate) fn overrides(&self) -> Vec<AssignmentOverride> {
        self.overrides.lock().clone()
    }

    pub(crate) fn identifiers(&self) -> Vec<IdentifierRequest> {
        self.identifiers.lock().clone()
    }

    pub(crate) fn visitor_fetches(&self) -> Vec<VisitorId> {
        self.visitor_fetches.lock().clone()
    }
}

fn unavailable() -> ClientError {
    ClientError::Api {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get_visitor(&self, visitor_id: &VisitorId) -> Result<VisitorResponse> {
        self.visitor_fetches.lock().push(visitor_id.clone());
        self.visitor.clone().ok_or_else(unavailable)
    }

    async fn post_identifier(&self, request: &IdentifierRequest) -> Result<VisitorResponse> {
        self.identifiers.lock().push(request.clone());
        self.linked.clone().ok_or_else(unavailable)
    }

    async fn post_assignment_event(&self, event: &AssignmentEvent) -> Result<()> {
        self.events.lock().push(event.clone());
        match self.event_status {
            Some(status) => Err(ClientError::Api {
                status,
                message: "Internal Server Error".to_string(),
            }),
            None => Ok(()),
        }
    }

    async fn post_assignment_override(
        &self,
        assignment: &AssignmentOverride,
        _credentials: &Credentials,
    ) -> Result<()> {
        self.overrides.lock().push(assignment.clone());
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Reply {
    Report(bool),
    Error,
}

/// Analytics fake that records every call.
pub(crate) struct FakeAnalytics {
    reply: Reply,
    tracked: Mutex<Vec<(VisitorId, Assignment)>>,
    identified: Mutex<Vec<VisitorId>>,
    aliased: Mutex<Vec<VisitorId>>,
}

impl FakeAnalytics {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            tracked: Mutex::new(Vec::new()),
            identified: Mutex::new(Vec::new()),
            aliased: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn succeeding() -> Self {
        Self::new(Reply::Report(true))
    }

    pub(crate) fn reporting(success: bool) -> Self {
        Self::new(Reply::Report(success))
    }

    pub(crate) fn erroring() -> Self {
        Self::new(Reply::Error)
    }

    pub(crate) fn tracked(&self) -> Vec<(VisitorId, Assignment)> {
        self.tracked.lock().clone()
    }

    pub(crate) fn identified(&self) -> Vec<VisitorId> {
        self.identified.lock().clone()
    }

    pub(crate) fn aliased(&self) -> Vec<VisitorId> {
        self.aliased.lock().clone()
    }
}

#[async_trait]
impl Analytics for FakeAnalytics {
    async fn track_assignment(
        &self,
        visitor_id: &VisitorId,
        assignment: &Assignment,
    ) -> std::result::Result<bool, AnalyticsError> {
        self.tracked
            .lock()
            .push((visitor_id.clone(), assignment.clone()));
        match self.reply {
            Reply::Report(success) => Ok(success),
            Reply::Error => Err(AnalyticsError("vendor script missing".to_string())),
        }
    }

    fn identify(&self, visitor_id: &VisitorId) {
        self.identified.lock().push(visitor_id.clone());
    }

    fn alias(&self, visitor_id: &VisitorId) {
        self.aliased.lock().push(visitor_id.clone());
    }
}

/// Error logger that keeps every message.
#[derive(Default)]
pub(crate) struct RecordingLogger {
    messages: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub(crate) fn contains(&self, needle: &str) -> bool {
        self.messages.lock().iter().any(|m| m.contains(needle))
    }
}

impl ErrorLogger for RecordingLogger {
    fn log(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

/// One set of fakes, shared between a session and the test that inspects it.
pub(crate) struct Fakes {
    pub transport: Arc<FakeTransport>,
    pub storage: Arc<MemoryVisitorStorage>,
    pub analytics: Arc<FakeAnalytics>,
    pub logger: Arc<RecordingLogger>,
}

impl Fakes {
    pub(crate) fn new(transport: FakeTransport, storage: MemoryVisitorStorage) -> Self {
        Self::with_analytics(transport, storage, FakeAnalytics::succeeding())
    }

    pub(crate) fn with_analytics(
        transport: FakeTransport,
        storage: MemoryVisitorStorage,
        analytics: FakeAnalytics,
    ) -> Self {
        Self {
            transport: Arc::new(transport),
            storage: Arc::new(storage),
            analytics: Arc::new(analytics),
            logger: Arc::new(RecordingLogger::default()),
        }
    }

    pub(crate) fn collaborators(&self) -> Collaborators {
        Collaborators {
            transport: self.transport.clone(),
            storage: self.storage.clone(),
            analytics: self.analytics.clone(),
            error_logger: self.logger.clone(),
        }
    }
}

/// Settings with a loaded registry of `(name, weights, feature_gate)` splits.
pub(crate) fn settings(
    splits: &[(&str, &[(&str, u32)], bool)],
    assignments: Option<Vec<Assignment>>,
) -> ClientSettings {
    let splits: BTreeMap<String, SplitConfig> = splits
        .iter()
        .map(|(name, weights, feature_gate)| {
            let config = SplitConfig {
                weights: weights.iter().map(|(v, w)| ((*v).to_string(), *w)).collect(),
                feature_gate: *feature_gate,
            };
            ((*name).to_string(), config)
        })
        .collect();
    ClientSettings {
        splits: Some(splits),
        assignments,
        ..ClientSettings::default()
    }
}
