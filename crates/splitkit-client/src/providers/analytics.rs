//! Built-in analytics sinks.

use async_trait::async_trait;
use splitkit_core::{Assignment, VisitorId};
use tracing::info;

use crate::errors::AnalyticsError;
use crate::traits::Analytics;

/// Records assignments as `tracing` events and always reports success.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAnalytics;

#[async_trait]
impl Analytics for TracingAnalytics {
    async fn track_assignment(
        &self,
        visitor_id: &VisitorId,
        assignment: &Assignment,
    ) -> Result<bool, AnalyticsError> {
        info!(
            visitor_id = %visitor_id,
            split = assignment.split_name(),
            variant = assignment.variant().unwrap_or_default(),
            context = assignment.context().unwrap_or_default(),
            "split assigned"
        );
        Ok(true)
    }

    fn identify(&self, visitor_id: &VisitorId) {
        info!(visitor_id = %visitor_id, "visitor identified");
    }

    fn alias(&self, visitor_id: &VisitorId) {
        info!(visitor_id = %visitor_id, "visitor aliased");
    }
}

/// Discards everything; assignments count as tracked.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopAnalytics;

#[async_trait]
impl Analytics for NoopAnalytics {
    async fn track_assignment(
        &self,
        _visitor_id: &VisitorId,
        _assignment: &Assignment,
    ) -> Result<bool, AnalyticsError> {
        Ok(true)
    }

    fn identify(&self, _visitor_id: &VisitorId) {}

    fn alias(&self, _visitor_id: &VisitorId) {}
}
