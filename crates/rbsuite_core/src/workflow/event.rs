//! Domain event emitted after a persisted status change.

use crate::model::project::{ProjectId, ProjectStatus};
use crate::model::role::Role;
use log::info;
use serde::{Deserialize, Serialize};

/// A project moved from one status to the next.
///
/// Built by callers once the compare-and-swap has committed; the engine never
/// emits it on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStatusChanged {
    pub project_id: ProjectId,
    pub from_status: ProjectStatus,
    pub to_status: ProjectStatus,
    pub actor_role: Role,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
}

/// Consumer of status-change events, e.g. the notification subsystem.
pub trait StatusEventSink {
    fn publish(&self, event: &ProjectStatusChanged);
}

impl<S: StatusEventSink + ?Sized> StatusEventSink for &S {
    fn publish(&self, event: &ProjectStatusChanged) {
        (**self).publish(event);
    }
}

/// Sink that records events in the core log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

impl StatusEventSink for LogEventSink {
    fn publish(&self, event: &ProjectStatusChanged) {
        info!(
            "event=project_status_changed module=workflow status=ok project_id={} from={} to={} actor_role={} ts_ms={}",
            event.project_id, event.from_status, event.to_status, event.actor_role, event.timestamp
        );
    }
}

#[cfg(test)]
mod tests {
    use super::ProjectStatusChanged;
    use crate::model::project::ProjectStatus;
    use crate::model::role::Role;
    use uuid::Uuid;

    #[test]
    fn event_serializes_with_snake_case_values() {
        let event = ProjectStatusChanged {
            project_id: Uuid::nil(),
            from_status: ProjectStatus::PreApproval,
            to_status: ProjectStatus::PartnerAssigned,
            actor_role: Role::DeputyDirector,
            timestamp: 1_767_225_600_000,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["project_id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["from_status"], "pre_approval");
        assert_eq!(json["to_status"], "partner_assigned");
        assert_eq!(json["actor_role"], "deputy_director");
        assert_eq!(json["timestamp"], 1_767_225_600_000_i64);

        let back: ProjectStatusChanged = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
