//! Static transition policy keyed by project status.

use crate::model::project::ProjectStatus;
use crate::model::role::Role;
use crate::workflow::requirement::Requirement;

/// Outgoing policy for one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub from: ProjectStatus,
    /// Candidate next statuses. Currently never more than one.
    pub next: &'static [ProjectStatus],
    /// Any one of these roles may fire the transition.
    pub roles: &'static [Role],
    /// All must hold, checked in order.
    pub requirements: &'static [Requirement],
}

impl TransitionRule {
    pub fn is_terminal(&self) -> bool {
        self.next.is_empty()
    }

    pub fn allows_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn allows_target(&self, target: ProjectStatus) -> bool {
        self.next.contains(&target)
    }
}

static DRAFT: TransitionRule = TransitionRule {
    from: ProjectStatus::Draft,
    next: &[ProjectStatus::PreApproval],
    roles: &[Role::Procurement],
    requirements: &[
        Requirement::Name,
        Requirement::CompanyId,
        Requirement::Description,
    ],
};

static PRE_APPROVAL: TransitionRule = TransitionRule {
    from: ProjectStatus::PreApproval,
    next: &[ProjectStatus::PartnerAssigned],
    roles: &[Role::DeputyDirector],
    requirements: &[Requirement::PartnerId],
};

static PARTNER_ASSIGNED: TransitionRule = TransitionRule {
    from: ProjectStatus::PartnerAssigned,
    next: &[ProjectStatus::PmAssigned],
    roles: &[Role::Partner],
    requirements: &[Requirement::PmId],
};

static PM_ASSIGNED: TransitionRule = TransitionRule {
    from: ProjectStatus::PmAssigned,
    next: &[ProjectStatus::TeamAssembled],
    roles: &[Role::Partner],
    requirements: &[Requirement::TeamMin2],
};

static TEAM_ASSEMBLED: TransitionRule = TransitionRule {
    from: ProjectStatus::TeamAssembled,
    next: &[ProjectStatus::InProgress],
    roles: &[Role::Partner],
    requirements: &[Requirement::AutoTasksCreated],
};

static IN_PROGRESS: TransitionRule = TransitionRule {
    from: ProjectStatus::InProgress,
    next: &[ProjectStatus::QaReview],
    roles: &[Role::Pm],
    requirements: &[Requirement::Tasks70PercentDone],
};

static QA_REVIEW: TransitionRule = TransitionRule {
    from: ProjectStatus::QaReview,
    next: &[ProjectStatus::ClientSignoff],
    roles: &[Role::Pm],
    requirements: &[Requirement::QualityChecklist100],
};

static CLIENT_SIGNOFF: TransitionRule = TransitionRule {
    from: ProjectStatus::ClientSignoff,
    next: &[ProjectStatus::Closed],
    roles: &[Role::Partner, Role::Leadership],
    requirements: &[],
};

static CLOSED: TransitionRule = TransitionRule {
    from: ProjectStatus::Closed,
    next: &[ProjectStatus::Archived],
    roles: &[Role::Leadership],
    requirements: &[],
};

static ARCHIVED: TransitionRule = TransitionRule {
    from: ProjectStatus::Archived,
    next: &[],
    roles: &[],
    requirements: &[],
};

/// Returns the rule for `status`. Every status has exactly one.
pub fn rule_for(status: ProjectStatus) -> &'static TransitionRule {
    match status {
        ProjectStatus::Draft => &DRAFT,
        ProjectStatus::PreApproval => &PRE_APPROVAL,
        ProjectStatus::PartnerAssigned => &PARTNER_ASSIGNED,
        ProjectStatus::PmAssigned => &PM_ASSIGNED,
        ProjectStatus::TeamAssembled => &TEAM_ASSEMBLED,
        ProjectStatus::InProgress => &IN_PROGRESS,
        ProjectStatus::QaReview => &QA_REVIEW,
        ProjectStatus::ClientSignoff => &CLIENT_SIGNOFF,
        ProjectStatus::Closed => &CLOSED,
        ProjectStatus::Archived => &ARCHIVED,
    }
}

static LIFECYCLE: [ProjectStatus; 10] = ProjectStatus::ALL;

/// Statuses in lifecycle order, `draft` first and `archived` last.
pub fn lifecycle_chain() -> &'static [ProjectStatus] {
    &LIFECYCLE
}

#[cfg(test)]
mod tests {
    use super::{lifecycle_chain, rule_for};
    use crate::model::project::ProjectStatus;
    use std::collections::HashSet;

    #[test]
    fn rule_for_is_keyed_by_its_own_status() {
        for status in ProjectStatus::ALL {
            assert_eq!(rule_for(status).from, status);
        }
    }

    #[test]
    fn chain_is_linear_without_cycles() {
        let chain = lifecycle_chain();
        assert_eq!(chain.first(), Some(&ProjectStatus::Draft));
        assert_eq!(chain.last(), Some(&ProjectStatus::Archived));

        let mut seen = HashSet::new();
        for window in chain.windows(2) {
            assert!(seen.insert(window[0]));
            assert_eq!(rule_for(window[0]).next, &[window[1]]);
        }
        assert!(rule_for(ProjectStatus::Archived).is_terminal());
    }

    #[test]
    fn only_archived_is_terminal_and_has_no_roles() {
        for status in ProjectStatus::ALL {
            let rule = rule_for(status);
            assert_eq!(rule.is_terminal(), status == ProjectStatus::Archived);
            assert_eq!(rule.roles.is_empty(), rule.is_terminal());
        }
    }
}
