//! Ticket workflow: the fixed four-stage pipeline Issued → Reviewed →
//! Actioned → Closed.
//!
//! How many stages a status requires is a pure function of the status. The
//! stored [`Workflow`] only remembers *when* each stage was first reached, and
//! never forgets it: moving a ticket back to an earlier status through an edit
//! leaves completed stages completed.

use crate::types::TicketStatus;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four workflow stages
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StageName {
    /// Ticket written
    Issued,
    /// Evidence checked
    Reviewed,
    /// Decision taken (appeal filed or outcome decided)
    Actioned,
    /// No further action
    Closed,
}

impl StageName {
    /// Stages in pipeline order
    pub const ALL: [Self; 4] = [Self::Issued, Self::Reviewed, Self::Actioned, Self::Closed];

    /// Days after the issue date at which seeded data completes this stage
    const fn seed_offset_days(self) -> i64 {
        match self {
            Self::Issued => 0,
            Self::Reviewed => 2,
            Self::Actioned => 10,
            Self::Closed => 15,
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Issued => "Issued",
            Self::Reviewed => "Reviewed",
            Self::Actioned => "Actioned",
            Self::Closed => "Closed",
        })
    }
}

/// Number of leading stages a status requires to be complete
#[must_use]
pub const fn required_stages(status: TicketStatus) -> usize {
    match status {
        TicketStatus::Issued => 1,
        TicketStatus::Reviewed => 2,
        TicketStatus::Appealed => 3,
        TicketStatus::Paid | TicketStatus::Rejected | TicketStatus::Resolved => 4,
    }
}

/// Completion record of one stage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStage {
    /// Which stage
    pub stage: StageName,
    /// When it was first completed
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkflowStage {
    const fn pending(stage: StageName) -> Self {
        Self {
            stage,
            completed_at: None,
        }
    }

    /// True once the stage has been reached
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// A ticket's progress through the four stages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    stages: [WorkflowStage; 4],
}

impl Default for Workflow {
    fn default() -> Self {
        Self {
            stages: StageName::ALL.map(WorkflowStage::pending),
        }
    }
}

impl Workflow {
    /// Workflow of a freshly created ticket with `status`, every required
    /// stage completed at `at`
    #[must_use]
    pub fn started(status: TicketStatus, at: DateTime<Utc>) -> Self {
        let mut workflow = Self::default();
        workflow.advance(status, at);
        workflow
    }

    /// Workflow for generated data: each required stage is dated at a fixed
    /// offset from the issue date
    #[must_use]
    pub fn seeded(status: TicketStatus, issue_date: NaiveDate) -> Self {
        let issued_at = issue_date.and_time(NaiveTime::MIN).and_utc();
        let mut workflow = Self::default();
        for record in workflow.stages.iter_mut().take(required_stages(status)) {
            record.completed_at =
                Some(issued_at + Duration::days(record.stage.seed_offset_days()));
        }
        workflow
    }

    /// Completes every stage `status` requires that is not complete yet.
    ///
    /// Already completed stages keep their original date. Returns the stages
    /// completed by this call.
    pub fn advance(&mut self, status: TicketStatus, at: DateTime<Utc>) -> Vec<StageName> {
        let mut newly_completed = Vec::new();
        for record in self.stages.iter_mut().take(required_stages(status)) {
            if record.completed_at.is_none() {
                record.completed_at = Some(at);
                newly_completed.push(record.stage);
            }
        }
        newly_completed
    }

    /// Stage records in pipeline order
    #[must_use]
    pub const fn stages(&self) -> &[WorkflowStage; 4] {
        &self.stages
    }

    /// Record for `stage`
    #[must_use]
    pub fn stage(&self, stage: StageName) -> &WorkflowStage {
        &self.stages[stage as usize]
    }

    /// First stage not yet completed, `None` when all are complete
    #[must_use]
    pub fn current_stage(&self) -> Option<StageName> {
        self.stages
            .iter()
            .find(|record| !record.is_completed())
            .map(|record| record.stage)
    }

    /// True when all four stages are complete
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current_stage().is_none()
    }

    /// Number of completed stages
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.stages.iter().filter(|record| record.is_completed()).count()
    }

    /// Completed fraction, from 0.0 to 1.0
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // at most 4 stages
    pub fn progress(&self) -> f64 {
        self.completed_count() as f64 / self.stages.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, 9, 0, 0)
            .single()
            .unwrap_or_default()
    }

    #[test]
    fn status_table() {
        for (status, expected) in [
            (TicketStatus::Issued, 1),
            (TicketStatus::Reviewed, 2),
            (TicketStatus::Appealed, 3),
            (TicketStatus::Paid, 4),
            (TicketStatus::Rejected, 4),
            (TicketStatus::Resolved, 4),
        ] {
            let workflow = Workflow::started(status, at(1));
            assert_eq!(workflow.completed_count(), expected, "{status:?}");
        }
    }

    #[test]
    fn current_stage_is_first_pending() {
        assert_eq!(
            Workflow::started(TicketStatus::Issued, at(1)).current_stage(),
            Some(StageName::Reviewed)
        );
        assert_eq!(
            Workflow::started(TicketStatus::Appealed, at(1)).current_stage(),
            Some(StageName::Closed)
        );
        let closed = Workflow::started(TicketStatus::Paid, at(1));
        assert_eq!(closed.current_stage(), None);
        assert!(closed.is_complete());
        assert!((closed.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn advance_dates_only_new_stages() {
        let mut workflow = Workflow::started(TicketStatus::Issued, at(1));

        let newly = workflow.advance(TicketStatus::Appealed, at(5));

        assert_eq!(newly, vec![StageName::Reviewed, StageName::Actioned]);
        assert_eq!(workflow.stage(StageName::Issued).completed_at, Some(at(1)));
        assert_eq!(workflow.stage(StageName::Actioned).completed_at, Some(at(5)));
    }

    #[test]
    fn moving_backwards_keeps_completed_stages() {
        let mut workflow = Workflow::started(TicketStatus::Resolved, at(1));

        let newly = workflow.advance(TicketStatus::Issued, at(9));

        assert!(newly.is_empty());
        assert_eq!(workflow.completed_count(), 4);
        assert_eq!(workflow.stage(StageName::Closed).completed_at, Some(at(1)));
    }

    #[test]
    fn seeded_stages_use_fixed_offsets() {
        let issue = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
        let workflow = Workflow::seeded(TicketStatus::Paid, issue);

        let days: Vec<i64> = workflow
            .stages()
            .iter()
            .filter_map(|record| record.completed_at)
            .map(|date| (date.date_naive() - issue).num_days())
            .collect();
        assert_eq!(days, vec![0, 2, 10, 15]);

        let reviewed = Workflow::seeded(TicketStatus::Reviewed, issue);
        assert_eq!(reviewed.completed_count(), 2);
        assert_eq!(reviewed.current_stage(), Some(StageName::Actioned));
    }
}
