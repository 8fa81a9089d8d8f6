//! Dashboard figures, derived from the ticket collection on every read.

use crate::types::{AuditEntry, Money, Ticket, TicketId, TicketStatus};
use serde::Serialize;

/// Headline figures for the dashboard
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// All tickets
    pub total_tickets: usize,
    /// Sum of the fines of Paid tickets
    pub collected_fines: Money,
    /// Tickets currently under appeal
    pub open_appeals: usize,
    /// Tickets not yet reviewed
    pub issued: usize,
    /// Paid tickets as a percentage of all tickets; 0 when there are none
    pub compliance_rate: f64,
    /// Latest audit entries across all tickets, newest first
    pub recent_activity: Vec<Activity>,
}

/// An audit entry together with the ticket it belongs to
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Ticket the entry was recorded on
    pub ticket_id: TicketId,
    /// The entry
    pub entry: AuditEntry,
}

impl DashboardSummary {
    /// Computes the summary, keeping at most `activity_limit` feed entries
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // ticket counts are small
    pub fn compute(tickets: &[Ticket], activity_limit: usize) -> Self {
        let count = |status| tickets.iter().filter(|t| t.status == status).count();
        let paid = count(TicketStatus::Paid);
        let compliance_rate = if tickets.is_empty() {
            0.0
        } else {
            paid as f64 / tickets.len() as f64 * 100.0
        };

        Self {
            total_tickets: tickets.len(),
            collected_fines: tickets
                .iter()
                .filter(|t| t.status == TicketStatus::Paid)
                .map(|t| t.fine_amount)
                .sum(),
            open_appeals: count(TicketStatus::Appealed),
            issued: count(TicketStatus::Issued),
            compliance_rate,
            recent_activity: recent_activity(tickets, activity_limit),
        }
    }
}

/// Audit entries of all tickets, newest first, truncated to `limit`
///
/// Entries with the same timestamp keep ticket order.
#[must_use]
pub fn recent_activity(tickets: &[Ticket], limit: usize) -> Vec<Activity> {
    let mut feed: Vec<Activity> = tickets
        .iter()
        .flat_map(|ticket| {
            ticket.audit_log().iter().map(|entry| Activity {
                ticket_id: ticket.id.clone(),
                entry: entry.clone(),
            })
        })
        .collect();
    feed.sort_by(|a, b| b.entry.timestamp.cmp(&a.entry.timestamp));
    feed.truncate(limit);
    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::demo_state;
    use chrono::NaiveDate;
    use parking_console_testing::SequentialIdGenerator;

    fn tickets() -> Vec<Ticket> {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
        demo_state(&SequentialIdGenerator::new(), today).tickets
    }

    #[test]
    fn summary_of_demo_data() {
        let tickets = tickets();
        let summary = DashboardSummary::compute(&tickets, 5);

        let paid_fines: Money = tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Paid)
            .map(|t| t.fine_amount)
            .sum();
        assert_eq!(summary.total_tickets, 10);
        assert_eq!(summary.collected_fines, paid_fines);
        assert_eq!(summary.open_appeals, 1);
        assert_eq!(summary.issued, 3);
        assert!((summary.compliance_rate - 20.0).abs() < f64::EPSILON);
        assert_eq!(summary.recent_activity.len(), 5);
    }

    #[test]
    fn feed_is_newest_first() {
        let feed = recent_activity(&tickets(), usize::MAX);
        assert_eq!(feed.len(), tickets().iter().map(|t| t.audit_log().len()).sum::<usize>());
        assert!(feed.windows(2).all(|w| w[0].entry.timestamp >= w[1].entry.timestamp));
    }

    #[test]
    fn empty_collection() {
        let summary = DashboardSummary::compute(&[], 10);
        assert_eq!(summary.total_tickets, 0);
        assert_eq!(summary.collected_fines, Money::ZERO);
        assert!(summary.compliance_rate.abs() < f64::EPSILON);
        assert!(summary.recent_activity.is_empty());
    }
}
