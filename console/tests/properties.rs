//! Property tests: list queries, workflow progression and the Paid invariant.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::{DateTime, Duration, NaiveDate, Utc};
use parking_console::query::{
    OfficerFilter, SortDirection, SortKey, SortState, StatusFilter, TicketCriteria, filter_tickets,
    sort_tickets,
};
use parking_console::seed::demo_state;
use parking_console::types::{Money, Ticket, TicketId, TicketStatus};
use parking_console::workflow::Workflow;
use parking_console::{ConsoleConfig, ConsoleEnvironment, ParkingConsole, TicketPatch};
use parking_console_testing::{SequentialIdGenerator, test_clock};
use proptest::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

/// Demo tickets with fines, plates and due dates overridden
fn tickets(fines: &[u64], plates: &[String], due_offsets: &[i64]) -> Vec<Ticket> {
    demo_state(&SequentialIdGenerator::new(), today())
        .tickets
        .into_iter()
        .enumerate()
        .map(|(i, mut ticket)| {
            ticket.fine_amount = Money::from_cents(fines[i % fines.len()]);
            ticket.vehicle.license_plate = plates[i % plates.len()].clone();
            ticket.due_date = today() + Duration::days(due_offsets[i % due_offsets.len()]);
            ticket
        })
        .collect()
}

fn status_filter() -> impl Strategy<Value = StatusFilter> {
    prop_oneof![
        Just(StatusFilter::All),
        proptest::sample::select(TicketStatus::ALL.to_vec()).prop_map(StatusFilter::Only),
    ]
}

#[derive(Clone, Debug)]
enum Command {
    Review(usize),
    Appeal(usize),
    Reject(usize),
    Resolve(usize),
    MarkPaid(usize),
    Delete(usize),
    SetStatus(usize, TicketStatus),
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        (0usize..12).prop_map(Command::Review),
        (0usize..12).prop_map(Command::Appeal),
        (0usize..12).prop_map(Command::Reject),
        (0usize..12).prop_map(Command::Resolve),
        (0usize..12).prop_map(Command::MarkPaid),
        (0usize..12).prop_map(Command::Delete),
        (0usize..12, proptest::sample::select(TicketStatus::ALL.to_vec()))
            .prop_map(|(i, status)| Command::SetStatus(i, status)),
    ]
}

fn run(console: &mut ParkingConsole, command: Command) -> parking_console::Result<()> {
    let id = |i: usize| TicketId::from_number(TicketId::FIRST_NUMBER + u32::try_from(i).unwrap());
    match command {
        Command::Review(i) => console.review_ticket(&id(i), ""),
        Command::Appeal(i) => console.appeal_ticket(&id(i), "Disputed"),
        Command::Reject(i) => console.reject_ticket(&id(i), "Insufficient evidence"),
        Command::Resolve(i) => console.resolve_ticket(&id(i), ""),
        Command::MarkPaid(i) => console.mark_paid(&id(i)),
        Command::Delete(i) => console.delete_ticket(&id(i)),
        Command::SetStatus(i, status) => console.update_ticket(
            &id(i),
            TicketPatch {
                status: Some(status),
                ..TicketPatch::default()
            },
        ),
    }
}

proptest! {
    #[test]
    fn prop_sorted_neighbours_are_ordered(
        key in proptest::sample::select(SortKey::ALL.to_vec()),
        descending in any::<bool>(),
        fines in proptest::collection::vec(1u64..50_000, 1..10),
        plates in proptest::collection::vec("[A-Za-z0-9-]{0,7}", 1..10),
        due_offsets in proptest::collection::vec(-40i64..40, 1..10),
    ) {
        let tickets = tickets(&fines, &plates, &due_offsets);
        let direction = if descending { SortDirection::Desc } else { SortDirection::Asc };
        let sorted = sort_tickets(tickets.iter().collect(), SortState { key, direction });

        prop_assert_eq!(sorted.len(), tickets.len());
        for pair in sorted.windows(2) {
            let (first, second) = (key.value(pair[0]), key.value(pair[1]));
            prop_assert!(!first.is_missing() || second.is_missing());
            if second.is_missing() {
                continue;
            }
            let ordering = first.cmp(&second);
            match direction {
                SortDirection::Asc => prop_assert_ne!(ordering, Ordering::Greater),
                SortDirection::Desc => prop_assert_ne!(ordering, Ordering::Less),
            }
        }
    }

    #[test]
    fn prop_filtering_is_a_pure_ordered_subset(
        status in status_filter(),
        officer_index in proptest::option::of(0usize..5),
        search in "[a-zA-Z0-9 -]{0,4}",
    ) {
        let state = demo_state(&SequentialIdGenerator::new(), today());
        let officer = officer_index
            .map_or(OfficerFilter::All, |i| OfficerFilter::Only(state.officers[i].id.to_string()));
        let criteria = TicketCriteria { status, officer, search };
        let before = state.tickets.clone();

        let first = filter_tickets(&state.tickets, &criteria);
        let second = filter_tickets(&state.tickets, &criteria);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&state.tickets, &before);
        let positions: Vec<usize> = first
            .iter()
            .map(|t| state.tickets.iter().position(|s| s.id == t.id).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        for ticket in first {
            if let StatusFilter::Only(wanted) = status {
                prop_assert_eq!(ticket.status, wanted);
            }
        }
    }

    #[test]
    fn prop_workflow_never_regresses(
        statuses in proptest::collection::vec(proptest::sample::select(TicketStatus::ALL.to_vec()), 1..12),
    ) {
        let start = DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap();
        let mut workflow = Workflow::default();
        for (step, status) in statuses.into_iter().enumerate() {
            let before = workflow;
            workflow.advance(status, start + Duration::hours(i64::try_from(step).unwrap()));

            prop_assert!(workflow.completed_count() >= before.completed_count());
            for (old, new) in before.stages().iter().zip(workflow.stages()) {
                if old.is_completed() {
                    prop_assert_eq!(old.completed_at, new.completed_at);
                }
            }
            let completed: Vec<bool> = workflow.stages().iter().map(|s| s.is_completed()).collect();
            prop_assert!(completed.windows(2).all(|w| w[0] || !w[1]));
        }
    }

    #[test]
    fn prop_paid_tickets_always_reference_a_payment(
        commands in proptest::collection::vec(command(), 1..25),
    ) {
        let env = ConsoleEnvironment::new(Arc::new(test_clock()), Arc::new(SequentialIdGenerator::new()));
        let mut console = ParkingConsole::with_environment(ConsoleConfig::default(), env);

        for command in commands {
            let before = console.state().tickets.clone();
            if run(&mut console, command).is_err() {
                prop_assert_eq!(&console.state().tickets, &before);
            }
            for ticket in &console.state().tickets {
                if ticket.status == TicketStatus::Paid {
                    prop_assert!(ticket.payment_id.is_some(), "{} has no payment", ticket.id);
                }
            }
        }
    }
}
