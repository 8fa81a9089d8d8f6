//! End-to-end console scenarios against the demo data.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::{Duration, NaiveDate};
use parking_console::error::Field;
use parking_console::navigation::{Params, Screen, View, id_param};
use parking_console::query::{SortKey, StatusFilter};
use parking_console::types::{
    Money, OfficerId, OfficerStatus, PaymentStatus, TicketId, TicketStatus, Vehicle,
};
use parking_console::workflow::StageName;
use parking_console::{
    ConsoleConfig, ConsoleEnvironment, ConsoleError, OfficerDraft, ParkingConsole, PaymentDraft,
    TicketDraft, TicketPatch,
};
use parking_console_testing::helpers::init_test_tracing;
use parking_console_testing::{SequentialIdGenerator, test_clock};
use std::sync::Arc;

fn environment() -> ConsoleEnvironment {
    ConsoleEnvironment::new(Arc::new(test_clock()), Arc::new(SequentialIdGenerator::new()))
}

fn console_with(config: ConsoleConfig) -> ParkingConsole {
    init_test_tracing();
    ParkingConsole::with_environment(config, environment())
}

fn console() -> ParkingConsole {
    console_with(ConsoleConfig::default())
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn first_officer(console: &ParkingConsole) -> OfficerId {
    console.state().officers[0].id.clone()
}

fn draft(console: &ParkingConsole) -> TicketDraft {
    TicketDraft {
        violation_type: "Expired Meter".to_string(),
        violation_code: "VMT-002".to_string(),
        fine_amount: Some(Money::from_dollars(50)),
        vehicle: Vehicle {
            license_plate: "NEW-001".to_string(),
            make: "Kia".to_string(),
            model: "Soul".to_string(),
            color: "Orange".to_string(),
        },
        officer_id: Some(first_officer(console)),
        location: "Elm St".to_string(),
        issue_date: Some(today()),
        ..TicketDraft::default()
    }
}

fn tkt(number: u32) -> TicketId {
    TicketId::from_number(number)
}

#[test]
fn demo_data_is_loaded_at_startup() {
    let console = console();
    let state = console.state();

    assert_eq!(state.tickets.len(), 10);
    assert_eq!(state.payments.len(), 10);
    assert_eq!(state.officers.len(), 5);
    assert_eq!(state.count_status(TicketStatus::Issued), 3);
    assert_eq!(state.count_status(TicketStatus::Paid), 2);
    assert_eq!(console.view(), View::Dashboard);
}

#[test]
fn starting_empty_when_seeding_is_disabled() {
    let console = console_with(ConsoleConfig {
        seed_demo_data: false,
        ..ConsoleConfig::default()
    });
    assert!(console.state().tickets.is_empty());
    assert_eq!(console.dashboard().total_tickets, 0);
}

#[test]
fn create_ticket_opens_payment_and_shows_detail() {
    let mut console = console();
    let id = console.create_ticket(draft(&console)).unwrap();

    assert_eq!(id, tkt(1010));
    let ticket = console.state().ticket(&id).unwrap();
    assert_eq!(ticket.status, TicketStatus::Issued);
    assert_eq!(ticket.due_date, today() + Duration::days(14));
    assert_eq!(ticket.officer_name, "Officer John Doe");
    assert!(ticket.workflow().stage(StageName::Issued).is_completed());
    assert!(!ticket.workflow().stage(StageName::Reviewed).is_completed());

    let payments: Vec<_> = console.state().payments_for(&id).collect();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount, Money::from_dollars(50));
    assert_eq!(payments[0].status, PaymentStatus::Pending);

    assert_eq!(console.state().route.screen, Screen::TicketDetail);
    assert_eq!(console.view(), View::TicketDetail(id));
}

#[test]
fn configured_due_days_apply_to_new_tickets() {
    let mut console = console_with(ConsoleConfig {
        payment_due_days: 30,
        ..ConsoleConfig::default()
    });
    let id = console.create_ticket(draft(&console)).unwrap();
    assert_eq!(
        console.state().ticket(&id).unwrap().due_date,
        today() + Duration::days(30)
    );
}

#[test]
fn invalid_ticket_is_rejected_without_changes() {
    let mut console = console();
    let before = console.state().clone();

    let error = console
        .create_ticket(TicketDraft {
            fine_amount: Some(Money::ZERO),
            officer_id: None,
            ..draft(&console)
        })
        .unwrap_err();

    let errors = error.validation_errors().unwrap();
    assert!(errors.has(Field::FineAmount));
    assert!(errors.has(Field::OfficerId));
    assert_eq!(console.state(), &before);
}

#[test]
fn mark_paid_settles_existing_payment() {
    let mut console = console();
    let id = tkt(1000);
    let audit_before = console.state().ticket(&id).unwrap().audit_log().len();

    console.mark_paid(&id).unwrap();

    let state = console.state();
    let ticket = state.ticket(&id).unwrap();
    assert_eq!(ticket.status, TicketStatus::Paid);
    assert_eq!(ticket.audit_log().len(), audit_before + 1);
    assert!(ticket.audit_log().last().unwrap().action.contains("Paid"));
    assert!(ticket.workflow().is_complete());

    let payment_id = ticket.payment_id.clone().unwrap();
    assert_eq!(payment_id.as_str(), "PMT-2000");
    let payment = state.payment(&payment_id).unwrap();
    assert_eq!(payment.status, PaymentStatus::Paid);
    assert_eq!(payment.method.as_deref(), Some("Manual"));
    assert_eq!(payment.paid_on, Some(today()));
    assert!(payment.transaction_id.as_deref().unwrap().starts_with("TRX-"));
    assert_eq!(state.payments.len(), 10);

    assert_eq!(state.route.params, id_param(&id));
}

#[test]
fn marking_paid_twice_is_an_invalid_transition() {
    let mut console = console();
    let id = tkt(1006);
    let before = console.state().clone();

    let error = console.mark_paid(&id).unwrap_err();

    assert!(matches!(
        error,
        ConsoleError::InvalidTransition {
            from: TicketStatus::Paid,
            to: TicketStatus::Paid,
            ..
        }
    ));
    assert_eq!(console.state(), &before);
}

#[test]
fn review_then_appeal_then_resolve() {
    let mut console = console();
    let id = tkt(1001);

    console.review_ticket(&id, "").unwrap();
    console.appeal_ticket(&id, "Signage obscured").unwrap();
    console.resolve_ticket(&id, "").unwrap();

    let ticket = console.state().ticket(&id).unwrap();
    assert_eq!(ticket.status, TicketStatus::Resolved);
    let details: Vec<_> = ticket.audit_log().iter().map(|e| e.details.as_str()).collect();
    assert!(details.contains(&"Evidence confirmed."));
    assert!(details.contains(&"Reason: Signage obscured"));
    assert!(ticket.workflow().stage(StageName::Closed).is_completed());

    assert!(console.reject_ticket(&id, "late").is_err());
}

#[test]
fn editing_a_ticket_records_changed_fields() {
    let mut console = console();
    let id = tkt(1002);
    console.navigate(Screen::EditTicket, id_param(&id)).unwrap();

    console
        .update_ticket(
            &id,
            TicketPatch {
                location: Some("Pier 9".to_string()),
                fine_amount: Some(Money::from_dollars(120)),
                ..TicketPatch::default()
            },
        )
        .unwrap();

    let ticket = console.state().ticket(&id).unwrap();
    assert_eq!(ticket.location, "Pier 9");
    let last = ticket.audit_log().last().unwrap();
    assert_eq!(last.action, "Ticket updated.");
    assert!(last.details.starts_with("Changes applied:"));
    assert_eq!(console.view(), View::TicketDetail(id));
}

#[test]
fn paid_status_requires_a_payment_reference() {
    let mut console = console();
    let error = console
        .update_ticket(
            &tkt(1000),
            TicketPatch {
                status: Some(TicketStatus::Paid),
                ..TicketPatch::default()
            },
        )
        .unwrap_err();
    assert!(error.validation_errors().unwrap().has(Field::Status));
}

#[test]
fn deleting_a_ticket_returns_to_the_list_and_keeps_payments() {
    let mut console = console();
    let id = tkt(1003);
    console.delete_ticket(&id).unwrap();

    assert!(console.state().ticket(&id).is_none());
    assert_eq!(console.state().payments_for(&id).count(), 1);
    assert_eq!(console.view(), View::TicketsList);

    console.navigate(Screen::TicketDetail, id_param(&id)).unwrap();
    assert_eq!(
        console.view(),
        View::EntityNotFound {
            entity: parking_console::error::Entity::Ticket,
            id: Some(id.to_string()),
        }
    );
    assert!(matches!(
        console.delete_ticket(&id),
        Err(ConsoleError::NotFound { .. })
    ));
}

#[test]
fn unknown_screen_resolves_to_not_found() {
    let mut console = console();
    console
        .navigate(Screen::parse("UNKNOWN_SCREEN"), Params::new())
        .unwrap();
    assert_eq!(
        console.view(),
        View::NotFound {
            screen: "UNKNOWN_SCREEN".to_string()
        }
    );
}

#[test]
fn audit_log_screen_lists_every_entry() {
    let mut console = console();
    console.navigate(Screen::AuditLog, Params::new()).unwrap();
    assert_eq!(console.view(), View::AuditLog);

    let entries: usize = console.state().tickets.iter().map(|t| t.audit_log().len()).sum();
    let feed = console.audit_feed();
    assert_eq!(feed.len(), entries);
    assert!(feed.len() > console.dashboard().recent_activity.len());
}

#[test]
fn officer_search_by_badge() {
    let console = console();
    let found = console.officers_view("OPD-101");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Officer John Doe");
    assert_eq!(console.officers_view("opd-101").len(), 1);
    assert_eq!(console.officers_view("").len(), 5);
}

#[test]
fn paid_filter_on_demo_data() {
    let mut console = console();
    console.set_status_filter(StatusFilter::Only(TicketStatus::Paid)).unwrap();

    let paid: Vec<String> = console.tickets_view().iter().map(|t| t.id.to_string()).collect();
    assert_eq!(paid.len(), 2);
    assert!(paid.contains(&"TKT-1006".to_string()));
    assert!(paid.contains(&"TKT-1007".to_string()));
}

#[test]
fn ticket_search_ignores_case_across_fields() {
    let mut console = console();

    console.set_search("xyz-789").unwrap();
    assert_eq!(console.tickets_view().len(), 2);
    console.set_search("officer jane").unwrap();
    assert_eq!(console.tickets_view().len(), 2);
    console.set_search("double PARKING").unwrap();
    assert_eq!(console.tickets_view().len(), 2);
    console.set_search("Tkt-1009").unwrap();
    assert_eq!(console.tickets_view().len(), 1);
}

#[test]
fn deleting_an_officer_leaves_their_tickets_alone() {
    let mut console = console();
    let officer = console.state().officers[1].clone();
    let before: Vec<_> = console
        .state()
        .tickets
        .iter()
        .filter(|t| t.officer_id == officer.id)
        .cloned()
        .collect();
    assert_eq!(before.len(), 2);

    console.delete_officer(&officer.id).unwrap();

    assert!(console.state().officer(&officer.id).is_none());
    let after: Vec<_> = console
        .state()
        .tickets
        .iter()
        .filter(|t| t.officer_id == officer.id)
        .cloned()
        .collect();
    assert_eq!(after, before);
    assert_eq!(after[0].officer_name, "Officer Jane Smith");
}

#[test]
fn officer_lifecycle() {
    let mut console = console();
    let id = console
        .create_officer(OfficerDraft {
            badge_id: "OPD-106".to_string(),
            name: "Officer Ana Lee".to_string(),
            email: "ana.lee@city.gov".to_string(),
            phone: "555-0106".to_string(),
            status: OfficerStatus::Active,
        })
        .unwrap();
    assert_eq!(console.state().officers.len(), 6);

    let duplicate = console
        .create_officer(OfficerDraft {
            badge_id: "OPD-106".to_string(),
            name: "Someone Else".to_string(),
            ..OfficerDraft::default()
        })
        .unwrap_err();
    assert!(duplicate.validation_errors().unwrap().has(Field::BadgeId));

    console.delete_officer(&id).unwrap();
    assert!(console.state().officer(&id).is_none());
    assert_eq!(console.view(), View::OfficersList);
}

#[test]
fn payment_views_derive_overdue() {
    let mut console = console();
    let rows = console.payments_view("");
    assert_eq!(rows.len(), 10);
    // TKT-1002 was issued 25 days before the test date.
    assert!(rows.iter().any(|row| row.status == PaymentStatus::Overdue));
    assert!(
        rows.iter()
            .all(|row| row.payment.status != PaymentStatus::Overdue)
    );

    let id = console
        .create_payment(PaymentDraft {
            ticket_id: Some(tkt(1000)),
            amount: Some(Money::from_dollars(10)),
            payer_name: "Pat Doe".to_string(),
            ..PaymentDraft::default()
        })
        .unwrap();
    assert_eq!(console.payments_view("pat doe")[0].payment.id, id);

    console.delete_payment(&id).unwrap();
    assert!(console.state().payment(&id).is_none());
    assert_eq!(console.view(), View::PaymentsList);
}

#[test]
fn signed_out_console_refuses_mutations_and_keeps_route() {
    let mut console = console();
    console.logout().unwrap();

    assert_eq!(console.state().route.screen, Screen::Login);
    assert_eq!(console.view(), View::LoginRequired);

    let before = console.state().clone();
    let error = console.create_ticket(draft(&console)).unwrap_err();
    assert!(matches!(error, ConsoleError::LoginRequired));
    assert_eq!(console.state(), &before);

    console.navigate(Screen::TicketsList, Params::new()).unwrap();
    assert_eq!(console.view(), View::LoginRequired);

    console.login().unwrap();
    assert_eq!(console.view(), View::TicketsList);
}

#[test]
fn list_query_filters_and_sorts() {
    let mut console = console();
    console
        .set_status_filter(StatusFilter::Only(TicketStatus::Issued))
        .unwrap();
    console.sort_by(SortKey::FineAmount).unwrap();

    let fines: Vec<Money> = console.tickets_view().iter().map(|t| t.fine_amount).collect();
    assert_eq!(fines.len(), 3);
    assert!(fines.windows(2).all(|w| w[0] <= w[1]));

    console.sort_by(SortKey::FineAmount).unwrap();
    let fines: Vec<Money> = console.tickets_view().iter().map(|t| t.fine_amount).collect();
    assert!(fines.windows(2).all(|w| w[0] >= w[1]));

    console.set_search("no-such-plate").unwrap();
    assert!(console.tickets_view().is_empty());
}

#[test]
fn dispatch_limit_rolls_back_the_whole_send() {
    let mut console = console_with(ConsoleConfig {
        max_dispatch_depth: 0,
        ..ConsoleConfig::default()
    });
    let before = console.state().clone();

    let error = console.create_ticket(draft(&console)).unwrap_err();

    assert!(matches!(error, ConsoleError::DispatchLimitExceeded { limit: 0 }));
    assert_eq!(console.state(), &before);
}

#[test]
fn create_needs_room_for_payment_and_screen_change() {
    let mut console = console_with(ConsoleConfig {
        max_dispatch_depth: 1,
        ..ConsoleConfig::default()
    });
    let before = console.state().clone();

    let error = console.create_ticket(draft(&console)).unwrap_err();
    assert!(matches!(error, ConsoleError::DispatchLimitExceeded { limit: 1 }));
    assert_eq!(console.state(), &before);

    console.delete_ticket(&tkt(1000)).unwrap();
    assert_eq!(console.view(), View::TicketsList);
}

#[test]
fn dashboard_reflects_mutations() {
    let mut console = console();
    let before = console.dashboard();

    console.mark_paid(&tkt(1000)).unwrap();

    let after = console.dashboard();
    assert_eq!(after.total_tickets, before.total_tickets);
    assert_eq!(after.issued, before.issued - 1);
    assert!(after.collected_fines > before.collected_fines);
    assert!(after.compliance_rate > before.compliance_rate);
    assert_eq!(after.recent_activity.len(), 10);
    assert!(
        after
            .recent_activity
            .iter()
            .any(|a| a.ticket_id == tkt(1000) && a.entry.action.contains("Paid"))
    );
}

#[test]
fn state_serializes_to_json() {
    let console = console();
    let json = console.snapshot_json().unwrap();
    assert!(json.contains("\"nextTicketNumber\":1010"));
    assert!(json.contains("TKT-1000"));
}
