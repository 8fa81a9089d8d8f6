//! Parking Console Demo
//!
//! Scripted walk through the console against the demo data:
//! - Dashboard figures
//! - Issuing a ticket (its payment opens automatically)
//! - Review, appeal and mark-paid transitions
//! - Filtering and sorting the ticket list
//! - Signing out
//!
//! # Usage
//!
//! ```bash
//! # Optional overrides
//! echo 'CONSOLE_PAYMENT_DUE_DAYS=30' > .env
//!
//! cargo run --bin demo
//! ```

use chrono::{Duration, Utc};
use parking_console::navigation::{Params, Screen};
use parking_console::query::{SortKey, StatusFilter};
use parking_console::types::{Money, TicketStatus, Vehicle};
use parking_console::{ConsoleConfig, ParkingConsole, TicketDraft, TicketPatch};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = ConsoleConfig::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    parking_console_runtime::metrics::register_metrics();

    println!("\n🚓 ============================================");
    println!("   Parking Console - Live Demo");
    println!("============================================\n");

    let mut console = ParkingConsole::new(config);

    // ========== Dashboard ==========

    let summary = console.dashboard();
    println!("📊 Dashboard");
    println!("   Total tickets:   {}", summary.total_tickets);
    println!("   Collected fines: {}", summary.collected_fines);
    println!("   Open appeals:    {}", summary.open_appeals);
    println!("   Compliance:      {:.1}%\n", summary.compliance_rate);

    // ========== Issue a ticket ==========

    println!("1️⃣  Issuing a ticket...");
    let officer = console
        .officers_view("OPD-101")
        .first()
        .map(|officer| officer.id.clone());
    let today = Utc::now().date_naive();
    let ticket_id = console.create_ticket(TicketDraft {
        violation_type: "Expired Meter".to_string(),
        violation_code: "VMT-002".to_string(),
        fine_amount: Some("50.00".parse::<Money>()?),
        vehicle: Vehicle {
            license_plate: "DEMO-42".to_string(),
            make: "Subaru".to_string(),
            model: "Outback".to_string(),
            color: "Green".to_string(),
        },
        officer_id: officer,
        location: "Harbor Rd & 3rd St".to_string(),
        issue_date: Some(today),
        due_date: Some(today + Duration::days(21)),
        ..TicketDraft::default()
    })?;
    println!("   ✓ {ticket_id} issued, route: {}", console.state().route.screen);
    for payment in console.state().payments_for(&ticket_id) {
        println!("   ✓ Payment {} opened for {}", payment.id, payment.amount);
    }

    // ========== Workflow ==========

    println!("\n2️⃣  Moving it through the workflow...");
    console.review_ticket(&ticket_id, "")?;
    console.appeal_ticket(&ticket_id, "Meter was broken.")?;
    console.update_ticket(
        &ticket_id,
        TicketPatch {
            notes: Some("Meter 17 reported faulty by citizen.".to_string()),
            ..TicketPatch::default()
        },
    )?;
    console.mark_paid(&ticket_id)?;
    if let Some(ticket) = console.state().ticket(&ticket_id) {
        println!(
            "   ✓ {} is {} ({:.0}% through workflow)",
            ticket.id,
            ticket.status,
            ticket.workflow().progress() * 100.0
        );
        for entry in ticket.audit_log() {
            println!("     - {} [{}] {}", entry.action, entry.actor, entry.details);
        }
    }

    // An invalid transition is rejected and nothing changes.
    if let Err(error) = console.review_ticket(&ticket_id, "") {
        println!("   ✗ Rejected as expected: {error}");
    }

    // ========== List queries ==========

    println!("\n3️⃣  Filtering tickets...");
    console.set_status_filter(StatusFilter::Only(TicketStatus::Issued))?;
    console.sort_by(SortKey::FineAmount)?;
    for ticket in console.tickets_view() {
        println!("   {} {:>8} {}", ticket.id, ticket.fine_amount.to_string(), ticket.vehicle.license_plate);
    }

    println!("\n4️⃣  Payments for John Citizen...");
    for row in console.payments_view("john").iter().take(5) {
        println!("   {} {:>8} {}", row.payment.id, row.payment.amount.to_string(), row.badge.label);
    }

    // ========== Navigation ==========

    println!("\n5️⃣  Navigating...");
    console.navigate(Screen::parse("REPORTS"), Params::new())?;
    println!("   REPORTS → {:?}", console.view());
    console.logout()?;
    println!("   After logout → {:?}", console.view());
    match console.delete_ticket(&ticket_id) {
        Err(error) => println!("   ✗ {error}"),
        Ok(()) => println!("   ! delete succeeded while signed out"),
    }

    info!(bytes = console.snapshot_json()?.len(), "Final state serialized");

    println!("\n✓ Demo complete\n");
    Ok(())
}
