// src/terminal.rs
// Terminal rendering of tickets, sheets and live-game state for the CLI.

use crate::calls::CalledSet;
use crate::defs::Number;
use crate::sheet::FullSheet;
use crate::ticket::{Ticket, TicketWithId, validate_ticket};

use std::collections::HashSet;

/// Print one ticket grid. Called numbers render bold yellow, the latest call
/// bold green, blanks as dots.
pub fn print_ticket(ticket: &Ticket, called: &HashSet<Number>, latest: Option<Number>) {
    for row in ticket {
        for cell in row {
            match cell {
                Some(number) if Some(*number) == latest => {
                    print!("\x1b[1;32m{number:3}\x1b[0m ");
                }
                Some(number) if called.contains(number) => {
                    print!("\x1b[1;33m{number:3}\x1b[0m ");
                }
                Some(number) => print!("{number:3} "),
                None => print!("  . "),
            }
        }
        println!();
    }
}

pub fn print_ticket_with_id(ticket: &TicketWithId, called: &HashSet<Number>) {
    let valid = validate_ticket(&ticket.ticket).valid;
    println!(
        "=== TICKET (ID: {:016X}) {} ===",
        ticket.id,
        if valid { "✓" } else { "✗" }
    );
    print_ticket(&ticket.ticket, called, None);
    println!();
}

pub fn print_sheet(sheet: &FullSheet, called: &HashSet<Number>) {
    println!("=== FULL SHEET (ID: {:016X}) ===", sheet.id);
    for (idx, ticket) in sheet.tickets.iter().enumerate() {
        println!("--- position {} (ID: {:016X}) ---", idx + 1, ticket.id);
        print_ticket(&ticket.ticket, called, None);
    }
    println!();
}

/// One call's worth of live-game output: latest number, a few previous ones
/// and the running count.
pub fn show_call(calls: &CalledSet, remaining: usize) {
    if let Some(latest) = calls.last() {
        println!("Called: \x1b[1;32m{latest}\x1b[0m");
    }
    let previous = calls.recent(3);
    if !previous.is_empty() {
        println!("Previous numbers: {previous:?}");
    }
    println!("{} called, {} left in the pouch", calls.len(), remaining);
}

pub fn announce_win(pattern_name: &str, ticket_ids: &[u64], call_count: usize) {
    let ids: Vec<String> = ticket_ids.iter().map(|id| format!("{id:016X}")).collect();
    println!(
        "\x1b[1;33m{pattern_name} won on call {call_count} by ticket(s) {}\x1b[0m",
        ids.join(", ")
    );
}
