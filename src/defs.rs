// src/defs.rs
// Shared type aliases and grid constants for the tambola core.

pub type Number = u8;

pub const FIRSTNUMBER: Number = 1;
pub const LASTNUMBER: Number = 90;

pub const TICKET_ROWS: usize = 3; // rows in a ticket
pub const TICKET_COLS: usize = 9; // columns in a ticket
pub const NUMBERS_PER_TICKET: usize = 15;
pub const NUMBERS_PER_ROW: usize = 5;
pub const MIN_PER_COLUMN: usize = 1;
pub const MAX_PER_COLUMN: usize = 3;
pub const TICKETS_PER_SHEET: usize = 6;

// Bounded retry budgets for the randomized generators; when a budget is
// exhausted the deterministic fallback construction takes over.
pub const MAX_TICKET_ATTEMPTS: usize = 100;
pub const MAX_SHEET_ATTEMPTS: usize = 200;

/// Inclusive legal number range for a ticket column.
/// Column 0 holds 1-9, columns 1-7 hold ten numbers each, column 8 holds 80-90.
pub const fn column_range(col: usize) -> (Number, Number) {
    match col {
        0 => (1, 9),
        8 => (80, 90),
        c => ((c * 10) as Number, (c * 10 + 9) as Number),
    }
}

/// Number of legal values in a column's range (9, 10 or 11).
pub const fn column_range_size(col: usize) -> usize {
    let (low, high) = column_range(col);
    (high - low + 1) as usize
}

/// Column a number belongs to on any ticket.
pub const fn column_for_number(number: Number) -> usize {
    match number {
        1..=9 => 0,
        80..=90 => 8,
        n => (n / 10) as usize,
    }
}
