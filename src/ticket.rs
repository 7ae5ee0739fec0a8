// src/ticket.rs
// Single-ticket generation and validation for the tambola core.
//
// A ticket is a 3x9 grid holding 15 numbers: 5 per row, 1-3 per column,
// every number inside its column's legal range and each column sorted
// ascending top to bottom. Generation is randomized with a bounded retry
// budget and a deterministic fallback, so a returned ticket is always valid.

use crate::defs::{
    Number, MAX_PER_COLUMN, MAX_TICKET_ATTEMPTS, MIN_PER_COLUMN, NUMBERS_PER_ROW,
    NUMBERS_PER_TICKET, TICKET_COLS, TICKET_ROWS, column_range,
};
use crate::logging::log_warning;

use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

use rand::Rng;
use rand::rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// TICKET_ROWS rows x TICKET_COLS columns; `None` is the canonical blank.
pub type Ticket = Vec<Vec<Option<Number>>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketWithId {
    pub id: u64,
    pub ticket: Ticket,
}

/// A specific rule broken by a grid, as reported by `validate_ticket`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleViolation {
    WrongRowCount { rows: usize },
    WrongRowLength { row: usize, cells: usize },
    WrongTotalNumbers { total: usize },
    WrongRowNumbers { row: usize, numbers: usize },
    ColumnCountOutOfRange { col: usize, numbers: usize },
    NumberOutsideColumnRange { col: usize, number: Number },
    ColumnNotAscending { col: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<RuleViolation>,
    pub row_counts: Vec<usize>,
    pub column_counts: Vec<usize>,
}

/// Check every ticket rule and return a structured report.
/// Usable on externally constructed grids as well as generator output.
pub fn validate_ticket(ticket: &Ticket) -> ValidationReport {
    let mut violations = Vec::new();

    if ticket.len() != TICKET_ROWS {
        violations.push(RuleViolation::WrongRowCount { rows: ticket.len() });
    }
    for (row_idx, row) in ticket.iter().enumerate() {
        if row.len() != TICKET_COLS {
            violations.push(RuleViolation::WrongRowLength {
                row: row_idx,
                cells: row.len(),
            });
        }
    }

    let row_counts: Vec<usize> = ticket
        .iter()
        .map(|row| row.iter().filter(|cell| cell.is_some()).count())
        .collect();
    for (row_idx, &count) in row_counts.iter().enumerate() {
        if count != NUMBERS_PER_ROW {
            violations.push(RuleViolation::WrongRowNumbers {
                row: row_idx,
                numbers: count,
            });
        }
    }

    let total: usize = row_counts.iter().sum();
    if total != NUMBERS_PER_TICKET {
        violations.push(RuleViolation::WrongTotalNumbers { total });
    }

    let mut column_counts = vec![0usize; TICKET_COLS];
    for col in 0..TICKET_COLS {
        let values: Vec<Number> = ticket
            .iter()
            .filter_map(|row| row.get(col).copied().flatten())
            .collect();
        column_counts[col] = values.len();

        if !(MIN_PER_COLUMN..=MAX_PER_COLUMN).contains(&values.len()) {
            violations.push(RuleViolation::ColumnCountOutOfRange {
                col,
                numbers: values.len(),
            });
        }

        let (low, high) = column_range(col);
        for &number in &values {
            if number < low || number > high {
                violations.push(RuleViolation::NumberOutsideColumnRange { col, number });
            }
        }

        // Strictly ascending from row 0 to row 2: no ties, no inversions.
        if values.windows(2).any(|pair| pair[0] >= pair[1]) {
            violations.push(RuleViolation::ColumnNotAscending { col });
        }
    }

    ValidationReport {
        valid: violations.is_empty(),
        violations,
        row_counts,
        column_counts,
    }
}

/// Generate one valid ticket. Randomized layout, guaranteed validity:
/// after MAX_TICKET_ATTEMPTS failed randomized attempts the deterministic
/// template fallback takes over.
pub fn generate_ticket() -> Ticket {
    let mut rng = rng();

    for _ in 0..MAX_TICKET_ATTEMPTS {
        let counts = random_column_counts(&mut rng);
        if let Some(ticket) = build_candidate(&counts, &mut rng) {
            return ticket;
        }
    }

    fallback_ticket()
}

/// Content-hash id for a ticket; blanks hash as 0, so the id is stable
/// across serialization round trips.
pub fn ticket_id(ticket: &Ticket) -> u64 {
    let mut hasher = DefaultHasher::new();
    for row in ticket {
        for cell in row {
            match cell {
                Some(number) => hasher.write_u8(*number),
                None => hasher.write_u8(0),
            }
        }
    }
    hasher.finish()
}

/// Generate `requested` independent tickets with unique content ids.
/// Duplicate layouts are regenerated up to the retry budget; on exhaustion
/// the batch is returned as-is with a logged warning.
pub fn generate_tickets(requested: usize) -> Vec<TicketWithId> {
    let mut tickets: Vec<TicketWithId> = Vec::with_capacity(requested);
    let mut seen_ids: HashSet<u64> = HashSet::new();
    let mut regenerations = 0usize;

    while tickets.len() < requested {
        let ticket = generate_ticket();
        let id = ticket_id(&ticket);
        if seen_ids.contains(&id) {
            regenerations += 1;
            if regenerations > MAX_TICKET_ATTEMPTS {
                log_warning(&format!(
                    "could not avoid duplicate ticket ids after {MAX_TICKET_ATTEMPTS} regenerations, keeping duplicate"
                ));
            } else {
                continue;
            }
        }
        seen_ids.insert(id);
        tickets.push(TicketWithId { id, ticket });
    }

    tickets
}

/// All numbers on a ticket in row-major order.
pub fn ticket_numbers(ticket: &Ticket) -> Vec<Number> {
    ticket
        .iter()
        .flat_map(|row| row.iter().copied().flatten())
        .collect()
}

// Column-count distribution for one ticket: every column starts at 1, the
// remaining 6 units go to distinct random columns, then occasionally one
// column is promoted to 3 by stealing a unit from another.
fn random_column_counts(rng: &mut impl Rng) -> Vec<usize> {
    let mut counts = vec![MIN_PER_COLUMN; TICKET_COLS];

    let mut cols: Vec<usize> = (0..TICKET_COLS).collect();
    cols.shuffle(rng);
    for &col in cols.iter().take(NUMBERS_PER_TICKET - TICKET_COLS) {
        counts[col] += 1;
    }

    if rng.random_bool(0.5) {
        let mut twos: Vec<usize> = (0..TICKET_COLS).filter(|&c| counts[c] == 2).collect();
        twos.shuffle(rng);
        if twos.len() >= 2 {
            counts[twos[0]] += 1;
            counts[twos[1]] -= 1;
        }
    }

    counts
}

// One randomized construction attempt: draw numbers per column into random
// rows, balance the rows, sort the columns, validate.
fn build_candidate(counts: &[usize], rng: &mut impl Rng) -> Option<Ticket> {
    let mut ticket: Ticket = vec![vec![None; TICKET_COLS]; TICKET_ROWS];

    for (col, &count) in counts.iter().enumerate() {
        let (low, high) = column_range(col);
        let mut pool: Vec<Number> = (low..=high).collect();
        pool.shuffle(rng);

        let mut rows: Vec<usize> = (0..TICKET_ROWS).collect();
        rows.shuffle(rng);

        for (&number, &row) in pool.iter().zip(rows.iter()).take(count) {
            ticket[row][col] = Some(number);
        }
    }

    if !balance_rows(&mut ticket) {
        return None;
    }
    sort_columns(&mut ticket);

    validate_ticket(&ticket).valid.then_some(ticket)
}

// Row-balance repair: while some row holds more than NUMBERS_PER_ROW numbers
// and another holds fewer, move one number from the over-full row to the
// under-full row.
//
// Preferred move keeps the number in its own column (the destination row has
// a free cell there, so the column range and count are untouched). When no
// same-column move exists the number is relocated into another column that
// has a free destination cell, spare capacity and an unused legal value.
// Each move shrinks the imbalance, so the loop terminates quickly.
pub(crate) fn balance_rows(ticket: &mut Ticket) -> bool {
    // Generous bound: every successful move reduces the row imbalance by 2.
    for _ in 0..(NUMBERS_PER_TICKET * 2) {
        let row_counts: Vec<usize> = ticket
            .iter()
            .map(|row| row.iter().filter(|cell| cell.is_some()).count())
            .collect();

        let over = row_counts.iter().position(|&c| c > NUMBERS_PER_ROW);
        let under = row_counts.iter().position(|&c| c < NUMBERS_PER_ROW);
        let (over, under) = match (over, under) {
            (Some(o), Some(u)) => (o, u),
            _ => return row_counts.iter().all(|&c| c == NUMBERS_PER_ROW),
        };

        if !move_between_rows(ticket, over, under) {
            return false;
        }
    }
    false
}

fn move_between_rows(ticket: &mut Ticket, over: usize, under: usize) -> bool {
    // Same-column move first.
    for col in 0..TICKET_COLS {
        if ticket[over][col].is_some() && ticket[under][col].is_none() {
            ticket[under][col] = ticket[over][col].take();
            return true;
        }
    }

    // Relocate into a different column with capacity and an unused legal value.
    for src in 0..TICKET_COLS {
        if ticket[over][src].is_none() || column_count(ticket, src) <= MIN_PER_COLUMN {
            continue;
        }
        for dst in 0..TICKET_COLS {
            if dst == src
                || ticket[under][dst].is_some()
                || column_count(ticket, dst) >= MAX_PER_COLUMN
            {
                continue;
            }
            if let Some(number) = unused_value_in_column(ticket, dst) {
                ticket[over][src] = None;
                ticket[under][dst] = Some(number);
                return true;
            }
        }
    }

    false
}

fn column_count(ticket: &Ticket, col: usize) -> usize {
    ticket.iter().filter(|row| row[col].is_some()).count()
}

fn unused_value_in_column(ticket: &Ticket, col: usize) -> Option<Number> {
    let (low, high) = column_range(col);
    let used: HashSet<Number> = ticket.iter().filter_map(|row| row[col]).collect();
    (low..=high).find(|number| !used.contains(number))
}

// Re-seat each column's values ascending across its occupied rows.
pub(crate) fn sort_columns(ticket: &mut Ticket) {
    for col in 0..TICKET_COLS {
        let rows: Vec<usize> = (0..TICKET_ROWS)
            .filter(|&row| ticket[row][col].is_some())
            .collect();
        let mut values: Vec<Number> = rows.iter().filter_map(|&row| ticket[row][col]).collect();
        values.sort_unstable();
        for (&row, &value) in rows.iter().zip(values.iter()) {
            ticket[row][col] = Some(value);
        }
    }
}

// Deterministic fallback: a known-valid column-count template, shuffled for
// variety. The template keeps every column in 1..=3 and sums to 15, and the
// greedy least-filled-row placement leaves at most a local imbalance that the
// same-column repair always resolves.
fn fallback_ticket() -> Ticket {
    let mut rng = rng();
    let mut template: Vec<usize> = vec![2, 2, 2, 1, 2, 1, 2, 2, 1];

    loop {
        template.shuffle(&mut rng);
        debug_assert_eq!(template.iter().sum::<usize>(), NUMBERS_PER_TICKET);

        let mut ticket: Ticket = vec![vec![None; TICKET_COLS]; TICKET_ROWS];
        for (col, &count) in template.iter().enumerate() {
            let (low, high) = column_range(col);
            let mut pool: Vec<Number> = (low..=high).collect();
            pool.shuffle(&mut rng);
            for &number in pool.iter().take(count) {
                let row = least_filled_free_row(&ticket, col);
                ticket[row][col] = Some(number);
            }
        }

        if balance_rows(&mut ticket) {
            sort_columns(&mut ticket);
            if validate_ticket(&ticket).valid {
                return ticket;
            }
        }
    }
}

// The row with the fewest numbers among rows still free in this column.
pub(crate) fn least_filled_free_row(ticket: &Ticket, col: usize) -> usize {
    (0..TICKET_ROWS)
        .filter(|&row| ticket[row][col].is_none())
        .min_by_key(|&row| ticket[row].iter().filter(|cell| cell.is_some()).count())
        .unwrap_or(0)
}
