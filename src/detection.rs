// src/detection.rs
// Winner-pattern detection for the tambola core.
//
// A cell is "marked" when it holds a number AND that number is a member of
// the called set. Detection is a pure read over tickets and called numbers:
// no state, no side effects, idempotent call to call. Malformed grids are
// treated as unsatisfiable instead of raised, since detection runs inside a
// live game loop on every call.

use crate::config::GameConfig;
use crate::defs::{Number, NUMBERS_PER_ROW, NUMBERS_PER_TICKET, TICKET_ROWS, TICKETS_PER_SHEET};
use crate::sheet::FullSheet;
use crate::ticket::{Ticket, TicketWithId};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Supported winning conditions. Structured variants instead of prize-name
/// string matching, so rule lookups cannot drift with display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrizePattern {
    TopLine,
    MiddleLine,
    BottomLine,
    EarlyFive,
    FourCorners,
    FullHouse,
    SecondFullHouse,
    FullSheetBonus,
    FullSheetLuckyDraw,
}

impl PrizePattern {
    pub const ALL: [PrizePattern; 9] = [
        PrizePattern::TopLine,
        PrizePattern::MiddleLine,
        PrizePattern::BottomLine,
        PrizePattern::EarlyFive,
        PrizePattern::FourCorners,
        PrizePattern::FullHouse,
        PrizePattern::SecondFullHouse,
        PrizePattern::FullSheetBonus,
        PrizePattern::FullSheetLuckyDraw,
    ];

    /// Configuration-file key for the pattern.
    pub fn key(self) -> &'static str {
        match self {
            PrizePattern::TopLine => "top_line",
            PrizePattern::MiddleLine => "middle_line",
            PrizePattern::BottomLine => "bottom_line",
            PrizePattern::EarlyFive => "early_five",
            PrizePattern::FourCorners => "four_corners",
            PrizePattern::FullHouse => "full_house",
            PrizePattern::SecondFullHouse => "second_full_house",
            PrizePattern::FullSheetBonus => "full_sheet_bonus",
            PrizePattern::FullSheetLuckyDraw => "full_sheet_lucky_draw",
        }
    }

    pub fn from_key(key: &str) -> Option<PrizePattern> {
        PrizePattern::ALL
            .into_iter()
            .find(|pattern| pattern.key() == key)
    }

    /// Sheet-level patterns are evaluated against a booking's six tickets
    /// rather than any single ticket.
    pub fn is_sheet_pattern(self) -> bool {
        matches!(
            self,
            PrizePattern::FullSheetBonus | PrizePattern::FullSheetLuckyDraw
        )
    }
}

/// Outcome for one pattern: satisfied or not, plus the ids of the tickets
/// that satisfy it (for the caller's winner record and tie-breaking).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternResult {
    pub pattern: PrizePattern,
    pub satisfied: bool,
    pub ticket_ids: Vec<u64>,
}

/// One booking's ticket on some sheet, as recorded by the booking layer.
/// Input to lucky-draw eligibility only; detection never stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketBooking {
    pub sheet_id: u64,
    pub position: u8,
    pub holder: String,
}

/// Evaluate every active pattern for one holder's tickets against the called
/// numbers. Pure function: identical inputs yield identical results, in the
/// order the config lists the patterns.
///
/// FullSheetBonus is evaluated when the slice holds a complete sheet of six
/// tickets. FullSheetLuckyDraw is administrative (see `lucky_draw_eligible`)
/// and always reports unsatisfied here.
pub fn evaluate_patterns(
    tickets: &[TicketWithId],
    called_numbers: &[Number],
    config: &GameConfig,
) -> Vec<PatternResult> {
    let called: HashSet<Number> = called_numbers.iter().copied().collect();

    config
        .active_patterns
        .iter()
        .map(|&pattern| match pattern {
            PrizePattern::FullSheetBonus => {
                let satisfied = sheet_bonus_satisfied(
                    tickets,
                    &called,
                    config.sheet_bonus_min_marks,
                );
                PatternResult {
                    pattern,
                    satisfied,
                    ticket_ids: if satisfied {
                        tickets.iter().map(|t| t.id).collect()
                    } else {
                        Vec::new()
                    },
                }
            }
            PrizePattern::FullSheetLuckyDraw => PatternResult {
                pattern,
                satisfied: false,
                ticket_ids: Vec::new(),
            },
            _ => {
                let ticket_ids: Vec<u64> = tickets
                    .iter()
                    .filter(|t| ticket_pattern_satisfied(&t.ticket, pattern, &called))
                    .map(|t| t.id)
                    .collect();
                PatternResult {
                    pattern,
                    satisfied: !ticket_ids.is_empty(),
                    ticket_ids,
                }
            }
        })
        .collect()
}

/// Per-candidate query: does this single ticket satisfy the pattern as of
/// the given called set? Sheet-level patterns are never satisfied by a
/// single ticket. Used by the calling layer to apply its own tie-break
/// across simultaneously eligible tickets.
pub fn pattern_satisfied(
    ticket: &Ticket,
    pattern: PrizePattern,
    called_numbers: &[Number],
) -> bool {
    if pattern.is_sheet_pattern() {
        return false;
    }
    let called: HashSet<Number> = called_numbers.iter().copied().collect();
    ticket_pattern_satisfied(ticket, pattern, &called)
}

/// Full Sheet Bonus: every one of the six tickets has at least `min_marks`
/// of its numbers called. No partial credit, no substitution across tickets.
pub fn sheet_bonus_satisfied(
    tickets: &[TicketWithId],
    called: &HashSet<Number>,
    min_marks: usize,
) -> bool {
    tickets.len() == TICKETS_PER_SHEET
        && tickets
            .iter()
            .all(|t| marked_count(&t.ticket, called) >= min_marks)
}

/// Convenience form of `sheet_bonus_satisfied` over a generated sheet.
pub fn sheet_bonus_for_sheet(
    sheet: &FullSheet,
    called_numbers: &[Number],
    min_marks: usize,
) -> bool {
    let called: HashSet<Number> = called_numbers.iter().copied().collect();
    sheet_bonus_satisfied(&sheet.tickets, &called, min_marks)
}

/// Lucky-draw eligibility: sheets where a single holder booked all six
/// positions. Returns the eligible sheet ids in first-seen order; the draw
/// itself is administrative and happens outside detection.
pub fn lucky_draw_eligible(bookings: &[TicketBooking]) -> Vec<u64> {
    let mut order: Vec<u64> = Vec::new();
    for booking in bookings {
        if !order.contains(&booking.sheet_id) {
            order.push(booking.sheet_id);
        }
    }

    order
        .into_iter()
        .filter(|&sheet_id| {
            let sheet_bookings: Vec<&TicketBooking> = bookings
                .iter()
                .filter(|b| b.sheet_id == sheet_id)
                .collect();
            if sheet_bookings.len() != TICKETS_PER_SHEET {
                return false;
            }
            let holder = &sheet_bookings[0].holder;
            if sheet_bookings.iter().any(|b| &b.holder != holder) {
                return false;
            }
            let positions: HashSet<u8> =
                sheet_bookings.iter().map(|b| b.position).collect();
            (1..=TICKETS_PER_SHEET as u8).all(|p| positions.contains(&p))
        })
        .collect()
}

/// Count of a ticket's numbers present in the called set.
pub fn marked_count(ticket: &Ticket, called: &HashSet<Number>) -> usize {
    ticket
        .iter()
        .flat_map(|row| row.iter().copied().flatten())
        .filter(|number| called.contains(number))
        .count()
}

fn ticket_pattern_satisfied(
    ticket: &Ticket,
    pattern: PrizePattern,
    called: &HashSet<Number>,
) -> bool {
    match pattern {
        PrizePattern::TopLine => line_satisfied(ticket, 0, called),
        PrizePattern::MiddleLine => line_satisfied(ticket, 1, called),
        PrizePattern::BottomLine => line_satisfied(ticket, 2, called),
        PrizePattern::EarlyFive => marked_count(ticket, called) >= NUMBERS_PER_ROW,
        PrizePattern::FourCorners => corners_satisfied(ticket, called),
        PrizePattern::FullHouse | PrizePattern::SecondFullHouse => {
            full_house_satisfied(ticket, called)
        }
        PrizePattern::FullSheetBonus | PrizePattern::FullSheetLuckyDraw => false,
    }
}

// A line is complete when the row holds its full complement of numbers and
// every one of them has been called. Short or empty rows (malformed input)
// are unsatisfiable rather than an error.
fn line_satisfied(ticket: &Ticket, row_idx: usize, called: &HashSet<Number>) -> bool {
    let Some(row) = ticket.get(row_idx) else {
        return false;
    };
    let numbers: Vec<Number> = row.iter().copied().flatten().collect();
    numbers.len() == NUMBERS_PER_ROW && numbers.iter().all(|number| called.contains(number))
}

// The four corner NUMBERS: first and last non-blank cell of the top row and
// of the bottom row, wherever they fall in the grid. Not the physical cells
// [0][0]/[0][8]/[2][0]/[2][8], which may well be blank.
fn corners_satisfied(ticket: &Ticket, called: &HashSet<Number>) -> bool {
    let Some(corners) = corner_numbers(ticket) else {
        return false;
    };
    corners.iter().all(|number| called.contains(number))
}

/// First/last non-blank numbers of the top and bottom rows. `None` when the
/// grid is malformed or a corner row holds no numbers at all.
pub fn corner_numbers(ticket: &Ticket) -> Option<[Number; 4]> {
    if ticket.len() != TICKET_ROWS {
        return None;
    }
    let ends = |row: &[Option<Number>]| -> Option<(Number, Number)> {
        let first = row.iter().copied().flatten().next()?;
        let last = row.iter().rev().copied().flatten().next()?;
        Some((first, last))
    };
    let (top_first, top_last) = ends(&ticket[0])?;
    let (bottom_first, bottom_last) = ends(&ticket[TICKET_ROWS - 1])?;
    Some([top_first, top_last, bottom_first, bottom_last])
}

// Strict full house: all 15 numbers called. A grid without exactly 15
// numbers never satisfies it.
fn full_house_satisfied(ticket: &Ticket, called: &HashSet<Number>) -> bool {
    let numbers: Vec<Number> = ticket
        .iter()
        .flat_map(|row| row.iter().copied().flatten())
        .collect();
    numbers.len() == NUMBERS_PER_TICKET
        && numbers.iter().all(|number| called.contains(number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::defs::TICKET_COLS;
    use crate::ticket::{generate_ticket, ticket_id, ticket_numbers};

    fn blank_grid() -> Ticket {
        vec![vec![None; TICKET_COLS]; TICKET_ROWS]
    }

    fn with_id(ticket: Ticket) -> TicketWithId {
        TicketWithId {
            id: ticket_id(&ticket),
            ticket,
        }
    }

    // Corner layout from the live-game regression: corners are the first and
    // last non-blank numbers of the top and bottom rows, {4, 61, 7, 75}.
    fn corner_ticket() -> Ticket {
        let mut ticket = blank_grid();
        ticket[0][0] = Some(4);
        ticket[0][2] = Some(22);
        ticket[0][4] = Some(45);
        ticket[0][6] = Some(61);
        ticket[2][0] = Some(7);
        ticket[2][3] = Some(35);
        ticket[2][5] = Some(52);
        ticket[2][7] = Some(75);
        ticket
    }

    #[test]
    fn test_corner_numbers_scan_not_grid_corners() {
        let ticket = corner_ticket();
        // Physical corners [0][8] and [2][8] are blank here.
        assert!(ticket[0][8].is_none());
        assert!(ticket[2][8].is_none());
        assert_eq!(corner_numbers(&ticket), Some([4, 61, 7, 75]));
    }

    #[test]
    fn test_four_corners_requires_all_four() {
        let ticket = corner_ticket();
        let everything_else = vec![4, 61, 7, 22, 45, 35, 52];

        let mut all_four = everything_else.clone();
        all_four.push(75);
        assert!(pattern_satisfied(&ticket, PrizePattern::FourCorners, &all_four));

        // 75 missing: unsatisfied no matter how much else is called.
        assert!(!pattern_satisfied(
            &ticket,
            PrizePattern::FourCorners,
            &everything_else
        ));
    }

    // Sparse bottom row: its single number is both first and last corner.
    #[test]
    fn test_four_corners_single_number_row() {
        let mut ticket = blank_grid();
        ticket[0][0] = Some(4);
        ticket[0][8] = Some(81);
        ticket[1][6] = Some(61);
        ticket[1][7] = Some(75);
        ticket[2][0] = Some(7);

        assert_eq!(corner_numbers(&ticket), Some([4, 81, 7, 7]));
        assert!(pattern_satisfied(
            &ticket,
            PrizePattern::FourCorners,
            &[4, 81, 7]
        ));
        assert!(!pattern_satisfied(
            &ticket,
            PrizePattern::FourCorners,
            &[4, 81, 61, 75]
        ));
    }

    // Live-game scenario: corners of a sparse grid are {4, 61, 7, 7} (the
    // bottom row holds 7 alone). Defensive path, so no range validation.
    #[test]
    fn test_four_corners_call_sequence() {
        let mut ticket = blank_grid();
        ticket[0][0] = Some(4);
        ticket[0][8] = Some(61);
        ticket[1][8] = Some(75);
        ticket[2][0] = Some(7);

        assert!(pattern_satisfied(
            &ticket,
            PrizePattern::FourCorners,
            &[1, 2, 3, 4, 5, 61, 7, 10, 15, 20]
        ));
        assert!(!pattern_satisfied(
            &ticket,
            PrizePattern::FourCorners,
            &[1, 2, 3, 4, 5, 61, 10, 15, 20]
        ));
    }

    #[test]
    fn test_four_corners_blank_row_unsatisfiable() {
        let mut ticket = blank_grid();
        ticket[0][0] = Some(4);
        // Bottom row entirely blank.
        assert_eq!(corner_numbers(&ticket), None);
        let every_number: Vec<Number> = (1..=90).collect();
        assert!(!pattern_satisfied(
            &ticket,
            PrizePattern::FourCorners,
            &every_number
        ));
    }

    #[test]
    fn test_lines_require_full_row() {
        let ticket = generate_ticket();
        let top: Vec<Number> = ticket[0].iter().copied().flatten().collect();

        assert!(pattern_satisfied(&ticket, PrizePattern::TopLine, &top));
        assert!(!pattern_satisfied(&ticket, PrizePattern::TopLine, &top[..4]));
        assert!(!pattern_satisfied(&ticket, PrizePattern::MiddleLine, &top));

        let middle: Vec<Number> = ticket[1].iter().copied().flatten().collect();
        let bottom: Vec<Number> = ticket[2].iter().copied().flatten().collect();
        assert!(pattern_satisfied(&ticket, PrizePattern::MiddleLine, &middle));
        assert!(pattern_satisfied(&ticket, PrizePattern::BottomLine, &bottom));
    }

    #[test]
    fn test_line_on_malformed_row_unsatisfiable() {
        let mut ticket = blank_grid();
        ticket[0][0] = Some(1);
        ticket[0][1] = Some(12);
        // Only two numbers in the row: never a line, never a panic.
        assert!(!pattern_satisfied(&ticket, PrizePattern::TopLine, &[1, 12]));
    }

    #[test]
    fn test_early_five() {
        let ticket = generate_ticket();
        let numbers = ticket_numbers(&ticket);
        assert!(pattern_satisfied(&ticket, PrizePattern::EarlyFive, &numbers[..5]));
        assert!(!pattern_satisfied(&ticket, PrizePattern::EarlyFive, &numbers[..4]));
    }

    #[test]
    fn test_full_house_strict() {
        let ticket = generate_ticket();
        let numbers = ticket_numbers(&ticket);
        assert_eq!(numbers.len(), 15);

        assert!(pattern_satisfied(&ticket, PrizePattern::FullHouse, &numbers));
        // 14 of 15 is not a full house.
        assert!(!pattern_satisfied(
            &ticket,
            PrizePattern::FullHouse,
            &numbers[..14]
        ));
        // Second full house uses the same completion predicate.
        assert!(pattern_satisfied(
            &ticket,
            PrizePattern::SecondFullHouse,
            &numbers
        ));
    }

    #[test]
    fn test_sheet_bonus_min_marks() {
        let sheet = crate::sheet::generate_full_sheet();

        // Exactly two marks on every ticket: satisfied with min_marks = 2.
        let mut called: Vec<Number> = Vec::new();
        for ticket in &sheet.tickets {
            called.extend(ticket_numbers(&ticket.ticket).into_iter().take(2));
        }
        assert!(sheet_bonus_for_sheet(&sheet, &called, 2));

        // Drop one ticket to a single mark: the whole bonus fails.
        let starved = ticket_numbers(&sheet.tickets[0].ticket)[1];
        let reduced: Vec<Number> = called.iter().copied().filter(|&n| n != starved).collect();
        assert!(!sheet_bonus_for_sheet(&sheet, &reduced, 2));

        // With min_marks = 1 the reduced set still qualifies.
        assert!(sheet_bonus_for_sheet(&sheet, &reduced, 1));
    }

    #[test]
    fn test_sheet_bonus_needs_six_tickets() {
        let sheet = crate::sheet::generate_full_sheet();
        let called: Vec<Number> = (1..=90).collect();
        let five = &sheet.tickets[..5];
        let called_set: HashSet<Number> = called.iter().copied().collect();
        assert!(!sheet_bonus_satisfied(five, &called_set, 2));
    }

    #[test]
    fn test_evaluate_patterns_idempotent() {
        let sheet = crate::sheet::generate_full_sheet();
        let config = GameConfig::default();
        let called: Vec<Number> = (1..=45).collect();

        let first = evaluate_patterns(&sheet.tickets, &called, &config);
        let second = evaluate_patterns(&sheet.tickets, &called, &config);
        assert_eq!(first, second);
        assert_eq!(first.len(), config.active_patterns.len());
    }

    #[test]
    fn test_evaluate_patterns_reports_ticket_ids() {
        let ticket = with_id(corner_ticket());
        let config = GameConfig {
            active_patterns: vec![PrizePattern::FourCorners, PrizePattern::FullHouse],
            sheet_bonus_min_marks: 2,
        };
        let results = evaluate_patterns(
            std::slice::from_ref(&ticket),
            &[4, 61, 7, 75],
            &config,
        );

        assert_eq!(results[0].pattern, PrizePattern::FourCorners);
        assert!(results[0].satisfied);
        assert_eq!(results[0].ticket_ids, vec![ticket.id]);

        assert_eq!(results[1].pattern, PrizePattern::FullHouse);
        assert!(!results[1].satisfied);
        assert!(results[1].ticket_ids.is_empty());
    }

    #[test]
    fn test_evaluate_patterns_full_called_set() {
        let sheet = crate::sheet::generate_full_sheet();
        let config = GameConfig::default();
        let called: Vec<Number> = (1..=90).collect();

        let results = evaluate_patterns(&sheet.tickets, &called, &config);
        for result in &results {
            match result.pattern {
                // Administrative pattern, never satisfied by called numbers.
                PrizePattern::FullSheetLuckyDraw => assert!(!result.satisfied),
                _ => assert!(result.satisfied, "pattern {:?}", result.pattern),
            }
        }
    }

    #[test]
    fn test_lucky_draw_eligibility() {
        let mut bookings: Vec<TicketBooking> = (1..=6)
            .map(|position| TicketBooking {
                sheet_id: 11,
                position,
                holder: "asha".to_string(),
            })
            .collect();
        // Second sheet split between two holders.
        for position in 1..=6 {
            bookings.push(TicketBooking {
                sheet_id: 22,
                position,
                holder: if position <= 3 { "ravi" } else { "meena" }.to_string(),
            });
        }
        // Third sheet same holder but only five positions booked.
        for position in 1..=5 {
            bookings.push(TicketBooking {
                sheet_id: 33,
                position,
                holder: "ravi".to_string(),
            });
        }

        assert_eq!(lucky_draw_eligible(&bookings), vec![11]);
    }

    #[test]
    fn test_pattern_keys_round_trip() {
        for pattern in PrizePattern::ALL {
            assert_eq!(PrizePattern::from_key(pattern.key()), Some(pattern));
        }
        assert_eq!(PrizePattern::from_key("no_such_pattern"), None);
    }
}
