// src/main.rs
// Command-line entry point: generate tickets and sheets, validate grids and
// simulate a live game with winner detection after every call.

use std::collections::HashSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tambola::calls::CalledSet;
use tambola::config::GameConfig;
use tambola::detection::{
    PrizePattern, TicketBooking, evaluate_patterns, lucky_draw_eligible,
};
use tambola::logging::{log_error, log_info};
use tambola::pouch::Pouch;
use tambola::sheet::{FullSheet, generate_full_sheet};
use tambola::terminal;
use tambola::ticket::{Ticket, generate_tickets, validate_ticket};

#[derive(Parser)]
#[command(name = "tambola", about = "Tambola ticket generation and winner detection")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate standalone tickets
    Generate {
        /// How many tickets to generate
        #[arg(short, long, default_value_t = 1)]
        count: usize,
        /// Emit JSON instead of grids
        #[arg(long)]
        json: bool,
    },
    /// Generate full sheets of six tickets covering 1-90
    Sheet {
        /// How many sheets to generate
        #[arg(short, long, default_value_t = 1)]
        count: usize,
        /// Emit JSON instead of grids
        #[arg(long)]
        json: bool,
    },
    /// Validate a ticket grid stored as JSON (3x9 of numbers or nulls)
    Validate {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Simulate a game: book sheets, call numbers, detect winners
    Play {
        /// How many full sheets take part
        #[arg(short, long, default_value_t = 2)]
        sheets: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { count, json } => generate_command(count, json),
        Commands::Sheet { count, json } => sheet_command(count, json),
        Commands::Validate { file } => validate_command(&file),
        Commands::Play { sheets } => play_command(sheets),
    }
}

fn generate_command(count: usize, json: bool) {
    let tickets = generate_tickets(count);
    if json {
        match serde_json::to_string_pretty(&tickets) {
            Ok(output) => println!("{output}"),
            Err(e) => log_error(&format!("could not serialize tickets: {e}")),
        }
        return;
    }
    let no_calls = HashSet::new();
    for ticket in &tickets {
        terminal::print_ticket_with_id(ticket, &no_calls);
    }
}

fn sheet_command(count: usize, json: bool) {
    let sheets: Vec<FullSheet> = (0..count).map(|_| generate_full_sheet()).collect();
    if json {
        match serde_json::to_string_pretty(&sheets) {
            Ok(output) => println!("{output}"),
            Err(e) => log_error(&format!("could not serialize sheets: {e}")),
        }
        return;
    }
    let no_calls = HashSet::new();
    for sheet in &sheets {
        terminal::print_sheet(sheet, &no_calls);
    }
}

fn validate_command(file: &PathBuf) {
    let content = match std::fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) => {
            log_error(&format!("could not read {}: {e}", file.display()));
            std::process::exit(1);
        }
    };
    let ticket: Ticket = match serde_json::from_str(&content) {
        Ok(ticket) => ticket,
        Err(e) => {
            log_error(&format!("could not parse {}: {e}", file.display()));
            std::process::exit(1);
        }
    };

    let report = validate_ticket(&ticket);
    match serde_json::to_string_pretty(&report) {
        Ok(output) => println!("{output}"),
        Err(e) => log_error(&format!("could not serialize report: {e}")),
    }
    if !report.valid {
        std::process::exit(1);
    }
}

fn play_command(sheet_count: usize) {
    let config = GameConfig::load_or_default();
    log_info(&format!(
        "starting game with {sheet_count} sheet(s), patterns: {:?}",
        config.active_patterns
    ));

    // Each simulated holder books one full sheet.
    let sheets: Vec<FullSheet> = (0..sheet_count).map(|_| generate_full_sheet()).collect();
    let bookings: Vec<TicketBooking> = sheets
        .iter()
        .enumerate()
        .flat_map(|(idx, sheet)| {
            (1..=6).map(move |position| TicketBooking {
                sheet_id: sheet.id,
                position,
                holder: format!("holder{}", idx + 1),
            })
        })
        .collect();

    let mut pouch = Pouch::new();
    let mut calls = CalledSet::new();
    let mut retired: HashSet<PrizePattern> = HashSet::new();
    let mut full_house_winners: Vec<u64> = Vec::new();

    let callable: Vec<PrizePattern> = config
        .active_patterns
        .iter()
        .copied()
        .filter(|pattern| *pattern != PrizePattern::FullSheetLuckyDraw)
        .collect();

    while let Some(number) = pouch.extract() {
        calls.push(number);
        terminal::show_call(&calls, pouch.len());

        for sheet in &sheets {
            let results = evaluate_patterns(&sheet.tickets, calls.as_slice(), &config);
            for result in results {
                if !result.satisfied || retired.contains(&result.pattern) {
                    continue;
                }
                // Second full house goes to a ticket other than the first winner.
                let ticket_ids: Vec<u64> = if result.pattern == PrizePattern::SecondFullHouse {
                    if !retired.contains(&PrizePattern::FullHouse) {
                        continue;
                    }
                    result
                        .ticket_ids
                        .iter()
                        .copied()
                        .filter(|id| !full_house_winners.contains(id))
                        .collect()
                } else {
                    result.ticket_ids.clone()
                };
                if ticket_ids.is_empty() {
                    continue;
                }

                // First past the post: the pattern retires once announced.
                retired.insert(result.pattern);
                if result.pattern == PrizePattern::FullHouse {
                    full_house_winners = ticket_ids.clone();
                }
                terminal::announce_win(result.pattern.key(), &ticket_ids, calls.len());
            }
        }

        if callable.iter().all(|pattern| retired.contains(pattern)) {
            log_info(&format!("all prizes claimed after {} calls", calls.len()));
            break;
        }
    }

    if config.is_active(PrizePattern::FullSheetLuckyDraw) {
        let eligible = lucky_draw_eligible(&bookings);
        log_info(&format!("{} sheet(s) eligible for the lucky draw", eligible.len()));
        if !eligible.is_empty() {
            let winner = eligible[rand::random_range(0..eligible.len())];
            println!("Lucky draw winner: sheet {winner:016X}");
        }
    }
}
