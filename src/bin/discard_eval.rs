//! Discard evaluation CLI.
//!
//! Usage:
//!   discard_eval --hand "123m456m789m123p56p" [--depth 3] [--json] [options]

use std::time::Instant;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use dahai::hand::parse_hand;
use dahai::search::{Candidate, DiscardEvaluator, SearchConfig};

#[derive(Parser, Debug)]
#[command(
    name = "discard_eval",
    about = "Exhaustive discard evaluation for a 14-tile riichi hand"
)]
struct Args {
    /// The 14-tile hand, e.g. "123m456m789m123p56p" or "1m 2m 3m ...".
    #[arg(long)]
    hand: String,

    /// Number of future draws to look ahead.
    #[arg(long, default_value = "3")]
    depth: usize,

    /// Number of rayon threads (0 = auto).
    #[arg(long, default_value = "0")]
    threads: usize,

    /// Emit the full evaluation as JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// Sort the table by expected value instead of tile order.
    #[arg(long)]
    sort: bool,

    /// Print a progress line per evaluated discard.
    #[arg(long)]
    progress: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .context("failed to configure rayon thread pool")?;
    }

    let hand = parse_hand(&args.hand).context("failed to parse hand")?;
    ensure!(
        hand.len() == 14,
        "expected 14 tiles, got {}: {:?}",
        hand.len(),
        hand,
    );

    let mut config = SearchConfig::new(args.depth);
    config.report_progress = args.progress;
    let evaluator = DiscardEvaluator::standard(config);

    eprintln!("=== Discard Evaluation ===");
    eprintln!("Hand:    {}", join_tiles(&hand));
    eprintln!("Depth:   {} draws", args.depth);
    eprintln!();

    let start = Instant::now();
    let result = evaluator.evaluate(&hand)?;
    let elapsed = start.elapsed();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let mut rows: Vec<&Candidate> = result.candidates.iter().collect();
    if args.sort {
        rows.sort_by(|a, b| a.cmp_rank(b));
    }

    print_table(&rows);

    let best = result.best_candidate();
    println!();
    println!(
        ">> Best discard: {} (EV {:.2}, P(win) {:.4})",
        best.tile, best.exp_value, best.win_prob,
    );
    match &result.global_best {
        Some(global) => {
            println!(
                ">> Highest scoring trajectory: discard {}, draw [{}] -> {} points",
                global.discard,
                join_tiles(&global.trajectory.draws),
                global.score,
            );
        }
        None => println!(">> No future within {} draws wins", result.depth),
    }

    eprintln!();
    eprintln!(
        "Evaluated {} candidates x {} sequences in {:.2}s",
        result.candidates.len(),
        result.candidates.first().map_or(0, |c| c.total_sequences),
        elapsed.as_secs_f64(),
    );

    Ok(())
}

fn print_table(rows: &[&Candidate]) {
    let header = Candidate::table_header();
    let table: Vec<Vec<String>> = rows.iter().map(|c| c.table_row()).collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in &table {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let line: Vec<String> = header
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{h:>w$}"))
        .collect();
    println!("{}", line.join("  "));

    for row in &table {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:>w$}"))
            .collect();
        println!("{}", line.join("  "));
    }
}

fn join_tiles(tiles: &[dahai::tile::Tile]) -> String {
    tiles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
