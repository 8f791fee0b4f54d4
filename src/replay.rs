// Offline replay of debug-log entries
//
// Each logged turn carries the board, our snake and the food seen the turn
// before, which is everything the cascade reads. Replaying an entry runs the
// current cascade on it and compares with the move that was sent.

use log::{info, warn};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::debug_logger::DebugLogEntry;
use crate::decision::{decide_move, Reason};
use crate::types::{Coord, Direction};

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: i32,
    pub original_move: Direction,
    pub replayed_move: Direction,
    pub reason: Reason,
    pub matches: bool,
    pub computation_time_us: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
    /// How often each stage settled the replayed move, in first-seen order
    pub by_reason: Vec<(Reason, usize)>,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine { config, verbose }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<DebugLogEntry>, String> {
        let file = File::open(log_path.as_ref()).map_err(|e| format!("Failed to open log file: {}", e))?;
        self.parse_log(BufReader::new(file))
    }

    /// Parses JSONL log entries from any reader, skipping blank lines
    pub fn parse_log<R: BufRead>(&self, reader: R) -> Result<Vec<DebugLogEntry>, String> {
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: DebugLogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &DebugLogEntry) -> Result<ReplayResult, String> {
        if entry.you.body.is_empty() {
            return Err(format!("Turn {}: logged snake has no body", entry.turn));
        }

        let history: HashSet<Coord> = entry.previous_food.iter().copied().collect();
        let start_time = Instant::now();
        let decision = decide_move(
            &entry.game_id,
            entry.turn,
            &entry.board,
            &entry.you,
            &history,
            &self.config.decision,
        );
        let computation_time_us = start_time.elapsed().as_micros();

        let matches = decision.direction == entry.chosen_move;
        if self.verbose {
            if matches {
                info!(
                    "Turn {}: ✓ MATCH - {} ({:?}, {}us)",
                    entry.turn,
                    decision.direction.as_str(),
                    decision.reason,
                    computation_time_us
                );
            } else {
                warn!(
                    "Turn {}: ✗ MISMATCH - Original: {} ({}), Replayed: {} ({:?})",
                    entry.turn,
                    entry.chosen_move.as_str(),
                    entry.reason,
                    decision.direction.as_str(),
                    decision.reason
                );
            }
        }

        Ok(ReplayResult {
            turn: entry.turn,
            original_move: entry.chosen_move,
            replayed_move: decision.direction,
            reason: decision.reason,
            matches,
            computation_time_us,
        })
    }

    /// Replays all entries in a log file
    pub fn replay_all(&self, entries: &[DebugLogEntry]) -> Vec<ReplayResult> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => warn!("Failed to replay turn {}: {}", entry.turn, e),
            }
        }

        results
    }

    /// Replays the listed turns, failing on the first one the log lacks
    pub fn replay_turns(
        &self,
        entries: &[DebugLogEntry],
        turns: &[i32],
    ) -> Result<Vec<ReplayResult>, String> {
        turns
            .iter()
            .map(|&turn| self.replay_entry(find_turn(entries, turn)?))
            .collect()
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        let mut by_reason: Vec<(Reason, usize)> = Vec::new();
        for result in results {
            match by_reason.iter_mut().find(|(reason, _)| *reason == result.reason) {
                Some((_, count)) => *count += 1,
                None => by_reason.push((result.reason, 1)),
            }
        }

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
            by_reason,
        }
    }

    /// Prints a report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!(
            "replayed {} turn(s): {} same move ({:.1}%), {} different",
            stats.total_turns, stats.matches, stats.match_rate, stats.mismatches
        );
        if let Some(slowest) = results.iter().map(|r| r.computation_time_us).max() {
            let total: u128 = results.iter().map(|r| r.computation_time_us).sum();
            println!(
                "decision time: {}us average, {}us slowest",
                total / results.len() as u128,
                slowest
            );
        }
        for (reason, count) in &stats.by_reason {
            println!("  {:<16} {}", format!("{:?}", reason), count);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("\nturns that now decide differently:");
            for result in mismatches {
                println!(
                    "  turn {}: {} -> {} ({:?})",
                    result.turn,
                    result.original_move.as_str(),
                    result.replayed_move.as_str(),
                    result.reason
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were made
    pub fn validate_expected_moves(
        &self,
        entries: &[DebugLogEntry],
        expected_moves: &[(i32, Vec<Direction>)], // (turn, acceptable_moves)
    ) -> Result<(), String> {
        for (turn, acceptable) in expected_moves {
            let entry = find_turn(entries, *turn)?;
            if !acceptable.contains(&entry.chosen_move) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    turn,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    entry.chosen_move.as_str()
                ));
            }
        }

        Ok(())
    }
}

fn find_turn(entries: &[DebugLogEntry], turn: i32) -> Result<&DebugLogEntry, String> {
    entries
        .iter()
        .find(|e| e.turn == turn)
        .ok_or_else(|| format!("Turn {} not found in log", turn))
}
