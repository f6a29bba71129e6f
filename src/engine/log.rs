//! Console reporting for the search: candidate lines, the picked move, and
//! per-move performance counters.

use crate::board::{Move, ScoredMoveList};

use super::eval::{is_mate_score, MATE_SCORE};
use super::Engine;

const RED: &str = "\x1b[1;31m";
const GREEN: &str = "\x1b[1;32m";
const BLUE: &str = "\x1b[1;34m";
const RESET: &str = "\x1b[0m";

fn red(text: &str) -> String {
    format!("{RED}{text}{RESET}")
}

fn green(text: &str) -> String {
    format!("{GREEN}{text}{RESET}")
}

fn blue(text: &str) -> String {
    format!("{BLUE}{text}{RESET}")
}

/// Render a score for humans: pawns with two decimals, or `#N` / `#-N`
/// for mate in N.
#[must_use]
pub fn format_score(score: i32) -> String {
    if is_mate_score(score) {
        let plies = MATE_SCORE - score.abs();
        let moves = (plies + 1) / 2;
        let sign = if score < 0 { "-" } else { "" };
        format!("#{sign}{moves}")
    } else {
        format!("{:.2}", f64::from(score) / 1000.0)
    }
}

impl Engine {
    pub(crate) fn log_only_move(&self, mv: Move) {
        println!("only move {}", red(&mv.to_string()));
    }

    pub(crate) fn log_candidates(&self, candidates: &ScoredMoveList, pick: crate::board::ScoredMove) {
        let listing = candidates
            .iter()
            .map(|c| format!("{} ({})", red(&c.mv.to_string()), green(&format_score(c.score))))
            .collect::<Vec<_>>()
            .join(", ");
        println!("optimal moves: {listing}");
        println!(
            "picked move {} ({})",
            red(&pick.mv.to_string()),
            green(&format_score(pick.score))
        );
    }

    pub(crate) fn log_search_report(&self, elapsed_ms: f64) {
        println!("move took {} ms", red(&format!("{}", elapsed_ms.round() as i64)));
        println!("nodes: {}", blue(&self.nodes.to_string()));
        let ordering = if self.cut_nodes == 0 {
            "NaN".to_string()
        } else {
            format!(
                "{}",
                (100.0 * self.first_cut_nodes as f64 / self.cut_nodes as f64).round() as i64
            )
        };
        println!("move ordering quality: {}%", green(&ordering));
        let knps = if elapsed_ms == 0.0 {
            "NaN".to_string()
        } else {
            format!("{}", (self.nodes as f64 / elapsed_ms).round() as i64)
        };
        println!("performance: {} kn/s", green(&knps));
        println!("{}", "-".repeat(80));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_score_pawn_units() {
        assert_eq!(format_score(0), "0.00");
        assert_eq!(format_score(1500), "1.50");
        assert_eq!(format_score(-16000), "-16.00");
        assert_eq!(format_score(50), "0.05");
    }

    #[test]
    fn test_format_score_mates() {
        // mate in 1: one ply from mate
        assert_eq!(format_score(MATE_SCORE - 1), "#1");
        // mate in 2: three plies
        assert_eq!(format_score(MATE_SCORE - 3), "#2");
        // getting mated
        assert_eq!(format_score(-(MATE_SCORE - 1)), "#-1");
        assert_eq!(format_score(-(MATE_SCORE - 4)), "#-2");
    }
}
