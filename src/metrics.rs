use serde::{Deserialize, Serialize};

use crate::diff;

/// Standard typing convention: five characters make one word.
pub const CHARS_PER_WORD: u64 = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub wpm: u32,
    pub accuracy_percent: u32,
    pub correct_character_count: u32,
    pub error_count: u32,
    pub total_typed_character_count: u32,
    pub backspace_count: u32,
}

/// Derive metrics from one reference/typed pair.
///
/// `elapsed_seconds` is countdown time consumed (duration minus remaining),
/// not wall-clock time, so the numbers track the timer the user sees.
pub fn compute_metrics(
    reference: &str,
    typed: &str,
    elapsed_seconds: u32,
    backspace_count: u32,
) -> Metrics {
    let tally = diff::tally(reference, typed);
    let correct = tally.correct as u64;
    let total = tally.typed as u64;

    Metrics {
        wpm: wpm(correct, elapsed_seconds),
        accuracy_percent: accuracy_percent(correct, total),
        correct_character_count: saturate(correct),
        error_count: saturate((tally.incorrect + tally.overflow) as u64),
        total_typed_character_count: saturate(total),
        backspace_count,
    }
}

/// `round((correct / 5) / (elapsed / 60))`, half-up, computed in integers.
pub fn wpm(correct: u64, elapsed_seconds: u32) -> u32 {
    if elapsed_seconds == 0 {
        return 0;
    }
    // (correct / 5) * (60 / elapsed) == 12 * correct / elapsed
    let numerator = correct * 60;
    let denominator = CHARS_PER_WORD * u64::from(elapsed_seconds);
    saturate(round_half_up(numerator, denominator))
}

/// `round(correct / total * 100)`, half-up; zero when nothing was typed.
pub fn accuracy_percent(correct: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    saturate(round_half_up(correct * 100, total))
}

fn round_half_up(numerator: u64, denominator: u64) -> u64 {
    (2 * numerator + denominator) / (2 * denominator)
}

fn saturate(v: u64) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}
