use std::collections::{BTreeMap, HashMap};

use chrono::Utc;

use crate::models::outcome::{Outcome, OutcomeDetail, OutcomeStatus, SectionStat};
use crate::models::question::BankRow;

/// Marking scheme. Engine constants, never spreadsheet-configurable.
pub const CORRECT_MARKS: f64 = 1.0;
pub const WRONG_PENALTY: f64 = 0.25;

pub struct ScoringService;

impl ScoringService {
    /// Evaluates a submission against the bank's answer key.
    ///
    /// Iteration order is the bank's row order, which fixes the
    /// `OutcomeDetail` sequence. Submission entries that reference no bank
    /// question are ignored; a blank or absent selection is unattempted; a
    /// blank answer key never matches, so a selection against it counts
    /// wrong. Pure apart from stamping `submitted_at` — persisting the
    /// outcome is the caller's job, and calling twice deliberately yields
    /// two outcomes.
    pub fn score(
        rows: &[BankRow],
        submission: &HashMap<String, String>,
        status: OutcomeStatus,
    ) -> Outcome {
        let mut correct_count: u32 = 0;
        let mut wrong_count: u32 = 0;
        let mut details = Vec::with_capacity(rows.len());
        let mut sections: BTreeMap<String, SectionStat> = BTreeMap::new();

        for row in rows {
            let q = &row.question;
            let selected = submission
                .get(&q.question_id)
                .map(|s| s.trim().to_string())
                .unwrap_or_default();
            let is_correct = !selected.is_empty()
                && !q.correct_answer.is_empty()
                && selected.to_uppercase() == q.correct_answer;

            if !selected.is_empty() {
                if is_correct {
                    correct_count += 1;
                } else {
                    wrong_count += 1;
                }
            }

            record_section(&mut sections, &q.section, &selected, is_correct);

            details.push(OutcomeDetail {
                question_id: q.question_id.clone(),
                selected,
                correct: q.correct_answer.clone(),
                is_correct,
                section: q.section.clone(),
                explanation: q.explanation.clone(),
                explanation_image: q.explanation_image.clone(),
                question_image: q.question_image.clone(),
            });
        }

        let total = rows.len() as u32;
        let score = round2(correct_count as f64 * CORRECT_MARKS - wrong_count as f64 * WRONG_PENALTY);
        let percentage = if total > 0 {
            round2(score / total as f64 * 100.0)
        } else {
            0.0
        };

        // Global score and the section totals follow the same scheme, so
        // they must agree exactly (marks are multiples of 0.25).
        debug_assert!(
            (score - sections.values().map(|s| s.marks).sum::<f64>()).abs() < 1e-9,
            "global score diverged from section marks"
        );

        Outcome {
            score,
            total_questions: total,
            percentage,
            status,
            details,
            sections,
            submitted_at: Utc::now(),
        }
    }
}

/// Folds one question's verdict into its section's stats. Shared with the
/// review reconciler so recomputed section totals can never drift from the
/// scheme the engine applied.
pub fn record_section(
    sections: &mut BTreeMap<String, SectionStat>,
    section: &str,
    selected: &str,
    is_correct: bool,
) {
    let stat = sections.entry(section.to_string()).or_default();
    if selected.is_empty() {
        stat.unattempted += 1;
    } else {
        stat.attempted += 1;
        if is_correct {
            stat.correct += 1;
            stat.marks += CORRECT_MARKS;
        } else {
            stat.wrong += 1;
            stat.marks -= WRONG_PENALTY;
        }
    }
}

/// Display rounding to two decimals; scores themselves are exact multiples
/// of 0.25 so this only ever touches percentages.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
