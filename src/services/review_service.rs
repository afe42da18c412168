use std::collections::{BTreeMap, HashMap};

use crate::models::outcome::{OutcomeDetail, SectionStat};
use crate::models::question::{BankRow, ReviewQuestion};
use crate::services::scoring_service::record_section;

pub struct ReviewService;

impl ReviewService {
    /// Rebuilds a displayable review by merging a persisted outcome
    /// snapshot with a freshly parsed bank.
    ///
    /// The bank may have been edited since the attempt was scored; review
    /// always shows current text, options and explanations, while the
    /// snapshot keeps authority over what the candidate selected and
    /// whether it was right. A deleted row degrades to an empty shell
    /// rather than failing the review. Reconciling twice against an
    /// unchanged bank yields identical output.
    pub fn reconcile(
        details: &[OutcomeDetail],
        bank: &[BankRow],
    ) -> (Vec<ReviewQuestion>, BTreeMap<String, SectionStat>) {
        let by_id: HashMap<&str, &BankRow> = bank
            .iter()
            .map(|row| (row.question.question_id.as_str(), row))
            .collect();

        let mut questions = Vec::with_capacity(details.len());
        for detail in details {
            questions.push(merge(detail, by_id.get(detail.question_id.as_str()).copied()));
        }

        // Never trust a stored section map: a persisted blob may predate a
        // scheme change, so totals are derived from the merged rows.
        let mut sections: BTreeMap<String, SectionStat> = BTreeMap::new();
        for q in &questions {
            record_section(&mut sections, &q.section, &q.selected, q.is_correct);
        }

        (questions, sections)
    }
}

fn merge(detail: &OutcomeDetail, row: Option<&BankRow>) -> ReviewQuestion {
    match row {
        Some(row) => {
            let q = &row.question;
            ReviewQuestion {
                question_id: detail.question_id.clone(),
                text: q.text.clone(),
                options: merged_options(row),
                selected: detail.selected.clone(),
                correct: q.correct_answer.clone(),
                is_correct: detail.is_correct,
                section: q.section.clone(),
                passage_id: q.passage_id.clone(),
                passage_text: q.passage_text.clone(),
                explanation: q.explanation.clone(),
                question_image: prefer(&detail.question_image, &q.question_image),
                explanation_image: prefer(&detail.explanation_image, &q.explanation_image),
                passage_image: q.passage_image.clone(),
            }
        }
        // Row deleted from the bank since scoring: bank-sourced fields
        // degrade to empty, the snapshot supplies the rest.
        None => ReviewQuestion {
            question_id: detail.question_id.clone(),
            text: String::new(),
            options: Vec::new(),
            selected: detail.selected.clone(),
            correct: detail.correct.clone(),
            is_correct: detail.is_correct,
            section: detail.section.clone(),
            passage_id: String::new(),
            passage_text: String::new(),
            explanation: detail.explanation.clone(),
            question_image: detail.question_image.clone(),
            explanation_image: detail.explanation_image.clone(),
            passage_image: String::new(),
        },
    }
}

/// Review is more lenient than the canonical parse: when options synthesis
/// came up empty but per-letter cells are populated, the list is re-derived
/// from those cells directly.
fn merged_options(row: &BankRow) -> Vec<String> {
    if !row.question.options.is_empty() {
        return row.question.options.clone();
    }
    row.raw_options
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

fn prefer(persisted: &str, bank: &str) -> String {
    if persisted.is_empty() {
        bank.to_string()
    } else {
        persisted.to_string()
    }
}
