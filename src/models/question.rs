use serde::{Deserialize, Serialize};

/// Answer letters a bank row may populate, in column order.
pub const OPTION_LETTERS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];

/// One canonical question derived from a bank row. Never persisted as such;
/// rebuilt from the spreadsheet on every parse.
///
/// Invariants upheld by the parser:
/// * `options` holds only non-empty strings, at most 5, in A→E order.
/// * `correct_answer` is an uppercase letter that indexes into `options`,
///   or empty.
/// * The three image fields are either empty or absolute URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: String,
    pub text: String,
    pub passage_id: String,
    pub passage_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub section: String,
    pub explanation: String,
    pub question_image: String,
    pub explanation_image: String,
    pub passage_image: String,
}

/// A parsed bank row: the canonical question plus the raw per-letter option
/// cells. Review-time reconciliation is more lenient than the canonical
/// `options` synthesis and may re-derive the list from these cells.
#[derive(Debug, Clone, PartialEq)]
pub struct BankRow {
    pub question: Question,
    pub raw_options: [String; 5],
}

/// One displayable review entry: a persisted outcome detail merged with the
/// current question bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewQuestion {
    pub question_id: String,
    pub text: String,
    pub options: Vec<String>,
    pub selected: String,
    pub correct: String,
    pub is_correct: bool,
    pub section: String,
    pub passage_id: String,
    pub passage_text: String,
    pub explanation: String,
    pub question_image: String,
    pub explanation_image: String,
    pub passage_image: String,
}
