use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook, DataType, Reader, Xlsx};
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::question::{BankRow, Question, OPTION_LETTERS};
use crate::services::media::MediaResolver;

// Alias tables for the loosely-structured banks operators author. Header
// names are matched case- and whitespace/underscore-insensitively, so every
// alias below is stored in normalized form. Within one field the first alias
// carrying a non-blank cell wins; that precedence is a contract covered by
// the parser tests.
const QUESTION_ID_ALIASES: &[&str] = &["questionid", "qid", "id"];
const TEXT_ALIASES: &[&str] = &["question", "questiontext"];
const PASSAGE_ID_ALIASES: &[&str] = &["passageid"];
const PASSAGE_TEXT_ALIASES: &[&str] = &["passagetext", "passage"];
const CORRECT_ALIASES: &[&str] = &["correctoption", "answer", "correct"];
const SECTION_ALIASES: &[&str] = &["section", "topic"];
const EXPLANATION_ALIASES: &[&str] = &["explanation"];
const QUESTION_IMAGE_ALIASES: &[&str] = &["questionimage"];
const EXPLANATION_IMAGE_ALIASES: &[&str] = &["explanationimage"];
const PASSAGE_IMAGE_ALIASES: &[&str] = &["passageimage"];
const OPTION_ALIASES: [&[&str]; 5] = [
    &["optiona", "a", "option1", "opta"],
    &["optionb", "b", "option2", "optb"],
    &["optionc", "c", "option3", "optc"],
    &["optiond", "d", "option4", "optd"],
    &["optione", "e", "option5", "opte"],
];

const DEFAULT_SECTION: &str = "General";

/// Parses one spreadsheet question bank into canonical, ordered rows.
///
/// Every cell is read as text so ratios, percentages and leading zeros
/// survive; spreadsheet-tool placeholders for "empty" normalize to "".
/// Merged ranges surface as the anchor-cell value plus empty companions,
/// which matches a logical unmerge of the sheet.
#[derive(Debug, Clone)]
pub struct BankService {
    resolver: MediaResolver,
}

impl BankService {
    pub fn new(resolver: MediaResolver) -> Self {
        Self { resolver }
    }

    /// Reads the first worksheet of the bank at `path`.
    ///
    /// Fails with `NotFound` when the path does not resolve and with
    /// `Format` when the file is not a readable workbook. Blank rows are
    /// skipped with a warning; they still consume their 1-based row
    /// position, which is what a row without an explicit id is named after.
    pub fn parse(&self, path: &str) -> Result<Vec<BankRow>> {
        if !Path::new(path).exists() {
            return Err(Error::NotFound(format!("Question bank not found: {}", path)));
        }

        let mut workbook: Xlsx<_> = open_workbook(path)
            .map_err(|e| Error::Format(format!("{}: {}", path, e)))?;
        let range = match workbook.worksheet_range_at(0) {
            Some(Ok(range)) => range,
            Some(Err(e)) => return Err(Error::Format(format!("{}: {}", path, e))),
            None => return Err(Error::Format(format!("{}: workbook has no sheets", path))),
        };

        let mut rows_iter = range.rows();
        let headers = match rows_iter.next() {
            Some(header_row) => header_index(header_row),
            None => return Ok(Vec::new()),
        };

        let mut rows: Vec<BankRow> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (position, raw_row) in rows_iter.enumerate() {
            let row_no = position + 1;
            let cells: Vec<String> = raw_row.iter().map(cell_to_string).collect();
            if cells.iter().all(|c| c.is_empty()) {
                warn!(row = row_no, "skipping blank question-bank row");
                continue;
            }

            let row = self.canonicalize(&headers, &cells, row_no);

            // Duplicate explicit ids resolve like repeated map inserts:
            // the row keeps its first position but the last content wins.
            match seen.get(&row.question.question_id) {
                Some(&idx) => rows[idx] = row,
                None => {
                    seen.insert(row.question.question_id.clone(), rows.len());
                    rows.push(row);
                }
            }
        }

        Ok(rows)
    }

    fn canonicalize(&self, headers: &HashMap<String, usize>, cells: &[String], row_no: usize) -> BankRow {
        let explicit_id = field(headers, cells, QUESTION_ID_ALIASES);
        let question_id = if explicit_id.is_empty() {
            row_no.to_string()
        } else {
            explicit_id
        };

        let mut raw_options: [String; 5] = Default::default();
        for (idx, aliases) in OPTION_ALIASES.iter().enumerate() {
            raw_options[idx] = field(headers, cells, aliases);
        }
        let options: Vec<String> = raw_options
            .iter()
            .filter(|o| !o.is_empty())
            .cloned()
            .collect();

        let mut correct_answer = field(headers, cells, CORRECT_ALIASES).to_uppercase();
        if !correct_answer.is_empty() && !letter_indexes(&correct_answer, options.len()) {
            warn!(
                row = row_no,
                question_id = %question_id,
                correct = %correct_answer,
                "answer key does not select a populated option, clearing it"
            );
            correct_answer.clear();
        }

        let mut section = field(headers, cells, SECTION_ALIASES);
        if section.is_empty() {
            section = DEFAULT_SECTION.to_string();
        }

        let question = Question {
            question_id,
            text: field(headers, cells, TEXT_ALIASES),
            passage_id: field(headers, cells, PASSAGE_ID_ALIASES),
            passage_text: field(headers, cells, PASSAGE_TEXT_ALIASES),
            options,
            correct_answer,
            section,
            explanation: field(headers, cells, EXPLANATION_ALIASES),
            question_image: self
                .resolver
                .resolve(&field(headers, cells, QUESTION_IMAGE_ALIASES)),
            explanation_image: self
                .resolver
                .resolve(&field(headers, cells, EXPLANATION_IMAGE_ALIASES)),
            passage_image: self
                .resolver
                .resolve(&field(headers, cells, PASSAGE_IMAGE_ALIASES)),
        };

        BankRow {
            question,
            raw_options,
        }
    }
}

/// Maps normalized header names to their column index. The first column
/// claiming a name keeps it.
fn header_index(header_row: &[DataType]) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (col, cell) in header_row.iter().enumerate() {
        let key = normalize_key(&cell_to_string(cell));
        if !key.is_empty() {
            index.entry(key).or_insert(col);
        }
    }
    index
}

/// First alias present with a non-blank value wins.
fn field(headers: &HashMap<String, usize>, cells: &[String], aliases: &[&str]) -> String {
    for alias in aliases {
        if let Some(&col) = headers.get(*alias) {
            if let Some(value) = cells.get(col) {
                if !value.is_empty() {
                    return value.clone();
                }
            }
        }
    }
    String::new()
}

/// Lowercases and strips whitespace and underscores so `Option A`,
/// `option_a` and `OPTIONA` all name the same column.
fn normalize_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Every cell is rendered as text. Integral floats lose their `.0` so
/// numeric ids match their submitted string form.
fn cell_to_string(cell: &DataType) -> String {
    let text = match cell {
        DataType::String(s) => s.trim().to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) => float_to_string(*f),
        DataType::Bool(b) => b.to_string(),
        DataType::Empty => String::new(),
        DataType::Error(_) => String::new(),
        other => other.to_string().trim().to_string(),
    };
    if text.eq_ignore_ascii_case("nan") || text.eq_ignore_ascii_case("none") {
        String::new()
    } else {
        text
    }
}

fn float_to_string(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

/// True when `letter` is a single answer letter that indexes into the
/// populated options.
fn letter_indexes(letter: &str, populated: usize) -> bool {
    let mut chars = letter.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => OPTION_LETTERS
            .iter()
            .position(|l| *l == c)
            .map(|idx| idx < populated)
            .unwrap_or(false),
        _ => false,
    }
}
