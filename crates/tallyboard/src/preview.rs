//! Single-record preview

use serde::Serialize;
use std::fmt;

use tallyboard_core::Record;
use tallyboard_formula::{evaluate, validate_record, Formula, FormulaValue};

/// What applying a formula to one record would produce
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    /// Rendered formula
    pub formula: String,
    pub record_name: String,
    pub value: FormulaValue,
    /// Exact text that would be written; `None` when nothing would be
    pub written: Option<String>,
    /// Why a batch run would skip this record
    pub skip_reason: Option<String>,
}

/// Evaluate `formula` against a sample record without writing anything
pub fn preview(formula: &Formula, record: &Record) -> Preview {
    let skip_reason = validate_record(formula, record)
        .err()
        .map(|e| e.to_string());
    let value = evaluate(formula, record);
    let written = match skip_reason {
        Some(_) => None,
        None => value.to_column_text(),
    };

    Preview {
        formula: formula.to_string(),
        record_name: record.name.clone(),
        value,
        written,
        skip_reason,
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Formula: {}", self.formula)?;
        writeln!(f, "Record:  {}", self.record_name)?;
        write!(f, "Result:  {}", self.value)?;
        if let Some(reason) = &self.skip_reason {
            write!(f, "\nSkipped: {}", reason)?;
        } else if let Some(text) = &self.written {
            write!(f, "\nWrites:  \"{}\"", text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tallyboard_core::ColumnValue;
    use tallyboard_formula::{Keyword, Token};

    fn record() -> Record {
        Record::item("1", "Widget", "9")
            .with_column(ColumnValue::new("qty", "Qty", "numbers", "4"))
    }

    #[test]
    fn test_preview_number() {
        let formula = Formula::new(vec![
            Token::column("qty", "Qty"),
            Token::operator("*"),
            Token::number("2.5"),
        ]);
        let p = preview(&formula, &record());
        assert_eq!(p.value, FormulaValue::Number(10.0));
        assert_eq!(p.written.as_deref(), Some("10"));
        assert_eq!(
            p.to_string(),
            "Formula: Qty * 2.5\nRecord:  Widget\nResult:  10\nWrites:  \"10\""
        );
    }

    #[test]
    fn test_preview_boolean() {
        let formula = Formula::new(vec![
            Token::logical(Keyword::If),
            Token::column("qty", "Qty"),
            Token::condition("<"),
            Token::number("5"),
            Token::logical(Keyword::Then),
            Token::logical(Keyword::True),
        ]);
        assert_eq!(preview(&formula, &record()).written.as_deref(), Some("true"));
    }

    #[test]
    fn test_preview_skip_reason() {
        let formula = Formula::new(vec![Token::column("cost", "Cost")]);
        let p = preview(&formula, &record());
        assert_eq!(p.skip_reason.as_deref(), Some("Missing column: Cost"));
        assert_eq!(p.written, None);
        assert_eq!(p.value, FormulaValue::Error("Column Cost not found".into()));
    }

    #[test]
    fn test_preview_error_writes_nothing() {
        let formula = Formula::new(vec![
            Token::column("qty", "Qty"),
            Token::operator("/"),
            Token::number("0"),
        ]);
        let p = preview(&formula, &record());
        assert_eq!(p.value, FormulaValue::Error("NaN".into()));
        assert_eq!(p.written, None);
    }
}
