//! Tests for formula evaluation against board records

use proptest::prelude::*;
use tallyboard_core::{ColumnValue, Record};
use tallyboard_formula::{evaluate, partition, Formula, FormulaValue, Keyword, Token};

fn record_with(values: &[(&str, String)]) -> Record {
    values.iter().fold(Record::item("42", "Task", "100"), |r, (id, text)| {
        r.with_column(ColumnValue::new(*id, id.to_uppercase(), "numbers", text.clone()))
    })
}

fn if_zero_increment(with_else: bool) -> Formula {
    let mut formula = Formula::default();
    formula.push(Token::logical(Keyword::If)).unwrap();
    formula.push(Token::column("a", "A")).unwrap();
    formula.push(Token::condition("==")).unwrap();
    formula.push(Token::number("0")).unwrap();
    formula.push(Token::logical(Keyword::Then)).unwrap();
    formula.push(Token::column("a", "A")).unwrap();
    formula.push(Token::operator("+")).unwrap();
    formula.push(Token::number("1")).unwrap();
    if with_else {
        formula.push(Token::logical(Keyword::Else)).unwrap();
        formula.push(Token::column("a", "A")).unwrap();
    }
    formula
}

/// Column plus literal
#[test]
fn test_column_plus_literal() {
    let formula = Formula::new(vec![
        Token::column("a", "A"),
        Token::operator("+"),
        Token::number("5"),
    ]);
    let record = record_with(&[("a", "3".into())]);
    assert_eq!(evaluate(&formula, &record), FormulaValue::Number(8.0));
}

/// Increment-when-zero, with and without an explicit else-branch
#[test]
fn test_conditional_pass_through_matches_explicit_else() {
    for with_else in [true, false] {
        let formula = if_zero_increment(with_else);

        let zero = record_with(&[("a", "0".into())]);
        assert_eq!(evaluate(&formula, &zero), FormulaValue::Number(1.0));

        let seven = record_with(&[("a", "7".into())]);
        assert_eq!(evaluate(&formula, &seven), FormulaValue::Number(7.0));
    }
}

/// THEN with no IF before it
#[test]
fn test_then_without_if_rejected() {
    let formula = Formula::new(vec![
        Token::logical(Keyword::Then),
        Token::number("1"),
    ]);
    let record = record_with(&[]);
    assert_eq!(
        evaluate(&formula, &record),
        FormulaValue::Error("Invalid conditional formula: missing IF or THEN".into())
    );
}

/// Formula JSON produced by the builder evaluates the same after decoding
#[test]
fn test_formula_from_json() {
    let json = r#"[
        {"id": "1", "type": "logical", "value": "if", "display": "IF"},
        {"id": "2", "type": "column", "value": "numbers_1", "display": "Hours"},
        {"id": "3", "type": "condition", "value": ">", "display": ">"},
        {"id": "4", "type": "number", "value": "40", "display": "40"},
        {"id": "5", "type": "logical", "value": "then", "display": "THEN"},
        {"id": "6", "type": "column", "value": "numbers_1", "display": "Hours"},
        {"id": "7", "type": "operator", "value": "-", "display": "-"},
        {"id": "8", "type": "number", "value": "40", "display": "40"},
        {"id": "9", "type": "logical", "value": "else", "display": "ELSE"},
        {"id": "10", "type": "number", "value": "0", "display": "0"}
    ]"#;
    let formula: Formula = serde_json::from_str(json).unwrap();
    assert!(formula.is_conditional());

    let overtime = record_with(&[("numbers_1", "46.5".into())]);
    assert_eq!(evaluate(&formula, &overtime), FormulaValue::Number(6.5));

    let regular = record_with(&[("numbers_1", "38".into())]);
    assert_eq!(evaluate(&formula, &regular), FormulaValue::Number(0.0));

    let reencoded: Formula =
        serde_json::from_str(&serde_json::to_string(&formula).unwrap()).unwrap();
    assert_eq!(evaluate(&reencoded, &overtime), evaluate(&formula, &overtime));
}

/// Evaluation result in the form written back to the board
#[test]
fn test_column_text_of_results() {
    let record = record_with(&[("a", "10".into())]);

    let half = Formula::new(vec![
        Token::column("a", "A"),
        Token::operator("/"),
        Token::number("4"),
    ]);
    assert_eq!(
        evaluate(&half, &record).to_column_text().as_deref(),
        Some("2.5")
    );

    let flag = Formula::new(vec![
        Token::logical(Keyword::If),
        Token::column("a", "A"),
        Token::condition(">"),
        Token::number("5"),
        Token::logical(Keyword::Then),
        Token::logical(Keyword::True),
        Token::logical(Keyword::Else),
        Token::logical(Keyword::False),
    ]);
    assert_eq!(
        evaluate(&flag, &record).to_column_text().as_deref(),
        Some("true")
    );
}

fn arithmetic_op() -> impl Strategy<Value = (&'static str, fn(f64, f64) -> f64)> {
    prop_oneof![
        Just(("+", (|a, b| a + b) as fn(f64, f64) -> f64)),
        Just(("-", (|a, b| a - b) as fn(f64, f64) -> f64)),
        Just(("*", (|a, b| a * b) as fn(f64, f64) -> f64)),
    ]
}

proptest! {
    /// `a op b` over numeric columns equals the native computation
    #[test]
    fn prop_binary_arithmetic(a in -10_000i32..10_000, b in -10_000i32..10_000, (sym, f) in arithmetic_op()) {
        let formula = Formula::new(vec![
            Token::column("a", "A"),
            Token::operator(sym),
            Token::column("b", "B"),
        ]);
        let record = record_with(&[("a", a.to_string()), ("b", b.to_string())]);
        prop_assert_eq!(evaluate(&formula, &record), FormulaValue::Number(f(a as f64, b as f64)));
    }

    /// `a + b * c` binds multiplication tighter
    #[test]
    fn prop_precedence(a in -1_000i32..1_000, b in -1_000i32..1_000, c in -1_000i32..1_000) {
        let formula = Formula::new(vec![
            Token::column("a", "A"),
            Token::operator("+"),
            Token::column("b", "B"),
            Token::operator("*"),
            Token::number(c.to_string()),
        ]);
        let record = record_with(&[("a", a.to_string()), ("b", b.to_string())]);
        let expected = a as f64 + b as f64 * c as f64;
        prop_assert_eq!(evaluate(&formula, &record), FormulaValue::Number(expected));
    }

    /// Division yields either the quotient or the non-finite marker
    #[test]
    fn prop_division(a in -1_000i32..1_000, b in -5i32..5) {
        let formula = Formula::new(vec![
            Token::column("a", "A"),
            Token::operator("/"),
            Token::column("b", "B"),
        ]);
        let record = record_with(&[("a", a.to_string()), ("b", b.to_string())]);
        let result = evaluate(&formula, &record);
        if b == 0 {
            prop_assert_eq!(result, FormulaValue::Error("NaN".into()));
        } else {
            prop_assert_eq!(result, FormulaValue::Number(a as f64 / b as f64));
        }
    }

    /// Same inputs, same output
    #[test]
    fn prop_evaluate_idempotent(a in -100i32..100, with_else in any::<bool>()) {
        let formula = if_zero_increment(with_else);
        let record = record_with(&[("a", a.to_string())]);
        prop_assert_eq!(evaluate(&formula, &record), evaluate(&formula, &record));
    }

    /// Formulas without IF partition to themselves
    #[test]
    fn prop_partition_identity_without_if(values in proptest::collection::vec(0u32..100, 0..12)) {
        let tokens: Vec<Token> = values.iter().map(|v| Token::number(v.to_string())).collect();
        let sections = partition(&tokens);
        prop_assert!(!sections.has_if);
        prop_assert_eq!(sections.condition, &tokens[..]);
    }
}

/// Runaway nesting comes back as an error value instead of exhausting the stack
#[test]
fn test_deeply_nested_formula_is_an_error_value() {
    let mut tokens = vec![Token::operator("-"); 1_000];
    tokens.push(Token::number("1"));
    let record = record_with(&[]);

    assert_eq!(
        evaluate(&Formula::new(tokens), &record),
        FormulaValue::Error("Parse error: Formula is nested too deeply".into())
    );
}
