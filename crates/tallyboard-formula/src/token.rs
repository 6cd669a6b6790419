//! Formula token model
//!
//! A formula is an ordered sequence of tokens produced by the formula
//! builder. Evaluation depends only on each token's kind and value, in order;
//! the `id` exists so a UI can reconcile list entries.

use crate::error::{FormulaError, FormulaResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of formula element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Reference to a record column; value is the column id
    Column,
    /// Arithmetic operator or parenthesis: `+ - * / ( )`
    Operator,
    /// Numeric literal; value is the literal text
    Number,
    /// Comparison: `== != < > <= >=`
    Condition,
    /// Keyword: `if then else true false`
    Logical,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Column => "column",
            TokenKind::Operator => "operator",
            TokenKind::Number => "number",
            TokenKind::Condition => "condition",
            TokenKind::Logical => "logical",
        };
        f.write_str(name)
    }
}

/// Logical keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    If,
    Then,
    Else,
    True,
    False,
}

impl Keyword {
    /// Parse a keyword (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "if" => Some(Keyword::If),
            "then" => Some(Keyword::Then),
            "else" => Some(Keyword::Else),
            "true" => Some(Keyword::True),
            "false" => Some(Keyword::False),
            _ => None,
        }
    }

    /// Canonical lowercase spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Then => "then",
            Keyword::Else => "else",
            Keyword::True => "true",
            Keyword::False => "false",
        }
    }

    /// Check if this keyword delimits a conditional section
    pub fn is_section_marker(&self) -> bool {
        matches!(self, Keyword::If | Keyword::Then | Keyword::Else)
    }
}

/// One lexical unit of a formula
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// Identifier, unique within a formula
    #[serde(default)]
    pub id: String,
    /// Token kind
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Raw operand: column id, operator symbol, literal text, comparison or keyword
    pub value: String,
    /// Human-readable label
    #[serde(default)]
    pub display: String,
}

impl Token {
    /// Create a token with an empty id
    pub fn new(kind: TokenKind, value: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            kind,
            value: value.into(),
            display: display.into(),
        }
    }

    /// Column reference
    pub fn column(column_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(TokenKind::Column, column_id, title)
    }

    /// Arithmetic operator or parenthesis
    pub fn operator(symbol: &str) -> Self {
        Self::new(TokenKind::Operator, symbol, symbol)
    }

    /// Numeric literal
    pub fn number(literal: impl Into<String>) -> Self {
        let literal = literal.into();
        Self::new(TokenKind::Number, literal.clone(), literal)
    }

    /// Comparison operator
    pub fn condition(symbol: &str) -> Self {
        Self::new(TokenKind::Condition, symbol, symbol)
    }

    /// Logical keyword
    pub fn logical(keyword: Keyword) -> Self {
        Self::new(
            TokenKind::Logical,
            keyword.as_str(),
            keyword.as_str().to_ascii_uppercase(),
        )
    }

    /// Set the token id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// The keyword this token carries, if it is a logical token
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Logical => Keyword::parse(&self.value),
            _ => None,
        }
    }

    /// Check if this token is the given logical keyword
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.keyword() == Some(keyword)
    }

    /// Boolean literal value for `true`/`false` keywords
    pub fn as_bool(&self) -> Option<bool> {
        match self.keyword()? {
            Keyword::True => Some(true),
            Keyword::False => Some(false),
            _ => None,
        }
    }

    /// Label shown to users, falling back to the raw value
    pub fn label(&self) -> &str {
        if self.display.is_empty() {
            &self.value
        } else {
            &self.display
        }
    }
}

/// An ordered token sequence: either an arithmetic expression or an
/// `IF … THEN … ELSE …` conditional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Formula {
    tokens: Vec<Token>,
}

impl Formula {
    /// Wrap an existing token sequence without checking keyword order
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// The tokens, in order
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the formula has no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate over the tokens
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Check if the formula contains an `if`, `then` or `else` keyword
    pub fn is_conditional(&self) -> bool {
        is_conditional(&self.tokens)
    }

    /// Distinct column tokens in first-appearance order
    pub fn referenced_columns(&self) -> Vec<&Token> {
        let mut seen: Vec<&Token> = Vec::new();
        for token in self.tokens.iter().filter(|t| t.kind == TokenKind::Column) {
            if !seen.iter().any(|s| s.value == token.value) {
                seen.push(token);
            }
        }
        seen
    }

    /// Append a token, enforcing keyword order.
    ///
    /// `then` requires a preceding `if`, `else` requires a preceding `then`,
    /// and each of the three may appear once. Tokens without an id get one.
    pub fn push(&mut self, mut token: Token) -> FormulaResult<()> {
        if let Some(keyword) = token.keyword().filter(Keyword::is_section_marker) {
            if self.tokens.iter().any(|t| t.is_keyword(keyword)) {
                return Err(FormulaError::DuplicateKeyword(
                    keyword.as_str().to_ascii_uppercase(),
                ));
            }
            match keyword {
                Keyword::Then if !self.tokens.iter().any(|t| t.is_keyword(Keyword::If)) => {
                    return Err(FormulaError::KeywordOrder("add IF first"));
                }
                Keyword::Else if !self.tokens.iter().any(|t| t.is_keyword(Keyword::Then)) => {
                    return Err(FormulaError::KeywordOrder("add THEN first"));
                }
                _ => {}
            }
        }

        if token.id.is_empty() {
            token.id = self.next_id();
        }
        self.tokens.push(token);
        Ok(())
    }

    /// Remove and return the last token
    pub fn pop(&mut self) -> Option<Token> {
        self.tokens.pop()
    }

    /// Remove all tokens
    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    fn next_id(&self) -> String {
        let mut n = self.tokens.len() + 1;
        loop {
            let candidate = format!("t{n}");
            if !self.tokens.iter().any(|t| t.id == candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl From<Vec<Token>> for Formula {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

impl<'a> IntoIterator for &'a Formula {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for token in &self.tokens {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            f.write_str(token.label())?;
        }
        Ok(())
    }
}

/// Check if a token sequence contains a section keyword
pub(crate) fn is_conditional(tokens: &[Token]) -> bool {
    tokens
        .iter()
        .any(|t| t.keyword().map_or(false, |k| k.is_section_marker()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_keyword_parsing() {
        assert_eq!(Keyword::parse("IF"), Some(Keyword::If));
        assert_eq!(Keyword::parse("else"), Some(Keyword::Else));
        assert_eq!(Keyword::parse("maybe"), None);
        assert_eq!(Keyword::parse(" Then "), Some(Keyword::Then));
        assert!(Keyword::Then.is_section_marker());
        assert!(!Keyword::True.is_section_marker());
    }

    #[test]
    fn test_token_keyword_only_for_logical() {
        let t = Token::new(TokenKind::Column, "if", "if");
        assert_eq!(t.keyword(), None);
        assert_eq!(Token::logical(Keyword::If).keyword(), Some(Keyword::If));
        assert_eq!(Token::logical(Keyword::False).as_bool(), Some(false));
    }

    #[test]
    fn test_push_assigns_ids() {
        let mut formula = Formula::default();
        formula.push(Token::number("1")).unwrap();
        formula.push(Token::operator("+")).unwrap();
        formula.push(Token::number("2").with_id("custom")).unwrap();

        let ids: Vec<&str> = formula.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "custom"]);
    }

    #[test]
    fn test_push_avoids_id_collision() {
        let mut formula = Formula::new(vec![Token::number("1").with_id("t2")]);
        formula.push(Token::number("2")).unwrap();
        assert_eq!(formula.tokens()[1].id, "t3");
    }

    #[test]
    fn test_push_then_without_if() {
        let mut formula = Formula::default();
        let err = formula.push(Token::logical(Keyword::Then)).unwrap_err();
        assert_eq!(err.to_string(), "add IF first");
        assert!(formula.is_empty());
    }

    #[test]
    fn test_push_else_without_then() {
        let mut formula = Formula::default();
        formula.push(Token::logical(Keyword::If)).unwrap();
        let err = formula.push(Token::logical(Keyword::Else)).unwrap_err();
        assert_eq!(err.to_string(), "add THEN first");
    }

    #[test]
    fn test_push_duplicate_keyword() {
        let mut formula = Formula::default();
        formula.push(Token::logical(Keyword::If)).unwrap();
        let err = formula.push(Token::logical(Keyword::If)).unwrap_err();
        assert_eq!(err, FormulaError::DuplicateKeyword("IF".into()));
    }

    #[test]
    fn test_true_false_may_repeat() {
        let mut formula = Formula::default();
        formula.push(Token::logical(Keyword::True)).unwrap();
        formula.push(Token::logical(Keyword::True)).unwrap();
        assert_eq!(formula.len(), 2);
        assert!(!formula.is_conditional());
    }

    #[test]
    fn test_referenced_columns_distinct() {
        let formula = Formula::new(vec![
            Token::column("a", "Alpha"),
            Token::operator("+"),
            Token::column("b", "Beta"),
            Token::operator("*"),
            Token::column("a", "Alpha"),
        ]);
        let cols: Vec<&str> = formula
            .referenced_columns()
            .iter()
            .map(|t| t.value.as_str())
            .collect();
        assert_eq!(cols, vec!["a", "b"]);
    }

    #[test]
    fn test_display() {
        let formula = Formula::new(vec![
            Token::logical(Keyword::If),
            Token::column("a", "Alpha"),
            Token::condition(">"),
            Token::number("3"),
            Token::logical(Keyword::Then),
            Token::new(TokenKind::Number, "1", ""),
        ]);
        assert_eq!(formula.to_string(), "IF Alpha > 3 THEN 1");
    }

    #[test]
    fn test_json_shape() {
        let formula = Formula::new(vec![Token::column("num1", "Price").with_id("a1")]);
        let json = serde_json::to_value(&formula).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"id": "a1", "type": "column", "value": "num1", "display": "Price"}
            ])
        );
    }
}
