//! Token sequence parser
//!
//! A recursive descent parser that turns a run of column, number and
//! operator tokens into an [`Expr`] tree with conventional precedence.

use crate::ast::{BinaryOperator, ComparisonOperator, Expr};
use crate::error::{FormulaError, FormulaResult};
use crate::token::{Token, TokenKind};

/// Parse an arithmetic token sequence into an AST
///
/// # Example
/// ```rust
/// use tallyboard_formula::{parse_expression, Expr, Token};
///
/// let tokens = vec![Token::number("1"), Token::operator("+"), Token::number("2")];
/// let ast = parse_expression(&tokens).unwrap();
/// assert!(matches!(ast, Expr::BinaryOp { .. }));
/// ```
pub fn parse_expression(tokens: &[Token]) -> FormulaResult<Expr> {
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }
    if tokens.len() > MAX_TOKENS {
        return Err(FormulaError::Parse("Formula is too long".into()));
    }

    let mut parser = TokenParser::new(tokens);
    let expr = parser.parse_additive()?;

    if let Some(token) = parser.peek() {
        return Err(FormulaError::Parse(format!(
            "Unexpected '{}' after expression",
            token.label()
        )));
    }

    Ok(expr)
}

/// Deepest run of prefix operators and parentheses accepted
const MAX_DEPTH: usize = 256;

/// Longest expression accepted; bounds the depth of left-leaning operator chains
const MAX_TOKENS: usize = 4096;

/// A condition split around its single comparison token
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison<'a> {
    pub left: &'a [Token],
    pub op: ComparisonOperator,
    pub right: &'a [Token],
    /// Index of the comparison token within the condition
    pub op_index: usize,
}

/// Split a condition into `left op right`.
///
/// The condition must hold exactly one comparison token with non-empty
/// operands on both sides.
pub fn split_comparison(tokens: &[Token]) -> FormulaResult<Comparison<'_>> {
    let positions: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.kind == TokenKind::Condition)
        .map(|(i, _)| i)
        .collect();

    if positions.len() != 1 {
        return Err(FormulaError::ComparisonCount(positions.len()));
    }

    let op_index = positions[0];
    let symbol = &tokens[op_index].value;
    let op = ComparisonOperator::from_symbol(symbol)
        .ok_or_else(|| FormulaError::UnknownComparison(symbol.clone()))?;

    let left = &tokens[..op_index];
    let right = &tokens[op_index + 1..];
    if left.is_empty() || right.is_empty() {
        return Err(FormulaError::MissingOperand);
    }

    Ok(Comparison {
        left,
        op,
        right,
        op_index,
    })
}

/// Operator symbols recognized in operator tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symbol {
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
}

impl Symbol {
    fn from_token(token: &Token) -> FormulaResult<Self> {
        match token.value.trim() {
            "+" => Ok(Symbol::Plus),
            "-" => Ok(Symbol::Minus),
            "*" => Ok(Symbol::Star),
            "/" => Ok(Symbol::Slash),
            "(" => Ok(Symbol::LeftParen),
            ")" => Ok(Symbol::RightParen),
            other => Err(FormulaError::Parse(format!("Unknown operator '{}'", other))),
        }
    }
}

struct TokenParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> TokenParser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// The operator symbol at the cursor, if the current token is an operator
    fn peek_symbol(&self) -> FormulaResult<Option<Symbol>> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Operator => Symbol::from_token(token).map(Some),
            _ => Ok(None),
        }
    }

    /// Run `parse` one nesting level deeper
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> FormulaResult<T>) -> FormulaResult<T> {
        if self.depth >= MAX_DEPTH {
            return Err(FormulaError::Parse("Formula is nested too deeply".into()));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -
    // 2. Multiplication/Division: *, /
    // 3. Unary: -, +
    // 4. Primary: numbers, columns, parentheses

    fn parse_additive(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek_symbol()? {
                Some(Symbol::Plus) => BinaryOperator::Add,
                Some(Symbol::Minus) => BinaryOperator::Subtract,
                _ => break,
            };

            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek_symbol()? {
                Some(Symbol::Star) => BinaryOperator::Multiply,
                Some(Symbol::Slash) => BinaryOperator::Divide,
                _ => break,
            };

            self.advance();
            let right = self.parse_unary()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        match self.peek_symbol()? {
            Some(Symbol::Minus) => {
                self.advance();
                let operand = self.nested(Self::parse_unary)?;
                Ok(Expr::Negate(Box::new(operand)))
            }
            // Prefix plus (no-op)
            Some(Symbol::Plus) => {
                self.advance();
                self.nested(Self::parse_unary)
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        let token = self
            .advance()
            .ok_or_else(|| FormulaError::Parse("Unexpected end of formula".into()))?;

        match token.kind {
            TokenKind::Number => {
                let n = token
                    .value
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| FormulaError::InvalidNumber(token.value.clone()))?;
                Ok(Expr::Number(n))
            }
            TokenKind::Column => Ok(Expr::Column {
                id: token.value.clone(),
                display: token.label().to_string(),
            }),
            TokenKind::Operator => match Symbol::from_token(token)? {
                Symbol::LeftParen => {
                    let expr = self.nested(Self::parse_additive)?;
                    match self.advance() {
                        Some(t)
                            if t.kind == TokenKind::Operator
                                && matches!(Symbol::from_token(t), Ok(Symbol::RightParen)) =>
                        {
                            Ok(expr)
                        }
                        _ => Err(FormulaError::Parse("Expected closing ')'".into())),
                    }
                }
                _ => Err(FormulaError::Parse(format!(
                    "Unexpected operator '{}'",
                    token.label()
                ))),
            },
            TokenKind::Condition => Err(FormulaError::Parse(format!(
                "Comparison '{}' is only allowed in an IF condition",
                token.label()
            ))),
            TokenKind::Logical => Err(FormulaError::Parse(format!(
                "Unexpected keyword '{}'",
                token.label()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Keyword;
    use pretty_assertions::assert_eq;

    fn num(s: &str) -> Token {
        Token::number(s)
    }

    fn op(s: &str) -> Token {
        Token::operator(s)
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_expression(&[num("42")]).unwrap(), Expr::Number(42.0));
        assert_eq!(parse_expression(&[num("3.14")]).unwrap(), Expr::Number(3.14));
    }

    #[test]
    fn test_parse_column() {
        let ast = parse_expression(&[Token::column("c1", "Cost")]).unwrap();
        assert_eq!(
            ast,
            Expr::Column {
                id: "c1".into(),
                display: "Cost".into()
            }
        );
    }

    #[test]
    fn test_parse_precedence() {
        // 1 + 2 * 3 => 1 + (2 * 3)
        let ast = parse_expression(&[num("1"), op("+"), num("2"), op("*"), num("3")]).unwrap();
        match ast {
            Expr::BinaryOp {
                op: BinaryOperator::Add,
                right,
                ..
            } => assert!(matches!(
                *right,
                Expr::BinaryOp {
                    op: BinaryOperator::Multiply,
                    ..
                }
            )),
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn test_parse_parentheses() {
        // (1 + 2) * 3
        let ast = parse_expression(&[
            op("("),
            num("1"),
            op("+"),
            num("2"),
            op(")"),
            op("*"),
            num("3"),
        ])
        .unwrap();
        assert!(matches!(
            ast,
            Expr::BinaryOp {
                op: BinaryOperator::Multiply,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_unary() {
        let ast = parse_expression(&[op("-"), num("5")]).unwrap();
        assert_eq!(ast, Expr::Negate(Box::new(Expr::Number(5.0))));

        let ast = parse_expression(&[op("+"), num("5")]).unwrap();
        assert_eq!(ast, Expr::Number(5.0));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_expression(&[]), Err(FormulaError::Empty));
        assert!(matches!(
            parse_expression(&[num("1"), op("+")]),
            Err(FormulaError::Parse(_))
        ));
        assert!(matches!(
            parse_expression(&[op("("), num("1")]),
            Err(FormulaError::Parse(_))
        ));
        assert!(matches!(
            parse_expression(&[num("1"), num("2")]),
            Err(FormulaError::Parse(_))
        ));
        assert!(matches!(
            parse_expression(&[num("1"), op("%"), num("2")]),
            Err(FormulaError::Parse(_))
        ));
        assert_eq!(
            parse_expression(&[num("1.2.3")]),
            Err(FormulaError::InvalidNumber("1.2.3".into()))
        );
        assert!(matches!(
            parse_expression(&[Token::logical(Keyword::True)]),
            Err(FormulaError::Parse(_))
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let nested_too_deeply = Err(FormulaError::Parse("Formula is nested too deeply".into()));

        let mut negations = vec![op("-"); MAX_DEPTH + 1];
        negations.push(num("1"));
        assert_eq!(parse_expression(&negations), nested_too_deeply);

        let mut parens = vec![op("("); MAX_DEPTH + 1];
        parens.push(num("1"));
        parens.extend(vec![op(")"); MAX_DEPTH + 1]);
        assert_eq!(parse_expression(&parens), nested_too_deeply);

        let mut shallow = vec![op("("); 10];
        shallow.push(op("-"));
        shallow.push(num("1"));
        shallow.extend(vec![op(")"); 10]);
        assert!(parse_expression(&shallow).is_ok());
    }

    #[test]
    fn test_length_limit() {
        let mut unary_run = vec![op("-"); 20_000];
        unary_run.push(num("1"));
        assert_eq!(
            parse_expression(&unary_run),
            Err(FormulaError::Parse("Formula is too long".into()))
        );

        let mut sum = vec![num("1")];
        for _ in 0..1000 {
            sum.push(op("+"));
            sum.push(num("1"));
        }
        assert!(parse_expression(&sum).is_ok());
    }

    #[test]
    fn test_split_comparison() {
        let tokens = vec![
            Token::column("a", "A"),
            op("+"),
            num("1"),
            Token::condition(">="),
            num("10"),
        ];
        let cmp = split_comparison(&tokens).unwrap();
        assert_eq!(cmp.left.len(), 3);
        assert_eq!(cmp.op, ComparisonOperator::GreaterEqual);
        assert_eq!(cmp.right.len(), 1);
        assert_eq!(cmp.op_index, 3);
    }

    #[test]
    fn test_split_comparison_errors() {
        assert_eq!(
            split_comparison(&[num("1")]),
            Err(FormulaError::ComparisonCount(0))
        );
        assert_eq!(
            split_comparison(&[
                num("1"),
                Token::condition("<"),
                num("2"),
                Token::condition("<"),
                num("3")
            ]),
            Err(FormulaError::ComparisonCount(2))
        );
        assert_eq!(
            split_comparison(&[Token::condition("=="), num("2")]),
            Err(FormulaError::MissingOperand)
        );
        assert_eq!(
            split_comparison(&[num("1"), Token::condition("=>"), num("2")]),
            Err(FormulaError::UnknownComparison("=>".into()))
        );
    }
}
