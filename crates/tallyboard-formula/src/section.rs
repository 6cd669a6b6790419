//! Conditional section partitioning
//!
//! Splits a token sequence into the condition, THEN-branch and ELSE-branch
//! slices around the first `if`, `then` and `else` keywords. No validation
//! happens here beyond locating the keywords.

use crate::token::{Keyword, Token};

/// The sections of a (possibly conditional) formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections<'a> {
    /// Tokens after `if` up to the next `then`/`else`; the whole formula when there is no `if`
    pub condition: &'a [Token],
    /// Tokens strictly between `then` and `else` (or the end)
    pub then_branch: &'a [Token],
    /// Tokens strictly after `else`
    pub else_branch: &'a [Token],
    pub has_if: bool,
    pub has_then: bool,
    pub has_else: bool,
    if_at: Option<usize>,
    then_at: Option<usize>,
    else_at: Option<usize>,
}

impl<'a> Sections<'a> {
    /// Check that `if` precedes `then`, and `then` precedes `else`, for
    /// the keywords present.
    pub fn is_ordered(&self) -> bool {
        let if_then = match (self.if_at, self.then_at) {
            (Some(i), Some(t)) => i < t,
            (None, Some(_)) => false,
            _ => true,
        };
        let then_else = match (self.then_at, self.else_at) {
            (Some(t), Some(e)) => t < e,
            (None, Some(_)) => false,
            _ => true,
        };
        if_then && then_else
    }

    /// Index of the `if` keyword
    pub fn if_index(&self) -> Option<usize> {
        self.if_at
    }

    /// Index of the `then` keyword
    pub fn then_index(&self) -> Option<usize> {
        self.then_at
    }

    /// Index of the `else` keyword
    pub fn else_index(&self) -> Option<usize> {
        self.else_at
    }

    /// Token index range of the condition within the full sequence
    pub fn condition_range(&self) -> std::ops::Range<usize> {
        let start = self.if_at.map_or(0, |i| i + 1);
        start..start + self.condition.len()
    }
}

/// Split a token sequence into its conditional sections
pub fn partition(tokens: &[Token]) -> Sections<'_> {
    let find = |keyword: Keyword| tokens.iter().position(|t| t.is_keyword(keyword));
    let if_at = find(Keyword::If);
    let then_at = find(Keyword::Then);
    let else_at = find(Keyword::Else);
    let len = tokens.len();

    let condition = match if_at {
        Some(i) => {
            let end = [then_at, else_at]
                .into_iter()
                .flatten()
                .filter(|&k| k > i)
                .min()
                .unwrap_or(len);
            &tokens[i + 1..end]
        }
        None => tokens,
    };

    let then_branch = match then_at {
        Some(t) => {
            let end = else_at.filter(|&e| e > t).unwrap_or(len);
            &tokens[t + 1..end]
        }
        None => &[],
    };

    let else_branch = match else_at {
        Some(e) => &tokens[e + 1..],
        None => &[],
    };

    Sections {
        condition,
        then_branch,
        else_branch,
        has_if: if_at.is_some(),
        has_then: then_at.is_some(),
        has_else: else_at.is_some(),
        if_at,
        then_at,
        else_at,
    }
}
