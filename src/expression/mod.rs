//! Boolean requirement expressions
//!
//! This module provides the human-readable counterpart to [`crate::dnf::Dnf`]:
//! an n-ary and/or tree over named terms, the form requirements take in logic
//! source files and the form minimised results are handed back in.
//!
//! # Main Types
//!
//! - [`BooleanExpression`] - an `and` or `or` node over a list of [`Item`]s
//! - [`Item`] - either a named term or a nested expression
//!
//! Expressions are parsed from strings like
//! `Progressive Sword x2 & (Bomb Bag | Slingshot)` where `&` binds tighter
//! than `|` and any run of characters outside `&|()` is a term (surrounding
//! whitespace trimmed). The serialised form is a tagged tree so downstream
//! consumers never re-parse strings:
//!
//! ```json
//! {"kind": "or", "items": ["Slingshot", {"kind": "and", "items": ["Bomb Bag", "Bow"]}]}
//! ```

mod parser;
pub mod error;
mod simplify;

pub use error::ExpressionParseError;
pub use simplify::simplify;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The connective of a [`BooleanExpression`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    And,
    Or,
}

/// A child of a [`BooleanExpression`]: either a named term or a subexpression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Item {
    Term(Arc<str>),
    Expr(BooleanExpression),
}

impl Item {
    pub fn term(name: &str) -> Item {
        Item::Term(Arc::from(name))
    }
}

impl From<BooleanExpression> for Item {
    fn from(expr: BooleanExpression) -> Item {
        Item::Expr(expr)
    }
}

/// An n-ary and/or tree over named terms.
///
/// By convention an empty `and` is trivially true and an empty `or` is
/// trivially false, matching the identities of the two connectives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanExpression {
    #[serde(rename = "kind")]
    pub op: Op,
    pub items: Vec<Item>,
}

impl BooleanExpression {
    pub fn and(items: Vec<Item>) -> Self {
        BooleanExpression { op: Op::And, items }
    }

    pub fn or(items: Vec<Item>) -> Self {
        BooleanExpression { op: Op::Or, items }
    }

    /// The trivially true expression.
    pub fn always() -> Self {
        BooleanExpression::and(Vec::new())
    }

    /// The trivially false expression.
    pub fn never() -> Self {
        BooleanExpression::or(Vec::new())
    }

    pub fn is_trivially_true(&self) -> bool {
        self.op == Op::And && self.items.is_empty()
    }

    pub fn is_trivially_false(&self) -> bool {
        self.op == Op::Or && self.items.is_empty()
    }

    /// Joins two items under `op`, flattening when the left side is already a
    /// node of the same connective. The parser uses this so `a & b & c`
    /// becomes one three-item node instead of a left-leaning chain.
    pub(crate) fn join(op: Op, left: Item, right: Item) -> Item {
        match left {
            Item::Expr(mut expr) if expr.op == op => {
                expr.items.push(right);
                Item::Expr(expr)
            }
            other => Item::Expr(BooleanExpression {
                op,
                items: vec![other, right],
            }),
        }
    }

    /// Wraps a lone item into an expression node without adding nesting.
    pub(crate) fn from_item(item: Item) -> Self {
        match item {
            Item::Expr(expr) => expr,
            term @ Item::Term(_) => BooleanExpression::and(vec![term]),
        }
    }
}

impl fmt::Display for BooleanExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = match self.op {
            Op::And => " & ",
            Op::Or => " | ",
        };
        if self.items.is_empty() {
            return match self.op {
                Op::And => write!(f, "True"),
                Op::Or => write!(f, "False"),
            };
        }
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(sep)?;
            }
            match item {
                Item::Term(name) => f.write_str(name)?,
                Item::Expr(expr) => {
                    // parenthesise only when the child binds looser
                    if self.op == Op::And && expr.op == Op::Or && expr.items.len() > 1 {
                        write!(f, "({})", expr)?;
                    } else {
                        write!(f, "{}", expr)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
