//! Parse failures for the requirement expression language
//!
//! The grammar is tiny: terms, `&`, `|` and parentheses. The only ways a
//! requirement can fail to parse are a connective or parenthesis in the
//! wrong place, or text that stops while the grammar still needs more.
//! Variants keep the original requirement text and the byte offset so
//! dump errors can point at the offending spot.

use lalrpop_util::lexer::Token;
use lalrpop_util::ParseError;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionParseError {
    /// A token the grammar does not allow at this point, as in
    /// `Sword & | Bow`.
    UnexpectedToken {
        /// The requirement text being parsed.
        input: Arc<str>,
        /// The offending token.
        token: Arc<str>,
        /// Byte offset of the token within `input`.
        offset: usize,
        /// Terminal names the parser would have accepted instead.
        expected: Vec<String>,
    },
    /// The text ran out mid-expression: a trailing connective, an unclosed
    /// parenthesis, or an empty requirement.
    UnexpectedEnd {
        input: Arc<str>,
        expected: Vec<String>,
    },
}

impl ExpressionParseError {
    pub(crate) fn from_parse_error(
        input: &str,
        error: ParseError<usize, Token<'_>, &'static str>,
    ) -> Self {
        let owned: Arc<str> = Arc::from(input);
        match error {
            ParseError::UnrecognizedToken {
                token: (offset, token, _),
                expected,
            } => ExpressionParseError::UnexpectedToken {
                input: owned,
                token: Arc::from(token.1),
                offset,
                expected,
            },
            ParseError::UnrecognizedEof { expected, .. } => ExpressionParseError::UnexpectedEnd {
                input: owned,
                expected,
            },
            // The lexer skips whitespace and every other character starts
            // some token, and the grammar has no fallible actions, so the
            // remaining cases cannot occur here. Fold them into the closest
            // report to keep the conversion total.
            ParseError::InvalidToken { location }
            | ParseError::ExtraToken {
                token: (location, ..),
            } => {
                let token: String = owned[location..].chars().take(1).collect();
                ExpressionParseError::UnexpectedToken {
                    input: owned,
                    token: Arc::from(token.as_str()),
                    offset: location,
                    expected: Vec::new(),
                }
            }
            ParseError::User { .. } => ExpressionParseError::UnexpectedEnd {
                input: owned,
                expected: Vec::new(),
            },
        }
    }
}

impl fmt::Display for ExpressionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionParseError::UnexpectedToken {
                input,
                token,
                offset,
                expected,
            } => {
                write!(
                    f,
                    "unexpected `{}` at offset {} in requirement {:?}",
                    token, offset, input
                )?;
                if !expected.is_empty() {
                    write!(f, ", expected {}", expected.join(" or "))?;
                }
                Ok(())
            }
            ExpressionParseError::UnexpectedEnd { input, expected } => {
                write!(f, "requirement {:?} ends mid-expression", input)?;
                if !expected.is_empty() {
                    write!(f, ", expected {}", expected.join(" or "))?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ExpressionParseError {}
