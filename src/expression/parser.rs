//! Parsing support for requirement expressions

use super::error::ExpressionParseError;
use super::BooleanExpression;

// Lalrpop-generated parser module (generated in OUT_DIR at build time)
#[allow(clippy::all)]
mod parser_impl {
    #![allow(clippy::all)]
    #![allow(dead_code)]
    #![allow(unused_variables)]
    #![allow(unused_imports)]
    #![allow(non_snake_case)]
    #![allow(non_camel_case_types)]
    #![allow(non_upper_case_globals)]
    include!(concat!(env!("OUT_DIR"), "/expression/requirement.rs"));
}

impl BooleanExpression {
    /// Parse a requirement expression from a string
    ///
    /// Supports:
    /// - `|` for OR (lowest precedence)
    /// - `&` for AND
    /// - Parentheses for grouping
    /// - Any other run of characters is a term, surrounding whitespace trimmed
    pub fn parse(input: &str) -> Result<Self, ExpressionParseError> {
        parser_impl::RequirementParser::new()
            .parse(input)
            .map_err(|e| ExpressionParseError::from_parse_error(input, e))
    }
}
