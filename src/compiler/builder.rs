//! Bridges the stringly-typed world description to fact-indexed requirements
//!
//! Used only while building the graph; all hot-path code afterwards works on
//! fact indices.

use super::error::{CompileError, CompileWarning};
use crate::dnf::Dnf;
use crate::expression::{BooleanExpression, Item, Op};
use crate::graph::Fact;
use std::collections::HashMap;
use std::sync::Arc;

const DAY_SUFFIX: &str = "_DAY";
const NIGHT_SUFFIX: &str = "_NIGHT";

fn day_name(name: &str) -> String {
    format!("{}{}", name, DAY_SUFFIX)
}

fn night_name(name: &str) -> String {
    format!("{}{}", name, NIGHT_SUFFIX)
}

pub(super) struct GraphBuilder<'a> {
    fact_ids: &'a HashMap<Arc<str>, Fact>,
    pub requirements: Vec<Dnf>,
    pub warnings: Vec<CompileWarning>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(fact_ids: &'a HashMap<Arc<str>, Fact>, num_facts: usize) -> Self {
        GraphBuilder {
            fact_ids,
            requirements: vec![Dnf::never(); num_facts],
            warnings: Vec::new(),
        }
    }

    /// Resolves a fact name to its index.
    pub fn fact(&self, name: &str) -> Result<Fact, CompileError> {
        self.fact_ids
            .get(name)
            .copied()
            .ok_or_else(|| CompileError::UnknownFact {
                name: name.to_string(),
            })
    }

    /// The day-variant fact of a `Both`-mode name.
    pub fn day(&self, name: &str) -> Result<Fact, CompileError> {
        self.fact(&day_name(name))
    }

    /// The night-variant fact of a `Both`-mode name.
    pub fn night(&self, name: &str) -> Result<Fact, CompileError> {
        self.fact(&night_name(name))
    }

    /// Sets the requirement for `fact`, warning when one already exists.
    pub fn set(&mut self, fact: Fact, name: &str, rhs: Dnf) {
        if !self.requirements[fact].is_trivially_false() {
            self.warnings.push(CompileWarning::RequirementOverwritten {
                name: name.to_string(),
            });
        }
        self.requirements[fact] = rhs;
    }

    /// Adds `rhs` as an alternative way to satisfy `fact`.
    pub fn add_alternative(&mut self, fact: Fact, rhs: &Dnf) {
        self.requirements[fact] = self.requirements[fact].or(rhs);
    }

    /// Parses a textual requirement into a DNF over known facts.
    pub fn parse_requirement(&self, text: &str) -> Result<Dnf, CompileError> {
        let expr = BooleanExpression::parse(text)?;
        self.expr_to_dnf(&expr)
    }

    /// Converts an and/or tree into DNF. The reserved terms `True`, `False`
    /// and `Unknown` are constants; everything else must be a declared fact.
    pub fn expr_to_dnf(&self, expr: &BooleanExpression) -> Result<Dnf, CompileError> {
        match expr.op {
            Op::Or => {
                let mut result = Dnf::never();
                for item in &expr.items {
                    result = result.or(&self.item_to_dnf(item)?);
                }
                Ok(result)
            }
            Op::And => {
                let mut result = Dnf::always();
                for item in &expr.items {
                    result = result.and(&self.item_to_dnf(item)?);
                }
                Ok(result)
            }
        }
    }

    fn item_to_dnf(&self, item: &Item) -> Result<Dnf, CompileError> {
        match item {
            Item::Expr(expr) => self.expr_to_dnf(expr),
            Item::Term(name) => match &**name {
                "True" => Ok(Dnf::always()),
                "False" | "Unknown" => Ok(Dnf::never()),
                other => Ok(Dnf::single(self.fact(other)?)),
            },
        }
    }
}
