//! Least-fixed-point solver
//!
//! Given the compiled requirement system plus runtime overrides (inventory,
//! settings, checked locations, exit assignments), computes the least bit-set
//! closed under all implications. The system is monotone, so the fixed point
//! is unique and iteration terminates.

use crate::bitset::BitSet;
use crate::dnf::Dnf;
use crate::graph::{Fact, RequirementGraph};
use std::collections::HashMap;

/// Runtime requirement layers keyed by fact. Overrides never mutate the
/// graph; they replace a fact's requirement for the duration of one solve.
pub type Overrides = HashMap<Fact, Dnf>;

/// Computes the least fixed point of the graph's implications under the
/// given overrides.
///
/// When a fact is present in several override sets, the last one wins; see
/// [`override_conflicts`] for detecting that situation. `starting_bits`
/// resumes from an earlier result after strictly monotone override changes,
/// which is purely a performance optimization and never changes the outcome.
pub fn solve(
    graph: &RequirementGraph,
    overrides: &[&Overrides],
    starting_bits: Option<&BitSet>,
) -> BitSet {
    let num_facts = graph.num_facts();
    let mut effective: Vec<&Dnf> = graph.requirements.iter().collect();
    for layer in overrides {
        for (&fact, expr) in layer.iter() {
            effective[fact] = expr;
        }
    }

    let mut bits = match starting_bits {
        Some(bits) => bits.clone(),
        None => BitSet::with_capacity(num_facts),
    };

    let mut changed = true;
    while changed {
        changed = false;
        for (fact, expr) in effective.iter().enumerate() {
            if expr.is_trivially_false() || bits.test(fact) {
                continue;
            }
            if expr.eval(&bits) {
                bits.set_bit(fact);
                changed = true;
            }
        }
    }

    bits
}

/// Facts for which more than one non-trivial requirement candidate exists
/// among the static graph and the override sets.
///
/// Overrides are expected to be mutually exclusive by construction, so any
/// hit here is a logic error in the caller. [`solve`] still resolves the
/// conflict deterministically by preferring the last-registered override.
pub fn override_conflicts(graph: &RequirementGraph, overrides: &[&Overrides]) -> Vec<Fact> {
    let mut conflicts = Vec::new();
    for fact in 0..graph.num_facts() {
        let mut candidates = usize::from(!graph.requirements[fact].is_trivially_false());
        for layer in overrides {
            if layer.contains_key(&fact) {
                candidates += 1;
            }
        }
        if candidates > 1 {
            conflicts.push(fact);
        }
    }
    conflicts
}
