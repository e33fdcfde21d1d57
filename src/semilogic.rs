//! Semilogic: reachability under optimistic assumptions
//!
//! A check is "in semilogic" when it is not reachable with the tracked
//! inventory alone, but becomes reachable once facts the player is certain
//! to be able to collect are assumed: reachable counted checks, hinted
//! items, predictable dungeon keys. Which facts may be assumed is domain
//! knowledge, so the caller supplies it as a closure that folds new
//! assumptions into an override layer; the loop here just re-solves until
//! that closure stops finding anything.
//!
//! Assumptions only ever grow, so every re-solve resumes from the previous
//! bit-set.

use crate::bitset::BitSet;
use crate::graph::RequirementGraph;
use crate::solver::{solve, Overrides};
use std::collections::HashMap;

/// The result of [`compute_semilogic`].
#[derive(Debug, Clone)]
pub struct SemiLogicOutcome {
    /// Facts reachable under assumptions.
    pub semi_bits: BitSet,
    /// Facts reachable under assumptions plus the trick overrides. Equal to
    /// `semi_bits` when no trick layer was given.
    pub trick_bits: BitSet,
    /// The assumption layer as it stood when the loops settled.
    pub assumptions: Overrides,
}

/// Runs the semilogic loop, then optionally a second loop with the trick
/// override layer added (typically one granting every trick fact).
///
/// `assume` is called after every solve with the current bits and may add
/// assumption overrides; it returns whether it added anything. It must be
/// monotone: removing assumptions it made earlier would invalidate the
/// resumed solves.
pub fn compute_semilogic<F>(
    graph: &RequirementGraph,
    base: &[&Overrides],
    tricks: Option<&Overrides>,
    in_logic_bits: &BitSet,
    mut assume: F,
) -> SemiLogicOutcome
where
    F: FnMut(&RequirementGraph, &BitSet, &mut Overrides) -> bool,
{
    let mut assumptions: Overrides = HashMap::new();
    let mut semi_bits = in_logic_bits.clone();

    loop {
        semi_bits = {
            let mut layers: Vec<&Overrides> = base.to_vec();
            layers.push(&assumptions);
            solve(graph, &layers, Some(&semi_bits))
        };
        if !assume(graph, &semi_bits, &mut assumptions) {
            break;
        }
    }

    let final_semi_bits = semi_bits.clone();

    if let Some(tricks) = tricks {
        loop {
            semi_bits = {
                let mut layers: Vec<&Overrides> = base.to_vec();
                layers.push(tricks);
                layers.push(&assumptions);
                solve(graph, &layers, Some(&semi_bits))
            };
            if !assume(graph, &semi_bits, &mut assumptions) {
                break;
            }
        }
    }

    SemiLogicOutcome {
        semi_bits: final_semi_bits,
        trick_bits: semi_bits,
        assumptions,
    }
}
