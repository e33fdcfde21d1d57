//! Requirement explanation minimizer
//!
//! Turns a fact's requirement into a compact, human-readable
//! [`BooleanExpression`] over opaque facts only. Two stages:
//!
//! 1. [`compute_ground_expression`] recursively substitutes non-opaque facts
//!    until only opaque ones remain, with a visited set breaking cycles
//!    (a recursive dependency contributes nothing new and collapses to
//!    false).
//! 2. [`minimize`] rewrites the resulting sum-of-products as a multi-level
//!    expression by extracting common factors and the best kernel divisor,
//!    recursing on quotient, divisor and remainder.
//!
//! The DNF has no negations and no don't-cares, so two-level methods
//! (Quine-McCluskey) find nothing to merge; kernel extraction is what
//! produces the factored forms people actually want to read.

mod algebra;
#[cfg(test)]
mod tests;

use crate::bitset::BitSet;
use crate::dnf::Dnf;
use crate::expression::{simplify, BooleanExpression, Item};
use crate::graph::{Fact, RequirementGraph};
use algebra::{algebraic_division, find_kernels, gen_rectangles, Kernel};
use std::collections::HashSet;
use std::sync::Arc;

/// Expands the requirement of `fact` into an expression over opaque facts
/// only.
pub fn compute_ground_expression(
    opaque: &BitSet,
    requirements: &[Dnf],
    fact: Fact,
) -> Dnf {
    let mut visited = HashSet::new();
    ground_expression(opaque, requirements, fact, &mut visited)
}

fn ground_expression(
    opaque: &BitSet,
    requirements: &[Dnf],
    fact: Fact,
    visited: &mut HashSet<Fact>,
) -> Dnf {
    if !visited.insert(fact) {
        return Dnf::never();
    }
    let mut result = Dnf::never();
    'next_conj: for conj in requirements[fact].conjunctions() {
        let mut expanded = Dnf::always();
        let conj_opaque = opaque.and(conj);
        for bit in conj.iter() {
            if conj_opaque.test(bit) {
                continue;
            }
            let term = ground_expression(opaque, requirements, bit, visited);
            if term.is_trivially_false() {
                continue 'next_conj;
            }
            expanded = expanded.and(&term).remove_duplicates();
        }
        if !conj_opaque.is_empty() {
            expanded = expanded.and_conjunction(&conj_opaque);
        }
        result = result.or(&expanded);
    }
    visited.remove(&fact);
    result.remove_duplicates()
}

/// Finds one path of not-yet-expanded, non-opaque facts leading into `fact`.
///
/// Deep expressions tend to share a few bottleneck facts (complex entrances,
/// mostly); expanding the facts on any path first and caching the results
/// makes subsequent [`compute_ground_expression`] calls much cheaper. Returns
/// `None` when `fact` itself has already been expanded, or when every path
/// runs into a visited or unsatisfiable fact.
pub fn find_new_subgoals(
    opaque: &BitSet,
    requirements: &[Dnf],
    fact: Fact,
    expanded: &HashSet<Fact>,
) -> Option<BitSet> {
    let mut visited = HashSet::new();
    any_path(opaque, requirements, fact, expanded, &mut visited)
}

fn any_path(
    opaque: &BitSet,
    requirements: &[Dnf],
    fact: Fact,
    expanded: &HashSet<Fact>,
    visited: &mut HashSet<Fact>,
) -> Option<BitSet> {
    if expanded.contains(&fact)
        || visited.contains(&fact)
        || requirements[fact].is_trivially_false()
    {
        return None;
    }
    visited.insert(fact);

    let this_bit = BitSet::single(fact);
    for conj in requirements[fact].conjunctions() {
        for bit in conj.iter() {
            if !opaque.test(bit) && !expanded.contains(&bit) {
                if let Some(more) = any_path(opaque, requirements, bit, expanded, visited) {
                    return Some(this_bit.or(&more));
                }
            }
        }
    }

    visited.remove(&fact);
    Some(this_bit)
}

/// Rewrites a ground DNF as a compact multi-level expression.
pub fn minimize(graph: &RequirementGraph, expr: &Dnf) -> BooleanExpression {
    minimize_sop(graph, expr.conjunctions())
}

fn term(graph: &RequirementGraph, fact: Fact) -> Item {
    Item::Term(Arc::clone(graph.fact_name(fact)))
}

fn cube_to_and(graph: &RequirementGraph, cube: &BitSet) -> BooleanExpression {
    BooleanExpression::and(cube.iter().map(|fact| term(graph, fact)).collect())
}

fn minimize_sop(graph: &RequirementGraph, sop: &[BitSet]) -> BooleanExpression {
    if sop.is_empty() {
        return BooleanExpression::never();
    }
    if sop.len() == 1 && sop[0].is_empty() {
        return BooleanExpression::always();
    }

    let implies = |a: &str, b: &str| graph.implies(a, b);

    if sop.len() == 1 {
        return simplify(&cube_to_and(graph, &sop[0]), &implies);
    }

    let mut conjunctions = Dnf::from_conjunctions(sop.to_vec())
        .remove_duplicates()
        .into_conjunctions();

    // Drop dominated facts within each cube so factoring never pulls out a
    // fact that a stronger one in the same cube already implies.
    for conj in &mut conjunctions {
        for fact in conj.iter().collect::<Vec<_>>() {
            let Some(dominators) = graph.dominators.get(graph.fact_name(fact)) else {
                continue;
            };
            for dominator in dominators {
                if let Some(dominator_fact) = graph.fact(dominator) {
                    if dominator_fact != fact && conj.test(dominator_fact) {
                        conj.clear_bit(fact);
                    }
                }
            }
        }
    }

    // Make the SOP cube-free; kernel extraction requires it.
    let mut common_factors = conjunctions[0].clone();
    for conj in &conjunctions {
        common_factors = common_factors.and(conj);
    }
    let mut variables = BitSet::new();
    for conj in &mut conjunctions {
        for fact in common_factors.iter() {
            conj.clear_bit(fact);
        }
        variables = variables.or(conj);
    }
    let variables: Vec<usize> = variables.iter().collect();

    let kernels: Vec<Kernel> = find_kernels(&conjunctions, &variables)
        .into_iter()
        .filter(|k| !k.co_kernel.is_empty())
        .collect();

    // Columns are the unique cubes across all kernels, rows the co-kernels.
    let mut columns: Vec<BitSet> = Vec::new();
    for kernel in &kernels {
        for cube in &kernel.kernel {
            if !columns.contains(cube) {
                columns.push(cube.clone());
            }
        }
    }
    let rows = &kernels;

    if !rows.is_empty() && !columns.is_empty() {
        let mut matrix = vec![vec![false; columns.len()]; rows.len()];
        for (col, cube) in columns.iter().enumerate() {
            for (row, kernel) in rows.iter().enumerate() {
                if kernel.kernel.contains(cube) {
                    matrix[row][col] = true;
                }
            }
        }

        let row_weight = |row: usize| rows[row].co_kernel.num_set_bits() + 1;
        let col_weight = |col: usize| columns[col].num_set_bits();
        let value = |col: usize, row: usize| {
            rows[row].co_kernel.or(&columns[col]).num_set_bits()
        };
        let literals_saved = |rect_rows: &[usize], rect_cols: &[usize]| -> i64 {
            let covered: i64 = rect_rows
                .iter()
                .map(|&row| {
                    rect_cols
                        .iter()
                        .filter(|&&col| matrix[row][col])
                        .map(|&col| value(col, row) as i64)
                        .sum::<i64>()
                })
                .sum();
            covered
                - rect_rows.iter().map(|&row| row_weight(row) as i64).sum::<i64>()
                - rect_cols.iter().map(|&col| col_weight(col) as i64).sum::<i64>()
        };

        let mut all_rects: Vec<(Vec<usize>, Vec<usize>)> = Vec::new();
        gen_rectangles(&matrix, |rect_rows, rect_cols| {
            all_rects.push((rect_rows.to_vec(), rect_cols.to_vec()));
            // No bound; our matrices are small enough to enumerate.
            true
        });

        // First rectangle on ties, so results are stable.
        let mut best: Option<(&[usize], i64)> = None;
        for (rect_rows, rect_cols) in &all_rects {
            let saved = literals_saved(rect_rows, rect_cols);
            if best.map_or(true, |(_, best_saved)| saved > best_saved) {
                best = Some((rect_cols, saved));
            }
        }

        if let Some((rect_cols, _)) = best {
            let divisor: Vec<BitSet> = rect_cols.iter().map(|&col| columns[col].clone()).collect();
            let division = algebraic_division(&conjunctions, &divisor);
            let quotient = Dnf::from_conjunctions(division.quotient).remove_duplicates();

            let product = BooleanExpression::and(vec![
                minimize_sop(graph, quotient.conjunctions()).into(),
                minimize_sop(graph, &divisor).into(),
            ]);
            let sum = BooleanExpression::or(vec![
                product.into(),
                minimize_sop(graph, &division.remainder).into(),
            ]);

            // CommonFactor1 & CommonFactor2 & (Quotient & Divisor | Remainder)
            let mut and_terms: Vec<Item> =
                common_factors.iter().map(|fact| term(graph, fact)).collect();
            and_terms.push(sum.into());
            return simplify(&BooleanExpression::and(and_terms), &implies);
        }
    }

    // Nothing to extract: CommonFactor1 & CommonFactor2 & (rest of the SOP)
    let mut and_terms: Vec<Item> = common_factors.iter().map(|fact| term(graph, fact)).collect();
    and_terms.push(
        BooleanExpression::or(
            conjunctions
                .iter()
                .map(|cube| cube_to_and(graph, cube).into())
                .collect(),
        )
        .into(),
    );
    simplify(&BooleanExpression::and(and_terms), &implies)
}
