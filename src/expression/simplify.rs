//! Tree simplification for minimised expressions
//!
//! Works on the and/or tree directly, using a caller-supplied domination
//! relation between terms. `implies(a, b)` must answer whether holding term
//! `a` always entails holding term `b`; for progressive item counts
//! "Sword x3" implies "Sword x2". Equality of names always implies.
//!
//! The rewrites applied are the classic ones for monotone formulas:
//!
//! - in an `or`, a term that implies a sibling is redundant
//! - in an `and`, a term implied by a sibling is redundant
//! - absorption: in an `or`, an `and` child falls away when one of its terms
//!   implies a sibling; in an `and`, an `or` child falls away when a sibling
//!   implies one of its terms
//! - same-op children are flattened and single-item nodes unwrapped

use super::{BooleanExpression, Item, Op};

/// Simplifies the expression tree under the given term domination relation.
pub fn simplify<F>(expr: &BooleanExpression, implies: &F) -> BooleanExpression
where
    F: Fn(&str, &str) -> bool,
{
    match simplify_item(&Item::Expr(expr.clone()), implies) {
        Item::Expr(expr) => expr,
        term @ Item::Term(_) => BooleanExpression::and(vec![term]),
    }
}

fn term_implies<F>(implies: &F, a: &str, b: &str) -> bool
where
    F: Fn(&str, &str) -> bool,
{
    a == b || implies(a, b)
}

fn simplify_item<F>(item: &Item, implies: &F) -> Item
where
    F: Fn(&str, &str) -> bool,
{
    let expr = match item {
        Item::Term(_) => return item.clone(),
        Item::Expr(expr) => expr,
    };

    // bottom-up, flattening same-op children as we collect them
    let mut items: Vec<Item> = Vec::with_capacity(expr.items.len());
    for child in &expr.items {
        match simplify_item(child, implies) {
            Item::Expr(sub) if sub.op == expr.op => items.extend(sub.items),
            other => items.push(other),
        }
    }

    items = remove_dominated(expr.op, items, implies);

    if items.len() == 1 {
        return items.pop().unwrap();
    }
    Item::Expr(BooleanExpression { op: expr.op, items })
}

/// Removes items made redundant by a sibling under the domination relation.
fn remove_dominated<F>(op: Op, items: Vec<Item>, implies: &F) -> Vec<Item>
where
    F: Fn(&str, &str) -> bool,
{
    let mut kept: Vec<Item> = Vec::with_capacity(items.len());
    'next: for (idx, item) in items.iter().enumerate() {
        for (other_idx, other) in items.iter().enumerate() {
            if other_idx == idx {
                continue;
            }
            if dominates(op, other, item, implies) {
                // on mutual domination (duplicates), keep only the first copy
                if other_idx < idx || !dominates(op, item, other, implies) {
                    continue 'next;
                }
            }
        }
        kept.push(item.clone());
    }
    kept
}

/// Whether keeping `keeper` makes `candidate` redundant inside an `op` node.
fn dominates<F>(op: Op, keeper: &Item, candidate: &Item, implies: &F) -> bool
where
    F: Fn(&str, &str) -> bool,
{
    match op {
        // in an or, candidate is redundant when candidate entails keeper
        Op::Or => entails_term(candidate, keeper, implies),
        // in an and, candidate is redundant when keeper entails candidate
        Op::And => entails_term(keeper, candidate, implies),
    }
}

/// Whether `source` holding always makes `target` hold.
///
/// Only the cheap structural cases are checked: term against term, an `and`
/// whose term implies the target, an `or` all of whose terms imply the
/// target, and the mirrored cases on the target side. That covers the
/// absorption rewrites without a full entailment test.
fn entails_term<F>(source: &Item, target: &Item, implies: &F) -> bool
where
    F: Fn(&str, &str) -> bool,
{
    match (source, target) {
        (Item::Term(a), Item::Term(b)) => term_implies(implies, a, b),
        (Item::Expr(expr), target) => match expr.op {
            // an and entails the target if any conjunct does
            Op::And => expr.items.iter().any(|i| entails_term(i, target, implies)),
            // an or entails the target only if every branch does
            Op::Or => {
                !expr.items.is_empty()
                    && expr.items.iter().all(|i| entails_term(i, target, implies))
            }
        },
        (source @ Item::Term(_), Item::Expr(expr)) => match expr.op {
            Op::Or => expr.items.iter().any(|i| entails_term(source, i, implies)),
            Op::And => {
                !expr.items.is_empty()
                    && expr.items.iter().all(|i| entails_term(source, i, implies))
            }
        },
    }
}
