//! Load-time simplification of the requirement system
//!
//! A freshly compiled graph contains thousands of single-use intermediate
//! facts (area access at a time of day, mostly). The passes here shrink the
//! system without changing which facts are reachable from any seed of opaque
//! facts:
//!
//! * [`remove_duplicates`] drops subsumed cubes within each requirement,
//! * [`shallow_simplify`] inlines non-opaque facts whose requirement is at
//!   most one cube,
//! * [`unify_requirements`] collapses pairs of mutually-implying facts onto
//!   one representative.
//!
//! [`simplify_requirements`] runs them to saturation. The worker runs the
//! same loop with cancellation checks between passes.

use crate::bitset::BitSet;
use crate::dnf::Dnf;

/// Expressions wider than this are left alone by [`shallow_simplify`];
/// inlining into them tends to blow up the cube count faster than later
/// subsumption can recover.
const SHALLOW_SIMPLIFY_MAX_CONJUNCTIONS: usize = 30;

/// Removes subsumed cubes from every requirement in the system.
pub fn remove_duplicates(requirements: &mut [Dnf]) {
    for expr in requirements.iter_mut() {
        if expr.conjunctions().len() >= 2 {
            *expr = expr.remove_duplicates();
        }
    }
}

/// Inlines requirements that are at most one cube into their consumers.
///
/// Only non-opaque facts are inlined; opaque facts are the terminals the
/// runtime overrides, so their requirements must survive as-is. Returns
/// true iff anything changed.
pub fn shallow_simplify(opaque: &BitSet, requirements: &mut [Dnf]) -> bool {
    let mut simplification_bits = BitSet::with_capacity(requirements.len());
    for (fact, expr) in requirements.iter().enumerate() {
        if !opaque.test(fact) && expr.conjunctions().len() <= 1 {
            simplification_bits.set_bit(fact);
        }
    }

    let mut simplified = false;
    for fact in 0..requirements.len() {
        if requirements[fact].conjunctions().len() >= SHALLOW_SIMPLIFY_MAX_CONJUNCTIONS {
            continue;
        }
        let conjunctions = requirements[fact].conjunctions().to_vec();
        let mut new_conjunctions = Vec::with_capacity(conjunctions.len());
        for conj in &conjunctions {
            if !conj.intersects(&simplification_bits) {
                new_conjunctions.push(conj.clone());
                continue;
            }
            simplified = true;
            let mut new_items = BitSet::new();
            let mut skip = false;
            for req_fact in conj.iter() {
                if !simplification_bits.test(req_fact) {
                    new_items.set_bit(req_fact);
                } else {
                    let revealed = &requirements[req_fact];
                    if revealed.is_trivially_false() {
                        // the whole cube can never be satisfied
                        skip = true;
                        break;
                    }
                    new_items = new_items.or(&revealed.conjunctions()[0]);
                }
            }
            // a cube that ends up requiring its own fact is useless
            if !skip && !new_items.test(fact) {
                new_conjunctions.push(new_items);
            }
        }
        requirements[fact] = Dnf::from_conjunctions(new_conjunctions);
    }

    simplified
}

/// Collapses pairs of non-opaque facts that imply each other through
/// singleton cubes onto a single representative. Returns true iff any pair
/// was merged.
pub fn unify_requirements(opaque: &BitSet, requirements: &mut [Dnf]) -> bool {
    let mut simplified = false;
    for a in 0..requirements.len() {
        if opaque.test(a) {
            continue;
        }
        for b in (a + 1)..requirements.len() {
            if opaque.test(b) {
                continue;
            }
            if try_unify_equivalent(requirements, a, b) {
                simplified = true;
            }
        }
    }
    simplified
}

/// If `a` has the cube `{b}` and `b` has the cube `{a}`, the two facts are
/// equivalent: move `a`'s other alternatives onto `b` and redefine `a` as
/// just `{b}`.
fn try_unify_equivalent(requirements: &mut [Dnf], a: usize, b: usize) -> bool {
    if requirements[a].conjunctions().len() < 2 || requirements[b].conjunctions().len() < 2 {
        return false;
    }
    let b_implies_a = requirements[a]
        .conjunctions()
        .iter()
        .position(|cube| cube.num_set_bits() == 1 && cube.test(b));
    let Some(b_implies_a) = b_implies_a else {
        return false;
    };
    let a_implies_b = requirements[b]
        .conjunctions()
        .iter()
        .any(|cube| cube.num_set_bits() == 1 && cube.test(a));
    if !a_implies_b {
        return false;
    }

    let mut moved = requirements[a].conjunctions().to_vec();
    moved.remove(b_implies_a);
    for cube in moved {
        requirements[b] = requirements[b].or_conjunction(cube);
    }
    requirements[a] = Dnf::single(b);
    true
}

/// Runs all passes to saturation.
pub fn simplify_requirements(requirements: &mut [Dnf], opaque: &BitSet) {
    loop {
        remove_duplicates(requirements);
        while shallow_simplify(opaque, requirements) {
            remove_duplicates(requirements);
        }
        if !unify_requirements(opaque, requirements) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(bits: &[usize]) -> BitSet {
        bits.iter().copied().collect()
    }

    /// Naive fixed point over the raw implication list, used to check that
    /// simplification never changes reachability.
    fn closure(requirements: &[Dnf], seed: &BitSet) -> BitSet {
        let mut bits = seed.clone();
        let mut changed = true;
        while changed {
            changed = false;
            for (fact, expr) in requirements.iter().enumerate() {
                if !bits.test(fact) && !expr.is_trivially_false() && expr.eval(&bits) {
                    bits.set_bit(fact);
                    changed = true;
                }
            }
        }
        bits
    }

    #[test]
    fn inlines_singleton_requirements() {
        // 0 is opaque; 1 is just {0}; 2 requires {1, 3}.
        let opaque: BitSet = [0, 3].into_iter().collect();
        let mut reqs = vec![
            Dnf::never(),
            Dnf::from_conjunctions(vec![cube(&[0])]),
            Dnf::from_conjunctions(vec![cube(&[1, 3])]),
            Dnf::never(),
        ];
        assert!(shallow_simplify(&opaque, &mut reqs));
        assert_eq!(reqs[2].conjunctions(), &[cube(&[0, 3])]);
    }

    #[test]
    fn drops_cubes_over_unsatisfiable_facts() {
        // 1 is non-opaque and trivially false, so 2's only cube dies.
        let opaque: BitSet = [0].into_iter().collect();
        let mut reqs = vec![
            Dnf::never(),
            Dnf::never(),
            Dnf::from_conjunctions(vec![cube(&[0, 1])]),
        ];
        assert!(shallow_simplify(&opaque, &mut reqs));
        assert!(reqs[2].is_trivially_false());
    }

    #[test]
    fn drops_self_referential_cubes() {
        // Inlining 1 into 2 would make 2 require itself.
        let opaque: BitSet = [0].into_iter().collect();
        let mut reqs = vec![
            Dnf::never(),
            Dnf::from_conjunctions(vec![cube(&[2])]),
            Dnf::from_conjunctions(vec![cube(&[0, 1]), cube(&[0])]),
        ];
        assert!(shallow_simplify(&opaque, &mut reqs));
        assert_eq!(reqs[2].conjunctions(), &[cube(&[0])]);
    }

    #[test]
    fn leaves_wide_expressions_alone() {
        let opaque: BitSet = [0].into_iter().collect();
        let wide: Vec<BitSet> = (0..SHALLOW_SIMPLIFY_MAX_CONJUNCTIONS)
            .map(|i| cube(&[1, i + 3]))
            .collect();
        let mut reqs = vec![
            Dnf::never(),
            Dnf::from_conjunctions(vec![cube(&[0])]),
            Dnf::from_conjunctions(wide.clone()),
        ];
        shallow_simplify(&opaque, &mut reqs);
        assert_eq!(reqs[2].conjunctions(), &wide[..]);
    }

    #[test]
    fn unifies_mutually_implying_facts() {
        // 1 <=> 2, each with one extra alternative.
        let opaque: BitSet = [0, 3].into_iter().collect();
        let mut reqs = vec![
            Dnf::never(),
            Dnf::from_conjunctions(vec![cube(&[2]), cube(&[0])]),
            Dnf::from_conjunctions(vec![cube(&[1]), cube(&[3])]),
            Dnf::never(),
        ];
        assert!(unify_requirements(&opaque, &mut reqs));
        assert_eq!(reqs[1], Dnf::single(2));
        // 2 inherited 1's alternative
        assert!(reqs[2].conjunctions().contains(&cube(&[0])));
        assert!(reqs[2].conjunctions().contains(&cube(&[3])));
    }

    #[test]
    fn unify_requires_both_directions() {
        let opaque: BitSet = [0, 3].into_iter().collect();
        let mut reqs = vec![
            Dnf::never(),
            Dnf::from_conjunctions(vec![cube(&[2]), cube(&[0])]),
            Dnf::from_conjunctions(vec![cube(&[0]), cube(&[3])]),
            Dnf::never(),
        ];
        assert!(!unify_requirements(&opaque, &mut reqs));
    }

    #[test]
    fn simplification_preserves_reachability() {
        // A small system with inlinable intermediates and an equivalent pair.
        // Opaque: 0, 1. Intermediates: 2..=6.
        let opaque: BitSet = [0, 1].into_iter().collect();
        let reqs = vec![
            Dnf::never(),
            Dnf::never(),
            Dnf::from_conjunctions(vec![cube(&[0])]),
            Dnf::from_conjunctions(vec![cube(&[2, 1])]),
            Dnf::from_conjunctions(vec![cube(&[5]), cube(&[3])]),
            Dnf::from_conjunctions(vec![cube(&[4]), cube(&[0, 1])]),
            Dnf::from_conjunctions(vec![cube(&[4]), cube(&[5])]),
        ];

        let mut simplified = reqs.clone();
        simplify_requirements(&mut simplified, &opaque);

        for seed_mask in 0u32..4 {
            let mut seed = BitSet::new();
            for bit in 0..2 {
                if seed_mask & (1 << bit) != 0 {
                    seed.set_bit(bit);
                }
            }
            let before = closure(&reqs, &seed);
            let after = closure(&simplified, &seed);
            assert_eq!(before, after, "seed {:?}", seed);
        }
    }
}
