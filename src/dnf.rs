//! Disjunctive normal form over fact cubes
//!
//! A [`Dnf`] is a list of conjunctions ("cubes"), each a [`BitSet`] of facts
//! that must all hold; the expression is true iff at least one cube is
//! satisfied. The empty list is trivially false, a list containing an empty
//! cube is trivially true.
//!
//! The requirement graph stores one `Dnf` per fact, and the algebra here is
//! deliberately purely monotone: there is no negation, which is what
//! guarantees the solver's least fixed point exists.

use crate::bitset::BitSet;

/// A monotone boolean expression in disjunctive normal form.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Dnf {
    conjunctions: Vec<BitSet>,
}

impl Dnf {
    /// An expression that always evaluates to false (empty disjunction).
    pub fn never() -> Self {
        Dnf {
            conjunctions: Vec::new(),
        }
    }

    /// An expression that always evaluates to true (a single empty cube).
    pub fn always() -> Self {
        Dnf {
            conjunctions: vec![BitSet::new()],
        }
    }

    /// An expression that is true iff the single given fact is true.
    pub fn single(fact: usize) -> Self {
        Dnf {
            conjunctions: vec![BitSet::single(fact)],
        }
    }

    /// Constructs an expression from cubes describing a DNF.
    pub fn from_conjunctions(conjunctions: Vec<BitSet>) -> Self {
        Dnf { conjunctions }
    }

    /// The cubes of this expression.
    pub fn conjunctions(&self) -> &[BitSet] {
        &self.conjunctions
    }

    /// Consumes the expression, returning its cubes.
    pub fn into_conjunctions(self) -> Vec<BitSet> {
        self.conjunctions
    }

    /// True iff the expression always evaluates to false.
    pub fn is_trivially_false(&self) -> bool {
        self.conjunctions.is_empty()
    }

    /// True iff the expression always evaluates to true.
    pub fn is_trivially_true(&self) -> bool {
        self.conjunctions.iter().any(|c| c.is_empty())
    }

    /// Disjunction: true if `self` is true or `other` is true.
    pub fn or(&self, other: &Dnf) -> Dnf {
        let mut conjunctions =
            Vec::with_capacity(self.conjunctions.len() + other.conjunctions.len());
        conjunctions.extend(self.conjunctions.iter().cloned());
        conjunctions.extend(other.conjunctions.iter().cloned());
        Dnf { conjunctions }
    }

    /// Disjunction with a single extra cube.
    pub fn or_conjunction(&self, cube: BitSet) -> Dnf {
        let mut conjunctions = self.conjunctions.clone();
        conjunctions.push(cube);
        Dnf { conjunctions }
    }

    /// Conjunction: the cube-wise cross product of the two expressions.
    pub fn and(&self, other: &Dnf) -> Dnf {
        if self.is_trivially_false() || other.is_trivially_false() {
            return Dnf::never();
        }
        let mut conjunctions =
            Vec::with_capacity(self.conjunctions.len() * other.conjunctions.len());
        for left in &self.conjunctions {
            for right in &other.conjunctions {
                conjunctions.push(left.or(right));
            }
        }
        Dnf { conjunctions }
    }

    /// Conjunction with a single cube (unions the cube into every term).
    pub fn and_conjunction(&self, cube: &BitSet) -> Dnf {
        Dnf {
            conjunctions: self.conjunctions.iter().map(|c| c.or(cube)).collect(),
        }
    }

    /// From each cube, removes the `drop` fact unless the `unless` fact is
    /// present in that cube.
    ///
    /// Used for time-of-day pruning: once a cube already requires the night
    /// marker, the day marker in the same edge condition is irrelevant and
    /// vice versa.
    pub fn drop_unless(&self, drop: usize, unless: usize) -> Dnf {
        Dnf {
            conjunctions: self
                .conjunctions
                .iter()
                .map(|c| {
                    if c.test(unless) {
                        c.clone()
                    } else {
                        let mut c = c.clone();
                        c.clear_bit(drop);
                        c
                    }
                })
                .collect(),
        }
    }

    /// Removes every cube that is a superset of another cube.
    ///
    /// A superset imposes a strictly stronger condition, so it is redundant;
    /// on ties the most general (smallest) cube is kept.
    pub fn remove_duplicates(&self) -> Dnf {
        let mut terms: Vec<BitSet> = Vec::with_capacity(self.conjunctions.len());
        'next_term: for candidate in &self.conjunctions {
            let mut to_remove = Vec::new();
            for (existing_idx, existing) in terms.iter().enumerate() {
                if existing.is_subset_of(candidate) {
                    // existing requires fewer or equal things than candidate
                    continue 'next_term;
                } else if candidate.is_subset_of(existing) {
                    to_remove.push(existing_idx);
                }
            }
            // swap-remove from the back so earlier indices stay valid
            for &idx in to_remove.iter().rev() {
                terms.swap_remove(idx);
            }
            terms.push(candidate.clone());
        }
        Dnf { conjunctions: terms }
    }

    /// Computes `self.or(other)` while filtering cubes of `other` that are
    /// already subsumed by `self`, and reports whether anything new was added.
    ///
    /// Callers use the flag to detect saturation when accumulating
    /// alternatives.
    pub fn or_extended(&self, other: &Dnf) -> (bool, Dnf) {
        let mut conjunctions = self.conjunctions.clone();
        let mut useful = false;
        'next_term: for candidate in &other.conjunctions {
            for existing in &self.conjunctions {
                if existing.is_subset_of(candidate) {
                    continue 'next_term;
                }
            }
            conjunctions.push(candidate.clone());
            useful = true;
        }
        (useful, Dnf { conjunctions })
    }

    /// Evaluates the expression assuming exactly the facts in `bits` are true.
    pub fn eval(&self, bits: &BitSet) -> bool {
        self.conjunctions.iter().any(|c| c.is_subset_of(bits))
    }
}

impl std::fmt::Debug for Dnf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_trivially_false() {
            return write!(f, "false");
        }
        for (i, conj) in self.conjunctions.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            if conj.is_empty() {
                write!(f, "true")?;
            } else {
                write!(f, "{:?}", conj)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(bits: &[usize]) -> BitSet {
        bits.iter().copied().collect()
    }

    #[test]
    fn test_trivial() {
        assert!(Dnf::never().is_trivially_false());
        assert!(!Dnf::never().is_trivially_true());
        assert!(Dnf::always().is_trivially_true());
        assert!(!Dnf::always().is_trivially_false());
        assert!(!Dnf::single(3).is_trivially_true());
    }

    #[test]
    fn test_and_is_cross_product() {
        let left = Dnf::from_conjunctions(vec![cube(&[0]), cube(&[1])]);
        let right = Dnf::from_conjunctions(vec![cube(&[2]), cube(&[3])]);
        let and = left.and(&right);
        assert_eq!(
            and.conjunctions(),
            &[cube(&[0, 2]), cube(&[0, 3]), cube(&[1, 2]), cube(&[1, 3])]
        );
    }

    #[test]
    fn test_and_with_false_is_false() {
        let expr = Dnf::single(1);
        assert!(expr.and(&Dnf::never()).is_trivially_false());
        assert!(Dnf::never().and(&expr).is_trivially_false());
    }

    #[test]
    fn test_remove_duplicates_drops_supersets() {
        let expr = Dnf::from_conjunctions(vec![
            cube(&[0, 1, 2]),
            cube(&[0]),
            cube(&[0, 1]),
            cube(&[3]),
        ]);
        let simplified = expr.remove_duplicates();
        assert_eq!(simplified.conjunctions().len(), 2);
        assert!(simplified.conjunctions().contains(&cube(&[0])));
        assert!(simplified.conjunctions().contains(&cube(&[3])));
    }

    #[test]
    fn test_remove_duplicates_idempotent() {
        let expr = Dnf::from_conjunctions(vec![cube(&[0, 1]), cube(&[0]), cube(&[2, 3])]);
        let once = expr.remove_duplicates();
        let twice = once.remove_duplicates();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_drop_unless() {
        let day = 0;
        let night = 1;
        let expr = Dnf::from_conjunctions(vec![cube(&[day, 5]), cube(&[day, night, 6])]);
        let pruned = expr.drop_unless(day, night);
        assert_eq!(pruned.conjunctions()[0], cube(&[5]));
        // Cube that also requires night keeps its day bit
        assert_eq!(pruned.conjunctions()[1], cube(&[day, night, 6]));
    }

    #[test]
    fn test_eval() {
        let expr = Dnf::from_conjunctions(vec![cube(&[0, 1]), cube(&[2])]);
        assert!(expr.eval(&cube(&[0, 1])));
        assert!(expr.eval(&cube(&[2, 7])));
        assert!(!expr.eval(&cube(&[0])));
        assert!(!Dnf::never().eval(&cube(&[0])));
        assert!(Dnf::always().eval(&BitSet::new()));
    }

    #[test]
    fn test_or_extended_reports_usefulness() {
        let base = Dnf::from_conjunctions(vec![cube(&[0])]);

        // A subsumed cube adds nothing
        let (useful, same) = base.or_extended(&Dnf::from_conjunctions(vec![cube(&[0, 1])]));
        assert!(!useful);
        assert_eq!(same.conjunctions().len(), 1);

        let (useful, grown) = base.or_extended(&Dnf::from_conjunctions(vec![cube(&[2])]));
        assert!(useful);
        assert_eq!(grown.conjunctions().len(), 2);
    }
}
