//! Algebraic building blocks for multi-level minimization
//!
//! Treats a sum-of-products as a polynomial over its facts: kernels and
//! co-kernels identify candidate divisors, the prime-rectangle enumeration
//! over the kernel/cube incidence matrix picks which one to extract, and
//! algebraic division performs the extraction. With no negations and no
//! don't-cares the algebraic view loses nothing.

use crate::bitset::BitSet;
use crate::dnf::Dnf;

/// A kernel (cube-free quotient) together with the co-kernel cube that
/// produced it.
#[derive(Debug, Clone)]
pub struct Kernel {
    pub kernel: Vec<BitSet>,
    pub co_kernel: BitSet,
}

/// The result of [`algebraic_division`].
#[derive(Debug, Clone)]
pub struct Division {
    pub quotient: Vec<BitSet>,
    pub remainder: Vec<BitSet>,
}

/// Divides `expr` by `divisor`: `expr = quotient * divisor + remainder`.
///
/// The quotient is the largest expression for which this identity holds
/// algebraically. An empty quotient means the divisor does not divide any
/// part of `expr`.
pub fn algebraic_division(expr: &[BitSet], divisor: &[BitSet]) -> Division {
    let mut quotient: Option<Vec<BitSet>> = None;
    for div_cube in divisor {
        let mut stripped: Vec<BitSet> = expr
            .iter()
            .filter(|cube| div_cube.is_subset_of(cube))
            .cloned()
            .collect();
        if stripped.is_empty() {
            return Division {
                quotient: Vec::new(),
                remainder: expr.to_vec(),
            };
        }
        for cube in &mut stripped {
            for bit in div_cube.iter() {
                cube.clear_bit(bit);
            }
        }
        // The quotient must work for every divisor cube, so intersect.
        quotient = Some(match quotient {
            None => stripped,
            Some(q) => q
                .into_iter()
                .filter(|qc| stripped.iter().any(|sc| sc == qc))
                .collect(),
        });
    }
    let quotient = quotient.unwrap_or_default();

    let covered = Dnf::from_conjunctions(quotient.clone())
        .and(&Dnf::from_conjunctions(divisor.to_vec()))
        .remove_duplicates();
    let remainder = expr
        .iter()
        .filter(|cube| {
            !covered
                .conjunctions()
                .iter()
                .any(|qd| qd.is_subset_of(cube))
        })
        .cloned()
        .collect();
    Division { quotient, remainder }
}

/// Enumerates all kernels of the cube-free expression `cubes`.
///
/// `variables` must list every fact occurring in `cubes`; the `min_idx`
/// recursion cutoff and the seen-co-kernel list keep the enumeration from
/// producing the same kernel through different variable orders.
pub fn find_kernels(cubes: &[BitSet], variables: &[usize]) -> Vec<Kernel> {
    let mut seen_co_kernels = Vec::new();
    find_kernels_rec(
        cubes.to_vec(),
        variables,
        BitSet::new(),
        &mut seen_co_kernels,
        0,
    )
}

fn find_kernels_rec(
    cubes: Vec<BitSet>,
    variables: &[usize],
    co_kernel_path: BitSet,
    seen_co_kernels: &mut Vec<BitSet>,
    min_idx: usize,
) -> Vec<Kernel> {
    let mut kernels = Vec::new();
    for (idx, &var) in variables.iter().enumerate() {
        if idx < min_idx {
            continue;
        }
        let containing: Vec<&BitSet> = cubes.iter().filter(|c| c.test(var)).collect();
        if containing.len() < 2 {
            continue;
        }
        let mut co = containing[0].clone();
        for cube in &containing[1..] {
            co = co.and(cube);
        }
        let sub_path = co_kernel_path.or(&co);
        let quotient = algebraic_division(&cubes, std::slice::from_ref(&co)).quotient;
        for sub in find_kernels_rec(quotient, variables, sub_path, seen_co_kernels, idx + 1) {
            if !seen_co_kernels.contains(&sub.co_kernel) {
                seen_co_kernels.push(sub.co_kernel.clone());
                kernels.push(sub);
            }
        }
    }

    if !seen_co_kernels.contains(&co_kernel_path) {
        kernels.push(Kernel {
            kernel: cubes,
            co_kernel: co_kernel_path,
        });
    }

    kernels
}

/// Enumerates prime rectangles of a 0/1 matrix: first the trivial
/// single-row and single-column primes, then wider ones through the
/// branching generator. `emit` returns true to bound the branch at that
/// rectangle.
pub fn gen_rectangles<F>(matrix: &[Vec<bool>], mut emit: F)
where
    F: FnMut(&[usize], &[usize]) -> bool,
{
    let num_cols = matrix.first().map_or(0, |row| row.len());
    let all_rows: Vec<usize> = (0..matrix.len()).collect();
    let all_cols: Vec<usize> = (0..num_cols).collect();

    // A trivial row rectangle is prime iff no other row has ones everywhere
    // this row does.
    for &row in &all_rows {
        let ones: Vec<usize> = all_cols
            .iter()
            .copied()
            .filter(|&col| matrix[row][col])
            .collect();
        if !ones.is_empty()
            && !all_rows.iter().any(|&other| {
                other != row && ones.iter().all(|&col| matrix[other][col])
            })
        {
            emit(&[row], &ones);
        }
    }

    for &col in &all_cols {
        let ones: Vec<usize> = all_rows
            .iter()
            .copied()
            .filter(|&row| matrix[row][col])
            .collect();
        if !ones.is_empty()
            && !all_cols.iter().any(|&other| {
                other != col && ones.iter().all(|&row| matrix[row][other])
            })
        {
            emit(&ones, &[col]);
        }
    }

    gen_rectangles_rec(&all_rows, &all_cols, matrix, 0, &[], &mut emit);
}

fn gen_rectangles_rec<F>(
    all_rows: &[usize],
    all_cols: &[usize],
    matrix: &[Vec<bool>],
    index: usize,
    rect_cols: &[usize],
    emit: &mut F,
) where
    F: FnMut(&[usize], &[usize]) -> bool,
{
    for &col in all_cols {
        if col < index {
            continue;
        }
        let rows_with_col: Vec<usize> = all_rows
            .iter()
            .copied()
            .filter(|&row| matrix[row][col])
            .collect();
        if rows_with_col.len() < 2 {
            continue;
        }

        // M1: rows not containing `col` are zeroed out.
        let mut m1: Vec<Vec<bool>> = matrix
            .iter()
            .map(|row| {
                if row[col] {
                    row.clone()
                } else {
                    vec![false; row.len()]
                }
            })
            .collect();

        let mut rect1_cols = rect_cols.to_vec();
        let mut prune = false;
        for &c1 in all_cols {
            let count = all_rows.iter().filter(|&&row| m1[row][c1]).count();
            if count == rows_with_col.len() {
                if c1 < col {
                    // This rectangle was already generated from c1's branch.
                    prune = true;
                    break;
                }
                rect1_cols.push(c1);
                for &row in all_rows {
                    m1[row][c1] = false;
                }
            }
        }

        if !prune {
            let bound = emit(&rows_with_col, &rect1_cols);
            if !bound {
                gen_rectangles_rec(all_rows, all_cols, &m1, col, &rect1_cols, emit);
            }
        }
    }
}
