//! Two-sample Kolmogorov-Smirnov test
//!
//! Statistic: `D = sup |F_a(x) - F_b(x)|` over the pooled sample.
//!
//! p-value:
//! - `n·m <= EXACT_MAX_CELLS`: exact, by counting the lattice paths of the
//!   merged sample that never reach `D`;
//! - otherwise: asymptotic Kolmogorov distribution evaluated at
//!   `(√n_e + 0.12 + 0.11/√n_e) · D` with `n_e = n·m / (n + m)`.

/// Largest `n·m` for which the exact p-value is computed
pub const EXACT_MAX_CELLS: usize = 10_000;

/// Lattice differences are multiples of `1/(n·m)`, far above this
const LATTICE_EPS: f64 = 1e-9;

/// Result of one two-sample test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsResult {
    pub statistic: f64,
    pub p_value: f64,
}

impl KsResult {
    /// Both values NaN, for columns with no data on one side
    pub fn undefined() -> Self {
        Self {
            statistic: f64::NAN,
            p_value: f64::NAN,
        }
    }
}

/// Test whether `a` and `b` come from the same distribution
///
/// Returns [`KsResult::undefined`] if either sample is empty.
pub fn ks_2samp(a: &[f64], b: &[f64]) -> KsResult {
    if a.is_empty() || b.is_empty() {
        return KsResult::undefined();
    }

    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);

    let statistic = ks_statistic(&a, &b);

    let p_value = if a.len() * b.len() <= EXACT_MAX_CELLS {
        exact_p_value(a.len(), b.len(), statistic)
    } else {
        asymptotic_p_value(a.len(), b.len(), statistic)
    };

    KsResult { statistic, p_value }
}

/// `P(D >= d)` under the null, from the fraction of monotone paths
/// (0,0) → (n,m) that stay strictly inside `|i/n - j/m| < d`
fn exact_p_value(n: usize, m: usize, d: f64) -> f64 {
    if d <= 0.0 {
        return 1.0;
    }

    let (nf, mf) = (n as f64, m as f64);
    let inside = |i: usize, j: usize| (i as f64 / nf - j as f64 / mf).abs() + LATTICE_EPS < d;

    // row[j]: share of paths reaching (i, j) without leaving the band,
    // normalized by C(i + j, i) so nothing overflows
    let mut row = vec![0.0f64; m + 1];
    for i in 0..=n {
        for j in 0..=m {
            row[j] = if i == 0 && j == 0 {
                1.0
            } else if !inside(i, j) {
                0.0
            } else {
                let total = (i + j) as f64;
                let from_a = if i > 0 { row[j] * i as f64 / total } else { 0.0 };
                let from_b = if j > 0 { row[j - 1] * j as f64 / total } else { 0.0 };
                from_a + from_b
            };
        }
    }

    (1.0 - row[m]).clamp(0.0, 1.0)
}

fn asymptotic_p_value(n: usize, m: usize, d: f64) -> f64 {
    let (n, m) = (n as f64, m as f64);
    let en = (n * m / (n + m)).sqrt();
    kolmogorov_survival((en + 0.12 + 0.11 / en) * d)
}

/// Largest gap between two empirical CDFs; inputs must be sorted
fn ks_statistic(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let m = b.len() as f64;
    let (mut i, mut j) = (0usize, 0usize);
    let mut d: f64 = 0.0;

    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        // Step past ties on both sides before comparing CDFs
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d = d.max((i as f64 / n - j as f64 / m).abs());
    }

    d
}

/// `Q_KS(λ) = 2 Σ_{k≥1} (-1)^{k-1} exp(-2 k² λ²)`
fn kolmogorov_survival(lambda: f64) -> f64 {
    const EPS_TERM: f64 = 1e-3;
    const EPS_SUM: f64 = 1e-8;

    let a2 = -2.0 * lambda * lambda;
    let mut fac = 2.0;
    let mut sum = 0.0;
    let mut previous = 0.0;

    for k in 1..=100 {
        let k = k as f64;
        let term = fac * (a2 * k * k).exp();
        sum += term;
        if term.abs() <= EPS_TERM * previous || term.abs() <= EPS_SUM * sum {
            return sum.clamp(0.0, 1.0);
        }
        fac = -fac;
        previous = term.abs();
    }

    // Series does not converge for tiny λ, where Q → 1
    1.0
}
