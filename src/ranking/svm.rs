//! One-class SVM with an RBF kernel
//!
//! Solves the nu-parameterised one-class dual
//!
//! ```text
//! min 0.5 * a'Qa   s.t.  0 <= a_i <= 1,  sum(a) = nu * n
//! ```
//!
//! with SMO (second-order working set selection, as in libsvm). The
//! solver starts from a fixed feasible point and never samples, so the
//! same reference matrix always yields bit-identical scores.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView1, ArrayView2};
use rayon::prelude::*;

use super::{DecisionFunction, NoveltyDetector, RankError, RankResult};
use crate::config::DEFAULT_NU;
use crate::ui;

const TAU: f64 = 1e-12;
const DEFAULT_TOL: f64 = 1e-3;

/// RBF kernel bandwidth
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gamma {
	/// `1 / (dim * var(X))` over every element of the reference matrix
	Scale,
	/// `1 / dim`
	Auto,
	Value(f64),
}

impl Default for Gamma {
	fn default() -> Self {
		Self::Scale
	}
}

impl Gamma {
	fn resolve(&self, data: ArrayView2<'_, f64>) -> f64 {
		let dim = data.ncols() as f64;
		match *self {
			Self::Scale => {
				let var = data.var(0.0);
				if var == 0.0 {
					1.0
				} else {
					1.0 / (dim * var)
				}
			}
			Self::Auto => 1.0 / dim,
			Self::Value(g) => g,
		}
	}
}

impl FromStr for Gamma {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"scale" => Ok(Self::Scale),
			"auto" => Ok(Self::Auto),
			other => {
				let value: f64 = other
					.parse()
					.map_err(|_| format!("'{}' is not 'scale', 'auto' or a number", s))?;
				if value > 0.0 && value.is_finite() {
					Ok(Self::Value(value))
				} else {
					Err(format!("gamma must be positive, got {}", value))
				}
			}
		}
	}
}

impl fmt::Display for Gamma {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Scale => write!(f, "scale"),
			Self::Auto => write!(f, "auto"),
			Self::Value(g) => write!(f, "{}", g),
		}
	}
}

/// One-class SVM hyperparameters
#[derive(Debug, Clone, Copy)]
pub struct OneClassSvm {
	nu: f64,
	gamma: Gamma,
	tol: f64,
}

impl Default for OneClassSvm {
	fn default() -> Self {
		Self {
			nu: DEFAULT_NU,
			gamma: Gamma::Scale,
			tol: DEFAULT_TOL,
		}
	}
}

impl OneClassSvm {
	pub fn new(nu: f64, gamma: Gamma) -> RankResult<Self> {
		if !(nu > 0.0 && nu <= 1.0) {
			return Err(RankError::InvalidParameter(format!("nu must be in (0, 1], got {}", nu)));
		}
		if let Gamma::Value(g) = gamma {
			if !(g > 0.0 && g.is_finite()) {
				return Err(RankError::InvalidParameter(format!("gamma must be positive, got {}", g)));
			}
		}
		Ok(Self {
			nu,
			gamma,
			tol: DEFAULT_TOL,
		})
	}

	pub fn nu(&self) -> f64 {
		self.nu
	}

	pub fn gamma(&self) -> Gamma {
		self.gamma
	}
}

impl NoveltyDetector for OneClassSvm {
	type Boundary = RbfBoundary;

	fn fit(&self, reference: ArrayView2<'_, f64>) -> RankResult<RbfBoundary> {
		let n = reference.nrows();
		if n == 0 || reference.ncols() == 0 {
			return Err(RankError::InvalidParameter(format!(
				"cannot fit on a {}x{} matrix",
				n,
				reference.ncols()
			)));
		}

		let gamma = self.gamma.resolve(reference);
		let sq_norms: Vec<f64> = reference.rows().into_iter().map(|r| r.dot(&r)).collect();
		let kernel = KernelMatrix::build(reference, &sq_norms, gamma);

		let solution = solve(&kernel, self.nu, self.tol);
		if !solution.converged {
			ui::warn(&format!(
				"One-class SVM stopped at the iteration cap ({}) before converging",
				solution.iterations
			));
		}
		ui::debug(&format!(
			"One-class SVM: n={}, gamma={:.5}, rho={:.5}, {} iterations",
			n, gamma, solution.rho, solution.iterations
		));

		let support: Vec<usize> = (0..n).filter(|&i| solution.alpha[i] > 0.0).collect();
		let dim = reference.ncols();
		let mut vectors = Array2::zeros((support.len(), dim));
		for (row, &i) in support.iter().enumerate() {
			vectors.row_mut(row).assign(&reference.row(i));
		}

		Ok(RbfBoundary {
			support: vectors,
			coef: support.iter().map(|&i| solution.alpha[i]).collect(),
			gamma,
			rho: solution.rho,
		})
	}
}

/// Fitted one-class boundary: `sum_i coef_i * K(sv_i, x) - rho`
#[derive(Debug, Clone)]
pub struct RbfBoundary {
	support: Array2<f64>,
	coef: Vec<f64>,
	gamma: f64,
	rho: f64,
}

impl RbfBoundary {
	pub fn rho(&self) -> f64 {
		self.rho
	}

	pub fn gamma(&self) -> f64 {
		self.gamma
	}

	pub fn support_count(&self) -> usize {
		self.coef.len()
	}

	pub fn dim(&self) -> usize {
		self.support.ncols()
	}
}

impl DecisionFunction for RbfBoundary {
	fn decision(&self, sample: ArrayView1<'_, f64>) -> f64 {
		let weighted: f64 = self
			.support
			.rows()
			.into_iter()
			.zip(&self.coef)
			.map(|(sv, &c)| {
				let dist: f64 = sv.iter().zip(sample.iter()).map(|(a, b)| (a - b) * (a - b)).sum();
				c * (-self.gamma * dist).exp()
			})
			.sum();
		weighted - self.rho
	}
}

/// Dense kernel matrix, single precision like libsvm's Q cache.
struct KernelMatrix {
	n: usize,
	values: Vec<f32>,
}

impl KernelMatrix {
	fn build(data: ArrayView2<'_, f64>, sq_norms: &[f64], gamma: f64) -> Self {
		let n = data.nrows();
		let mut values = vec![0.0f32; n * n];

		values.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
			let xi = data.row(i);
			for (j, slot) in row.iter_mut().enumerate() {
				let dist = (sq_norms[i] + sq_norms[j] - 2.0 * xi.dot(&data.row(j))).max(0.0);
				*slot = (-gamma * dist).exp() as f32;
			}
		});

		Self { n, values }
	}

	fn row(&self, i: usize) -> &[f32] {
		&self.values[i * self.n..(i + 1) * self.n]
	}

	fn diag(&self, i: usize) -> f64 {
		self.values[i * self.n + i] as f64
	}
}

struct Solution {
	alpha: Vec<f64>,
	rho: f64,
	iterations: usize,
	converged: bool,
}

fn solve(q: &KernelMatrix, nu: f64, tol: f64) -> Solution {
	let n = q.n;
	let total = nu * n as f64;
	let bounded = (total.floor() as usize).min(n);

	let mut alpha = vec![0.0; n];
	alpha[..bounded].iter_mut().for_each(|a| *a = 1.0);
	if bounded < n {
		alpha[bounded] = total - bounded as f64;
	}

	let mut grad = vec![0.0; n];
	for (i, &a) in alpha.iter().enumerate() {
		if a != 0.0 {
			for (g, &k) in grad.iter_mut().zip(q.row(i)) {
				*g += a * k as f64;
			}
		}
	}

	let max_iter = (100 * n).max(10_000_000);
	let mut iterations = 0;
	let mut converged = false;

	while iterations < max_iter {
		let Some((i, j)) = select_working_set(q, &alpha, &grad, tol) else {
			converged = true;
			break;
		};
		iterations += 1;

		let (qi, qj) = (q.row(i), q.row(j));
		let (old_i, old_j) = (alpha[i], alpha[j]);

		let mut quad = q.diag(i) + q.diag(j) - 2.0 * qi[j] as f64;
		if quad <= 0.0 {
			quad = TAU;
		}
		let delta = (grad[i] - grad[j]) / quad;
		let sum = alpha[i] + alpha[j];
		alpha[i] -= delta;
		alpha[j] += delta;

		// Clip back into the box while keeping alpha[i] + alpha[j] fixed
		if sum > 1.0 {
			if alpha[i] > 1.0 {
				alpha[i] = 1.0;
				alpha[j] = sum - 1.0;
			}
		} else if alpha[j] < 0.0 {
			alpha[j] = 0.0;
			alpha[i] = sum;
		}
		if sum > 1.0 {
			if alpha[j] > 1.0 {
				alpha[j] = 1.0;
				alpha[i] = sum - 1.0;
			}
		} else if alpha[i] < 0.0 {
			alpha[i] = 0.0;
			alpha[j] = sum;
		}

		let (di, dj) = (alpha[i] - old_i, alpha[j] - old_j);
		for (k, g) in grad.iter_mut().enumerate() {
			*g += qi[k] as f64 * di + qj[k] as f64 * dj;
		}
	}

	Solution {
		rho: compute_rho(&alpha, &grad),
		alpha,
		iterations,
		converged,
	}
}

/// Maximal violating pair with second-order choice of `j`.
/// `None` once the KKT gap drops below `tol`.
fn select_working_set(q: &KernelMatrix, alpha: &[f64], grad: &[f64], tol: f64) -> Option<(usize, usize)> {
	let mut gmax = f64::NEG_INFINITY;
	let mut gmax_idx = None;
	for (t, (&a, &g)) in alpha.iter().zip(grad).enumerate() {
		if a < 1.0 && -g >= gmax {
			gmax = -g;
			gmax_idx = Some(t);
		}
	}
	let i = gmax_idx?;
	let qi = q.row(i);

	let mut gmax2 = f64::NEG_INFINITY;
	let mut best = None;
	let mut obj_min = f64::INFINITY;
	for (j, (&a, &g)) in alpha.iter().zip(grad).enumerate() {
		if a <= 0.0 {
			continue;
		}
		if g >= gmax2 {
			gmax2 = g;
		}
		let grad_diff = gmax + g;
		if grad_diff > 0.0 {
			let quad = q.diag(i) + q.diag(j) - 2.0 * qi[j] as f64;
			let obj = -(grad_diff * grad_diff) / if quad > 0.0 { quad } else { TAU };
			if obj <= obj_min {
				obj_min = obj;
				best = Some(j);
			}
		}
	}

	if gmax + gmax2 < tol {
		return None;
	}
	best.map(|j| (i, j))
}

/// Offset from free support vectors, or the midpoint of the feasible
/// interval when every alpha sits on a bound.
fn compute_rho(alpha: &[f64], grad: &[f64]) -> f64 {
	let mut ub = f64::INFINITY;
	let mut lb = f64::NEG_INFINITY;
	let mut free_sum = 0.0;
	let mut free_count = 0usize;

	for (&a, &g) in alpha.iter().zip(grad) {
		if a >= 1.0 {
			lb = lb.max(g);
		} else if a <= 0.0 {
			ub = ub.min(g);
		} else {
			free_count += 1;
			free_sum += g;
		}
	}

	if free_count > 0 {
		free_sum / free_count as f64
	} else if ub.is_infinite() {
		lb
	} else if lb.is_infinite() {
		ub
	} else {
		(ub + lb) / 2.0
	}
}
