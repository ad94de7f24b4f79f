//! Per-dimension standardization

use ndarray::{Array1, Array2, ArrayView2, Axis};

use super::{RankError, RankResult};

/// Standard deviations below this count as zero variance.
const MIN_SCALE: f64 = 10.0 * f64::EPSILON;

/// Mean/std standardization fitted on reference samples.
///
/// Zero-variance dimensions get a scale of 1, so they are centred but
/// left unscaled.
#[derive(Debug, Clone)]
pub struct StandardScaler {
	mean: Array1<f64>,
	scale: Array1<f64>,
}

impl StandardScaler {
	pub fn fit(data: ArrayView2<'_, f64>) -> RankResult<Self> {
		let mean = data
			.mean_axis(Axis(0))
			.ok_or_else(|| RankError::InvalidParameter("cannot fit scaler on zero samples".into()))?;

		let scale = data
			.var_axis(Axis(0), 0.0)
			.mapv(|var| {
				let std = var.sqrt();
				if std < MIN_SCALE {
					1.0
				} else {
					std
				}
			});

		Ok(Self { mean, scale })
	}

	pub fn transform(&self, data: ArrayView2<'_, f64>) -> RankResult<Array2<f64>> {
		if data.ncols() != self.dim() {
			return Err(RankError::DimensionMismatch {
				expected: self.dim(),
				actual: data.ncols(),
			});
		}
		Ok((&data - &self.mean) / &self.scale)
	}

	pub fn dim(&self) -> usize {
		self.mean.len()
	}

	pub fn mean(&self) -> &Array1<f64> {
		&self.mean
	}

	pub fn scale(&self) -> &Array1<f64> {
		&self.scale
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ndarray::array;

	#[test]
	fn standardizes_each_column() {
		let data = array![[1.0, 10.0], [3.0, 30.0]];
		let scaler = StandardScaler::fit(data.view()).unwrap();

		assert_eq!(scaler.mean(), &array![2.0, 20.0]);
		assert_eq!(scaler.scale(), &array![1.0, 10.0]);

		let out = scaler.transform(data.view()).unwrap();
		assert_eq!(out, array![[-1.0, -1.0], [1.0, 1.0]]);
	}

	#[test]
	fn zero_variance_column_is_centred_only() {
		let data = array![[5.0, 1.0], [5.0, 3.0]];
		let scaler = StandardScaler::fit(data.view()).unwrap();
		assert_eq!(scaler.scale()[0], 1.0);

		let out = scaler.transform(array![[7.0, 2.0]].view()).unwrap();
		assert_eq!(out[[0, 0]], 2.0);
		assert_eq!(out[[0, 1]], 0.0);
		assert!(out.iter().all(|v| v.is_finite()));
	}

	#[test]
	fn single_sample_fits() {
		let data = array![[0.5, -0.5, 2.0]];
		let scaler = StandardScaler::fit(data.view()).unwrap();
		let out = scaler.transform(data.view()).unwrap();
		assert!(out.iter().all(|&v| v == 0.0));
	}

	#[test]
	fn rejects_empty_and_mismatched_input() {
		let empty = Array2::<f64>::zeros((0, 3));
		assert!(StandardScaler::fit(empty.view()).is_err());

		let scaler = StandardScaler::fit(array![[1.0, 2.0]].view()).unwrap();
		let err = scaler.transform(array![[1.0, 2.0, 3.0]].view()).unwrap_err();
		assert!(matches!(err, RankError::DimensionMismatch { expected: 2, actual: 3 }));
	}

	#[test]
	fn uses_population_variance() {
		let data = array![[0.0], [2.0], [4.0], [6.0]];
		let scaler = StandardScaler::fit(data.view()).unwrap();
		assert!((scaler.scale()[0] - 5.0_f64.sqrt()).abs() < 1e-12);
	}
}
