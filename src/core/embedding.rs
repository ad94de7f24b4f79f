//! Normalized sentence-embedding vectors

#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
	/// Create normalized embedding from raw data
	pub fn new(data: Vec<f32>) -> Self {
		Self(normalize(&data))
	}

	/// Wrap data as-is, without normalization
	pub fn raw(data: Vec<f32>) -> Self {
		Self(data)
	}

	/// Get raw vector
	pub fn as_slice(&self) -> &[f32] {
		&self.0
	}

	pub fn dim(&self) -> usize {
		self.0.len()
	}

	pub fn is_finite(&self) -> bool {
		self.0.iter().all(|v| v.is_finite())
	}
}

fn normalize(v: &[f32]) -> Vec<f32> {
	let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
	if norm > 0.0 {
		v.iter().map(|x| x / norm).collect()
	} else {
		v.to_vec()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_normalizes_to_unit_length() {
		let emb = Embedding::new(vec![3.0, 4.0]);
		assert!((emb.as_slice()[0] - 0.6).abs() < 1e-6);
		assert!((emb.as_slice()[1] - 0.8).abs() < 1e-6);
		let norm: f32 = emb.as_slice().iter().map(|x| x * x).sum();
		assert!((norm - 1.0).abs() < 1e-6);
	}

	#[test]
	fn zero_vector_is_left_alone() {
		let emb = Embedding::new(vec![0.0, 0.0, 0.0]);
		assert_eq!(emb.as_slice(), &[0.0, 0.0, 0.0]);
		assert_eq!(emb.dim(), 3);
	}

	#[test]
	fn detects_non_finite_values() {
		assert!(Embedding::raw(vec![1.0, 2.0]).is_finite());
		assert!(!Embedding::raw(vec![1.0, f32::NAN]).is_finite());
	}
}
