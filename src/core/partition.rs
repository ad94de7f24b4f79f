//! Partition keys for per-tag ranking

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which slice of the reference corpus a ranking run uses.
///
/// `All` stands in for "no partitioning" so that sectioned and
/// unsectioned runs share one code path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "tag", rename_all = "lowercase")]
pub enum PartitionKey {
	All,
	Tag(String),
}

impl fmt::Display for PartitionKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::All => write!(f, "full corpus"),
			Self::Tag(tag) => write!(f, "tag '{}'", tag),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn serializes_with_kind() {
		let all = serde_json::to_value(PartitionKey::All).unwrap();
		assert_eq!(all, serde_json::json!({"kind": "all"}));

		let tag = serde_json::to_value(PartitionKey::Tag("gnn".into())).unwrap();
		assert_eq!(tag, serde_json::json!({"kind": "tag", "tag": "gnn"}));
	}

	#[test]
	fn displays_for_logs() {
		assert_eq!(PartitionKey::All.to_string(), "full corpus");
		assert_eq!(PartitionKey::Tag("gnn".into()).to_string(), "tag 'gnn'");
	}
}
