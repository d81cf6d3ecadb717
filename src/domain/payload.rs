use serde::{Deserialize, Serialize};

pub const DEFAULT_ID_PREFIX: &str = "loadtest-pr";
pub const DEFAULT_PULL_REQUEST_NAME: &str = "Load test PR";
/// Author seeded into the service by its fixture migration
pub const DEFAULT_AUTHOR_ID: &str = "u001";

/// Body of `POST /pullRequest/create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

/// Builds one payload per (virtual user, iteration) pair.
///
/// Only the identifier varies between payloads. It is derived from the VU
/// number and the iteration counter, so two payloads from the same run can
/// only share an id if they share both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadFactory {
    id_prefix: String,
    pull_request_name: String,
    author_id: String,
}

impl PayloadFactory {
    pub fn new(
        id_prefix: impl Into<String>,
        pull_request_name: impl Into<String>,
        author_id: impl Into<String>,
    ) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            pull_request_name: pull_request_name.into(),
            author_id: author_id.into(),
        }
    }

    /// Identifier for a VU (numbered from 1) at a given iteration (from 0)
    pub fn pull_request_id(&self, vu: u32, iteration: u64) -> String {
        format!("{}-{}-{}", self.id_prefix, vu, iteration)
    }

    pub fn build(&self, vu: u32, iteration: u64) -> CreatePullRequest {
        CreatePullRequest {
            pull_request_id: self.pull_request_id(vu, iteration),
            pull_request_name: self.pull_request_name.clone(),
            author_id: self.author_id.clone(),
        }
    }
}

impl Default for PayloadFactory {
    fn default() -> Self {
        Self::new(
            DEFAULT_ID_PREFIX,
            DEFAULT_PULL_REQUEST_NAME,
            DEFAULT_AUTHOR_ID,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_payload_serializes_with_service_field_names() {
        let payload = PayloadFactory::default().build(3, 7);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "pull_request_id": "loadtest-pr-3-7",
                "pull_request_name": "Load test PR",
                "author_id": "u001",
            })
        );
    }

    #[test]
    fn test_author_and_name_never_change() {
        let factory = PayloadFactory::new("run", "Nightly PR", "u042");
        for vu in 1..=5 {
            for iteration in 0..20 {
                let payload = factory.build(vu, iteration);
                assert_eq!(payload.author_id, "u042");
                assert_eq!(payload.pull_request_name, "Nightly PR");
            }
        }
    }

    #[test]
    fn test_ids_distinct_across_grid() {
        let factory = PayloadFactory::default();
        let mut seen = HashSet::new();
        for vu in 1..=50 {
            for iteration in 0..200 {
                assert!(seen.insert(factory.pull_request_id(vu, iteration)));
            }
        }
        assert_eq!(seen.len(), 50 * 200);
    }

    proptest! {
        #[test]
        fn prop_distinct_pairs_give_distinct_ids(
            a in (1u32..10_000, 0u64..1_000_000),
            b in (1u32..10_000, 0u64..1_000_000),
        ) {
            prop_assume!(a != b);
            let factory = PayloadFactory::default();
            prop_assert_ne!(
                factory.pull_request_id(a.0, a.1),
                factory.pull_request_id(b.0, b.1)
            );
        }
    }
}
