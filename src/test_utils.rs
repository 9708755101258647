//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    use crate::core::lock::LockRecord;

    /// Generate a GitHub `owner/name` repository
    pub fn repo_name() -> impl Strategy<Value = String> {
        ("[A-Za-z][A-Za-z0-9-]{0,15}", "[A-Za-z][A-Za-z0-9._-]{0,20}")
            .prop_map(|(owner, name)| format!("{owner}/{name}"))
    }

    /// Generate a release tag such as `v1.2.3`
    pub fn tag_name() -> impl Strategy<Value = String> {
        (0u32..20, 0u32..20, 0u32..20, any::<bool>()).prop_map(|(major, minor, patch, v)| {
            let prefix = if v { "v" } else { "" };
            format!("{prefix}{major}.{minor}.{patch}")
        })
    }

    /// Generate an asset file name
    pub fn asset_name() -> impl Strategy<Value = String> {
        (
            "[a-z][a-z0-9_-]{0,20}",
            prop_oneof![Just("zip"), Just("bin"), Just("nro"), Just("ovl")],
        )
            .prop_map(|(stem, ext)| format!("{stem}.{ext}"))
    }

    /// Generate an RFC 3339 UTC timestamp as GitHub reports them
    pub fn timestamp() -> impl Strategy<Value = String> {
        (2015u32..2030, 1u32..13, 1u32..29, 0u32..24, 0u32..60, 0u32..60).prop_map(
            |(y, mo, d, h, mi, s)| format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}Z"),
        )
    }

    /// Generate a complete lock record
    pub fn lock_record() -> impl Strategy<Value = LockRecord> {
        (repo_name(), tag_name(), asset_name(), timestamp()).prop_map(
            |(repo, tag_name, asset_name, asset_updated_at)| LockRecord {
                repo,
                tag_name,
                asset_name,
                asset_updated_at,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_repo_name_generator(repo in repo_name()) {
            let parts: Vec<&str> = repo.split('/').collect();
            prop_assert_eq!(parts.len(), 2);
            prop_assert!(parts.iter().all(|p| !p.is_empty()));
        }

        #[test]
        fn test_timestamp_generator(ts in timestamp()) {
            prop_assert_eq!(ts.len(), 20);
            prop_assert!(ts.ends_with('Z'));
        }

        #[test]
        fn test_asset_name_generator(name in asset_name()) {
            prop_assert!(name.contains('.'));
            prop_assert!(!name.contains('/'));
        }
    }
}
