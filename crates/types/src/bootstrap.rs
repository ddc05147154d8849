//! Package-manager bootstrap source

use crate::version::RuntimeVersion;
use polyenv_hash::Hash;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where each runtime's package manager comes from, and what it must hash to
///
/// The URL may contain `{version}` for sources that publish one script per
/// interpreter line. A runtime with a pinned checksum only ever executes a
/// script matching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapSpec {
    pub url: String,
    #[serde(default)]
    pub checksums: BTreeMap<RuntimeVersion, Hash>,
}

impl BootstrapSpec {
    #[must_use]
    pub fn url_for(&self, version: RuntimeVersion) -> String {
        self.url.replace("{version}", &version.to_string())
    }

    #[must_use]
    pub fn checksum_for(&self, version: RuntimeVersion) -> Option<&Hash> {
        self.checksums.get(&version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_template() {
        let spec = BootstrapSpec {
            url: "https://bootstrap.pypa.io/pip/{version}/get-pip.py".to_string(),
            checksums: BTreeMap::new(),
        };
        assert_eq!(
            spec.url_for(RuntimeVersion::new(3, 7)),
            "https://bootstrap.pypa.io/pip/3.7/get-pip.py"
        );
        assert!(spec.checksum_for(RuntimeVersion::new(3, 7)).is_none());
    }
}
