use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `sepguard.toml` schema v1.
///
/// Every list is optional; a list that is present replaces the preset list
/// outright (an empty list clears it).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SepguardConfigV1 {
    /// Optional schema string for tooling (`sepguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Device launched before the vendor/system split.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fake_treble: Option<bool>,

    /// Map of check_id -> config.
    #[serde(default)]
    pub checks: BTreeMap<String, CheckConfig>,

    #[serde(default)]
    pub coredomain: CoredomainConfig,

    #[serde(default)]
    pub entrypoints: EntrypointsConfig,

    #[serde(default)]
    pub isolated: IsolatedConfig,

    #[serde(default)]
    pub freeze: FreezeConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    /// Override preset enable/disable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Type (or domain) names the check tolerates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoredomainConfig {
    /// Domains whose entry points are never classified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntrypointsConfig {
    /// Entry-point types that have no path label by construction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_types: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IsolatedConfig {
    /// target type -> classes isolated sub-domains may use on it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeMap<String, Vec<String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hal_server_attributes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_allowed_attributes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_allowed_classes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forbidden_perms: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FreezeConfig {
    /// Types that may appear in the current public policy without being frozen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_added_types: Option<Vec<String>>,
}
