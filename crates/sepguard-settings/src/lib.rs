//! Config parsing and allow-list preset resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{
    CheckConfig, CoredomainConfig, EntrypointsConfig, FreezeConfig, IsolatedConfig,
    SepguardConfigV1,
};
pub use resolve::{Overrides, ResolvedConfig};

/// Parse `sepguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<SepguardConfigV1> {
    let cfg: SepguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config used by the engine (preset + overrides + per-check config).
pub fn resolve_config(
    cfg: SepguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
