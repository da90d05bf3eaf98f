use anyhow::Context;
use sepguard_settings::{Overrides, ResolvedConfig, SepguardConfigV1};

/// Parse and resolve config text. Empty text means the preset defaults.
pub fn resolve_config_text(
    config_text: &str,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let cfg = if config_text.trim().is_empty() {
        SepguardConfigV1::default()
    } else {
        sepguard_settings::parse_config_toml(config_text).context("parse config")?
    };
    sepguard_settings::resolve_config(cfg, overrides).context("resolve config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_resolves_default_profile() {
        let resolved = resolve_config_text("  \n", Overrides::default()).expect("resolve");
        assert_eq!(resolved.effective.profile, "default");
        assert!(!resolved.effective.fake_treble);
    }

    #[test]
    fn overrides_win_over_file() {
        let overrides = Overrides {
            profile: None,
            fake_treble: Some(true),
        };
        let resolved = resolve_config_text("fake_treble = false\n", overrides).expect("resolve");
        assert!(resolved.effective.fake_treble);
    }

    #[test]
    fn bad_toml_is_reported_with_context() {
        let err = resolve_config_text("checks = 3", Overrides::default()).expect_err("bad");
        assert!(format!("{err:#}").starts_with("parse config"));
    }
}
