use crate::{model::SepguardConfigV1, presets};
use anyhow::Context;
use sepguard_domain::CATALOG;
use sepguard_domain::policy::{CheckPolicy, EffectiveConfig};
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub fake_treble: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
    /// Added public types the freeze test tolerates.
    pub freeze_ignore_added_types: Vec<String>,
}

pub fn resolve_config(
    cfg: SepguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "default".to_string());

    let mut effective = presets::preset(&profile);

    if let Some(fake_treble) = overrides.fake_treble.or(cfg.fake_treble) {
        effective.fake_treble = fake_treble;
    }

    // per-check overrides
    for (check_id, cc) in cfg.checks.iter() {
        if !CATALOG.iter().any(|c| c.id == check_id.as_str()) {
            anyhow::bail!("unknown check id in config: {check_id}");
        }
        let entry = effective
            .checks
            .entry(check_id.clone())
            .or_insert_with(CheckPolicy::disabled);

        if let Some(enabled) = cc.enabled {
            entry.enabled = enabled;
        }
        if let Some(allow) = &cc.allow {
            validate_names(allow).with_context(|| format!("invalid allow list for {check_id}"))?;
            entry.allow = allow.clone();
        }
    }

    if let Some(allow) = &cfg.coredomain.allow {
        effective.coredomain_allowlist = to_set(allow, "coredomain.allow")?;
    }
    if let Some(skip) = &cfg.entrypoints.skip_types {
        effective.entrypoint_skip_types = to_set(skip, "entrypoints.skip_types")?;
    }

    let isolated = &cfg.isolated;
    if let Some(permissions) = &isolated.permissions {
        effective.isolated.permissions = permissions
            .iter()
            .map(|(target, classes)| {
                let key = format!("isolated.permissions.{target}");
                Ok((target.clone(), to_set(classes, &key)?))
            })
            .collect::<anyhow::Result<_>>()?;
    }
    if let Some(attrs) = &isolated.hal_server_attributes {
        validate_names(attrs).context("invalid isolated.hal_server_attributes")?;
        for attr in attrs {
            if !attr.contains('_') {
                anyhow::bail!(
                    "isolated.hal_server_attributes: `{attr}` has no `_suffix` to strip"
                );
            }
        }
        effective.isolated.hal_server_attributes = attrs.clone();
    }
    if let Some(attrs) = &isolated.compute_allowed_attributes {
        validate_names(attrs).context("invalid isolated.compute_allowed_attributes")?;
        effective.isolated.compute_allowed_attributes = attrs.clone();
    }
    if let Some(classes) = &isolated.compute_allowed_classes {
        effective.isolated.compute_allowed_classes =
            to_set(classes, "isolated.compute_allowed_classes")?;
    }
    if let Some(perms) = &isolated.forbidden_perms {
        effective.isolated.forbidden_perms = to_set(perms, "isolated.forbidden_perms")?;
    }

    let freeze_ignore_added_types = match &cfg.freeze.ignore_added_types {
        Some(types) => {
            validate_names(types).context("invalid freeze.ignore_added_types")?;
            types.clone()
        }
        None => presets::FREEZE_IGNORE_ADDED_TYPES
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };

    Ok(ResolvedConfig {
        effective,
        freeze_ignore_added_types,
    })
}

fn validate_names(names: &[String]) -> anyhow::Result<()> {
    for name in names {
        if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == ':') {
            anyhow::bail!("not a policy identifier: {name:?}");
        }
    }
    Ok(())
}

fn to_set(names: &[String], key: &str) -> anyhow::Result<BTreeSet<String>> {
    validate_names(names).with_context(|| format!("invalid {key}"))?;
    Ok(names.iter().cloned().collect())
}
