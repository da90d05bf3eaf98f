use sepguard_domain::CATALOG;
use sepguard_domain::policy::{CheckPolicy, EffectiveConfig, IsolatedPolicy};
use std::collections::{BTreeMap, BTreeSet};

/// Types allowed to appear in the current public policy without a freeze entry.
pub const FREEZE_IGNORE_ADDED_TYPES: &[&str] = &["proc_compaction_proactiveness"];

/// Preset profiles carry the historical allow-lists.
///
/// `strict` keeps the structural exceptions (allow-listed domains, entry-point
/// skips, the isolated table) but tolerates no per-check types.
pub fn preset(profile: &str) -> EffectiveConfig {
    match profile {
        "strict" => strict_profile(),
        // default
        _ => default_profile(),
    }
}

fn default_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "default".to_string(),
        checks: default_checks(),
        coredomain_allowlist: names(&["vendor_init", "modprobe", "slideshow"]),
        entrypoint_skip_types: names(&["postinstall_file"]),
        isolated: isolated_policy(),
        fake_treble: false,
    }
}

fn strict_profile() -> EffectiveConfig {
    let mut cfg = default_profile();
    cfg.profile = "strict".to_string();
    for policy in cfg.checks.values_mut() {
        policy.allow.clear();
    }
    cfg
}

fn default_checks() -> BTreeMap<String, CheckPolicy> {
    use sepguard_types::ids::*;
    let mut m: BTreeMap<String, CheckPolicy> = CATALOG
        .iter()
        .map(|c| (c.id.to_string(), CheckPolicy::enabled()))
        .collect();

    // Used for app data of the matching user and assorted other files.
    m.insert(
        CHECK_APP_DATA_TYPES.to_string(),
        CheckPolicy::enabled().with_allow([
            "shell_data_file",
            "bluetooth_data_file",
            "nfc_data_file",
            "radio_data_file",
        ]),
    );

    m.insert(
        CHECK_DEV_TYPES.to_string(),
        CheckPolicy::enabled().with_allow([
            "boringssl_self_test_marker",  // /dev/boringssl/selftest
            "cgroup_rc_file",              // /dev/cgroup.rc
            "dev_cpu_variant",             // /dev/cpu_variant:{arch}
            "fscklogs",                    // /dev/fscklogs
            "properties_serial",           // /dev/__properties__/properties_serial
            "property_info",               // /dev/__properties__/property_info
            "runtime_event_log_tags_file", // /dev/event-log-tags
        ]),
    );

    m
}

fn isolated_policy() -> IsolatedPolicy {
    // Client access granted through technical debt; kept as data.
    let table: &[(&str, &[&str])] = &[
        ("codec2_config_prop", &["file"]),
        ("device_config_nnapi_native_prop", &["file"]),
        ("hal_allocator_default", &["binder", "fd"]),
        ("hal_codec2", &["binder", "fd"]),
        ("hal_codec2_hwservice", &["hwservice_manager"]),
        ("hal_graphics_allocator", &["binder", "fd"]),
        ("hal_graphics_allocator_service", &["service_manager"]),
        ("hal_graphics_allocator_hwservice", &["hwservice_manager"]),
        ("hal_graphics_allocator_server", &["binder", "service_manager"]),
        ("hal_graphics_mapper_hwservice", &["hwservice_manager"]),
        ("hal_graphics_mapper_service", &["service_manager"]),
        ("hal_neuralnetworks", &["binder", "fd"]),
        ("hal_neuralnetworks_service", &["service_manager"]),
        ("hal_neuralnetworks_hwservice", &["hwservice_manager"]),
        ("hal_omx_hwservice", &["hwservice_manager"]),
        ("hidl_allocator_hwservice", &["hwservice_manager"]),
        ("hidl_manager_hwservice", &["hwservice_manager"]),
        ("hidl_memory_hwservice", &["hwservice_manager"]),
        ("hidl_token_hwservice", &["hwservice_manager"]),
        ("hwservicemanager", &["binder"]),
        ("hwservicemanager_prop", &["file"]),
        ("mediacodec", &["binder", "fd"]),
        ("mediaswcodec", &["binder", "fd"]),
        ("media_variant_prop", &["file"]),
        ("nnapi_ext_deny_product_prop", &["file"]),
        ("servicemanager", &["fd"]),
        ("toolbox_exec", &["file"]),
    ];

    IsolatedPolicy {
        permissions: table
            .iter()
            .map(|(target, classes)| (target.to_string(), names(classes)))
            .collect(),
        hal_server_attributes: vec![
            "hal_codec2_server".to_string(),
            "hal_graphics_allocator_server".to_string(),
            "hal_neuralnetworks_server".to_string(),
        ],
        compute_allowed_attributes: vec![
            "isolated_compute_allowed_service".to_string(),
            "isolated_compute_allowed_device".to_string(),
        ],
        compute_allowed_classes: names(&["service_manager", "chr_file"]),
        forbidden_perms: names(&["write", "rw_file_perms"]),
    }
}

fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}
