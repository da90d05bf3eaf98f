//! Fixtures shared by this crate's tests and downstream crates.

use crate::checks::CATALOG;
use crate::classifier::DomainClassifier;
use crate::context::{CheckContext, CompatInputs};
use crate::policy::{CheckPolicy, EffectiveConfig, IsolatedPolicy};
use sepguard_compat::CilPolicy;
use sepguard_policy::Policy;
use sepguard_policy::test_support::PolicyBuilder;
use std::collections::{BTreeMap, BTreeSet};

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn isolated_policy() -> IsolatedPolicy {
    IsolatedPolicy {
        permissions: BTreeMap::from([
            ("hal_codec2".to_string(), set(&["binder", "fd"])),
            ("servicemanager".to_string(), set(&["fd"])),
            ("toolbox_exec".to_string(), set(&["file"])),
        ]),
        hal_server_attributes: vec!["hal_codec2_server".to_string()],
        compute_allowed_attributes: vec![
            "isolated_compute_allowed_service".to_string(),
            "isolated_compute_allowed_device".to_string(),
        ],
        compute_allowed_classes: set(&["service_manager", "chr_file"]),
        forbidden_perms: set(&["write", "rw_file_perms"]),
    }
}

/// Every check enabled with an empty allow list.
pub fn config() -> EffectiveConfig {
    EffectiveConfig {
        profile: "test".to_string(),
        checks: CATALOG
            .iter()
            .map(|c| (c.id.to_string(), CheckPolicy::enabled()))
            .collect(),
        coredomain_allowlist: set(&["vendor_init"]),
        entrypoint_skip_types: set(&["postinstall_file"]),
        isolated: isolated_policy(),
        fake_treble: false,
    }
}

pub fn config_with_allow(check_id: &str, allow: &[&str]) -> EffectiveConfig {
    let mut cfg = config();
    cfg.checks.insert(
        check_id.to_string(),
        CheckPolicy::enabled().with_allow(allow.iter().copied()),
    );
    cfg
}

/// Domains entered from each partition, plus an app, an allow-listed domain,
/// an OTA domain and one with an unrecognized entry point.
pub fn classifier_policy() -> Policy {
    PolicyBuilder::new()
        .typ("init", &["domain", "coredomain"])
        .typ("init_exec", &["file_type", "exec_type"])
        .allow("init", "init_exec", "file", &["entrypoint", "read", "execute"])
        .typ("hal_foo_default", &["domain"])
        .typ("hal_foo_default_exec", &["file_type", "exec_type"])
        .allow("hal_foo_default", "hal_foo_default_exec", "file", &["entrypoint"])
        .typ("legacy_vendor", &["domain"])
        .typ("legacy_vendor_exec", &["file_type", "exec_type"])
        .allow("legacy_vendor", "legacy_vendor_exec", "file", &["entrypoint"])
        .typ("vendor_init", &["domain"])
        .typ("vendor_init_exec", &["file_type", "exec_type"])
        .allow("vendor_init", "vendor_init_exec", "file", &["entrypoint"])
        .typ("untrusted_app", &["domain", "appdomain", "coredomain"])
        .typ("app_exec", &["file_type", "exec_type"])
        .allow("untrusted_app", "app_exec", "file", &["entrypoint"])
        .typ("postinstall", &["domain", "coredomain"])
        .typ("postinstall_file", &["file_type"])
        .allow("postinstall", "postinstall_file", "file", &["entrypoint"])
        .typ("odd", &["domain"])
        .typ("odd_exec", &["file_type", "exec_type"])
        .allow("odd", "odd_exec", "file", &["entrypoint"])
        .file_contexts(concat!(
            "/system/bin/init            u:object_r:init_exec:s0\n",
            "/vendor/bin/hw/foo          u:object_r:hal_foo_default_exec:s0\n",
            "/system/vendor/bin/legacy   u:object_r:legacy_vendor_exec:s0\n",
            "/system/bin/vendor_init     u:object_r:vendor_init_exec:s0\n",
            "/system/bin/app_process     u:object_r:app_exec:s0\n",
            "/postinstall(/.*)?          u:object_r:postinstall_file:s0\n",
            "/data/odd                   u:object_r:odd_exec:s0\n",
        ))
        .build()
}

/// Declares every attribute the sepolicy suite asks about.
pub fn suite_attributes() -> PolicyBuilder {
    [
        "domain",
        "coredomain",
        "appdomain",
        "file_type",
        "exec_type",
        "data_file_type",
        "core_data_file_type",
        "app_data_file_type",
        "system_file_type",
        "vendor_file_type",
        "sysfs_type",
        "debugfs_type",
        "tracefs_type",
        "bpffs_type",
        "proc_type",
        "dev_type",
        "dmabuf_heap_device_type",
        "system_property_type",
        "vendor_property_type",
        "isolated_app_all",
        "socket_between_core_and_vendor_violators",
        "vendor_executes_system_violators",
    ]
    .into_iter()
    .fold(PolicyBuilder::new(), PolicyBuilder::attribute)
}

/// A small device policy with one violation each for the data, sysfs, vendor
/// and coredomain checks.
pub fn sepolicy_builder() -> PolicyBuilder {
    suite_attributes()
        .typ("system_file", &["file_type", "system_file_type"])
        .typ("system_data_file", &["file_type", "data_file_type", "core_data_file_type"])
        .typ("vendor_data_file", &["file_type", "data_file_type"])
        .typ("rogue_data_file", &["file_type", "core_data_file_type"])
        .typ("vendor_file", &["file_type", "vendor_file_type"])
        .typ("sysfs", &["sysfs_type"])
        .typ("rogue_sysfs", &[])
        .typ("proc", &["proc_type"])
        .typ("build_prop", &["system_property_type"])
        .typ("init", &["domain", "coredomain"])
        .typ("init_exec", &["file_type", "exec_type", "system_file_type"])
        .allow("init", "init_exec", "file", &["entrypoint"])
        .typ("hal_foo_default", &["domain"])
        .typ("hal_foo_default_exec", &["file_type", "exec_type"])
        .allow("hal_foo_default", "hal_foo_default_exec", "file", &["entrypoint"])
        .typ("rogue_system_daemon", &["domain"])
        .typ("rogue_exec", &["file_type", "exec_type", "system_file_type"])
        .allow("rogue_system_daemon", "rogue_exec", "file", &["entrypoint"])
        .typ("servicemanager", &["domain", "coredomain"])
        .typ("isolated_app", &["domain", "appdomain", "coredomain", "isolated_app_all"])
        .typ(
            "isolated_compute_app",
            &["domain", "appdomain", "coredomain", "isolated_app_all"],
        )
        .allow("isolated_app_all", "servicemanager", "fd", &["use"])
        .genfs("sysfs", "/", "sysfs")
        .genfs("proc", "/", "proc")
        .file_contexts(concat!(
            "/system(/.*)?          u:object_r:system_file:s0\n",
            "/system/bin/init       u:object_r:init_exec:s0\n",
            "/system/bin/rogued     u:object_r:rogue_exec:s0\n",
            "/vendor(/.*)?          u:object_r:vendor_file:s0\n",
            "/vendor/bin/hw/foo     u:object_r:hal_foo_default_exec:s0\n",
            "/data(/.*)?            u:object_r:system_data_file:s0\n",
            "/data/rogue(/.*)?      u:object_r:rogue_data_file:s0\n",
            "/data/vendor(/.*)?     u:object_r:vendor_data_file:s0\n",
            "/data/vendor_ce(/.*)?  u:object_r:vendor_data_file:s0\n",
            "/data/vendor_de(/.*)?  u:object_r:vendor_data_file:s0\n",
            "/sys/class/rogue       u:object_r:rogue_sysfs:s0\n",
        ))
}

/// Owns everything a [`CheckContext`] borrows.
#[derive(Debug)]
pub struct Fixture {
    pub policy: Policy,
    pub domains: DomainClassifier,
    pub compat: Option<CompatInputs>,
}

impl Fixture {
    pub fn new(policy: Policy, cfg: &EffectiveConfig) -> Self {
        let domains = DomainClassifier::classify(&policy, cfg).expect("fixture policy must classify");
        Self {
            policy,
            domains,
            compat: None,
        }
    }

    pub fn with_compat(mut self, compat: CompatInputs) -> Self {
        self.compat = Some(compat);
        self
    }

    pub fn ctx(&self) -> CheckContext<'_> {
        CheckContext {
            policy: &self.policy,
            domains: &self.domains,
            compat: self.compat.as_ref(),
        }
    }
}

pub fn sepolicy_fixture() -> Fixture {
    Fixture::new(sepolicy_builder().build(), &config())
}

/// `new_public` was added without a mapping entry and `gone_public` was
/// removed without a declaration.
pub fn compat_inputs() -> CompatInputs {
    let mapping = CilPolicy::parse(concat!(
        "(type kept_public)\n",
        "(typeattributeset kept_public_33_0 (kept_public mapped_new))\n",
        "(typeattributeset gone_public_33_0 (gone_public))\n",
        "(typeattributeset declared_gone_33_0 (declared_gone))\n",
        "(type declared_gone)\n",
    ))
    .expect("fixture mapping must parse");

    CompatInputs {
        base_types: set(&["kept_public", "new_public", "mapped_new", "new_private"]),
        old_types: set(&["kept_public", "gone_public", "declared_gone"]),
        mapping,
        public_types: set(&["kept_public", "new_public", "mapped_new"]),
    }
}
