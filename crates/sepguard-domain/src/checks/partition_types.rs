//! Path-label assertions over storage partitions.

use super::utils::{NONE, allowed_types};
use crate::context::CheckContext;
use crate::error::EngineError;
use crate::policy::{CheckPolicy, EffectiveConfig};

const SYSTEM_PARTITIONS: [&str; 3] = ["/system/", "/system_ext/", "/product/"];
const SYSTEM_EXCEPTIONS: [&str; 8] = [
    // Devices before the split have no vendor partition.
    "/system/vendor/",
    // Overlays are mounted over vendor.
    "/product/overlay/",
    "/product/vendor_overlay/",
    "/system/overlay/",
    "/system/product/overlay/",
    "/system/product/vendor_overlay/",
    "/system/system_ext/overlay/",
    "/system_ext/overlay/",
];

const VENDOR_PARTITIONS: [&str; 2] = ["/vendor/", "/odm/"];
const VENDOR_EXCEPTIONS: [&str; 3] = [
    "/vendor/etc/selinux/",
    "/vendor/odm/etc/selinux/",
    "/odm/etc/selinux/",
];

const VENDOR_DATA_DIRS: [&str; 3] = ["/data/vendor/", "/data/vendor_ce/", "/data/vendor_de/"];

pub fn data(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    policy: &CheckPolicy,
) -> Result<String, EngineError> {
    let allow = allowed_types(policy);
    Ok(ctx
        .policy
        .assert_path_types_have_attribute(&["/data/"], &NONE, "data_file_type", &allow)?)
}

pub fn system(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    policy: &CheckPolicy,
) -> Result<String, EngineError> {
    let allow = allowed_types(policy);
    Ok(ctx.policy.assert_path_types_have_attribute(
        &SYSTEM_PARTITIONS,
        &SYSTEM_EXCEPTIONS,
        "system_file_type",
        &allow,
    )?)
}

pub fn vendor(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    policy: &CheckPolicy,
) -> Result<String, EngineError> {
    let allow = allowed_types(policy);
    Ok(ctx.policy.assert_path_types_have_attribute(
        &VENDOR_PARTITIONS,
        &VENDOR_EXCEPTIONS,
        "vendor_file_type",
        &allow,
    )?)
}

pub fn core_data(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    policy: &CheckPolicy,
) -> Result<String, EngineError> {
    let allow = allowed_types(policy);
    let mut ret = ctx.policy.assert_path_types_have_attribute(
        &["/data/"],
        &["/data/vendor", "/data/vendor_ce", "/data/vendor_de"],
        "core_data_file_type",
        &allow,
    )?;
    ret += &ctx.policy.assert_path_types_do_not_have_attribute(
        &VENDOR_DATA_DIRS,
        &NONE,
        "core_data_file_type",
        &allow,
    )?;
    Ok(ret)
}

/// Nothing under the vendor data directories may be core data.
pub fn vendor_data_not_core(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    policy: &CheckPolicy,
) -> Result<String, EngineError> {
    let allow = allowed_types(policy);
    Ok(ctx.policy.assert_path_types_do_not_have_attribute(
        &VENDOR_DATA_DIRS,
        &NONE,
        "core_data_file_type",
        &allow,
    )?)
}

/// App data types are applied through seapp_contexts only, never by path.
pub fn app_data(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    policy: &CheckPolicy,
) -> Result<String, EngineError> {
    let allow = allowed_types(policy);
    Ok(ctx.policy.assert_path_types_do_not_have_attribute(
        &["/data/", "/vendor/", "/odm/", "/product/"],
        &NONE,
        "app_data_file_type",
        &allow,
    )?)
}

pub fn dma_heap(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    policy: &CheckPolicy,
) -> Result<String, EngineError> {
    let allow = allowed_types(policy);
    Ok(ctx.policy.assert_path_types_have_attribute(
        &["/dev/dma_heap/"],
        &NONE,
        "dmabuf_heap_device_type",
        &allow,
    )?)
}

pub fn dev(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    policy: &CheckPolicy,
) -> Result<String, EngineError> {
    let allow = allowed_types(policy);
    Ok(ctx
        .policy
        .assert_path_types_have_attribute(&["/dev"], &["/dev/socket"], "dev_type", &allow)?)
}
