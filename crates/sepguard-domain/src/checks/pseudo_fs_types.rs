//! Labels on kernel pseudo-filesystems, from genfscon statements and paths.

use super::utils::{NONE, allowed_types};
use crate::context::CheckContext;
use crate::error::EngineError;
use crate::policy::{CheckPolicy, EffectiveConfig};

pub fn bpffs(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    _policy: &CheckPolicy,
) -> Result<String, EngineError> {
    Ok(ctx
        .policy
        .assert_genfs_filesystem_types_have_attribute("bpf", "bpffs_type")?)
}

pub fn proc(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    _policy: &CheckPolicy,
) -> Result<String, EngineError> {
    Ok(ctx
        .policy
        .assert_genfs_filesystem_types_have_attribute("proc", "proc_type")?)
}

pub fn sysfs(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    policy: &CheckPolicy,
) -> Result<String, EngineError> {
    let allow = allowed_types(policy);
    let mut ret = ctx
        .policy
        .assert_genfs_filesystem_types_have_attribute("sysfs", "sysfs_type")?;
    ret += &ctx.policy.assert_path_types_have_attribute(
        &["/sys/"],
        &["/sys/kernel/debug/", "/sys/kernel/tracing"],
        "sysfs_type",
        &allow,
    )?;
    Ok(ret)
}

pub fn debugfs(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    policy: &CheckPolicy,
) -> Result<String, EngineError> {
    let allow = allowed_types(policy);
    let mut ret = ctx
        .policy
        .assert_genfs_filesystem_types_have_attribute("debugfs", "debugfs_type")?;
    ret += &ctx.policy.assert_path_types_have_attribute(
        &["/sys/kernel/debug/", "/sys/kernel/tracing"],
        &NONE,
        "debugfs_type",
        &allow,
    )?;
    Ok(ret)
}

/// tracefs is reachable under /sys/kernel/tracing and, for older kernels,
/// /sys/kernel/debug/tracing. Nothing else under debugfs may claim it.
pub fn tracefs(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    policy: &CheckPolicy,
) -> Result<String, EngineError> {
    let allow = allowed_types(policy);
    let mut ret = ctx
        .policy
        .assert_genfs_filesystem_types_have_attribute("tracefs", "tracefs_type")?;
    ret += &ctx.policy.assert_path_types_have_attribute(
        &["/sys/kernel/tracing"],
        &NONE,
        "tracefs_type",
        &allow,
    )?;
    ret += &ctx.policy.assert_path_types_do_not_have_attribute(
        &["/sys/kernel/debug"],
        &["/sys/kernel/debug/tracing"],
        "tracefs_type",
        &allow,
    )?;
    Ok(ret)
}
