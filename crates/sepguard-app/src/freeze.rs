//! The freeze use case: the public policy must not change once the vendor API is frozen.

use crate::config::resolve_config_text;
use crate::load::load_cil;
use camino::Utf8Path;
use sepguard_compat::FreezeDiff;
use sepguard_settings::Overrides;
use sepguard_types::{Report, ids};

#[derive(Clone, Debug)]
pub struct FreezeInput<'a> {
    /// Public CIL built from the current tree.
    pub current: &'a Utf8Path,
    /// Frozen prebuilt public CIL.
    pub prebuilt: &'a Utf8Path,
    /// Config file contents; supplies the tolerated additions.
    pub config_text: &'a str,
}

pub fn run_freeze_test(input: FreezeInput<'_>) -> anyhow::Result<Report> {
    let resolved = resolve_config_text(input.config_text, Overrides::default())?;
    let current = load_cil(input.current)?;
    let prebuilt = load_cil(input.prebuilt)?;

    let diff = FreezeDiff::between(&current, &prebuilt, &resolved.freeze_ignore_added_types);
    let mut report = Report::new();
    if !diff.is_empty() {
        report.push(ids::CHECK_PUBLIC_FREEZE, diff.to_string());
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, text: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("utf8");
        std::fs::write(&path, text).expect("write");
        path
    }

    #[test]
    fn tolerated_addition_passes() {
        let dir = TempDir::new().expect("tempdir");
        let prebuilt = write(&dir, "prebuilt.cil", "(type a)\n(typeattribute x)\n");
        let current = write(
            &dir,
            "current.cil",
            "(type a)\n(type proc_compaction_proactiveness)\n(typeattribute x)\n(typeattribute base_typeattr_3)\n",
        );
        let report = run_freeze_test(FreezeInput {
            current: &current,
            prebuilt: &prebuilt,
            config_text: "",
        })
        .expect("run");
        assert!(report.is_empty(), "{report}");
    }

    #[test]
    fn added_type_fails_with_guard_hint() {
        let dir = TempDir::new().expect("tempdir");
        let prebuilt = write(&dir, "prebuilt.cil", "(type a)\n");
        let current = write(&dir, "current.cil", "(type a)\n(type b)\n");
        let report = run_freeze_test(FreezeInput {
            current: &current,
            prebuilt: &prebuilt,
            config_text: "",
        })
        .expect("run");
        let text = report.render();
        assert!(text.starts_with("The following public types were added:\nb\n"));
        assert!(text.contains("after vendor API freeze"));
        assert_eq!(report.violations()[0].check_id, ids::CHECK_PUBLIC_FREEZE);
    }

    #[test]
    fn config_can_clear_the_tolerated_list() {
        let dir = TempDir::new().expect("tempdir");
        let prebuilt = write(&dir, "prebuilt.cil", "(type a)\n");
        let current = write(&dir, "current.cil", "(type a)\n(type proc_compaction_proactiveness)\n");
        let report = run_freeze_test(FreezeInput {
            current: &current,
            prebuilt: &prebuilt,
            config_text: "[freeze]\nignore_added_types = []\n",
        })
        .expect("run");
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn missing_prebuilt_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let current = write(&dir, "current.cil", "(type a)\n");
        let missing = Utf8PathBuf::from_path_buf(dir.path().join("nope.cil")).expect("utf8");
        let err = run_freeze_test(FreezeInput {
            current: &current,
            prebuilt: &missing,
            config_text: "",
        })
        .expect_err("missing");
        assert!(format!("{err:#}").contains("nope.cil"));
    }
}
