//! The domain dump use case: show how every domain was classified.

use crate::config::resolve_config_text;
use crate::load::load_policy;
use crate::render::OutputFormat;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use sepguard_domain::DomainClassifier;
use sepguard_settings::Overrides;

#[derive(Clone, Debug)]
pub struct DumpInput<'a> {
    pub policy: &'a Utf8Path,
    pub file_contexts: &'a [Utf8PathBuf],
    pub config_text: &'a str,
}

pub fn dump_domains(input: DumpInput<'_>, format: OutputFormat) -> anyhow::Result<String> {
    let resolved = resolve_config_text(input.config_text, Overrides::default())?;
    let policy = load_policy(input.policy, input.file_contexts)?;
    let domains =
        DomainClassifier::classify(&policy, &resolved.effective).context("classify domains")?;
    match format {
        OutputFormat::Text => Ok(domains.dump()),
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(&domains).context("serialize domains")?;
            json.push('\n');
            Ok(json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const POLICY: &str = "\
attribute domain
attribute coredomain
type init domain coredomain
type init_exec
type hal_foo domain
type hal_foo_exec
allow init init_exec:file entrypoint;
allow hal_foo hal_foo_exec:file entrypoint;
";

    const FILE_CONTEXTS: &str = "\
/system/bin/init          u:object_r:init_exec:s0
/vendor/bin/hw/hal_foo    u:object_r:hal_foo_exec:s0
";

    fn input_files() -> (TempDir, Utf8PathBuf, Vec<Utf8PathBuf>) {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8");
        let policy = root.join("policy.conf");
        let fc = root.join("file_contexts");
        std::fs::write(&policy, POLICY).expect("write");
        std::fs::write(&fc, FILE_CONTEXTS).expect("write");
        (dir, policy, vec![fc])
    }

    #[test]
    fn text_dump_lists_each_domain() {
        let (_dir, policy, fc) = input_files();
        let out = dump_domains(
            DumpInput {
                policy: &policy,
                file_contexts: &fc,
                config_text: "",
            },
            OutputFormat::Text,
        )
        .expect("dump");
        assert!(out.contains("hal_foo\n"));
        assert!(out.contains("\tfromVendor=true"), "{out}");
        assert!(out.contains("\t\t/system/bin/init\n"));
    }

    #[test]
    fn json_dump_is_keyed_by_domain() {
        let (_dir, policy, fc) = input_files();
        let out = dump_domains(
            DumpInput {
                policy: &policy,
                file_contexts: &fc,
                config_text: "",
            },
            OutputFormat::Json,
        )
        .expect("dump");
        let value: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(value["init"]["has_core_attribute"], true);
        assert_eq!(value["hal_foo"]["from_vendor"], true);
    }
}
