//! The fc sort use case: emit path-label lines in the order the labeling lookup wants them.

use crate::load::read_text;
use anyhow::Context;
use camino::Utf8PathBuf;
use sepguard_contexts::{parse_file_contexts, sort_by_specificity};

/// Every entry of `files`, least specific first, one trimmed line each.
///
/// Entries that tie keep their input order, file by file.
pub fn sort_file_contexts(files: &[Utf8PathBuf]) -> anyhow::Result<String> {
    if files.is_empty() {
        anyhow::bail!("must specify at least one file_contexts file");
    }
    let mut entries = Vec::new();
    for path in files {
        let text = read_text(path)?;
        let parsed = parse_file_contexts(&text)
            .into_result()
            .with_context(|| format!("parse {path}"))?;
        entries.extend(parsed);
    }
    sort_by_specificity(&mut entries);

    let mut out = String::new();
    for entry in &entries {
        out.push_str(&entry.raw_line);
        out.push('\n');
    }
    Ok(out)
}
