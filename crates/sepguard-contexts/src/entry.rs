use crate::error::ContextsError;
use crate::meta::{is_meta, pattern_len, stem_len};
use sepguard_types::SecurityContext;
use std::fmt;
use std::str::FromStr;

/// File kind qualifier from the optional middle column of a file_contexts line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileKind {
    Regular,
    Directory,
    CharDevice,
    BlockDevice,
    Socket,
    Symlink,
    Pipe,
}

impl FileKind {
    pub fn as_token(self) -> &'static str {
        match self {
            FileKind::Regular => "--",
            FileKind::Directory => "-d",
            FileKind::CharDevice => "-c",
            FileKind::BlockDevice => "-b",
            FileKind::Socket => "-s",
            FileKind::Symlink => "-l",
            FileKind::Pipe => "-p",
        }
    }
}

impl FromStr for FileKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "--" => Ok(FileKind::Regular),
            "-d" => Ok(FileKind::Directory),
            "-c" => Ok(FileKind::CharDevice),
            "-b" => Ok(FileKind::BlockDevice),
            "-s" => Ok(FileKind::Socket),
            "-l" => Ok(FileKind::Symlink),
            "-p" => Ok(FileKind::Pipe),
            _ => Err(()),
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// One parsed file_contexts line. Immutable after parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathRuleEntry {
    pub pattern: String,
    pub file_kind: Option<FileKind>,
    pub context: SecurityContext,
    pub is_meta: bool,
    pub stem_len: usize,
    pub pattern_len: usize,
    /// The trimmed source line, re-emitted verbatim by the sorter.
    pub raw_line: String,
}

impl PathRuleEntry {
    /// Parse a single line. Blank lines and `#` comments yield `Ok(None)`.
    pub fn parse(line_no: usize, line: &str) -> Result<Option<Self>, ContextsError> {
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            return Ok(None);
        }

        let fields: Vec<&str> = text.split_whitespace().collect();
        let (pattern, kind, label) = match fields.as_slice() {
            [pattern, label] => (*pattern, None, *label),
            [pattern, kind, label] => (*pattern, Some(*kind), *label),
            _ => {
                return Err(ContextsError::FieldCount {
                    line: line_no,
                    found: fields.len(),
                    text: text.to_string(),
                });
            }
        };

        let file_kind = match kind {
            None => None,
            Some(k) => Some(k.parse::<FileKind>().map_err(|_| {
                ContextsError::UnknownFileKind {
                    line: line_no,
                    kind: k.to_string(),
                    text: text.to_string(),
                }
            })?),
        };

        let context = label
            .parse::<SecurityContext>()
            .map_err(|source| ContextsError::Context {
                line: line_no,
                text: text.to_string(),
                source,
            })?;

        Ok(Some(Self {
            pattern: pattern.to_string(),
            file_kind,
            context,
            is_meta: is_meta(pattern),
            stem_len: stem_len(pattern),
            pattern_len: pattern_len(pattern),
            raw_line: text.to_string(),
        }))
    }

    pub fn type_name(&self) -> &str {
        self.context.type_name()
    }
}

/// Entries that parsed, plus the per-line errors for those that did not.
#[derive(Clone, Debug, Default)]
pub struct ParseOutcome {
    pub entries: Vec<PathRuleEntry>,
    pub errors: Vec<ContextsError>,
}

impl ParseOutcome {
    pub fn into_result(self) -> Result<Vec<PathRuleEntry>, ContextsError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.entries),
        }
    }
}

/// Parse a whole file_contexts text. A bad line never stops the lines after it.
pub fn parse_file_contexts(text: &str) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    for (idx, line) in text.lines().enumerate() {
        match PathRuleEntry::parse(idx + 1, line) {
            Ok(Some(entry)) => outcome.entries.push(entry),
            Ok(None) => {}
            Err(err) => {
                tracing::debug!("skipping file_contexts line: {err}");
                outcome.errors.push(err);
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_entries_and_skips_comments() {
        let content = "# comment
/                                     u:object_r:rootfs:s0
# another comment
/adb_keys                     u:object_r:adb_keys_file:s0
";
        let outcome = parse_file_contexts(content);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.entries.len(), 2);
        assert_eq!(outcome.entries[0].pattern, "/");
        assert_eq!(outcome.entries[0].type_name(), "rootfs");
        assert_eq!(outcome.entries[1].pattern, "/adb_keys");
        assert_eq!(outcome.entries[1].type_name(), "adb_keys_file");
    }

    #[test]
    fn file_kind_column_is_parsed() {
        let entry = PathRuleEntry::parse(1, "/data -- u:object_r:rootfs:s0")
            .expect("parse")
            .expect("entry");
        assert_eq!(entry.file_kind, Some(FileKind::Regular));
        assert_eq!(entry.raw_line, "/data -- u:object_r:rootfs:s0");
    }

    #[test]
    fn bad_lines_are_reported_with_their_line_number() {
        let content = "/ok u:object_r:rootfs:s0
/bad u:object_r:vendor_file
/worse
/a -x u:object_r:rootfs:s0
/still_ok u:object_r:system_file:s0
";
        let outcome = parse_file_contexts(content);
        assert_eq!(outcome.entries.len(), 2);
        let lines: Vec<usize> = outcome.errors.iter().map(ContextsError::line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
        assert!(matches!(
            outcome.errors[2],
            ContextsError::UnknownFileKind { .. }
        ));
    }
}
