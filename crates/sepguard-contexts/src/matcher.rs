use crate::meta::is_meta_char;
use regex::Regex;
use std::borrow::Cow;

/// Partition alternations that show up at the start of most vendor-side
/// patterns, paired with the literal spellings each one stands for.
const COMMON_PREFIXES: [(&str, [&str; 2]); 4] = [
    ("/(vendor|system/vendor)", ["/vendor", "/system/vendor"]),
    ("/(odm|vendor/odm)", ["/odm", "/vendor/odm"]),
    ("/(product|system/product)", ["/product", "/system/product"]),
    ("/(system_ext|system/system_ext)", ["/system_ext", "/system/system_ext"]),
];

/// A path pattern compiled as `^pattern$`, matched from the start of the input.
#[derive(Clone, Debug)]
pub struct AnchoredPattern {
    regex: Regex,
}

impl AnchoredPattern {
    /// Returns `None` when the pattern is not a valid regex.
    pub fn compile(pattern: &str) -> Option<Self> {
        match Regex::new(&format!("^{}$", literal_braces(pattern))) {
            Ok(regex) => Some(Self { regex }),
            Err(err) => {
                tracing::trace!(pattern, error = %err, "pattern does not compile");
                None
            }
        }
    }

    pub fn is_match(&self, input: &str) -> bool {
        // `^a|b$` style alternations are only anchored on one side, so insist
        // on a match that begins at offset zero.
        self.regex.find(input).is_some_and(|m| m.start() == 0)
    }
}

/// Length of the counted repetition at the start of `rest` (which begins
/// with `{`), if it is one: `{m}`, `{m,}`, `{m,n}`, `{,n}` or `{,}`.
fn repetition_len(rest: &str) -> Option<usize> {
    let close = rest.find('}')?;
    let body = &rest[1..close];
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    let valid = match body.split_once(',') {
        None => !body.is_empty() && digits(body),
        Some((min, max)) => digits(min) && digits(max),
    };
    valid.then_some(close + 1)
}

/// Path patterns are written for a regex dialect where a brace that does not
/// open a counted repetition is an ordinary character (`/dev/foo{bar}`).
/// Escape those braces; `{,n}` is spelled `{0,n}`.
fn literal_braces(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains(['{', '}']) {
        return Cow::Borrowed(pattern);
    }

    let mut out = String::with_capacity(pattern.len() + 4);
    let mut in_class = false;
    let mut idx = 0;
    while let Some(c) = pattern[idx..].chars().next() {
        let next = idx + c.len_utf8();
        match c {
            '\\' => {
                let escaped = pattern[next..].chars().next().map_or(0, char::len_utf8);
                out.push_str(&pattern[idx..next + escaped]);
                idx = next + escaped;
                continue;
            }
            '[' if !in_class => {
                in_class = true;
                out.push(c);
                // `[]...]` and `[^]...]` start with a literal `]`.
                let mut skip = next;
                if pattern[skip..].starts_with('^') {
                    skip += 1;
                }
                if pattern[skip..].starts_with(']') {
                    skip += 1;
                }
                out.push_str(&pattern[next..skip]);
                idx = skip;
                continue;
            }
            ']' if in_class => in_class = false,
            '{' if !in_class => match repetition_len(&pattern[idx..]) {
                Some(len) => {
                    let rep = &pattern[idx..idx + len];
                    match rep.strip_prefix("{,") {
                        Some(max) => {
                            out.push_str("{0,");
                            out.push_str(max);
                        }
                        None => out.push_str(rep),
                    }
                    idx += len;
                    continue;
                }
                None => {
                    out.push_str("\\{");
                    idx = next;
                    continue;
                }
            },
            '}' if !in_class => {
                out.push_str("\\}");
                idx = next;
                continue;
            }
            _ => {}
        }
        out.push(c);
        idx = next;
    }
    Cow::Owned(out)
}

enum LiteralScan {
    Covered,
    Diverged,
    NeedsRegex,
}

/// Strip matching partition alternations from the pattern and their literal
/// spelling from the prefix. `None` means an alternation matched the pattern
/// but none of its spellings starts the prefix.
fn strip_common_prefixes<'p, 'q>(
    mut pattern: &'p str,
    mut prefix: &'q str,
) -> Option<(&'p str, &'q str)> {
    for (group, spellings) in COMMON_PREFIXES {
        let Some(rest) = pattern.strip_prefix(group) else {
            continue;
        };
        let spelled = spellings.iter().find_map(|s| prefix.strip_prefix(*s))?;
        pattern = rest;
        prefix = spelled;
    }
    Some((pattern, prefix))
}

fn scan_literal(pattern: &str, prefix: &str) -> LiteralScan {
    let mut pat = pattern.chars();
    for want in prefix.chars() {
        match pat.next() {
            None => return LiteralScan::Diverged,
            Some(c) if c == '\\' || is_meta_char(c) => return LiteralScan::NeedsRegex,
            Some(c) if c != want => return LiteralScan::Diverged,
            Some(_) => {}
        }
    }
    LiteralScan::Covered
}

fn regex_prefix_match(pattern: &str, prefix: &str) -> bool {
    let mut cuts: Vec<usize> = pattern
        .char_indices()
        .map(|(idx, _)| idx)
        .skip(1)
        .chain(std::iter::once(pattern.len()))
        .filter(|&end| end > 0)
        .collect();
    cuts.reverse();

    cuts.into_iter().any(|end| {
        AnchoredPattern::compile(&pattern[..end]).is_some_and(|re| re.is_match(prefix))
    })
}

/// Whether some path beginning with `prefix` could be matched by `pattern`.
///
/// Partition alternations and plain leading literals are decided without
/// touching the regex engine. Otherwise the pattern is truncated from the
/// right, one character at a time, until a truncation matches the whole
/// prefix or nothing is left.
pub fn matches_prefix(pattern: &str, prefix: &str) -> bool {
    let Some((pattern, prefix)) = strip_common_prefixes(pattern, prefix) else {
        return false;
    };

    match scan_literal(pattern, prefix) {
        LiteralScan::Covered => true,
        LiteralScan::Diverged => false,
        LiteralScan::NeedsRegex => regex_prefix_match(pattern, prefix),
    }
}

pub fn matches_any_prefix<S: AsRef<str>>(pattern: &str, prefixes: &[S]) -> bool {
    prefixes.iter().any(|p| matches_prefix(pattern, p.as_ref()))
}
