/// Characters that turn a path pattern into a regex.
pub const META_CHARS: [char; 10] = ['.', '^', '$', '?', '*', '+', '|', '[', '(', '{'];

pub fn is_meta_char(c: char) -> bool {
    META_CHARS.contains(&c)
}

/// Occurrences of metacharacters in a pattern, split by whether a backslash escapes them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetaCounts {
    pub total: usize,
    pub escaped: usize,
}

impl MetaCounts {
    pub fn of(pattern: &str) -> Self {
        let mut counts = MetaCounts::default();
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                // The escaped character is consumed here so `\\.` leaves the dot live.
                if let Some(next) = chars.next()
                    && is_meta_char(next)
                {
                    counts.total += 1;
                    counts.escaped += 1;
                }
                continue;
            }
            if is_meta_char(c) {
                counts.total += 1;
            }
        }
        counts
    }
}

/// A pattern is a regex only if some metacharacter occurrence is not escaped.
pub fn is_meta(pattern: &str) -> bool {
    let counts = MetaCounts::of(pattern);
    counts.total > counts.escaped
}

/// Length of the literal stem: characters before the first unescaped metacharacter.
/// An escape sequence counts as one character.
pub fn stem_len(pattern: &str) -> usize {
    let mut len = 0;
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if is_meta_char(c) {
            break;
        }
        len += 1;
    }
    len
}

/// Pattern length in characters with escaping backslashes removed.
pub fn pattern_len(pattern: &str) -> usize {
    pattern.chars().filter(|c| *c != '\\').count()
}
