use crate::error::CompatError;

/// A CIL s-expression. Lists remember the line their `(` was on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sexpr {
    Atom(String),
    List { line: usize, items: Vec<Sexpr> },
}

impl Sexpr {
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Sexpr::Atom(s) => Some(s),
            Sexpr::List { .. } => None,
        }
    }

    /// Every atom in this expression, depth first.
    pub fn atoms(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Sexpr::Atom(s) => out.push(s),
            Sexpr::List { items, .. } => {
                for item in items {
                    item.collect_atoms(out);
                }
            }
        }
    }
}

fn flush(atom: &mut String, stack: &mut [(usize, Vec<Sexpr>)]) {
    if atom.is_empty() {
        return;
    }
    let word = std::mem::take(atom);
    if let Some((_, items)) = stack.last_mut() {
        items.push(Sexpr::Atom(word));
    }
}

/// Parse the top-level expressions of a CIL text. `;` starts a comment that
/// runs to the end of the line; atoms outside any list are ignored.
pub fn parse_sexprs(text: &str) -> Result<Vec<Sexpr>, CompatError> {
    let mut stack: Vec<(usize, Vec<Sexpr>)> = Vec::new();
    let mut top = Vec::new();
    let mut atom = String::new();
    let mut line = 1usize;
    let mut in_comment = false;

    for c in text.chars() {
        if in_comment {
            if c == '\n' {
                in_comment = false;
                line += 1;
            }
            continue;
        }
        match c {
            ';' => {
                flush(&mut atom, &mut stack);
                in_comment = true;
            }
            '(' => {
                flush(&mut atom, &mut stack);
                stack.push((line, Vec::new()));
            }
            ')' => {
                flush(&mut atom, &mut stack);
                let (open_line, items) = stack
                    .pop()
                    .ok_or(CompatError::UnexpectedClose { line })?;
                let list = Sexpr::List {
                    line: open_line,
                    items,
                };
                match stack.last_mut() {
                    Some((_, parent)) => parent.push(list),
                    None => top.push(list),
                }
            }
            c if c.is_whitespace() => {
                flush(&mut atom, &mut stack);
                if c == '\n' {
                    line += 1;
                }
            }
            _ => atom.push(c),
        }
    }

    if let Some((open_line, _)) = stack.first() {
        return Err(CompatError::Unclosed { line: *open_line });
    }
    Ok(top)
}
