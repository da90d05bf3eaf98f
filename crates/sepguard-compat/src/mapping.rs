use crate::error::CompatError;
use crate::sexpr::{Sexpr, parse_sexprs};
use camino::Utf8Path;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static VERSIONED_SET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)_\d+_\d+").expect("valid versioned set regex"));

static API_LEVEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.\d+).+\.cil").expect("valid api level regex"));

const SET_OPERATORS: [&str; 5] = ["and", "or", "xor", "not", "all"];

/// Type and attribute facts extracted from a CIL file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CilPolicy {
    /// Names declared with `(type ...)`.
    pub types: BTreeSet<String>,
    /// Names declared with `(typeattribute ...)`.
    pub type_attributes: BTreeSet<String>,
    /// `(typeattributeset name expr)` bindings, operators dropped.
    pub attribute_sets: BTreeMap<String, BTreeSet<String>>,
    /// member -> names of every set that includes it.
    pub reverse_sets: BTreeMap<String, BTreeSet<String>>,
    /// `foo` for every versioned set named `foo_<major>_<minor>`.
    pub public_types: BTreeSet<String>,
    /// From file names like `30.0.compat.cil`.
    pub api_level: Option<String>,
}

impl CilPolicy {
    pub fn from_path(path: &Utf8Path) -> Result<Self, CompatError> {
        let text = std::fs::read_to_string(path).map_err(|source| CompatError::Read {
            path: path.to_owned(),
            source,
        })?;
        let mut parsed = Self::parse(&text)?;
        parsed.api_level = path
            .file_name()
            .and_then(|name| API_LEVEL.captures(name))
            .map(|caps| caps[1].to_string());
        tracing::debug!(
            path = %path,
            types = parsed.types.len(),
            attributes = parsed.type_attributes.len(),
            sets = parsed.attribute_sets.len(),
            "parsed CIL"
        );
        Ok(parsed)
    }

    pub fn parse(text: &str) -> Result<Self, CompatError> {
        let mut out = Self::default();
        let mut unknown: BTreeMap<String, usize> = BTreeMap::new();

        for stmt in parse_sexprs(text)? {
            let Sexpr::List { line, items } = &stmt else {
                continue;
            };
            let Some(keyword) = items.first().and_then(Sexpr::as_atom) else {
                tracing::warn!(line = *line, "CIL statement does not start with a keyword");
                continue;
            };
            let args = &items[1..];

            match keyword {
                "type" => {
                    out.types.insert(single_name(*line, keyword, args)?);
                }
                "typeattribute" => {
                    out.type_attributes
                        .insert(single_name(*line, keyword, args)?);
                }
                "typeattributeset" => out.add_set(*line, args)?,
                "expandtypeattribute" => {}
                other => *unknown.entry(other.to_string()).or_default() += 1,
            }
        }

        for (keyword, count) in unknown {
            tracing::warn!(keyword = %keyword, count, "skipping unsupported CIL statements");
        }
        Ok(out)
    }

    fn add_set(&mut self, line: usize, args: &[Sexpr]) -> Result<(), CompatError> {
        let [name, expr] = args else {
            return Err(CompatError::Statement {
                line,
                message: "typeattributeset expects a name and an expression".to_string(),
            });
        };
        let name = name.as_atom().ok_or_else(|| CompatError::Statement {
            line,
            message: "typeattributeset name must be an atom".to_string(),
        })?;

        let members: BTreeSet<String> = expr
            .atoms()
            .into_iter()
            .filter(|atom| !SET_OPERATORS.contains(atom))
            .map(str::to_string)
            .collect();

        for member in &members {
            self.reverse_sets
                .entry(member.clone())
                .or_default()
                .insert(name.to_string());
        }
        self.attribute_sets
            .entry(name.to_string())
            .or_default()
            .extend(members);

        if let Some(caps) = VERSIONED_SET.captures(name) {
            self.public_types.insert(caps[1].to_string());
        }
        Ok(())
    }

    /// True if some set binding in this file includes `member`.
    pub fn is_mapped(&self, member: &str) -> bool {
        self.reverse_sets.contains_key(member)
    }
}

fn single_name(line: usize, keyword: &str, args: &[Sexpr]) -> Result<String, CompatError> {
    match args {
        [Sexpr::Atom(name)] => Ok(name.clone()),
        _ => Err(CompatError::Statement {
            line,
            message: format!("`{keyword}` expects exactly one name"),
        }),
    }
}
