use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `user:role:type:level` label, split once at the input boundary.
///
/// Only `type_name` drives policy decisions; the other fields are kept so the
/// label round-trips through `Display`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SecurityContext {
    pub user: String,
    pub role: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub level: String,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContextParseError {
    #[error("context `{0}` must have exactly 4 colon-separated fields")]
    FieldCount(String),
    #[error("context `{0}` has an empty type field")]
    EmptyType(String),
}

impl SecurityContext {
    /// `u:object_r:<type>:s0`, the shape of every file label.
    pub fn object(type_name: &str) -> Self {
        Self {
            user: "u".to_string(),
            role: "object_r".to_string(),
            type_name: type_name.to_string(),
            level: "s0".to_string(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl FromStr for SecurityContext {
    type Err = ContextParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').collect();
        let [user, role, type_name, level] = fields.as_slice() else {
            return Err(ContextParseError::FieldCount(s.to_string()));
        };
        if type_name.is_empty() {
            return Err(ContextParseError::EmptyType(s.to_string()));
        }
        Ok(Self {
            user: user.to_string(),
            role: role.to_string(),
            type_name: type_name.to_string(),
            level: level.to_string(),
        })
    }
}

impl fmt::Display for SecurityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.user, self.role, self.type_name, self.level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_four_field_label() {
        let ctx: SecurityContext = "u:object_r:vendor_configs_file:s0".parse().expect("parse");
        assert_eq!(ctx.type_name(), "vendor_configs_file");
        assert_eq!(ctx.to_string(), "u:object_r:vendor_configs_file:s0");
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(matches!(
            "u:object_r:vendor_file".parse::<SecurityContext>(),
            Err(ContextParseError::FieldCount(_))
        ));
        assert!(matches!(
            "u:object_r:vendor_file:s0:c512".parse::<SecurityContext>(),
            Err(ContextParseError::FieldCount(_))
        ));
        assert!("invalid_contexts".parse::<SecurityContext>().is_err());
    }

    #[test]
    fn rejects_empty_type() {
        assert_eq!(
            "u:object_r::s0".parse::<SecurityContext>(),
            Err(ContextParseError::EmptyType("u:object_r::s0".to_string()))
        );
    }
}
