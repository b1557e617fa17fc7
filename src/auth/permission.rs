use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_CODE_LEN: usize = 128;

/// Stable permission code such as `ws:project:write`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PermissionCode(String);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PermissionCodeError {
    #[error("permission code is empty")]
    Empty,
    #[error("permission code exceeds 128 bytes")]
    TooLong,
    #[error("permission code '{0}' must have at least two ':'-separated segments")]
    MissingScope(String),
    #[error("permission code '{0}' contains an invalid segment")]
    InvalidSegment(String),
}

impl PermissionCode {
    /// Validate and wrap a permission code.
    ///
    /// Codes are two or more `:`-separated segments of `[a-z0-9_-]`.
    pub fn parse(raw: &str) -> Result<Self, PermissionCodeError> {
        if raw.is_empty() {
            return Err(PermissionCodeError::Empty);
        }
        if raw.len() > MAX_CODE_LEN {
            return Err(PermissionCodeError::TooLong);
        }

        let segments: Vec<&str> = raw.split(':').collect();
        if segments.len() < 2 {
            return Err(PermissionCodeError::MissingScope(raw.to_string()));
        }

        let valid_segment = |s: &&str| {
            !s.is_empty()
                && s.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        };
        if !segments.iter().all(valid_segment) {
            return Err(PermissionCodeError::InvalidSegment(raw.to_string()));
        }

        Ok(Self(raw.to_string()))
    }

    /// Wrap a compile-time constant code.
    ///
    /// # Panics
    ///
    /// Panics if `raw` is not a valid code.
    pub fn from_static(raw: &'static str) -> Self {
        match Self::parse(raw) {
            Ok(code) => code,
            Err(e) => panic!("invalid static permission code: {}", e),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PermissionCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for PermissionCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        PermissionCode::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Catalog row: a permission code and its human-readable description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionEntry {
    pub permission_code: String,
    pub description: String,
}

/// Default catalog used by the in-memory permission store.
pub const BUILTIN_CATALOG: &[(&str, &str)] = &[
    ("ws:workspace:read", "View workspace settings"),
    ("ws:workspace:admin", "Manage workspace settings and billing"),
    ("ws:member:read", "View workspace members"),
    ("ws:member:invite", "Invite members to the workspace"),
    ("ws:member:remove", "Remove members from the workspace"),
    ("ws:project:read", "View projects"),
    ("ws:project:write", "Create and edit projects"),
    ("ws:project:delete", "Delete projects"),
    ("ws:role:read", "View roles and assignments"),
    ("ws:role:write", "Create roles and assign them to members"),
    ("ws:permission:read", "View the permission catalog"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_scoped_codes() {
        for raw in ["ws:project:write", "ws:a", "billing:invoice-line:read_all", "ws:v2:x"] {
            assert_eq!(PermissionCode::parse(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn rejects_malformed_codes() {
        assert_eq!(PermissionCode::parse(""), Err(PermissionCodeError::Empty));
        assert!(matches!(
            PermissionCode::parse("admin"),
            Err(PermissionCodeError::MissingScope(_))
        ));
        for raw in ["ws::write", "ws:Project:write", "ws:project:", ":ws", "ws:pro ject"] {
            assert!(
                matches!(PermissionCode::parse(raw), Err(PermissionCodeError::InvalidSegment(_))),
                "{raw} should be rejected"
            );
        }
        let long = format!("ws:{}", "a".repeat(MAX_CODE_LEN));
        assert_eq!(PermissionCode::parse(&long), Err(PermissionCodeError::TooLong));
    }

    #[test]
    fn builtin_catalog_codes_are_valid() {
        for (code, description) in BUILTIN_CATALOG {
            assert!(PermissionCode::parse(code).is_ok(), "{code}");
            assert!(!description.is_empty());
        }
    }

    #[test]
    fn deserialize_validates() {
        let ok: PermissionCode = serde_json::from_str("\"ws:project:read\"").unwrap();
        assert_eq!(ok.as_str(), "ws:project:read");
        assert!(serde_json::from_str::<PermissionCode>("\"nope\"").is_err());
    }

    #[test]
    fn entry_serializes_with_permission_code_key() {
        let entry = PermissionEntry {
            permission_code: "ws:project:read".to_string(),
            description: "View projects".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            serde_json::json!({"permissionCode": "ws:project:read", "description": "View projects"})
        );
    }
}
