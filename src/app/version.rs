// ABOUTME: Defines Version - the opaque token an embedded application reports
// ABOUTME: for its deployed build. Either text or a JSON number.

use serde::{Deserialize, Serialize};

/// Deployed version reported by an embedded application.
///
/// Equality is the only operation that matters: two records are on the
/// same deployment when their versions compare equal. Text and numeric
/// versions never compare equal, so `"2"` and `2` are different versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Version {
    /// A numeric version such as `3` or `1.5`.
    Number(serde_json::Number),
    /// A textual version such as `"2024-10-01t1"`.
    Text(String),
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Version::Number(n) => write!(f, "{}", n),
            Version::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Version::Text(s.to_string())
    }
}

impl From<String> for Version {
    fn from(s: String) -> Self {
        Version::Text(s)
    }
}

impl From<u64> for Version {
    fn from(n: u64) -> Self {
        Version::Number(n.into())
    }
}

impl From<i64> for Version {
    fn from(n: i64) -> Self {
        Version::Number(n.into())
    }
}
