use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// An opaque token identifying a caller.
///
/// The core never inspects the contents; identities are only compared for
/// equality (owner checks and duplicate-voter checks). Authenticating the
/// token happens upstream.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identity {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl From<String> for Identity {
    fn from(token: String) -> Self {
        Self(token)
    }
}
