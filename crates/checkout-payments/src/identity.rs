//! Caller identity

use serde::{Deserialize, Serialize};

/// Authenticated principal attached to a request.
///
/// Produced by the server's token verifier; the payments crate only consumes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub uid: String,

    #[serde(default)]
    pub email: Option<String>,
}

impl CallerIdentity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
        }
    }
}
