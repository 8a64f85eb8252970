use serde::{Deserialize, Serialize};

/// A row from the `profiles` resource. Read-only in this client; used to
/// greet the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
}
