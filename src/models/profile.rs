use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// The viewing profile currently selected within an account
///
/// Stored client-side in the `selectedProfile` cookie, independently of the
/// access credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMarker {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_kids: bool,
}

impl ProfileMarker {
    /// Cookie representation: base64url of the JSON record
    pub fn encode(&self) -> String {
        // Serializing a struct of strings and bools cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Reverses [`ProfileMarker::encode`]
    pub fn decode(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}
