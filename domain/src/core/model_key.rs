//! Model key value object selecting the upstream model route

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Upstream model selector (Value Object)
///
/// The backend routes each chat request to a model endpoint by key. The
/// streaming core never interprets the key; it is forwarded verbatim and
/// stamped on the assistant message as its model tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelKey {
    QwenPublic,
    QwenInternal,
    Deepseek,
    Custom(String),
}

impl ModelKey {
    /// Get the wire identifier for this key
    pub fn as_str(&self) -> &str {
        match self {
            ModelKey::QwenPublic => "qwen-public",
            ModelKey::QwenInternal => "qwen-internal",
            ModelKey::Deepseek => "deepseek",
            ModelKey::Custom(s) => s,
        }
    }

    /// Keys the backend router knows about
    pub fn known() -> Vec<ModelKey> {
        vec![ModelKey::QwenPublic, ModelKey::QwenInternal, ModelKey::Deepseek]
    }
}

impl Default for ModelKey {
    /// The backend falls back to the public Qwen route
    fn default() -> Self {
        ModelKey::QwenPublic
    }
}

impl std::fmt::Display for ModelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ModelKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "qwen-public" => ModelKey::QwenPublic,
            "qwen-internal" => ModelKey::QwenInternal,
            "deepseek" => ModelKey::Deepseek,
            other => ModelKey::Custom(other.to_string()),
        })
    }
}

impl Serialize for ModelKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ModelKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let Ok(key) = s.parse::<ModelKey>();
        Ok(key)
    }
}
