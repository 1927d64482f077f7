use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Remote model tier. `Pro` is gated on the user having credits left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    #[default]
    Fast,
    Pro,
}

impl ModelType {
    pub const ALL: [ModelType; 2] = [ModelType::Fast, ModelType::Pro];

    /// Identifier sent to the Gemini API.
    pub fn api_id(self) -> &'static str {
        match self {
            ModelType::Fast => "gemini-2.5-flash",
            ModelType::Pro => "gemini-3-pro-preview",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelType::Fast => "fast",
            ModelType::Pro => "pro",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ModelType::Fast => "Fast",
            ModelType::Pro => "Pro",
        }
    }

    pub fn requires_credits(self) -> bool {
        self == ModelType::Pro
    }

    pub fn toggled(self) -> Self {
        match self {
            ModelType::Fast => ModelType::Pro,
            ModelType::Pro => ModelType::Fast,
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ModelType::ALL
            .into_iter()
            .find(|model| model.as_str() == lower || model.api_id() == lower)
            .ok_or_else(|| format!("unknown model '{s}' (expected 'fast' or 'pro')"))
    }
}
