use serde::{Deserialize, Serialize};

/// A language runtime the remote service can execute code in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runtime {
    /// Canonical language name, e.g. `python`.
    pub language: String,
    /// Installed version of the language.
    pub version: String,
    /// Alternative names accepted in place of `language`.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Backing runtime when it differs from the language, e.g. `deno` for typescript.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
}

impl Runtime {
    /// Whether `name` refers to this runtime, either by language or by alias.
    pub fn matches(&self, name: &str) -> bool {
        self.language == name || self.aliases.iter().any(|alias| alias == name)
    }
}
