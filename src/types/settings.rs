use serde::{Deserialize, Serialize};

/// User-facing configuration of the bookmark lists screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListSettings {
    pub naming: NamingSettings,
    pub export: ExportSettings,
    #[serde(default)]
    pub notifications_prompt_dismissed: bool,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            naming: NamingSettings::default(),
            export: ExportSettings::default(),
            notifications_prompt_dismissed: false,
        }
    }
}

/// Bounds for category names, counted in characters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamingSettings {
    pub min_category_name_length: usize,
    pub max_category_name_length: usize,
    #[serde(default = "default_category_name")]
    pub default_category_name: String,
}

fn default_category_name() -> String {
    "My Places".to_string()
}

impl Default for NamingSettings {
    fn default() -> Self {
        Self {
            min_category_name_length: 1,
            max_category_name_length: 60,
            default_category_name: default_category_name(),
        }
    }
}

/// Where exported category files are written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExportSettings {
    /// Overrides the platform cache directory when set.
    pub directory: Option<String>,
}
