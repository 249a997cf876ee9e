use mailcraft_compiler_html::CompileOptions;
use mailcraft_document::{BlockRegistry, BrandColors, Document, DocumentSettings, IdGenerator};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const DEFAULT_CONFIG_NAME: &str = "mailcraft.config.json";

/// Mailcraft configuration file format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Colors applied to newly created blocks
    #[serde(default)]
    pub brand: BrandColors,

    /// Settings for new documents
    #[serde(default)]
    pub document: DocumentSettings,

    #[serde(default)]
    pub render: RenderConfig,

    /// Seed for node IDs; random when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_seed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub pretty: bool,
    pub indent: String,
    pub title: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let options = CompileOptions::default();
        Self {
            pretty: options.pretty,
            indent: options.indent,
            title: options.title,
        }
    }
}

impl EditorConfig {
    /// Load config from a directory
    pub fn load(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config = Self::from_json(&content)?;
            debug!(path = %config_path.display(), "Loaded config");
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(EditorConfig::default())
        }
    }

    pub fn from_json(source: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Block factory seeded and branded from this config
    pub fn registry(&self) -> BlockRegistry {
        let ids = match &self.id_seed {
            Some(seed) => IdGenerator::from_seed(seed),
            None => IdGenerator::random(),
        };
        BlockRegistry::new(ids).with_brand(self.brand.clone())
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            pretty: self.render.pretty,
            indent: self.render.indent.clone(),
            title: self.render.title.clone(),
            preheader: None,
        }
    }

    /// Empty document using the configured settings
    pub fn new_document(&self) -> Document {
        Document::with_settings(self.document.clone())
    }
}
