use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracetree_engine::{DefaultFormatter, Filter, HierarchyGenerator, PropertyTreeTransformer};

/// Resolve the configuration directory based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. TRACETREE_PATH environment variable (with tilde expansion)
/// 3. XDG config directory (recommended default)
/// 4. ~/.tracetree (fallback for systems without XDG)
pub fn resolve_config_dir(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("TRACETREE_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join("tracetree"));
    }

    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".tracetree"));
    }

    Err(Error::Config(
        "Could not determine config path: no home directory or XDG config directory found"
            .to_string(),
    ))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

/// View options for the hierarchy panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyOptions {
    pub only_visible: bool,
    pub simplify_names: bool,
    pub flatten: bool,
    pub filter: String,
    pub pinned_ids: Vec<String>,
    pub show_diff: bool,
}

impl Default for HierarchyOptions {
    fn default() -> Self {
        Self {
            only_visible: false,
            simplify_names: true,
            flatten: false,
            filter: String::new(),
            pinned_ids: Vec::new(),
            show_diff: true,
        }
    }
}

impl HierarchyOptions {
    pub fn compile_filter(&self) -> Result<Filter> {
        Ok(Filter::compile(&self.filter)?)
    }

    /// Apply the view toggles to a generator
    pub fn apply<'a>(&self, generator: HierarchyGenerator<'a>) -> HierarchyGenerator<'a> {
        generator
            .only_visible(self.only_visible)
            .simplify_names(self.simplify_names)
            .flatten(self.flatten)
            .with_pinned_ids(self.pinned_ids.iter().cloned())
    }
}

/// View options for the properties panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyOptions {
    pub show_defaults: bool,
    pub show_diff: bool,
    pub filter: String,
    /// Empty disables metadata hoisting
    pub metadata_key: String,
    pub skip: Vec<String>,
}

impl Default for PropertyOptions {
    fn default() -> Self {
        Self {
            show_defaults: false,
            show_diff: true,
            filter: String::new(),
            metadata_key: "metadata".to_string(),
            skip: Vec::new(),
        }
    }
}

impl PropertyOptions {
    pub fn compile_filter(&self) -> Result<Filter> {
        Ok(Filter::compile(&self.filter)?)
    }

    /// Apply the panel options and the default formatter to a transformer
    pub fn apply<'a>(&self, transformer: PropertyTreeTransformer<'a>) -> PropertyTreeTransformer<'a> {
        let transformer = transformer
            .show_defaults(self.show_defaults)
            .show_diff(self.show_diff)
            .skip(self.skip.iter().cloned())
            .formatter(DefaultFormatter);
        if self.metadata_key.is_empty() {
            transformer
        } else {
            transformer.metadata_key(self.metadata_key.as_str())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub hierarchy: HierarchyOptions,
    #[serde(default)]
    pub properties: PropertyOptions,
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::default_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(resolve_config_dir(None)?.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use tracetree_types::TreeNode;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.hierarchy.simplify_names);
        assert!(config.hierarchy.show_diff);
        assert!(!config.properties.show_defaults);
        assert_eq!(config.properties.metadata_key, "metadata");
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.hierarchy.only_visible = true;
        config.hierarchy.pinned_ids = vec!["42".to_string()];
        config.properties.skip = vec!["buffer".to_string()];

        config.save_to(&config_path)?;
        assert!(config_path.exists());

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded, config);

        Ok(())
    }

    #[test]
    fn test_partial_config_fills_defaults() -> Result<()> {
        let config = Config::parse("[hierarchy]\nfilter = \"Wallpaper,!Task\"\n")?;
        assert_eq!(config.hierarchy.filter, "Wallpaper,!Task");
        assert!(config.hierarchy.simplify_names);
        assert_eq!(config.properties, PropertyOptions::default());
        Ok(())
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::parse("[hierarchy\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_filter_is_engine_error() {
        let options = HierarchyOptions {
            filter: "(".to_string(),
            ..HierarchyOptions::default()
        };
        let err = options.compile_filter().unwrap_err();
        assert!(matches!(
            err,
            Error::Engine(tracetree_types::Error::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_load_nonexistent_returns_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path)?;
        assert_eq!(config, Config::default());

        Ok(())
    }

    #[test]
    fn test_explicit_config_dir() -> Result<()> {
        assert_eq!(
            resolve_config_dir(Some("/tmp/tracetree"))?,
            PathBuf::from("/tmp/tracetree")
        );
        Ok(())
    }

    #[test]
    fn test_property_options_apply() -> Result<()> {
        let value = json!({"z": 0, "metadata": {"source": "sf"}, "buffer": {"w": 1}});
        let options = PropertyOptions {
            skip: vec!["buffer".to_string()],
            ..PropertyOptions::default()
        };

        let tree = options
            .apply(PropertyTreeTransformer::new(&value, options.compile_filter()?))
            .transform()?;
        let names: Vec<_> = tree.children().iter().map(|child| child.name()).collect();
        assert_eq!(names, vec![r#"buffer: {"w":1}"#]);
        assert_eq!(tree.metadata(), Some(&json!({"source": "sf"})));
        Ok(())
    }
}
