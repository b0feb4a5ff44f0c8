//! Configuration system
//!
//! Reads configuration from:
//! - `.attrlintrc.yaml` / `.attrlintrc.json` (project-level)
//! - `~/.attrlintrc.yaml` (user-level)
//!
//! ```yaml
//! extends: [strict]
//! rules:
//!   disabled: [no-attribute-template-literals]
//!   options:
//!     no-attribute-string-literals:
//!       ignores:
//!         - attributes: [variant]
//! ```

use crate::diagnostic::Severity;
use crate::options::{OptionsError, RuleOptions};
use crate::rule::{RULE_IDS, STRING_LITERALS, TEMPLATE_LITERALS};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file names, in lookup order
pub const CONFIG_NAMES: &[&str] = &[
    ".attrlintrc.yaml",
    ".attrlintrc.yml",
    ".attrlintrc.json",
    "attrlint.yaml",
    "attrlint.yml",
    "attrlint.json",
];

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid rule options: {0}")]
    Options(#[from] OptionsError),
}

/// Engine settings
///
/// Unset fields fall through to the configuration being extended.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Enable parallel processing (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,

    /// Number of parallel jobs (0 = auto-detect)
    pub jobs: usize,
}

impl EngineConfig {
    pub fn is_parallel(&self) -> bool {
        self.parallel.unwrap_or(true)
    }
}

/// Output settings
///
/// Unset fields fall through to the configuration being extended.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Output format (default: text)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,

    /// Color mode (default: auto)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorMode>,

    /// Verbose output (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    /// Show statistics (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<bool>,
}

impl OutputConfig {
    pub fn output_format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.unwrap_or_default()
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }

    pub fn show_statistics(&self) -> bool {
        self.statistics.unwrap_or(true)
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Compact,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "compact" => Ok(OutputFormat::Compact),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Color mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// File handling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilesConfig {
    /// Include patterns
    pub include: Vec<String>,

    /// Exclude patterns
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            include: vec!["**/*.jsx".to_string(), "**/*.tsx".to_string()],
            exclude: vec![
                "**/node_modules/**".to_string(),
                "**/dist/**".to_string(),
                "**/build/**".to_string(),
            ],
        }
    }
}

/// Compiled include/exclude globs
#[derive(Debug, Clone)]
pub struct FileFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl FileFilter {
    /// Whether a file found while walking a directory should be linted
    pub fn accepts(&self, path: &Path) -> bool {
        self.include.is_match(path) && !self.exclude.is_match(path)
    }

    /// Whether a path is excluded (explicitly named files only check this)
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.is_match(path)
    }
}

impl FilesConfig {
    pub fn filter(&self) -> Result<FileFilter, ConfigError> {
        Ok(FileFilter {
            include: build_globset(&self.include)?,
            exclude: build_globset(&self.exclude)?,
        })
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| ConfigError::Invalid(format!("Invalid glob '{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| ConfigError::Invalid(e.to_string()))
}

/// Rule configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    /// Disabled rules
    pub disabled: Vec<String>,

    /// Enabled rules (empty = all)
    pub enabled: Vec<String>,

    /// Severity overrides (rule_id -> severity)
    pub severity: HashMap<String, Severity>,

    /// Filter options (rule_id -> options)
    pub options: HashMap<String, RuleOptions>,

    /// Per-file rule ignores (glob pattern -> rule IDs)
    pub per_file: HashMap<String, Vec<String>>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Extend from other configuration files or presets
    pub extends: Vec<String>,

    /// Engine settings
    pub engine: EngineConfig,

    /// Output settings
    pub output: OutputConfig,

    /// File handling settings
    pub files: FilesConfig,

    /// Rule configuration
    pub rules: RulesConfig,
}

impl Config {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a preset configuration by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "recommended" => Some(Self::default()),
            "strict" => Some(Self::preset_strict()),
            _ => None,
        }
    }

    /// Strict preset - every finding is an error
    fn preset_strict() -> Self {
        let mut config = Self::default();
        for id in [STRING_LITERALS, TEMPLATE_LITERALS] {
            config.rules.severity.insert(id.to_string(), Severity::Error);
        }
        config
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_depth(path, 0)
    }

    /// Load with recursion depth limit (to prevent infinite loops)
    fn load_with_depth(path: &Path, depth: usize) -> Result<Self, ConfigError> {
        const MAX_DEPTH: usize = 10;
        if depth >= MAX_DEPTH {
            return Err(ConfigError::Invalid(
                "Maximum config inheritance depth exceeded".to_string(),
            ));
        }

        log::debug!("loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let mut config: Self = match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown config file format: {}",
                    ext
                )))
            }
        };

        if !config.extends.is_empty() {
            let base_dir = path.parent().unwrap_or(Path::new("."));
            let mut base_config = Self::default();

            for extend in &config.extends.clone() {
                let extended = if let Some(preset) = Self::preset(extend) {
                    log::debug!("extending preset '{}'", extend);
                    preset
                } else {
                    let extend_path = if Path::new(extend).is_absolute() {
                        PathBuf::from(extend)
                    } else {
                        base_dir.join(extend)
                    };
                    Self::load_with_depth(&extend_path, depth + 1)?
                };
                base_config.merge(extended);
            }

            base_config.merge(config);
            config = base_config;
        }

        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Self) {
        // Engine settings
        if other.engine.jobs != 0 {
            self.engine.jobs = other.engine.jobs;
        }
        if other.engine.parallel.is_some() {
            self.engine.parallel = other.engine.parallel;
        }

        // Output settings (only what the other config sets)
        if other.output.format.is_some() {
            self.output.format = other.output.format;
        }
        if other.output.verbose.is_some() {
            self.output.verbose = other.output.verbose;
        }
        if other.output.color.is_some() {
            self.output.color = other.output.color;
        }
        if other.output.statistics.is_some() {
            self.output.statistics = other.output.statistics;
        }

        // Files - extend lists
        extend_unique(&mut self.files.include, other.files.include);
        extend_unique(&mut self.files.exclude, other.files.exclude);

        // Rules
        extend_unique(&mut self.rules.disabled, other.rules.disabled);
        if !other.rules.enabled.is_empty() {
            self.rules.enabled = other.rules.enabled;
        }
        self.rules.severity.extend(other.rules.severity);
        // Options replace per rule
        self.rules.options.extend(other.rules.options);
        for (pattern, rules) in other.rules.per_file {
            self.rules.per_file.entry(pattern).or_default().extend(rules);
        }
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<Self, ConfigError> {
        // Check current directory
        for name in CONFIG_NAMES {
            let path = PathBuf::from(name);
            if path.exists() {
                return Self::load(&path);
            }
        }

        // Check home directory
        if let Some(home) = dirs::home_dir() {
            for name in CONFIG_NAMES {
                let path = home.join(name);
                if path.exists() {
                    return Self::load(&path);
                }
            }
        }

        log::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Merge CLI arguments into configuration
    pub fn merge_cli(
        &mut self,
        format: Option<OutputFormat>,
        verbose: Option<bool>,
        jobs: Option<usize>,
        disabled_rules: Option<Vec<String>>,
        statistics: Option<bool>,
    ) {
        if format.is_some() {
            self.output.format = format;
        }
        if verbose.is_some() {
            self.output.verbose = verbose;
        }
        if let Some(j) = jobs {
            self.engine.jobs = j;
        }
        if let Some(disabled) = disabled_rules {
            extend_unique(&mut self.rules.disabled, disabled);
        }
        if statistics.is_some() {
            self.output.statistics = statistics;
        }
    }

    /// Reject references to rules that do not exist and malformed per-file globs
    pub fn validate(&self) -> Result<(), ConfigError> {
        let referenced = self
            .rules
            .options
            .keys()
            .chain(self.rules.severity.keys())
            .chain(self.rules.enabled.iter());

        for id in referenced {
            if !RULE_IDS.contains(&id.as_str()) {
                return Err(ConfigError::Invalid(format!("Unknown rule: {}", id)));
            }
        }

        for (pattern, ids) in &self.rules.per_file {
            if let Some(id) = ids.iter().find(|id| *id != "all" && !RULE_IDS.contains(&id.as_str())) {
                return Err(ConfigError::Invalid(format!(
                    "Unknown rule in per_file '{}': {}",
                    pattern, id
                )));
            }
        }
        self.rules.per_file_ignores()?;
        Ok(())
    }

    /// Check if a rule is enabled
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        if self.rules.disabled.iter().any(|id| id == rule_id) {
            return false;
        }

        if !self.rules.enabled.is_empty() {
            return self.rules.enabled.iter().any(|id| id == rule_id);
        }

        true
    }

    /// Get severity override for a rule
    pub fn get_severity_override(&self, rule_id: &str) -> Option<Severity> {
        self.rules.severity.get(rule_id).copied()
    }

    /// Filter options for a rule (defaults when none are configured)
    pub fn rule_options(&self, rule_id: &str) -> RuleOptions {
        self.rules.options.get(rule_id).cloned().unwrap_or_default()
    }

}

impl RulesConfig {
    /// Compile the `per_file` globs
    pub fn per_file_ignores(&self) -> Result<PerFileIgnores, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        let mut rules = Vec::with_capacity(self.per_file.len());
        for (pattern, ids) in &self.per_file {
            let glob = Glob::new(pattern).map_err(|e| {
                ConfigError::Invalid(format!("Invalid per_file glob '{}': {}", pattern, e))
            })?;
            builder.add(glob);
            rules.push(ids.clone());
        }
        let set = builder
            .build()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(PerFileIgnores { set, rules })
    }
}

/// Compiled `per_file` rule ignores
#[derive(Debug, Clone, Default)]
pub struct PerFileIgnores {
    set: GlobSet,
    /// Rule ids per glob, indexed like the glob set
    rules: Vec<Vec<String>>,
}

impl PerFileIgnores {
    /// Check if a rule should be ignored for a file
    pub fn is_ignored(&self, rule_id: &str, file_path: &Path) -> bool {
        self.set
            .matches(file_path)
            .into_iter()
            .any(|i| self.rules[i].iter().any(|id| id == "all" || id == rule_id))
    }
}

fn extend_unique(target: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{FilterOption, Mode};
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert!(config.engine.is_parallel());
        assert_eq!(config.engine.jobs, 0);
        assert_eq!(config.output.output_format(), OutputFormat::Text);
        assert_eq!(config.output.color_mode(), ColorMode::Auto);
        assert!(config.output.show_statistics());
        assert_eq!(config.files.include, vec!["**/*.jsx", "**/*.tsx"]);
        assert!(config.rules.options.is_empty());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("compact".parse::<OutputFormat>().unwrap(), OutputFormat::Compact);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_config_merge_cli() {
        let mut config = Config::new();
        config.merge_cli(
            Some(OutputFormat::Json),
            Some(true),
            Some(4),
            Some(vec![STRING_LITERALS.to_string()]),
            Some(false),
        );

        assert_eq!(config.output.output_format(), OutputFormat::Json);
        assert!(config.output.is_verbose());
        assert!(!config.output.show_statistics());
        assert_eq!(config.engine.jobs, 4);
        assert!(!config.is_rule_enabled(STRING_LITERALS));
    }

    #[test]
    fn test_rule_enabled() {
        let mut config = Config::new();
        assert!(config.is_rule_enabled(STRING_LITERALS));

        config.rules.disabled.push(STRING_LITERALS.to_string());
        assert!(!config.is_rule_enabled(STRING_LITERALS));
        assert!(config.is_rule_enabled(TEMPLATE_LITERALS));

        config.rules.disabled.clear();
        config.rules.enabled = vec![TEMPLATE_LITERALS.to_string()];
        assert!(!config.is_rule_enabled(STRING_LITERALS));
        assert!(config.is_rule_enabled(TEMPLATE_LITERALS));
    }

    #[test]
    fn test_yaml_deserialize() {
        let yaml = r#"
engine:
  parallel: false
  jobs: 4
output:
  format: compact
rules:
  severity:
    no-attribute-string-literals: error
  options:
    no-attribute-string-literals:
      mode: override
      only:
        components: [Button]
      ignores:
        - attributes: [as]
        - valuePatterns: ["^\\d+$"]
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.engine.is_parallel());
        assert_eq!(config.engine.jobs, 4);
        assert_eq!(config.output.output_format(), OutputFormat::Compact);
        assert_eq!(
            config.get_severity_override(STRING_LITERALS),
            Some(Severity::Error)
        );

        let options = config.rule_options(STRING_LITERALS);
        assert_eq!(options.mode(), Mode::Override);
        assert!(matches!(options.ignores, Some(FilterOption::Many(ref v)) if v.len() == 2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let yaml = r#"
rules:
  options:
    no-attribute-string-literals:
      ignores:
        attribute: [title]
"#;
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
        assert!(serde_yaml::from_str::<Config>("engine:\n  cache: true\n").is_err());
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let json = r#"{"rules": {"options": {"no-attribute-string-literals": {"mode": "replace"}}}}"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }

    #[test]
    fn test_validate_unknown_rule() {
        let mut config = Config::new();
        config
            .rules
            .options
            .insert("no-such-rule".to_string(), RuleOptions::default());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_presets() {
        let strict = Config::preset("strict").unwrap();
        assert_eq!(strict.get_severity_override(TEMPLATE_LITERALS), Some(Severity::Error));
        assert!(Config::preset("recommended").is_some());
        assert!(Config::preset("lenient").is_none());
    }

    #[test]
    fn test_load_with_extends() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "base.yaml",
            "rules:\n  disabled: [no-attribute-template-literals]\n",
        );
        let path = write(
            &dir,
            ".attrlintrc.yaml",
            "extends: [strict, base.yaml]\noutput:\n  format: json\n",
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.output.output_format(), OutputFormat::Json);
        assert_eq!(config.get_severity_override(STRING_LITERALS), Some(Severity::Error));
        assert!(!config.is_rule_enabled(TEMPLATE_LITERALS));
        assert_eq!(config.files.include.len(), 2);
    }

    #[test]
    fn test_load_json() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "attrlint.json",
            r#"{"rules": {"options": {"no-attribute-template-literals": {"ignores": {"attributes": ["title"]}}}}}"#,
        );
        let config = Config::load(&path).unwrap();
        assert!(config.rule_options(TEMPLATE_LITERALS).ignores.is_some());
    }

    #[test]
    fn test_extends_cycle_is_bounded() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "loop.yaml", "extends: [loop.yaml]\n");
        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.toml", "");
        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_file_filter() {
        let filter = FilesConfig::default().filter().unwrap();
        assert!(filter.accepts(Path::new("src/App.tsx")));
        assert!(!filter.accepts(Path::new("src/App.ts")));
        assert!(!filter.accepts(Path::new("node_modules/lib/Button.jsx")));
        assert!(filter.is_excluded(Path::new("app/dist/bundle.jsx")));
    }

    #[test]
    fn test_per_file_ignores() {
        let mut config = Config::new();
        config
            .rules
            .per_file
            .insert("**/*.test.tsx".to_string(), vec!["all".to_string()]);

        config.rules.per_file.insert(
            "legacy/**".to_string(),
            vec![TEMPLATE_LITERALS.to_string()],
        );
        let ignores = config.rules.per_file_ignores().unwrap();

        assert!(ignores.is_ignored(STRING_LITERALS, Path::new("src/App.test.tsx")));
        assert!(!ignores.is_ignored(STRING_LITERALS, Path::new("src/App.tsx")));
        assert!(ignores.is_ignored(TEMPLATE_LITERALS, Path::new("legacy/Old.jsx")));
        assert!(!ignores.is_ignored(STRING_LITERALS, Path::new("legacy/Old.jsx")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_per_file_glob_rejected() {
        let mut config = Config::new();
        config
            .rules
            .per_file
            .insert("src/[unclosed".to_string(), vec!["all".to_string()]);

        assert!(matches!(config.rules.per_file_ignores(), Err(ConfigError::Invalid(_))));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_per_file_unknown_rule_rejected() {
        let mut config = Config::new();
        config
            .rules
            .per_file
            .insert("**/*.test.tsx".to_string(), vec!["no-such-rule".to_string()]);

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no-such-rule"));
    }

    #[test]
    fn test_extends_keeps_unset_settings() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "base.yaml",
            "engine:\n  parallel: false\noutput:\n  format: json\n  color: never\n  statistics: false\n",
        );
        let path = write(
            &dir,
            ".attrlintrc.yaml",
            "extends: [base.yaml]\nrules:\n  disabled: [no-attribute-template-literals]\n",
        );

        let config = Config::load(&path).unwrap();
        assert!(!config.engine.is_parallel());
        assert_eq!(config.output.output_format(), OutputFormat::Json);
        assert_eq!(config.output.color_mode(), ColorMode::Never);
        assert!(!config.output.show_statistics());
        assert!(!config.is_rule_enabled(TEMPLATE_LITERALS));
    }

    #[test]
    fn test_extends_child_resets_setting() {
        let dir = TempDir::new().unwrap();
        write(&dir, "base.yaml", "engine:\n  parallel: false\noutput:\n  format: json\n");
        let path = write(
            &dir,
            ".attrlintrc.yaml",
            "extends: [base.yaml]\nengine:\n  parallel: true\noutput:\n  format: text\n",
        );

        let config = Config::load(&path).unwrap();
        assert!(config.engine.is_parallel());
        assert_eq!(config.output.output_format(), OutputFormat::Text);
    }
}
