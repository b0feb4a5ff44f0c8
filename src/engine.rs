//! Core linter engine

use crate::config::{Config, ConfigError, PerFileIgnores};
use crate::diagnostic::{Diagnostic, Location, Severity};
use crate::plugin::{Document, ParseError, Plugin};
use crate::plugins::jsx::JsxPlugin;
use crate::rule::{Report, Rule, RULE_IDS};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-rule timing statistics
#[derive(Debug, Clone, Default)]
pub struct RuleTiming {
    /// Rule ID
    pub rule_id: String,
    /// Total time spent on this rule
    pub total_time: Duration,
    /// Number of elements the rule checked
    pub evaluation_count: usize,
    /// Number of findings
    pub match_count: usize,
}

impl RuleTiming {
    pub fn new(rule_id: &str) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            ..Default::default()
        }
    }

    /// Average time per evaluation
    pub fn avg_time(&self) -> Duration {
        if self.evaluation_count > 0 {
            self.total_time / self.evaluation_count as u32
        } else {
            Duration::ZERO
        }
    }
}

/// Result of linting operation
#[derive(Debug, Default)]
pub struct LintResult {
    /// All diagnostics
    pub diagnostics: Vec<Diagnostic>,

    /// Files processed
    pub files_processed: usize,

    /// Files with errors
    pub files_with_errors: usize,

    /// Files with warnings
    pub files_with_warnings: usize,

    /// Total errors
    pub error_count: usize,

    /// Total warnings
    pub warning_count: usize,

    /// Total info messages
    pub info_count: usize,

    /// Processing duration
    pub duration: Duration,

    /// Per-rule timing statistics (rule_id -> timing)
    pub rule_timings: HashMap<String, RuleTiming>,
}

impl LintResult {
    /// Result for a single file from its diagnostics
    fn for_file(diagnostics: Vec<Diagnostic>) -> Self {
        let mut result = LintResult {
            files_processed: 1,
            ..LintResult::default()
        };

        for diag in &diagnostics {
            match diag.severity {
                Severity::Error => result.error_count += 1,
                Severity::Warning => result.warning_count += 1,
                Severity::Info => result.info_count += 1,
            }
        }
        if result.error_count > 0 {
            result.files_with_errors = 1;
        }
        if result.warning_count > 0 {
            result.files_with_warnings = 1;
        }

        result.diagnostics = diagnostics;
        result
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }

    /// Check if result is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        self.error_count == 0 && self.warning_count == 0
    }

    /// Get exit code (0 = success, 1 = warnings, 2 = errors)
    pub fn exit_code(&self) -> i32 {
        if self.error_count > 0 {
            2
        } else if self.warning_count > 0 {
            1
        } else {
            0
        }
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: LintResult) {
        self.diagnostics.extend(other.diagnostics);
        self.files_processed += other.files_processed;
        self.files_with_errors += other.files_with_errors;
        self.files_with_warnings += other.files_with_warnings;
        self.error_count += other.error_count;
        self.warning_count += other.warning_count;
        self.info_count += other.info_count;

        for (rule_id, timing) in other.rule_timings {
            let entry = self
                .rule_timings
                .entry(rule_id)
                .or_insert_with(|| RuleTiming::new(&timing.rule_id));
            entry.total_time += timing.total_time;
            entry.evaluation_count += timing.evaluation_count;
            entry.match_count += timing.match_count;
        }
    }

    /// Drop diagnostics below a severity, keeping counts consistent
    pub fn retain_min_severity(&mut self, min: Severity) {
        self.diagnostics.retain(|d| d.severity >= min);
        self.error_count = self.diagnostics.iter().filter(|d| d.is_error()).count();
        self.warning_count = self.diagnostics.iter().filter(|d| d.is_warning()).count();
        self.info_count = self
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Info)
            .count();
    }

    /// Get rule timings sorted by total time (descending)
    pub fn sorted_timings(&self) -> Vec<&RuleTiming> {
        let mut timings: Vec<_> = self.rule_timings.values().collect();
        timings.sort_by(|a, b| b.total_time.cmp(&a.total_time));
        timings
    }

    /// Format timing statistics as a string
    pub fn format_timings(&self) -> String {
        let timings = self.sorted_timings();
        if timings.is_empty() {
            return "No timing data available".to_string();
        }

        let mut output = String::new();
        output.push_str("Rule Timing Statistics:\n");
        output.push_str(&format!(
            "{:<36} {:>12} {:>12} {:>10} {:>10}\n",
            "Rule ID", "Total", "Avg", "Elements", "Findings"
        ));
        output.push_str(&"-".repeat(84));
        output.push('\n');

        for timing in timings {
            let total_ms = timing.total_time.as_secs_f64() * 1000.0;
            let avg_us = timing.avg_time().as_secs_f64() * 1_000_000.0;
            output.push_str(&format!(
                "{:<36} {:>10.2}ms {:>10.2}µs {:>10} {:>10}\n",
                timing.rule_id, total_ms, avg_us, timing.evaluation_count, timing.match_count
            ));
        }

        output
    }
}

/// The main linter engine
pub struct Engine {
    config: Config,

    /// Enabled rules, configured once and shared by every file
    rules: Vec<Rule>,

    /// Compiled `per_file` rule ignores
    per_file: PerFileIgnores,

    /// Registered plugins (keyed by extension)
    plugins: HashMap<String, Arc<dyn Plugin>>,
}

impl Engine {
    /// Create an engine, building every enabled rule from the configuration
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rules = Vec::new();
        for id in RULE_IDS {
            if !config.is_rule_enabled(id) {
                log::debug!("rule {} is disabled", id);
                continue;
            }
            let Some(rule) = Rule::builtin(id, &config.rule_options(id)) else {
                continue;
            };
            let mut rule = rule?;
            if let Some(severity) = config.get_severity_override(id) {
                rule = rule.with_severity(severity);
            }
            log::debug!("rule {} enabled at {}", id, rule.severity);
            rules.push(rule);
        }

        let per_file = config.rules.per_file_ignores()?;
        let mut engine = Self {
            config,
            rules,
            per_file,
            plugins: HashMap::new(),
        };
        engine.register_plugin(Arc::new(JsxPlugin::new()));
        Ok(engine)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Enabled rules
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Register a plugin
    pub fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) {
        for ext in plugin.extensions() {
            self.plugins.insert(ext.to_string(), Arc::clone(&plugin));
        }
    }

    /// Whether some plugin handles this file
    pub fn supports(&self, path: &Path) -> bool {
        self.get_plugin(path).is_some()
    }

    fn get_plugin(&self, path: &Path) -> Option<Arc<dyn Plugin>> {
        let ext = path.extension()?.to_str()?;
        self.plugins.get(ext).cloned()
    }

    /// Lint multiple files; diagnostics keep the order of `files`
    pub fn lint(&self, files: &[PathBuf]) -> LintResult {
        let start = Instant::now();

        let results: Vec<LintResult> = match self.thread_pool() {
            Some(pool) => pool.install(|| files.par_iter().map(|f| self.lint_file(f)).collect()),
            None => files.iter().map(|f| self.lint_file(f)).collect(),
        };

        let mut combined = LintResult::default();
        for result in results {
            combined.merge(result);
        }

        combined.duration = start.elapsed();
        combined
    }

    fn thread_pool(&self) -> Option<rayon::ThreadPool> {
        if !self.config.engine.is_parallel() {
            return None;
        }
        let threads = if self.config.engine.jobs > 0 {
            self.config.engine.jobs
        } else {
            num_cpus::get()
        };
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::warn!("failed to start thread pool, linting sequentially: {}", e);
                None
            }
        }
    }

    /// Lint a single file
    pub fn lint_file(&self, path: &Path) -> LintResult {
        if !self.supports(path) {
            log::warn!("skipping {}: unsupported file type", path.display());
            return LintResult {
                files_processed: 1,
                ..LintResult::default()
            };
        }

        log::debug!("linting {}", path.display());
        match std::fs::read_to_string(path) {
            Ok(content) => self.lint_source(&content, path),
            Err(e) => LintResult::for_file(vec![Diagnostic::new(
                "file-read-error",
                Severity::Error,
                &format!("Failed to read file: {}", e),
                Location::new(path.to_path_buf(), 0, 0),
            )]),
        }
    }

    /// Lint source text as if read from `path` (the extension picks the plugin)
    pub fn lint_source(&self, content: &str, path: &Path) -> LintResult {
        let Some(plugin) = self.get_plugin(path) else {
            return LintResult {
                files_processed: 1,
                ..LintResult::default()
            };
        };

        let document = match plugin.parse(content, path) {
            Ok(d) => d,
            Err(e) => {
                let location = match &e {
                    ParseError::Syntax { line, column, .. } => {
                        Location::new(path.to_path_buf(), *line, *column)
                    }
                    ParseError::Io(_) => Location::new(path.to_path_buf(), 0, 0),
                };
                return LintResult::for_file(vec![Diagnostic::new(
                    "parse-error",
                    Severity::Error,
                    &format!("Parse error: {}", e),
                    location,
                )]);
            }
        };

        let (diagnostics, timings) = self.evaluate_rules(document.as_ref(), path);
        let mut result = LintResult::for_file(diagnostics);
        result.rule_timings = timings;
        result
    }

    /// Run every applicable rule over every element of a document
    fn evaluate_rules(
        &self,
        document: &dyn Document,
        file_path: &Path,
    ) -> (Vec<Diagnostic>, HashMap<String, RuleTiming>) {
        let mut diagnostics = Vec::new();
        let mut timings: HashMap<String, RuleTiming> = HashMap::new();

        let rules: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|rule| !self.per_file.is_ignored(&rule.id, file_path))
            .collect();

        for element in document.elements() {
            for rule in &rules {
                let start = Instant::now();
                let mut reports: Vec<Report> = Vec::new();
                rule.check(element, &mut reports);

                let timing = timings
                    .entry(rule.id.clone())
                    .or_insert_with(|| RuleTiming::new(&rule.id));
                timing.total_time += start.elapsed();
                timing.evaluation_count += 1;

                for report in &reports {
                    let diag = Diagnostic::from_report(rule, report, document);
                    if document.is_rule_disabled(&rule.id, diag.location.line) {
                        continue;
                    }
                    timing.match_count += 1;
                    diagnostics.push(diag);
                }
            }
        }

        // Elements come in document order; interleave rules by position
        diagnostics.sort_by_key(|d| (d.location.line, d.location.column));
        (diagnostics, timings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{STRING_LITERALS, TEMPLATE_LITERALS};
    use std::io::Write;
    use tempfile::TempDir;

    fn engine() -> Engine {
        Engine::new(Config::default()).unwrap()
    }

    #[test]
    fn test_engine_builds_all_rules() {
        let ids: Vec<_> = engine().rules().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![STRING_LITERALS, TEMPLATE_LITERALS]);
    }

    #[test]
    fn test_disabled_rule_is_not_built() {
        let mut config = Config::default();
        config.rules.disabled.push(TEMPLATE_LITERALS.to_string());
        let engine = Engine::new(config).unwrap();
        assert_eq!(engine.rules().len(), 1);
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let config: Config = serde_yaml::from_str(
            "rules:\n  options:\n    no-attribute-string-literals:\n      ignores:\n        valuePatterns: ['(']\n",
        )
        .unwrap();
        assert!(matches!(Engine::new(config), Err(ConfigError::Options(_))));
    }

    #[test]
    fn test_invalid_per_file_glob_is_config_error() {
        let mut config = Config::default();
        config
            .rules
            .per_file
            .insert("src/{a,b".to_string(), vec![STRING_LITERALS.to_string()]);
        assert!(matches!(Engine::new(config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_per_file_ignores_skip_rule() {
        let mut config = Config::default();
        config
            .rules
            .per_file
            .insert("**/*.stories.jsx".to_string(), vec![STRING_LITERALS.to_string()]);
        let engine = Engine::new(config).unwrap();
        let source = "<A title=\"x\" b={`y ${z}`} />";

        let stories = engine.lint_source(source, Path::new("src/A.stories.jsx"));
        let ids: Vec<_> = stories.diagnostics.iter().map(|d| d.rule_id.as_str()).collect();
        assert_eq!(ids, vec![TEMPLATE_LITERALS]);

        let plain = engine.lint_source(source, Path::new("src/A.jsx"));
        assert_eq!(plain.diagnostics.len(), 2);
    }

    #[test]
    fn test_regex_after_if_head_is_not_a_parse_error() {
        let source = "if (ok) /'/.test(s);\n<Button title=\"Hi\" />;\n";
        let result = engine().lint_source(source, Path::new("a.jsx"));
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].rule_id, STRING_LITERALS);
        assert_eq!(result.diagnostics[0].location.line, 2);
    }

    #[test]
    fn test_lint_source_locations() {
        let result = engine().lint_source(
            "const a = 1;\nconst b = <Button title=\"hello\" />;\n",
            Path::new("App.jsx"),
        );
        assert_eq!(result.warning_count, 1);
        assert_eq!(result.exit_code(), 1);

        let diag = &result.diagnostics[0];
        assert_eq!(diag.location.line, 2);
        assert_eq!(diag.location.column, 25);
        assert_eq!(diag.location.length, 7);
        assert_eq!(diag.source_line.as_deref(), Some("const b = <Button title=\"hello\" />;"));
    }

    #[test]
    fn test_severity_override() {
        let mut config = Config::default();
        config
            .rules
            .severity
            .insert(STRING_LITERALS.to_string(), Severity::Error);
        let result = Engine::new(config)
            .unwrap()
            .lint_source("<A title=\"x\" />", Path::new("a.tsx"));
        assert_eq!(result.error_count, 1);
        assert_eq!(result.exit_code(), 2);
    }

    #[test]
    fn test_parse_error_diagnostic() {
        let result = engine().lint_source("const s = \"open\n", Path::new("a.jsx"));
        assert_eq!(result.error_count, 1);
        assert_eq!(result.diagnostics[0].rule_id, "parse-error");
        assert_eq!(result.diagnostics[0].location.line, 1);
    }

    #[test]
    fn test_inline_disable() {
        let source = "// attrlint-disable-next-line no-attribute-string-literals\n<A title=\"x\" />;\n<B title=\"y\" />;\n";
        let result = engine().lint_source(source, Path::new("a.jsx"));
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].location.line, 3);
    }

    #[test]
    fn test_diagnostics_interleave_rules_by_position() {
        let source = "<A a={`x ${y}`} b=\"z\" />";
        let result = engine().lint_source(source, Path::new("a.jsx"));
        let ids: Vec<_> = result.diagnostics.iter().map(|d| d.rule_id.as_str()).collect();
        assert_eq!(ids, vec![TEMPLATE_LITERALS, STRING_LITERALS]);
    }

    #[test]
    fn test_lint_files_in_order() {
        let dir = TempDir::new().unwrap();
        let mut files = Vec::new();
        for (name, content) in [
            ("a.jsx", "<A title=\"one\" />"),
            ("b.jsx", "<B />"),
            ("c.tsx", "<C title=\"three\" />"),
        ] {
            let path = dir.path().join(name);
            std::fs::File::create(&path)
                .unwrap()
                .write_all(content.as_bytes())
                .unwrap();
            files.push(path);
        }
        files.push(dir.path().join("missing.jsx"));

        let result = engine().lint(&files);
        assert_eq!(result.files_processed, 4);
        assert_eq!(result.warning_count, 2);
        assert_eq!(result.error_count, 1);
        assert_eq!(result.files_with_warnings, 2);

        let rules: Vec<_> = result.diagnostics.iter().map(|d| d.rule_id.as_str()).collect();
        assert_eq!(rules, vec![STRING_LITERALS, STRING_LITERALS, "file-read-error"]);
        assert!(result.diagnostics[1].message.contains("three"));
        assert_eq!(result.rule_timings[STRING_LITERALS].match_count, 2);
    }

    #[test]
    fn test_retain_min_severity() {
        let mut config = Config::default();
        config
            .rules
            .severity
            .insert(TEMPLATE_LITERALS.to_string(), Severity::Error);
        let mut result = Engine::new(config)
            .unwrap()
            .lint_source("<A a={`x ${y}`} b=\"z\" />", Path::new("a.jsx"));
        result.retain_min_severity(Severity::Error);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.warning_count, 0);
        assert_eq!(result.exit_code(), 2);
    }

    #[test]
    fn test_exit_codes() {
        let mut result = LintResult::default();
        assert_eq!(result.exit_code(), 0);
        assert!(result.is_clean());
        result.warning_count = 1;
        assert_eq!(result.exit_code(), 1);
        result.error_count = 1;
        assert_eq!(result.exit_code(), 2);
        assert!(result.has_errors() && result.has_warnings());
    }
}
