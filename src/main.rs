//! attrlint CLI - flag hard-coded text in JSX attributes

use anyhow::{bail, Context, Result};
use attrlint::config::{ColorMode, Config, FileFilter, OutputFormat};
use attrlint::engine::Engine;
use attrlint::options::{Mode, RuleOptions};
use attrlint::output::{CompactFormatter, JsonFormatter, OutputFormatter, TextFormatter};
use attrlint::rule::{builtin_rules, Rule};
use attrlint::Severity;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use glob::glob;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "attrlint",
    version,
    about = "JSX attribute literal linter",
    long_about = "Flags hard-coded string and template literals passed to components \
                  through JSX attributes, so user-visible text goes through translation."
)]
struct Cli {
    /// Files, directories or glob patterns to lint (default: current directory)
    files: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format (default: from configuration, else text)
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Only print diagnostics, without the summary
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value = "0")]
    jobs: usize,

    /// Disable specific rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    disable: Option<Vec<String>>,

    /// Minimum severity to report
    #[arg(long, value_enum)]
    severity: Option<MinSeverity>,

    /// List all available rules
    #[arg(long)]
    list_rules: bool,

    /// Show per-rule timing statistics
    #[arg(long)]
    stats: bool,

    /// Exit with 0 even if there are findings
    #[arg(long)]
    exit_zero: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show detailed information about a rule
    Explain {
        /// Rule ID to explain
        rule_id: String,
    },
    /// Initialize a configuration file
    Init {
        /// Preset to start from (recommended, strict)
        #[arg(long, default_value = "recommended")]
        preset: String,

        /// Output format (yaml, json)
        #[arg(long, value_enum, default_value = "yaml")]
        output_format: InitFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Compact,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::Compact => OutputFormat::Compact,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum InitFormat {
    Yaml,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum MinSeverity {
    Info,
    Warning,
    Error,
}

impl From<MinSeverity> for Severity {
    fn from(min: MinSeverity) -> Self {
        match min {
            MinSeverity::Info => Severity::Info,
            MinSeverity::Warning => Severity::Warning,
            MinSeverity::Error => Severity::Error,
        }
    }
}

fn severity_label(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Error => "error".red(),
        Severity::Warning => "warning".yellow(),
        Severity::Info => "info".blue(),
    }
}

/// Print a rule summary line
fn print_rule(rule: &Rule, enabled: bool) {
    let marker = if enabled { "".normal() } else { " [disabled]".yellow() };
    println!(
        "    {} [{}]{}",
        rule.id.cyan(),
        severity_label(rule.severity),
        marker
    );
    println!("      {}", rule.description);
}

/// Print detailed rule explanation
fn explain_rule(rule: &Rule) {
    println!("{}", "Rule Details".bold());
    println!();
    println!("  {}: {}", "ID".bold(), rule.id.cyan());
    println!("  {}: {}", "Severity".bold(), severity_label(rule.severity));

    println!();
    println!("  {}", "Description".bold());
    println!("  {}", rule.description);

    println!();
    println!("  {}", "Rationale".bold());
    println!("  {}", rule.rationale);

    println!();
    println!("  {} {}", "Example".bold(), "(incorrect)".red());
    for line in rule.example_bad.lines() {
        println!("    {}", line);
    }

    println!();
    println!("  {} {}", "Example".bold(), "(correct)".green());
    for line in rule.example_good.lines() {
        println!("    {}", line);
    }

    println!();
    println!("  {}", "Default filters".bold());
    let defaults = serde_yaml::to_string(rule.defaults()).unwrap_or_default();
    for line in defaults.lines() {
        println!("    {}", line);
    }

    println!();
    println!("  {}", "Options".bold());
    println!("    only     attributes matching this filter are the only ones checked");
    println!("    ignores  attributes matching this filter are never reported");
    println!(
        "    mode     {} (combine with the defaults) or {} (replace them)",
        Mode::Extend.to_string().cyan(),
        Mode::Override.to_string().cyan()
    );
}

fn handle_list_rules(config: &Config) -> Result<()> {
    let rules = builtin_rules()?;
    println!("{}", "Available rules:".bold());
    println!();
    for rule in &rules {
        let rule = match config.get_severity_override(&rule.id) {
            Some(severity) => rule.clone().with_severity(severity),
            None => rule.clone(),
        };
        print_rule(&rule, config.is_rule_enabled(&rule.id));
    }
    println!();
    println!("{} rules", rules.len());
    Ok(())
}

fn handle_explain(rule_id: &str) -> Result<i32> {
    let rules = builtin_rules()?;
    match rules.iter().find(|r| r.id == rule_id) {
        Some(rule) => {
            explain_rule(rule);
            Ok(0)
        }
        None => {
            eprintln!("{}: Rule '{}' not found", "error".red().bold(), rule_id);
            eprintln!();
            eprintln!("Use {} to see all available rules", "--list-rules".cyan());
            Ok(1)
        }
    }
}

/// Starter configuration: the preset plus every rule's defaults spelled out
fn starter_config(preset: &str) -> Result<Config> {
    let Some(mut config) = Config::preset(preset) else {
        bail!("Unknown preset '{}'. Available: recommended, strict", preset);
    };
    for rule in builtin_rules()? {
        let defaults = rule.defaults();
        let options = RuleOptions {
            ignores: defaults.ignores.clone(),
            only: defaults.only.clone(),
            mode: Some(Mode::Override),
        };
        config.rules.options.insert(rule.id.clone(), options);
    }
    Ok(config)
}

fn handle_init(preset: &str, output_format: InitFormat) -> Result<i32> {
    let config = starter_config(preset)?;

    let filename = match output_format {
        InitFormat::Json => ".attrlintrc.json",
        InitFormat::Yaml => ".attrlintrc.yaml",
    };

    if Path::new(filename).exists() {
        eprintln!(
            "{}: {} already exists. Remove it first to reinitialize.",
            "error".red().bold(),
            filename
        );
        return Ok(1);
    }

    let content = match output_format {
        InitFormat::Json => serde_json::to_string_pretty(&config)?,
        InitFormat::Yaml => format!(
            "# attrlint configuration\n# Generated with: attrlint init --preset {}\n\n{}",
            preset,
            serde_yaml::to_string(&config)?
        ),
    };

    std::fs::write(filename, content).with_context(|| format!("Failed to write {}", filename))?;

    println!("{} Created {}", "success".green().bold(), filename);
    println!();
    println!("Next steps:");
    println!("  1. Review and customize the configuration");
    println!("  2. Run {} to lint your files", "attrlint src".cyan());
    Ok(0)
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_default().context("Failed to load config")?,
    };
    Ok(config)
}

/// Expand the command line into the list of files to lint
///
/// Directories are walked and filtered by the configured include and exclude
/// globs. Files named directly (or through a glob pattern) only need a plugin
/// that handles them and must not be excluded.
fn collect_files(patterns: &[String], filter: &FileFilter, engine: &Engine) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_dir() {
            let walk = if pattern == "." {
                "**/*".to_string()
            } else {
                format!("{}/**/*", pattern.trim_end_matches('/'))
            };
            let entries = glob(&walk).with_context(|| format!("Invalid directory '{}'", pattern))?;
            for entry in entries.flatten() {
                if entry.is_file() && filter.accepts(&entry) && seen.insert(entry.clone()) {
                    files.push(entry);
                }
            }
            continue;
        }

        let entries = glob(pattern).with_context(|| format!("Invalid pattern '{}'", pattern))?;
        for entry in entries.flatten() {
            if !entry.is_file() {
                continue;
            }
            if filter.is_excluded(&entry) || !engine.supports(&entry) {
                log::warn!("skipping {}", entry.display());
                continue;
            }
            if seen.insert(entry.clone()) {
                files.push(entry);
            }
        }
    }

    Ok(files)
}

fn run(cli: Cli) -> Result<i32> {
    if let Some(cmd) = &cli.command {
        return match cmd {
            Commands::Explain { rule_id } => handle_explain(rule_id),
            Commands::Init {
                preset,
                output_format,
            } => handle_init(preset, *output_format),
        };
    }

    let mut config = load_config(&cli)?;
    config.merge_cli(
        cli.format.map(OutputFormat::from),
        cli.verbose.then_some(true),
        (cli.jobs > 0).then_some(cli.jobs),
        cli.disable.clone(),
        cli.quiet.then_some(false),
    );

    match config.output.color_mode() {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }
    if cli.no_color {
        colored::control::set_override(false);
    }

    if cli.list_rules {
        handle_list_rules(&config)?;
        return Ok(0);
    }

    let filter = config.files.filter()?;
    let engine = Engine::new(config).context("Invalid configuration")?;
    let config = engine.config();

    let patterns = if cli.files.is_empty() {
        vec![".".to_string()]
    } else {
        cli.files.clone()
    };
    let files = collect_files(&patterns, &filter, &engine)?;

    if files.is_empty() {
        eprintln!("{}: No files found to lint", "error".red().bold());
        return Ok(1);
    }

    if config.output.is_verbose() {
        eprintln!(
            "Linting {} files with {} rules...",
            files.len(),
            engine.rules().len()
        );
    }

    let mut result = engine.lint(&files);
    if let Some(min) = cli.severity {
        result.retain_min_severity(min.into());
    }

    let formatter: Box<dyn OutputFormatter> = match config.output.output_format() {
        OutputFormat::Text => {
            let text = TextFormatter::new()
                .with_help(config.output.is_verbose())
                .with_stats(config.output.show_statistics());
            if cli.no_color || config.output.color_mode() == ColorMode::Never {
                Box::new(text.without_color())
            } else {
                Box::new(text)
            }
        }
        OutputFormat::Json => Box::new(JsonFormatter::new().pretty()),
        OutputFormat::Compact => Box::new(CompactFormatter::new()),
    };
    print!("{}", formatter.format(&result));

    if cli.stats {
        eprintln!();
        eprintln!("{}", result.format_timings().trim_end());
    }

    Ok(if cli.exit_zero { 0 } else { result.exit_code() })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}
