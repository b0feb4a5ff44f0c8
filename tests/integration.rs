//! Integration tests for attrlint

use attrlint::{Config, ConfigError, Engine, LintResult, RuleOptions, Severity};
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::TempDir;

const STRING_RULE: &str = "no-attribute-string-literals";
const TEMPLATE_RULE: &str = "no-attribute-template-literals";

/// Engine running a single rule, optionally with YAML rule options
fn engine_for(rule_id: &str, options: Option<&str>) -> Engine {
    let mut config = Config::default();
    config.rules.enabled = vec![rule_id.to_string()];
    if let Some(yaml) = options {
        let options: RuleOptions = serde_yaml::from_str(yaml).unwrap();
        config.rules.options.insert(rule_id.to_string(), options);
    }
    Engine::new(config).unwrap()
}

fn lint(engine: &Engine, code: &str) -> LintResult {
    engine.lint_source(code, Path::new("Component.jsx"))
}

fn messages(rule_id: &str, options: Option<&str>, code: &str) -> Vec<String> {
    lint(&engine_for(rule_id, options), code)
        .diagnostics
        .into_iter()
        .map(|d| d.message)
        .collect()
}

fn assert_valid(rule_id: &str, cases: &[(&str, Option<&str>)]) {
    for (code, options) in cases {
        let found = messages(rule_id, *options, code);
        assert!(found.is_empty(), "expected no findings for {}: {:?}", code, found);
    }
}

fn assert_invalid(rule_id: &str, cases: &[(&str, Option<&str>, &[&str])]) {
    for (code, options, expected) in cases {
        let found = messages(rule_id, *options, code);
        let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        assert_eq!(found, expected, "for {}", code);
    }
}

#[test]
fn test_string_literals_valid() {
    assert_valid(
        STRING_RULE,
        &[
            ("<Button someAttribute />", None),
            (r#"<Button id="some-literal" />"#, None),
            (r#"<Button aria-hidden="true" />"#, None),
            (
                r#"<> <Button tone="primary" /> <Checkbox tone="default" /> </>"#,
                Some("{ignores: {values: [primary, default]}}"),
            ),
            (
                r#"<Box theme="dark-mode" />"#,
                Some(r"{ignores: {valuePatterns: ['^dark-\w+']}}"),
            ),
            (
                r#"<Button as="a" href="https://example.com">click me</Button>"#,
                Some("{ignores: {attributes: [as, href]}}"),
            ),
            (
                r#"<Button data-testid="button" />"#,
                Some(r"{ignores: {attributePatterns: ['^data-\w+']}}"),
            ),
            (
                r#"<Button:namespace ignored="this comp is ignored now" />"#,
                Some("{ignores: {components: ['Button:namespace']}}"),
            ),
            (
                r#"<Some.Provider ignored="this comp is ignored now" />"#,
                Some(r"{ignores: {componentPatterns: ['\w+\.Provider$']}}"),
            ),
            (
                r#"<Button as="p" />"#,
                Some("{ignores: {and: [{components: [Button]}, {attributes: [as]}]}}"),
            ),
            (
                r#"<Ignored prop="this is ignored now" />"#,
                Some("{only: {components: [Button]}}"),
            ),
        ],
    );
}

#[test]
fn test_string_literals_invalid() {
    assert_invalid(
        STRING_RULE,
        &[
            (
                r#"<Button aria-label="some aria-label" />"#,
                None,
                &["Attribute `aria-label` on component `Button` has invalid string literal `some aria-label`."],
            ),
            (
                r#"<Button someStringAttr="hello" />"#,
                None,
                &["Attribute `someStringAttr` on component `Button` has invalid string literal `hello`."],
            ),
            (
                r#"<Button someStringAttr={"hello"} />"#,
                None,
                &["Attribute `someStringAttr` on component `Button` has invalid string literal `hello`."],
            ),
            (
                "<Button someStringAttr={`hello`} />",
                None,
                &["Attribute `someStringAttr` on component `Button` has invalid string literal `hello`."],
            ),
            (
                r#"<Button someConditionalExpr={value ? "one" : "two"} />"#,
                None,
                &[
                    "Attribute `someConditionalExpr` on component `Button` has invalid string literal `one`.",
                    "Attribute `someConditionalExpr` on component `Button` has invalid string literal `two`.",
                ],
            ),
            (
                r#"<Button someLogicalExpr={value ?? "fallback"} />"#,
                None,
                &["Attribute `someLogicalExpr` on component `Button` has invalid string literal `fallback`."],
            ),
            (
                r#"<> <Ignored prop="this is ignored now" /> <Button prop="wrong" /> </>"#,
                Some("{mode: override, only: {components: [Button]}}"),
                &["Attribute `prop` on component `Button` has invalid string literal `wrong`."],
            ),
            (
                r#"<> <NotButton as={"p"} /> <Button notAs="p" /> </>"#,
                Some("{mode: override, ignores: {and: [{components: [Button]}, {attributes: [as]}]}}"),
                &[
                    "Attribute `as` on component `NotButton` has invalid string literal `p`.",
                    "Attribute `notAs` on component `Button` has invalid string literal `p`.",
                ],
            ),
            (
                r#"<> <Button as="p" /> <Other prop="hey" /> </>"#,
                Some("{mode: override, only: {and: [{components: [Button]}, {attributes: [as]}]}}"),
                &["Attribute `as` on component `Button` has invalid string literal `p`."],
            ),
        ],
    );
}

#[test]
fn test_template_literals_valid() {
    assert_valid(
        TEMPLATE_RULE,
        &[
            ("<Button someAttribute />", None),
            (
                "<> <Button tone={`primary${foo}`} /> <Checkbox tone={`default${foo}`} /> </>",
                Some("{ignores: {values: [primary, default]}}"),
            ),
            (
                "<Box theme={`dark\n${foo}`} />",
                Some("{ignores: {valuePatterns: ['^dark']}}"),
            ),
            (
                "<Button title={`Hello ${name}`}>click me</Button>",
                Some("{ignores: {attributes: [title]}}"),
            ),
            (
                "<Button data-testid={`button ${foo}`} />",
                Some(r"{ignores: {attributePatterns: ['^data-\w+']}}"),
            ),
            (
                "<Button:namespace ignored={`this comp is ignored now${foo}`} />",
                Some("{ignores: {components: ['Button:namespace']}}"),
            ),
            (
                "<Some.Provider ignored={`this comp is ignored now${foo}`} />",
                Some(r"{ignores: {componentPatterns: ['\w+\.Provider$']}}"),
            ),
            (
                "<Button as={`p ${foo}`} />",
                Some("{ignores: {and: [{components: [Button]}, {attributes: [as]}]}}"),
            ),
            (
                "<Ignored prop={`this is ignored now ${foo}`} />",
                Some("{only: {components: [Button]}}"),
            ),
        ],
    );
}

#[test]
fn test_template_literals_invalid() {
    assert_invalid(
        TEMPLATE_RULE,
        &[
            (
                "<Button someStringAttr={`hello ${foo}`} />",
                None,
                &["Attribute `someStringAttr` on component `Button` has invalid template element `hello `."],
            ),
            (
                "<Button someConditionalExpr={value ? `yes ${foo}` : `no ${foo}`} />",
                None,
                &[
                    "Attribute `someConditionalExpr` on component `Button` has invalid template element `yes `.",
                    "Attribute `someConditionalExpr` on component `Button` has invalid template element `no `.",
                ],
            ),
            (
                "<Button someLogicalExpr={value ?? `fallback ${foo}`} />",
                None,
                &["Attribute `someLogicalExpr` on component `Button` has invalid template element `fallback `."],
            ),
            (
                r#"<> <Ignored prop="this is ignored now" /> <Button prop={`wrong${foo}`} /> </>"#,
                Some("{mode: override, only: {components: [Button]}}"),
                &["Attribute `prop` on component `Button` has invalid template element `wrong`."],
            ),
            (
                "<MyComponent title={`Hello ${name}!`} />",
                Some(r"{only: {valuePatterns: ['(\s\w+|\w+\s)']}}"),
                &["Attribute `title` on component `MyComponent` has invalid template element `Hello `."],
            ),
        ],
    );
}

#[test]
fn test_scenario_default_ignores_id() {
    let result = lint(&engine_for(STRING_RULE, None), r#"<Button id="some-literal" />"#);
    assert!(result.is_clean());
    assert_eq!(result.exit_code(), 0);
}

#[test]
fn test_scenario_conditional_branches() {
    let result = lint(
        &engine_for(STRING_RULE, None),
        r#"<Button someStringAttr={value ? "one" : "two"} />"#,
    );
    assert_eq!(result.warning_count, 2);
    assert_eq!(result.diagnostics[0].location.column, 33);
    assert_eq!(result.diagnostics[1].location.column, 41);
}

#[test]
fn test_scenario_override_only() {
    let found = messages(
        STRING_RULE,
        Some("{mode: override, only: {components: [Button]}}"),
        r#"<Ignored prop="x" /><Button prop="wrong" />"#,
    );
    assert_eq!(
        found,
        vec!["Attribute `prop` on component `Button` has invalid string literal `wrong`.".to_string()]
    );
}

#[test]
fn test_scenario_extend_and_ignores() {
    let options = Some("{ignores: {and: [{components: [Button]}, {attributes: [as]}]}}");
    assert!(messages(STRING_RULE, options, r#"<Button as="p" />"#).is_empty());
    assert_eq!(
        messages(STRING_RULE, options, r#"<Button other="p" />"#),
        vec!["Attribute `other` on component `Button` has invalid string literal `p`.".to_string()]
    );
}

#[test]
fn test_both_rules_on_real_component() {
    let engine = Engine::new(Config::default()).unwrap();
    let code = r#"import React from 'react';

export function Greeting({ name }: { name: string }) {
  const cls = "greeting";
  return (
    <Card className={cls} title="Welcome" data-testid="greeting">
      <Text label={`Hello ${name}`} tone={name ? "loud" : undefined} />
      {items.map((item) => <Item key={item.id} caption={item.caption ?? "Untitled"} />)}
    </Card>
  );
}
"#;
    let result = engine.lint_source(code, Path::new("Greeting.tsx"));
    let found: Vec<(usize, &str, &str)> = result
        .diagnostics
        .iter()
        .map(|d| (d.location.line, d.rule_id.as_str(), d.message.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            (6, STRING_RULE, "Attribute `title` on component `Card` has invalid string literal `Welcome`."),
            (7, TEMPLATE_RULE, "Attribute `label` on component `Text` has invalid template element `Hello `."),
            (7, STRING_RULE, "Attribute `tone` on component `Text` has invalid string literal `loud`."),
            (8, STRING_RULE, "Attribute `caption` on component `Item` has invalid string literal `Untitled`."),
        ]
    );
    assert_eq!(
        result.diagnostics[0].source_line.as_deref(),
        Some(r#"    <Card className={cls} title="Welcome" data-testid="greeting">"#)
    );
}

#[test]
fn test_inline_disable_comments() {
    let engine = Engine::new(Config::default()).unwrap();
    let code = r#"// attrlint-disable-next-line no-attribute-string-literals
const a = <Button title="skipped" />;
const b = <Button title="reported" />;
const c = <Button title="same line" />; // attrlint-disable all
"#;
    let result = engine.lint_source(code, Path::new("Disabled.jsx"));
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].location.line, 3);

    let file_wide = format!("/* attrlint-disable-file {} */\n{}", STRING_RULE, code);
    assert!(engine
        .lint_source(&file_wide, Path::new("Disabled.jsx"))
        .is_clean());
}

#[test]
fn test_disable_text_in_strings_does_not_suppress() {
    let engine = Engine::new(Config::default()).unwrap();
    let code = r#"const tip = "attrlint-disable-next-line all";
const a = <Button title="reported" />;
const b = <Help>attrlint-disable-file all</Help>;
"#;
    let result = engine.lint_source(code, Path::new("Tips.jsx"));
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].location.line, 2);
}

#[test]
fn test_invalid_per_file_glob_rejected() {
    let mut config = Config::default();
    config
        .rules
        .per_file
        .insert("src/[oops".to_string(), vec![STRING_RULE.to_string()]);
    assert!(matches!(Engine::new(config), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_per_file_ignores() {
    let mut config = Config::default();
    config
        .rules
        .per_file
        .insert("**/*.stories.jsx".to_string(), vec!["all".to_string()]);
    let engine = Engine::new(config).unwrap();
    let code = r#"<Button title="Story" />"#;

    assert!(engine
        .lint_source(code, Path::new("src/Button.stories.jsx"))
        .is_clean());
    assert!(!engine.lint_source(code, Path::new("src/Button.jsx")).is_clean());
}

#[test]
fn test_parse_error_diagnostic() {
    let engine = Engine::new(Config::default()).unwrap();
    let code = "const ok = <Button />;\nconst broken = 'unterminated;\n";
    let result = engine.lint_source(code, Path::new("Broken.jsx"));

    assert_eq!(result.diagnostics.len(), 1);
    let diag = &result.diagnostics[0];
    assert_eq!(diag.rule_id, "parse-error");
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.location.line, 2);
    assert_eq!(result.exit_code(), 2);
}

#[test]
fn test_unsupported_extension_is_skipped() {
    let engine = Engine::new(Config::default()).unwrap();
    let result = engine.lint_source(r#"<Button title="x" />"#, Path::new("notes.md"));
    assert!(result.is_clean());
    assert!(!engine.supports(Path::new("notes.md")));
    assert!(engine.supports(Path::new("App.tsx")));
}

#[test]
fn test_config_file_and_lint_files() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join(".attrlintrc.yaml");
    std::fs::write(
        &config_path,
        r#"
extends: [strict]
rules:
  disabled: [no-attribute-template-literals]
  options:
    no-attribute-string-literals:
      ignores:
        - attributes: [variant]
"#,
    )
    .unwrap();

    let first = dir.path().join("First.jsx");
    let second = dir.path().join("Second.tsx");
    std::fs::write(&first, "<Button variant=\"primary\" label={`Hi ${x}`} />\n").unwrap();
    std::fs::write(&second, "const x = 1;\n<Button label=\"Save\" />\n").unwrap();

    let config = Config::load(&config_path).unwrap();
    let engine = Engine::new(config).unwrap();
    assert_eq!(engine.rules().len(), 1);

    let result = engine.lint(&[first, second.clone(), dir.path().join("missing.jsx")]);
    assert_eq!(result.files_processed, 3);

    let found: Vec<(&str, usize, Severity)> = result
        .diagnostics
        .iter()
        .map(|d| (d.rule_id.as_str(), d.location.line, d.severity))
        .collect();
    assert_eq!(
        found,
        vec![
            (STRING_RULE, 2, Severity::Error),
            ("file-read-error", 0, Severity::Error),
        ]
    );
    assert_eq!(result.diagnostics[0].location.file, second);
    assert_eq!(result.exit_code(), 2);
}

#[test]
fn test_min_severity_filter() {
    let mut config = Config::default();
    config
        .rules
        .severity
        .insert(TEMPLATE_RULE.to_string(), Severity::Error);
    let engine = Engine::new(config).unwrap();

    let mut result = engine.lint_source(
        r#"<Button title="Plain" label={`Hi ${x}`} />"#,
        Path::new("App.jsx"),
    );
    assert_eq!((result.error_count, result.warning_count), (1, 1));

    result.retain_min_severity(Severity::Error);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].rule_id, TEMPLATE_RULE);
    assert_eq!(result.warning_count, 0);
}

#[test]
fn test_invalid_pattern_is_config_error() {
    let mut config = Config::default();
    let options: RuleOptions = serde_yaml::from_str("{ignores: {valuePatterns: ['(']}}").unwrap();
    config.rules.options.insert(STRING_RULE.to_string(), options);

    assert!(matches!(Engine::new(config), Err(ConfigError::Options(_))));
}

#[test]
fn test_lookahead_pattern_options() {
    let options = Some("{mode: override, ignores: {attributePatterns: ['^(?!title$)']}}");
    assert_eq!(
        messages(STRING_RULE, options, r#"<Button title="Hi" label="Hey" subtitle="Yo" />"#),
        vec!["Attribute `title` on component `Button` has invalid string literal `Hi`.".to_string()]
    );

    let handlers = Some(r"{only: {attributePatterns: ['^on[A-Z]\w*$']}, ignores: {valuePatterns: ['^(?!.*\s)']}}");
    assert_eq!(
        messages(STRING_RULE, handlers, r#"<Button onHover="show tip" onTap="x" label="Save now" />"#),
        vec!["Attribute `onHover` on component `Button` has invalid string literal `show tip`.".to_string()]
    );
}

#[test]
fn test_word_class_is_ascii_in_options() {
    let options = Some(r"{ignores: {valuePatterns: ['^\w+$']}}");
    assert!(messages(STRING_RULE, options, r#"<Button tone="primary_1" />"#).is_empty());
    assert_eq!(
        messages(STRING_RULE, options, r#"<Button tone="café" />"#),
        vec!["Attribute `tone` on component `Button` has invalid string literal `café`.".to_string()]
    );
}

#[test]
fn test_unknown_option_fields_rejected() {
    assert!(serde_yaml::from_str::<RuleOptions>("{ignores: {attribute: [title]}}").is_err());
    assert!(serde_yaml::from_str::<RuleOptions>("{exclude: {attributes: [title]}}").is_err());
    assert!(serde_yaml::from_str::<RuleOptions>(
        "{ignores: {and: [{attributes: [a]}], attributes: [b]}}"
    )
    .is_err());
}

#[test]
fn test_unknown_rule_in_config_rejected() {
    let mut config = Config::default();
    config
        .rules
        .severity
        .insert("no-such-rule".to_string(), Severity::Error);
    assert!(matches!(Engine::new(config), Err(ConfigError::Invalid(_))));
}
