//! Tests for run-script rewriting.

use super::*;
use crate::error::LessonError;
use crate::test_support::{FakeEvaluator, StaticCatalog, create_tree, eval_context};
use serde_json::json;

fn rewrite(script: &str, files: &[(&str, &str)], evaluator: &FakeEvaluator) -> Result<String> {
    let lesson = create_tree(files);
    let eval = eval_context();
    let catalog = StaticCatalog::new();
    let ctx = RewriteContext {
        lesson_dir: lesson.path(),
        eval: &eval,
        evaluator,
        catalog: &catalog,
    };
    Rewriter::new("nixpkgs")?.rewrite(script, &ctx)
}

#[test]
fn test_rule_order_is_fixed() {
    let rewriter = Rewriter::new("nixpkgs").unwrap();
    let names: Vec<&str> = rewriter.rules.iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["package-run", "evaluation"]);
}

#[test]
fn test_package_run_with_separator() {
    let out = rewrite(
        "nix run nixpkgs#hello -- --greeting hi",
        &[],
        &FakeEvaluator::new(),
    )
    .unwrap();
    assert_eq!(out, "/nix/store/fake-hello/bin/hello --greeting hi");
}

#[test]
fn test_package_run_without_arguments() {
    let out = rewrite("nix run nixpkgs#cowsay", &[], &FakeEvaluator::new()).unwrap();
    assert_eq!(out, "/nix/store/fake-cowsay/bin/cowsay");
}

#[test]
fn test_package_run_is_order_independent() {
    let first = rewrite(
        "nix run nixpkgs#jq\nnix run nixpkgs#hello",
        &[],
        &FakeEvaluator::new(),
    )
    .unwrap();
    let second = rewrite(
        "nix run nixpkgs#hello\nnix run nixpkgs#jq",
        &[],
        &FakeEvaluator::new(),
    )
    .unwrap();

    let mut a: Vec<&str> = first.lines().collect();
    let mut b: Vec<&str> = second.lines().collect();
    a.sort();
    b.sort();
    assert_eq!(a, b);
}

#[test]
fn test_unmatched_lines_pass_through() {
    let script = "#!/usr/bin/env bash\nset -e\n\necho \"nix is great\"\n";
    let out = rewrite(script, &[], &FakeEvaluator::new()).unwrap();
    assert_eq!(out, script);
}

#[test]
fn test_evaluation_pretty_prints() {
    let evaluator = FakeEvaluator::new().with_file("eval.nix", json!({ "a": 1 }));
    let out = rewrite("nix eval -f eval.nix", &[("eval.nix", "{ a = 1; }")], &evaluator).unwrap();
    assert_eq!(out, "echo '{\n  a = 1;\n}'");
}

#[test]
fn test_evaluation_json_keeps_pipe() {
    let evaluator = FakeEvaluator::new().with_file("eval.nix", json!({ "a": 1 }));
    let out = rewrite(
        "nix eval --json -f eval.nix | jq .a",
        &[("eval.nix", "{ a = 1; }")],
        &evaluator,
    )
    .unwrap();
    assert_eq!(out, r#"echo '{"a":1}' | jq .a"#);
}

#[test]
fn test_evaluation_apply_resolves_placeholder() {
    let expr = "x: (import <nixpkgs> {}).lib.attrNames x";
    let resolved = "x: (import /nix/store/0000-nixpkgs-source {}).lib.attrNames x";
    let evaluator = FakeEvaluator::new()
        .with_file("eval.nix", json!({ "a": 1, "b": 2 }))
        .with_apply(resolved, json!(["a", "b"]));

    let out = rewrite(
        &format!("nix eval -f eval.nix --json --apply '{}'", expr),
        &[("eval.nix", "")],
        &evaluator,
    )
    .unwrap();

    assert_eq!(out, r#"echo '["a","b"]'"#);
    assert_eq!(evaluator.seen_applies(), vec![resolved.to_string()]);
}

#[test]
fn test_evaluation_is_eager_and_once_per_occurrence() {
    let evaluator = FakeEvaluator::new().with_file("eval.nix", json!(42));
    rewrite(
        "nix eval -f eval.nix\nnix eval -f eval.nix",
        &[("eval.nix", "42")],
        &evaluator,
    )
    .unwrap();
    assert_eq!(evaluator.calls(), 2);
}

#[test]
fn test_evaluation_without_file_is_fatal() {
    let err = rewrite("nix eval --json", &[], &FakeEvaluator::new()).unwrap_err();
    assert!(matches!(err, LessonError::NoFileSpecified(_)));
}

#[test]
fn test_evaluation_missing_expression_file() {
    let err = rewrite("nix eval -f nope.nix", &[], &FakeEvaluator::new()).unwrap_err();
    assert!(matches!(err, LessonError::MissingFile(_)));
}

#[test]
fn test_evaluation_malformed_arguments() {
    let err = rewrite("nix eval -f \"eval.nix", &[], &FakeEvaluator::new()).unwrap_err();
    assert!(matches!(err, LessonError::MalformedArguments(_)));
}

#[test]
fn test_both_rules_on_one_line() {
    let evaluator = FakeEvaluator::new().with_file("eval.nix", json!("hi"));
    let out = rewrite(
        "nix eval --json -f eval.nix | nix run nixpkgs#jq -- -r .",
        &[("eval.nix", "")],
        &evaluator,
    )
    .unwrap();
    assert_eq!(out, r#"echo '"hi"' | /nix/store/fake-jq/bin/jq -r ."#);
}

#[test]
fn test_only_first_match_per_rule_per_line() {
    let out = rewrite(
        "nix run nixpkgs#hello && nix run nixpkgs#jq",
        &[],
        &FakeEvaluator::new(),
    )
    .unwrap();
    assert_eq!(out, "/nix/store/fake-hello/bin/hello && nix run nixpkgs#jq");
}

#[test]
fn test_rewritten_span_is_not_seen_by_later_rules() {
    // The first rule emits `nix eval`; the evaluation rule must not touch it.
    let rules = vec![
        RewriteRule {
            name: "inject",
            pattern: regex::Regex::new("MARK").unwrap(),
            transform: |_, _| Ok("nix eval -f missing.nix".to_string()),
        },
        rules::evaluation_rule().unwrap(),
    ];
    let rewriter = Rewriter::with_rules(rules);

    let lesson = create_tree(&[]);
    let eval = eval_context();
    let evaluator = FakeEvaluator::new();
    let catalog = StaticCatalog::new();
    let ctx = RewriteContext {
        lesson_dir: lesson.path(),
        eval: &eval,
        evaluator: &evaluator,
        catalog: &catalog,
    };

    let out = rewriter.rewrite("echo MARK", &ctx).unwrap();
    assert_eq!(out, "echo nix eval -f missing.nix");
    assert_eq!(evaluator.calls(), 0);
}

#[test]
fn test_catalog_failure_propagates() {
    let err = rewrite("nix run nixpkgs#missing", &[], &FakeEvaluator::new()).unwrap_err();
    assert!(matches!(err, LessonError::EvalError(_)));
}

#[test]
fn test_package_run_followed_by_shell_syntax() {
    for (script, expected) in [
        (
            "nix run nixpkgs#hello; echo done",
            "/nix/store/fake-hello/bin/hello; echo done",
        ),
        (
            "echo \"$(nix run nixpkgs#hello)\"",
            "echo \"$(/nix/store/fake-hello/bin/hello)\"",
        ),
        (
            "nix run nixpkgs#hello&& echo ok",
            "/nix/store/fake-hello/bin/hello&& echo ok",
        ),
        (
            "nix run nixpkgs#hello --version",
            "/nix/store/fake-hello/bin/hello --version",
        ),
    ] {
        let out = rewrite(script, &[], &FakeEvaluator::new()).unwrap();
        assert_eq!(out, expected, "script: {}", script);
    }
}

#[test]
fn test_evaluation_ends_at_shell_operators() {
    for (script, expected) in [
        ("nix eval -f eval.nix && echo ok", "echo 42 && echo ok"),
        ("nix eval -f eval.nix || echo failed", "echo 42 || echo failed"),
        ("nix eval -f eval.nix; echo ok", "echo 42; echo ok"),
        ("nix eval -f eval.nix > out.txt", "echo 42 > out.txt"),
        ("x=$(nix eval -f eval.nix)", "x=$(echo 42)"),
    ] {
        let evaluator = FakeEvaluator::new().with_file("eval.nix", json!(42));
        let out = rewrite(script, &[("eval.nix", "42")], &evaluator).unwrap();
        assert_eq!(out, expected, "script: {}", script);
    }
}

#[test]
fn test_evaluation_apply_may_contain_operators() {
    let expr = "x: if x > 1 && true then \"big\" else \"small\"";
    let evaluator = FakeEvaluator::new()
        .with_file("eval.nix", json!(2))
        .with_apply(expr, json!("big"));

    let out = rewrite(
        &format!("nix eval -f eval.nix --apply '{}'; echo done", expr),
        &[("eval.nix", "2")],
        &evaluator,
    )
    .unwrap();

    assert_eq!(out, "echo '\"big\"'; echo done");
    assert_eq!(evaluator.seen_applies(), vec![expr.to_string()]);
}

#[test]
fn test_evaluation_uses_evaluator_rendering() {
    let evaluator = FakeEvaluator::new()
        .with_file("eval.nix", json!({ "a": 1 }))
        .with_rendered("eval.nix", "{\n  f = <function>;\n}");

    let out = rewrite("nix eval -f eval.nix", &[("eval.nix", "")], &evaluator).unwrap();
    assert_eq!(out, "echo '{\n  f = <function>;\n}'");

    let json = rewrite("nix eval --json -f eval.nix", &[("eval.nix", "")], &evaluator).unwrap();
    assert_eq!(json, r#"echo '{"a":1}'"#);
}
