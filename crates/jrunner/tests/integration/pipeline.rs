//! Pipeline branches exercised with shell stand-ins for the JDK

use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

use jrunner::runner::{PipelineError, Runner, compile};
use jrunner::source::SUFFIX_LEN;
use jrunner::{CodeResponse, CompilationUnit, Config, Workspace};
use regex::Regex;
use tokio::task::JoinSet;

use super::{fixture_source, leftover_entries, test_config};

fn sh(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string()]
}

/// Compiler that only checks the source file was written, and a custom program
fn stub_config(root: &Path, run_script: &str) -> Config {
    let mut config = test_config(root);
    config.compiler.command = sh("test -f '{source}'");
    config.runtime.command = sh(run_script);
    config
}

#[tokio::test]
async fn test_success_splits_memory_marker() {
    let root = tempfile::tempdir().unwrap();
    let runner = Runner::new(stub_config(
        root.path(),
        "echo a; echo '{MemoryUsage}: 12MB'; echo b",
    ));

    let result = runner.run(&fixture_source("hello.java")).await.unwrap();

    assert_eq!(result.output, "a\nb");
    assert_eq!(result.memory_usage.as_deref(), Some("12MB"));
    assert!(
        Regex::new(r"^\d+\.\d{3}$")
            .unwrap()
            .is_match(&result.execution_time)
    );
    assert_eq!(leftover_entries(root.path()), 0);
}

#[tokio::test]
async fn test_success_without_marker() {
    let root = tempfile::tempdir().unwrap();
    let runner = Runner::new(stub_config(root.path(), "printf 'hi\\n\\n'"));

    let result = runner.run(&fixture_source("hello.java")).await.unwrap();

    assert_eq!(result.output, "hi");
    assert!(result.memory_usage.is_none());
}

#[tokio::test]
async fn test_compiler_sees_rewritten_source() {
    let root = tempfile::tempdir().unwrap();
    let mut config = stub_config(root.path(), "echo {class}");
    config.compiler.command = sh("grep -q 'public class {class} ' '{source}'");
    let runner = Runner::new(config);

    let result = runner.run(&fixture_source("hello.java")).await.unwrap();

    assert!(result.output.starts_with("Hello"));
    assert_eq!(result.output.len(), "Hello".len() + SUFFIX_LEN);
}

#[tokio::test]
async fn test_source_file_named_after_class() {
    let root = tempfile::tempdir().unwrap();
    let mut config = stub_config(root.path(), "ls '{workspace}'");
    config.compiler.command = sh("test \"$(basename '{source}')\" = '{class}.java'");
    let runner = Runner::new(config);

    let result = runner.run(&fixture_source("hello.java")).await.unwrap();

    let listed: Vec<&str> = result.output.lines().collect();
    assert!(listed.iter().any(|f| f.starts_with("Hello") && f.ends_with(".java")));
    assert!(listed.contains(&"output.log"));
}

#[tokio::test]
async fn test_compile_step_expects_source_already_written() {
    let root = tempfile::tempdir().unwrap();
    let config = stub_config(root.path(), "true");
    let unit = CompilationUnit::prepare(&fixture_source("hello.java")).unwrap();
    let source_name = config.compiler.source_name(&unit.class_name);

    let workspace = Workspace::create(&config.workspace, &source_name).unwrap();
    let unwritten = compile(&config.compiler, &workspace, &unit).await;
    assert!(matches!(unwritten, Err(PipelineError::CompilationFailed(_))));

    workspace.write_source(&unit.source).await.unwrap();
    compile(&config.compiler, &workspace, &unit).await.unwrap();
    workspace.destroy();
}

#[tokio::test]
async fn test_compile_failure_is_formatted() {
    let root = tempfile::tempdir().unwrap();
    let marker_dir = tempfile::tempdir().unwrap();
    let ran = marker_dir.path().join("ran");

    let mut config = stub_config(root.path(), &format!("touch '{}'", ran.display()));
    config.compiler.command = sh(
        "echo \"{source}:3: error: ';' expected\" >&2; \
         echo '        System.out.println(\"x\")' >&2; \
         echo '                                 ^' >&2; \
         echo '1 error' >&2; exit 1",
    );
    let runner = Runner::new(config);

    let err = runner
        .run(&fixture_source("syntax_error.java"))
        .await
        .unwrap_err();

    match err {
        PipelineError::CompilationFailed(ref message) => {
            assert!(message.contains("Error at line 3: ';' expected"));
            assert!(message.contains("1 error"));
            assert!(!message.contains('^'));
        }
        ref other => panic!("expected CompilationFailed, got {other:?}"),
    }
    assert!(err.to_string().starts_with("Compilation failed\n\n"));
    assert!(!ran.exists(), "program must not run after a failed compile");
    assert_eq!(leftover_entries(root.path()), 0);
}

#[tokio::test]
async fn test_compile_failure_applies_line_offset() {
    let root = tempfile::tempdir().unwrap();
    let mut config = stub_config(root.path(), "true");
    config.compiler.command = sh("echo 'X.java:9: error: not a statement' >&2; exit 1");
    config.compiler.line_offset = 4;
    let runner = Runner::new(config);

    let err = runner.run(&fixture_source("hello.java")).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Compilation failed\n\nError at line 5: not a statement\n"
    );
}

#[tokio::test]
async fn test_compile_failure_without_diagnostics_keeps_raw_text() {
    let root = tempfile::tempdir().unwrap();
    let mut config = stub_config(root.path(), "true");
    config.compiler.command = sh("exit 2");
    let runner = Runner::new(config);

    let err = runner.run(&fixture_source("hello.java")).await.unwrap_err();

    assert!(matches!(err, PipelineError::CompilationFailed(ref m) if m.is_empty()));
}

#[tokio::test]
async fn test_compile_timeout_removes_workspace() {
    let root = tempfile::tempdir().unwrap();
    let mut config = stub_config(root.path(), "true")
        .with_compile_timeout(0.3)
        .unwrap();
    config.compiler.command = sh("exec sleep 10");
    let runner = Runner::new(config);

    let started = Instant::now();
    let err = runner.run(&fixture_source("hello.java")).await.unwrap_err();

    assert!(matches!(err, PipelineError::CompilationTimeout));
    assert_eq!(err.to_string(), "Compilation timed out.");
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(leftover_entries(root.path()), 0);
}

#[tokio::test]
async fn test_execution_timeout_removes_workspace() {
    let root = tempfile::tempdir().unwrap();
    let config = stub_config(root.path(), "echo started; exec sleep 10")
        .with_run_timeout(0.3)
        .unwrap();
    let runner = Runner::new(config);

    let started = Instant::now();
    let err = runner.run(&fixture_source("hello.java")).await.unwrap_err();

    assert!(matches!(err, PipelineError::ExecutionTimeout));
    assert_eq!(err.to_string(), "Execution timed out.");
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(leftover_entries(root.path()), 0);
}

#[tokio::test]
async fn test_execution_failure_returns_stderr() {
    let root = tempfile::tempdir().unwrap();
    let mut config = stub_config(root.path(), "echo partial; echo boom >&2; exit 1");
    // compiler warnings share the sink; they must not leak into the program's error
    config.compiler.command = sh("echo 'Note: uses unchecked operations' >&2");
    let runner = Runner::new(config);

    let err = runner.run(&fixture_source("hello.java")).await.unwrap_err();

    match err {
        PipelineError::ExecutionFailed(ref stderr) => assert_eq!(stderr, "boom\n"),
        ref other => panic!("expected ExecutionFailed, got {other:?}"),
    }
    assert_eq!(err.to_string(), "Execution failed\n\nboom\n");
    assert_eq!(leftover_entries(root.path()), 0);
}

#[tokio::test]
async fn test_missing_compiler_is_unexpected_io() {
    let root = tempfile::tempdir().unwrap();
    let mut config = stub_config(root.path(), "true");
    config.compiler.command = vec!["jrunner-no-such-javac".to_string(), "{source}".to_string()];
    let runner = Runner::new(config);

    let err = runner.run(&fixture_source("hello.java")).await.unwrap_err();

    assert!(matches!(err, PipelineError::Io(_)));
    assert!(
        err.to_string()
            .starts_with("Unexpected error during execution: ")
    );
    assert_eq!(leftover_entries(root.path()), 0);
}

#[tokio::test]
async fn test_missing_class_touches_nothing() {
    let root = tempfile::tempdir().unwrap();
    let marker_dir = tempfile::tempdir().unwrap();
    let compiled = marker_dir.path().join("compiled");
    let mut config = stub_config(root.path(), "true");
    config.compiler.command = sh(&format!("touch '{}'", compiled.display()));
    let runner = Runner::new(config);

    let err = runner.run("class NotPublic {}").await.unwrap_err();

    assert!(err.is_input_error());
    assert!(!compiled.exists());
    assert_eq!(leftover_entries(root.path()), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_identical_submissions_do_not_collide() {
    let root = tempfile::tempdir().unwrap();
    let runner = Runner::new(stub_config(root.path(), "echo {class}; echo '{workspace}'"));
    let source = fixture_source("hello.java");

    let mut runs = JoinSet::new();
    for _ in 0..8 {
        let runner = runner.clone();
        let source = source.clone();
        runs.spawn(async move { runner.run(&source).await });
    }

    let mut classes = HashSet::new();
    let mut workspaces = HashSet::new();
    while let Some(joined) = runs.join_next().await {
        let result = joined.unwrap().unwrap();
        let mut lines = result.output.lines();
        classes.insert(lines.next().unwrap().to_string());
        workspaces.insert(lines.next().unwrap().to_string());
    }
    assert_eq!(classes.len(), 8);
    assert_eq!(workspaces.len(), 8);
    assert_eq!(leftover_entries(root.path()), 0);
}

#[tokio::test]
async fn test_response_from_pipeline_result() {
    let root = tempfile::tempdir().unwrap();
    let runner = Runner::new(stub_config(root.path(), "echo hi"));

    let ok = CodeResponse::from(runner.run(&fixture_source("hello.java")).await);
    assert_eq!(ok.output.as_deref(), Some("hi"));
    assert!(ok.message.is_none());

    let err = CodeResponse::from(runner.run("interface Nope {}").await);
    assert_eq!(
        err.message.as_deref(),
        Some("Error: Could not find a public class declaration.")
    );
    assert!(err.output.is_none());
    assert!(err.execution_time.is_none());
}
