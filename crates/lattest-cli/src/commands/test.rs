//! Test command - run suites against a compiler

use crate::testing::runner::TestRun;
use crate::testing::{ReportFormat, SuitePlan, TestReporter, TestRunner, DEFAULT_SUITES};
use anyhow::{Context, Result};
use colored::*;
use lattest_config::ConfigLoader;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Arguments for the test command
#[derive(Debug, Clone)]
pub struct TestArgs {
    /// Compiler executable, invoked as `<compiler> <source.lat>`
    pub compiler: PathBuf,
    /// Suites to run; empty means configured or default suites
    pub suites: Vec<String>,
    /// Directory suite names are resolved against
    pub root: PathBuf,
    /// Interpreter command override
    pub interpreter: Option<String>,
    /// Per-invocation timeout override
    pub timeout: Option<Duration>,
    /// Print totals after the run
    pub summary: bool,
    /// Output in JSON format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Report a failing suite and continue with the next one
    pub keep_going: bool,
}

impl Default for TestArgs {
    fn default() -> Self {
        Self {
            compiler: PathBuf::from("latc"),
            suites: Vec::new(),
            root: PathBuf::from("."),
            interpreter: None,
            timeout: None,
            summary: false,
            json: false,
            no_color: false,
            keep_going: false,
        }
    }
}

/// Run the test command, reporting to standard output
pub fn run(args: TestArgs) -> Result<()> {
    run_with_writer(args, io::stdout()).map(|_| ())
}

/// Run the test command, reporting to `out`
pub fn run_with_writer<W: Write>(args: TestArgs, out: W) -> Result<Vec<TestRun>> {
    let root = std::path::absolute(&args.root)
        .with_context(|| format!("failed to resolve suite root {}", args.root.display()))?;

    let config = ConfigLoader::new()
        .load_from_directory(&root)
        .context("failed to load lattest configuration")?;
    if let Some(project_root) = config.project_root() {
        debug!(config = %project_root.display(), "using lattest.toml");
    }

    let suites: Vec<String> = if !args.suites.is_empty() {
        args.suites.clone()
    } else if let Some(configured) = config.suites() {
        configured.to_vec()
    } else {
        DEFAULT_SUITES.iter().map(|s| s.to_string()).collect()
    };

    let interpreter = args
        .interpreter
        .clone()
        .unwrap_or_else(|| config.interpreter().to_string());
    let runner = TestRunner::new(&args.compiler)
        .with_interpreter(interpreter)
        .with_timeout(args.timeout.or_else(|| config.timeout()))
        .with_compiler_stdout_to_stderr(args.json);

    let format = if args.json {
        ReportFormat::Json
    } else {
        ReportFormat::Lines
    };
    let mut reporter = TestReporter::new(out)
        .with_format(format)
        .with_summary(args.summary || config.summary())
        .with_no_color(args.no_color);

    let started = Instant::now();
    let mut runs = Vec::new();
    for suite in &suites {
        let plan = SuitePlan::discover(&root, suite);
        if plan.is_empty() {
            debug!(suite = %suite, "no cases found");
            continue;
        }
        debug!(suite = %suite, cases = plan.len(), "running suite");

        let outcome = runner.run(&plan, |run| {
            reporter.report_run(run)?;
            runs.push(run.clone());
            Ok(())
        });

        if let Err(e) = outcome {
            if !args.keep_going {
                return Err(e.context(format!("suite '{}' aborted", suite)));
            }
            warn!(suite = %suite, error = %e, "suite aborted");
            eprintln!(
                "{} suite '{}' aborted: {:#}",
                "error:".red().bold(),
                suite,
                e
            );
        }
    }

    reporter.finish(&runs, started.elapsed())?;
    Ok(runs)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::testing::runner::TestResult;
    use crate::testing::test_support::Workspace;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn args_for(ws: &Workspace, suites: &[&str]) -> TestArgs {
        TestArgs {
            compiler: ws.compiler(),
            suites: suites.iter().map(|s| s.to_string()).collect(),
            root: ws.root(),
            interpreter: Some(ws.interpreter()),
            no_color: true,
            ..Default::default()
        }
    }

    fn run_to_string(args: TestArgs) -> (String, Vec<TestRun>) {
        let mut out = Vec::new();
        let runs = run_with_writer(args, &mut out).unwrap();
        (String::from_utf8(out).unwrap(), runs)
    }

    #[test]
    fn test_command_reports_every_case() {
        let ws = Workspace::new();
        ws.good_case("basic/core/good/foo", 0, "true", None, None);
        ws.good_case("basic/core/good/qux", 0, "echo 42", None, Some("42\n"));
        ws.good_case("basic/core/good/bar", 2, "true", None, None);
        ws.bad_case("basic/core/bad/baz", 0);

        let (out, runs) = run_to_string(args_for(&ws, &["basic"]));

        assert_eq!(
            out,
            "basic/core/good/bar CE\n\
             basic/core/good/foo OK\n\n\
             basic/core/good/qux OK\n\n\
             basic/core/bad/baz no CE\n\n"
        );
        assert_eq!(runs.len(), 4);
    }

    #[test]
    fn test_command_suites_run_in_given_order() {
        let ws = Workspace::new();
        ws.good_case("arrays/a/good/x", 0, "true", None, None);
        ws.good_case("basic/a/good/y", 0, "true", None, None);

        let (out, _) = run_to_string(args_for(&ws, &["basic", "arrays"]));

        assert_eq!(out, "basic/a/good/y OK\n\narrays/a/good/x OK\n\n");
    }

    #[test]
    fn test_command_missing_suite_prints_nothing() {
        let ws = Workspace::new();

        let (out, runs) = run_to_string(args_for(&ws, &["objects2"]));

        assert_eq!(out, "");
        assert!(runs.is_empty());
    }

    #[test]
    fn test_command_uses_configured_suites() {
        let ws = Workspace::new();
        ws.good_case("mine/a/good/x", 0, "true", None, None);
        fs::write(
            ws.root().join("lattest.toml"),
            "[runner]\nsuites = [\"mine\"]\n",
        )
        .unwrap();

        let (out, _) = run_to_string(args_for(&ws, &[]));

        assert_eq!(out, "mine/a/good/x OK\n\n");
    }

    #[test]
    fn test_command_repeat_runs_are_identical() {
        let ws = Workspace::new();
        ws.good_case("basic/a/good/x", 0, "echo 1", None, Some("1\n"));
        ws.good_case("basic/a/good/y", 0, "echo 2", None, Some("1\n"));

        let (first, _) = run_to_string(args_for(&ws, &["basic"]));
        let (second, _) = run_to_string(args_for(&ws, &["basic"]));

        assert_eq!(first, second);
        let leftovers: Vec<_> = fs::read_dir(ws.root().join("basic/a/good"))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".proc.output"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_command_keep_going_skips_broken_suite() {
        let ws = Workspace::new();
        ws.bad_case("basic/a/bad/x", 1);

        let args = TestArgs {
            compiler: ws.root().join("missing-latc"),
            keep_going: true,
            ..args_for(&ws, &["basic", "other"])
        };
        let (out, runs) = run_to_string(args);

        assert_eq!(out, "");
        assert!(runs.is_empty());
    }

    #[test]
    fn test_command_launch_failure_aborts_without_keep_going() {
        let ws = Workspace::new();
        ws.bad_case("basic/a/bad/x", 1);

        let args = TestArgs {
            compiler: ws.root().join("missing-latc"),
            ..args_for(&ws, &["basic"])
        };
        let err = run_with_writer(args, Vec::<u8>::new()).unwrap_err();

        assert!(format!("{:#}", err).contains("failed to launch compiler"));
    }

    #[test]
    fn test_command_json_report() {
        let ws = Workspace::new();
        ws.good_case("basic/a/good/x", 0, "true", None, None);

        let args = TestArgs {
            json: true,
            ..args_for(&ws, &["basic"])
        };
        let (out, runs) = run_to_string(args);

        let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["tests"], 1);
        assert_eq!(doc["results"][0]["label"], "OK");
        assert_eq!(runs[0].result, TestResult::Ok);
    }
}
