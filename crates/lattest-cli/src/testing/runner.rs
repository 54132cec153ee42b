//! Test runner - compile, interpret and classify discovered cases

use crate::testing::discovery::{SuitePlan, TestCase, TestGroup};
use crate::testing::process::{wait_for, Completion};
use anyhow::{Context, Result};
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

/// Which external tool a timeout hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compile,
    Run,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Compile => f.write_str("compile"),
            Stage::Run => f.write_str("run"),
        }
    }
}

/// Classification of a single case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    /// Good case: output matched (or was correctly empty)
    Ok,
    /// Good case: output differed from the expectation
    WrongAnswer,
    /// Good case: the compiler rejected it
    CompileError,
    /// Bad case: the compiler rejected it, as it should
    ExpectedCompileError,
    /// Bad case: the compiler accepted it
    UnexpectedAccept,
    /// An external tool ran past the configured timeout
    Timeout { stage: Stage },
}

impl TestResult {
    /// Check if this result is a pass
    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Ok | TestResult::ExpectedCompileError)
    }

    /// Check if this result is a failure
    pub fn is_fail(&self) -> bool {
        !self.is_pass()
    }

    /// Label printed after the case path
    pub fn label(&self) -> &'static str {
        match self {
            TestResult::Ok => "OK",
            TestResult::WrongAnswer => "WA",
            TestResult::CompileError | TestResult::ExpectedCompileError => "CE",
            TestResult::UnexpectedAccept => "no CE",
            TestResult::Timeout { .. } => "TIMEOUT",
        }
    }

    /// Every report line but a compile error on a good case is followed by a blank line
    pub fn has_trailing_blank_line(&self) -> bool {
        !matches!(self, TestResult::CompileError)
    }
}

/// A completed test run
#[derive(Debug, Clone)]
pub struct TestRun {
    /// Suite the case was discovered in
    pub suite: String,
    /// The case that was run
    pub case: TestCase,
    /// Result of running the case
    pub result: TestResult,
    /// Wall time spent on the case
    pub duration: Duration,
}

/// Runs cases against an external compiler and interpreter
#[derive(Debug, Clone)]
pub struct TestRunner {
    compiler: PathBuf,
    interpreter: String,
    timeout: Option<Duration>,
    /// Send compiler stdout to our stderr instead of sharing our stdout
    compiler_stdout_to_stderr: bool,
}

impl TestRunner {
    /// Create a runner for `compiler`, interpreting with `lli` and no timeout
    pub fn new(compiler: impl Into<PathBuf>) -> Self {
        Self {
            compiler: compiler.into(),
            interpreter: lattest_config::DEFAULT_INTERPRETER.to_string(),
            timeout: None,
            compiler_stdout_to_stderr: false,
        }
    }

    /// Set the interpreter command
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Set the timeout applied to every compiler and interpreter invocation
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Keep compiler stdout off our stdout, for reports that must own it
    pub fn with_compiler_stdout_to_stderr(mut self, redirect: bool) -> Self {
        self.compiler_stdout_to_stderr = redirect;
        self
    }

    /// Run every case of the suite in order, handing each result to `on_run` as it completes
    pub fn run<F>(&self, plan: &SuitePlan, mut on_run: F) -> Result<Vec<TestRun>>
    where
        F: FnMut(&TestRun) -> Result<()>,
    {
        let mut runs = Vec::with_capacity(plan.len());
        for group in plan.groups() {
            debug!(dir = %group.dir.display(), cases = group.cases.len(), "running group");
            for case in &group.cases {
                let run = self.run_case(&plan.name, case)?;
                on_run(&run)?;
                runs.push(run);
            }
        }
        Ok(runs)
    }

    /// Run a single case
    pub fn run_case(&self, suite: &str, case: &TestCase) -> Result<TestRun> {
        let start = Instant::now();
        let result = match case.group {
            TestGroup::Good => self.run_good(case)?,
            TestGroup::Bad => self.run_bad(case)?,
        };
        debug!(case = %case.display.display(), result = result.label(), "classified");

        Ok(TestRun {
            suite: suite.to_string(),
            case: case.clone(),
            result,
            duration: start.elapsed(),
        })
    }

    fn run_good(&self, case: &TestCase) -> Result<TestResult> {
        match self.compile(case)? {
            Completion::TimedOut => return Ok(TestResult::Timeout { stage: Stage::Compile }),
            completion if !completion.succeeded() => return Ok(TestResult::CompileError),
            _ => {}
        }

        let capture = case.capture_path();
        let verdict = self.interpret(case, &capture);
        // The capture goes away whatever happened above.
        let removed = fs::remove_file(&capture);
        let verdict = verdict?;
        if let Err(e) = removed {
            if e.kind() != io::ErrorKind::NotFound {
                return Err(e)
                    .with_context(|| format!("failed to remove {}", capture.display()));
            }
        }
        Ok(verdict)
    }

    fn run_bad(&self, case: &TestCase) -> Result<TestResult> {
        Ok(match self.compile(case)? {
            Completion::TimedOut => TestResult::Timeout { stage: Stage::Compile },
            completion if completion.succeeded() => TestResult::UnexpectedAccept,
            _ => TestResult::ExpectedCompileError,
        })
    }

    fn compile(&self, case: &TestCase) -> Result<Completion> {
        debug!(compiler = %self.compiler.display(), source = %case.source.display(), "compiling");
        let mut command = Command::new(&self.compiler);
        command.arg(&case.source);
        if self.compiler_stdout_to_stderr {
            command.stdout(io::stderr());
        }
        let mut child = command
            .spawn()
            .with_context(|| format!("failed to launch compiler {}", self.compiler.display()))?;
        wait_for(&mut child, self.timeout)
            .with_context(|| format!("failed to wait for compiler on {}", case.source.display()))
    }

    fn interpret(&self, case: &TestCase, capture: &Path) -> Result<TestResult> {
        let input_path = case.input_path();
        let stdin = if input_path.is_file() {
            let input = File::open(&input_path)
                .with_context(|| format!("failed to open {}", input_path.display()))?;
            Stdio::from(input)
        } else {
            Stdio::null()
        };

        let output = File::create(capture)
            .with_context(|| format!("failed to create {}", capture.display()))?;
        let stderr = output
            .try_clone()
            .with_context(|| format!("failed to share {}", capture.display()))?;

        let artifact = case.artifact_path();
        debug!(interpreter = %self.interpreter, artifact = %artifact.display(), "interpreting");
        let mut child = Command::new(&self.interpreter)
            .arg(&artifact)
            .stdin(stdin)
            .stdout(Stdio::from(output))
            .stderr(Stdio::from(stderr))
            .spawn()
            .with_context(|| format!("failed to launch interpreter {}", self.interpreter))?;

        // `Command` owns the input and capture handles, so they are closed once it drops.
        let completion = wait_for(&mut child, self.timeout)
            .with_context(|| format!("failed to wait for interpreter on {}", artifact.display()))?;
        if completion == Completion::TimedOut {
            return Ok(TestResult::Timeout { stage: Stage::Run });
        }

        if output_matches(case, capture)? {
            Ok(TestResult::Ok)
        } else {
            Ok(TestResult::WrongAnswer)
        }
    }
}

/// Compare the capture with `<case>.output`, or require it to be empty when there is none
fn output_matches(case: &TestCase, capture: &Path) -> Result<bool> {
    let expected_path = case.expected_output_path();
    if expected_path.is_file() {
        let expected = fs::read(&expected_path)
            .with_context(|| format!("failed to read {}", expected_path.display()))?;
        let actual =
            fs::read(capture).with_context(|| format!("failed to read {}", capture.display()))?;
        Ok(expected == actual)
    } else {
        let len = fs::metadata(capture)
            .with_context(|| format!("failed to stat {}", capture.display()))?
            .len();
        Ok(len == 0)
    }
}
