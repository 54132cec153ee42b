//! Test reporter - display test results

use crate::testing::runner::{TestResult, TestRun};
use colored::*;
use std::io::{self, Write};
use std::time::Duration;

/// How results are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// One colored line per case, as it completes
    #[default]
    Lines,
    /// A single JSON document once every suite has run
    Json,
}

/// Test reporter with output configuration
pub struct TestReporter<W: Write> {
    out: W,
    format: ReportFormat,
    /// Print totals after the run
    summary: bool,
    /// Emit ANSI colors on labels
    color: bool,
}

impl<W: Write> TestReporter<W> {
    /// Create a new line reporter with colors on and no summary
    pub fn new(out: W) -> Self {
        Self {
            out,
            format: ReportFormat::Lines,
            summary: false,
            color: true,
        }
    }

    /// Select the output format
    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Print totals after the run
    pub fn with_summary(mut self, summary: bool) -> Self {
        self.summary = summary;
        self
    }

    /// Disable colored output
    pub fn with_no_color(mut self, no_color: bool) -> Self {
        self.color = !no_color;
        self
    }

    /// Report a single completed case
    pub fn report_run(&mut self, run: &TestRun) -> io::Result<()> {
        if self.format != ReportFormat::Lines {
            return Ok(());
        }

        writeln!(
            self.out,
            "{} {}",
            run.case.display.display(),
            self.paint(&run.result)
        )?;
        if run.result.has_trailing_blank_line() {
            writeln!(self.out)?;
        }
        self.out.flush()
    }

    /// Finish the report once every suite has run
    pub fn finish(&mut self, runs: &[TestRun], elapsed: Duration) -> io::Result<()> {
        match self.format {
            ReportFormat::Lines if self.summary => self.print_summary(runs, elapsed),
            ReportFormat::Lines => Ok(()),
            ReportFormat::Json => self.print_json(runs, elapsed),
        }?;
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, result: &TestResult) -> String {
        let label = result.label();
        if !self.color {
            return label.to_string();
        }
        let colored = match result {
            TestResult::Ok | TestResult::ExpectedCompileError => label.green(),
            TestResult::WrongAnswer | TestResult::Timeout { .. } => label.yellow(),
            TestResult::CompileError | TestResult::UnexpectedAccept => label.red(),
        };
        colored.to_string()
    }

    /// Print summary statistics
    fn print_summary(&mut self, runs: &[TestRun], elapsed: Duration) -> io::Result<()> {
        let total = runs.len();
        let passed = runs.iter().filter(|r| r.result.is_pass()).count();
        let failed = runs.iter().filter(|r| r.result.is_fail()).count();

        writeln!(self.out, "{}", "─".repeat(50))?;

        let (status, failed_count) = if !self.color {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            (status.to_string(), failed.to_string())
        } else if failed > 0 {
            (
                "FAILED".red().bold().to_string(),
                failed.to_string().red().bold().to_string(),
            )
        } else {
            ("PASSED".green().bold().to_string(), failed.to_string())
        };

        writeln!(
            self.out,
            "Test result: {} | {} total, {} passed, {} failed",
            status, total, passed, failed_count
        )?;
        writeln!(self.out, "Time: {:.2?}", elapsed)
    }

    fn print_json(&mut self, runs: &[TestRun], elapsed: Duration) -> io::Result<()> {
        let passed = runs.iter().filter(|r| r.result.is_pass()).count();
        let results: Vec<_> = runs
            .iter()
            .map(|r| {
                let stage = match r.result {
                    TestResult::Timeout { stage } => Some(stage.to_string()),
                    _ => None,
                };
                serde_json::json!({
                    "suite": r.suite,
                    "case": r.case.display.display().to_string(),
                    "group": r.case.group.to_string(),
                    "label": r.result.label(),
                    "passed": r.result.is_pass(),
                    "timed_out": stage,
                    "duration_ms": r.duration.as_millis(),
                })
            })
            .collect();

        writeln!(
            self.out,
            "{}",
            serde_json::json!({
                "tests": runs.len(),
                "passed": passed,
                "failed": runs.len() - passed,
                "duration_ms": elapsed.as_millis(),
                "results": results,
            })
        )
    }
}
