//! Scratch suite trees for unit tests
//!
//! Sources are shell scripts and the "compiler" is `sh` itself: running a
//! `.lat` writes its `.bc` (another shell script) and exits with the chosen
//! code. The "interpreter" is `sh` too, and every bytecode run appends its
//! path to a log so tests can tell whether it was ever invoked.

use crate::testing::runner::TestRunner;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("suites")).unwrap();
        Self { dir }
    }

    /// Directory suites live in
    pub fn root(&self) -> PathBuf {
        self.dir.path().join("suites")
    }

    pub fn compiler(&self) -> PathBuf {
        PathBuf::from("sh")
    }

    pub fn interpreter(&self) -> String {
        "sh".to_string()
    }

    pub fn runner(&self) -> TestRunner {
        TestRunner::new(self.compiler()).with_interpreter(self.interpreter())
    }

    /// Write `<rel>.lat` that compiles `program` and exits with `exit_code`
    pub fn good_case(
        &self,
        rel: &str,
        exit_code: i32,
        program: &str,
        input: Option<&str>,
        output: Option<&str>,
    ) {
        let base = self.root().join(rel);
        let log = self.log_path();
        let source = format!(
            "cat > \"${{0%.lat}}.bc\" <<'LATTEST_EOF'\necho \"$0\" >> '{}'\n{}\nLATTEST_EOF\nexit {}\n",
            log.display(),
            program,
            exit_code
        );
        write(&with_suffix(&base, "lat"), &source);
        if let Some(input) = input {
            write(&with_suffix(&base, "input"), input);
        }
        if let Some(output) = output {
            write(&with_suffix(&base, "output"), output);
        }
    }

    /// Write `<rel>.lat` whose compilation only exits with `exit_code`
    pub fn bad_case(&self, rel: &str, exit_code: i32) {
        let base = self.root().join(rel);
        write(&with_suffix(&base, "lat"), &format!("exit {}\n", exit_code));
    }

    /// Write `<rel>.lat` with `source` as its whole compilation script
    pub fn raw_case(&self, rel: &str, source: &str) {
        write(&with_suffix(&self.root().join(rel), "lat"), source);
    }

    /// Bytecode paths the interpreter has run so far
    pub fn interpreter_calls(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn log_path(&self) -> PathBuf {
        self.dir.path().join("interpreter.log")
    }
}

fn with_suffix(base: &Path, extension: &str) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}
