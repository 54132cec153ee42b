//! Test discovery - find `.lat` cases under `SUITE/*/{good,bad}/`

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Extension of test sources
pub const SOURCE_EXTENSION: &str = "lat";

/// Which kind of group a case belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestGroup {
    /// Expected to compile, run and match its `.output`
    Good,
    /// Expected to be rejected by the compiler
    Bad,
}

impl TestGroup {
    /// Directory name of the group inside a subsuite
    pub fn dir_name(self) -> &'static str {
        match self {
            TestGroup::Good => "good",
            TestGroup::Bad => "bad",
        }
    }
}

impl fmt::Display for TestGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A discovered test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Absolute path of the `.lat` source
    pub source: PathBuf,
    /// Base path without extension, as reported (relative to the suite root)
    pub display: PathBuf,
    /// Group the case was found in
    pub group: TestGroup,
}

impl TestCase {
    /// Absolute base path (source without its extension)
    pub fn base(&self) -> PathBuf {
        self.source.with_extension("")
    }

    /// Optional standard input for the interpreter
    pub fn input_path(&self) -> PathBuf {
        self.sibling("input")
    }

    /// Optional expected interpreter output
    pub fn expected_output_path(&self) -> PathBuf {
        self.sibling("output")
    }

    /// Bytecode written by the compiler
    pub fn artifact_path(&self) -> PathBuf {
        self.sibling("bc")
    }

    /// Transient capture of the interpreter's stdout and stderr
    pub fn capture_path(&self) -> PathBuf {
        self.sibling("proc.output")
    }

    // Appends rather than replaces, so `a.b.lat` keeps its `a.b` stem.
    fn sibling(&self, extension: &str) -> PathBuf {
        let mut path = self.base().into_os_string();
        path.push(".");
        path.push(extension);
        PathBuf::from(path)
    }
}

/// A group directory together with its cases, in run order
#[derive(Debug, Clone, Default)]
pub struct GroupDir {
    pub dir: PathBuf,
    pub cases: Vec<TestCase>,
}

/// Everything found for one suite
#[derive(Debug, Clone, Default)]
pub struct SuitePlan {
    /// Suite name as given by the user
    pub name: String,
    /// `good/` groups, sorted by subsuite
    pub good: Vec<GroupDir>,
    /// `bad/` groups, sorted by subsuite
    pub bad: Vec<GroupDir>,
}

impl SuitePlan {
    /// Discover the cases of `name`, resolved against `root`
    ///
    /// A suite directory that does not exist yields an empty plan.
    pub fn discover(root: &Path, name: &str) -> Self {
        let suite_dir = root.join(name);
        let display_dir = PathBuf::from(name);

        let mut plan = SuitePlan {
            name: name.to_string(),
            ..Default::default()
        };

        let mut subsuites = sorted_entries(&suite_dir)
            .into_iter()
            .filter(|(_, is_dir)| *is_dir)
            .map(|(name, _)| name)
            .collect::<Vec<_>>();
        // Groups run in `SUITE/<sub>/` path order, where `core-ext/` precedes `core/`.
        subsuites.sort_by_cached_key(|name| {
            let mut key = name.clone();
            key.push("/");
            key
        });

        for group in [TestGroup::Good, TestGroup::Bad] {
            for sub in &subsuites {
                let dir = suite_dir.join(sub).join(group.dir_name());
                if !dir.is_dir() {
                    continue;
                }
                let display = display_dir.join(sub).join(group.dir_name());
                let cases = discover_cases(&dir, &display, group);
                debug!(dir = %dir.display(), cases = cases.len(), "discovered group");

                let group_dir = GroupDir { dir, cases };
                match group {
                    TestGroup::Good => plan.good.push(group_dir),
                    TestGroup::Bad => plan.bad.push(group_dir),
                }
            }
        }

        plan
    }

    /// Groups in run order: every good group, then every bad group
    pub fn groups(&self) -> impl Iterator<Item = &GroupDir> {
        self.good.iter().chain(self.bad.iter())
    }

    /// All cases in run order
    pub fn cases(&self) -> impl Iterator<Item = &TestCase> {
        self.groups().flat_map(|g| g.cases.iter())
    }

    /// Get count of cases
    pub fn len(&self) -> usize {
        self.groups().map(|g| g.cases.len()).sum()
    }

    /// Check if the suite has any cases
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Find the `.lat` files of one group directory
fn discover_cases(dir: &Path, display: &Path, group: TestGroup) -> Vec<TestCase> {
    sorted_entries(dir)
        .into_iter()
        .filter(|(_, is_dir)| !*is_dir)
        .filter(|(name, _)| Path::new(name).extension() == Some(OsStr::new(SOURCE_EXTENSION)))
        .map(|(name, _)| {
            let source = dir.join(&name);
            let stem = Path::new(&name).with_extension("");
            TestCase {
                source,
                display: display.join(stem),
                group,
            }
        })
        .collect()
}

/// Immediate, non-hidden children of `dir` sorted by name, with a directory flag
///
/// Hidden names are skipped the way a shell `*` glob skips them.
fn sorted_entries(dir: &Path) -> Vec<(OsString, bool)> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name();
            if name.as_encoded_bytes().starts_with(b".") {
                return None;
            }
            Some((name.to_os_string(), entry.file_type().is_dir()))
        })
        .collect()
}
