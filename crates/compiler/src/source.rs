use crate::error::ErrorKind;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

/// Provenance token written into every emitted module.
pub const GENERATED_MARKER: &str = "@generated by busgen";

const SKIPPED_DIRS: [&str; 1] = ["target"];
const TEST_DIRS: [&str; 2] = ["tests", "benches"];

/// One Rust source file and its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    relative: PathBuf,
    text: String,
}

impl SourceFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        Self { relative: path.clone(), path, text: text.into() }
    }

    fn loaded(root: &Path, path: PathBuf, text: String) -> Self {
        let relative = path.strip_prefix(root).map_or_else(|_| path.clone(), Path::to_path_buf);
        Self { path, relative, text }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the leading comment block carries the provenance marker.
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.text
            .lines()
            .map(str::trim)
            .take_while(|line| line.is_empty() || line.starts_with("//"))
            .any(|line| line.contains(GENERATED_MARKER))
    }

    /// Whether the file belongs to a test or bench target.
    #[must_use]
    pub fn is_test(&self) -> bool {
        let in_test_dir = self.relative.parent().is_some_and(|parent| {
            parent.components().any(|c| match c {
                Component::Normal(name) => TEST_DIRS.iter().any(|dir| name == *dir),
                _ => false,
            })
        });
        let name = self.relative.file_name().and_then(|n| n.to_str()).unwrap_or_default();

        in_test_dir
            || name == "tests.rs"
            || name.ends_with("_test.rs")
            || name.ends_with("_tests.rs")
    }

    /// The Rust module path of the file: `src/events.rs` is `events`, `src/lib.rs` is `crate`.
    #[must_use]
    pub fn module_path(&self) -> String {
        let components: Vec<&str> = self
            .relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();
        let start = components.iter().rposition(|c| *c == "src").map_or(0, |i| i + 1);

        let mut segments: Vec<&str> = components[start..].to_vec();
        if let Some(last) = segments.pop() {
            let stem = last.strip_suffix(".rs").unwrap_or(last);
            if !matches!(stem, "mod" | "lib" | "main") {
                segments.push(stem);
            }
        }

        if segments.is_empty() { "crate".to_owned() } else { segments.join("::") }
    }

    /// Trimmed `//` comment lines directly above the 1-based `line`, top to bottom.
    pub(crate) fn comments_above(&self, line: usize) -> Vec<&str> {
        let lines: Vec<&str> = self.text.lines().take(line.saturating_sub(1)).collect();
        let mut block: Vec<&str> = lines
            .iter()
            .rev()
            .map(|l| l.trim())
            .take_while(|l| l.starts_with("//"))
            .collect();
        block.reverse();
        block
    }
}

/// The directory a child module of the file at `path` lives in.
///
/// `src/events.rs` owns `src/events/`; `mod.rs`, `lib.rs` and `main.rs` own their
/// own directory.
#[must_use]
pub fn module_dir(path: &Path) -> PathBuf {
    let parent = path.parent().map_or_else(PathBuf::new, Path::to_path_buf);
    match path.file_stem().and_then(|s| s.to_str()) {
        Some("mod" | "lib" | "main") | None => parent,
        Some(stem) => parent.join(stem),
    }
}

/// An ordered set of source files, the unit a compilation consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    files: Vec<SourceFile>,
}

impl SourceSet {
    /// Builds a set from in-memory files, ordered by path.
    #[must_use]
    pub fn new(mut files: Vec<SourceFile>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self { files }
    }

    /// Collects every `*.rs` file below `dir`, skipping `target/` and hidden directories.
    pub fn load_dir(dir: &Path) -> Result<Self, ErrorKind> {
        let io_error = |path: &Path, message: String| ErrorKind::Io {
            path: path.display().to_string(),
            message,
        };

        if !dir.is_dir() {
            return Err(io_error(dir, "not a directory".to_owned()));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(dir).sort_by_file_name().into_iter().filter_entry(|e| keep(e, dir));
        for entry in walker {
            let entry = entry.map_err(|e| io_error(e.path().unwrap_or(dir), e.to_string()))?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "rs") {
                continue;
            }

            let text = fs::read_to_string(path).map_err(|e| io_error(path, e.to_string()))?;
            trace!(path = %path.display(), bytes = text.len(), "Loaded source file");
            files.push(SourceFile::loaded(dir, path.to_path_buf(), text));
        }

        debug!(dir = %dir.display(), files = files.len(), "Source tree loaded");
        Ok(Self::new(files))
    }

    #[must_use]
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Parses every non-test file.
    pub(crate) fn parse(&self) -> Result<Vec<ParsedFile<'_>>, ErrorKind> {
        self.files
            .iter()
            .filter(|file| !file.is_test())
            .map(|file| {
                syn::parse_file(&file.text)
                    .map(|syntax| ParsedFile { source: file, syntax })
                    .map_err(|e| ErrorKind::ParseFailure {
                        path: file.path.display().to_string(),
                        message: format!("line {}: {e}", e.span().start().line),
                    })
            })
            .collect()
    }
}

fn keep(entry: &DirEntry, root: &Path) -> bool {
    if entry.path() == root || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    !name.starts_with('.') && !SKIPPED_DIRS.iter().any(|dir| name == *dir)
}

/// A non-test source file with its syntax tree.
pub(crate) struct ParsedFile<'a> {
    pub(crate) source: &'a SourceFile,
    pub(crate) syntax: syn::File,
}
