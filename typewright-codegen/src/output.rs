//! Formatting and persistence of generated files.

use crate::error::CodegenError;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Formats generated source text before it is written.
pub trait SourceFormatter {
    /// Returns the formatted text.
    ///
    /// # Errors
    /// Returns [`CodegenError::Format`] if formatting fails.
    fn format(&self, source: &str) -> Result<String, CodegenError>;
}

/// Formatter that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughFormatter;

impl SourceFormatter for PassthroughFormatter {
    fn format(&self, source: &str) -> Result<String, CodegenError> {
        Ok(source.to_string())
    }
}

/// Formatter piping text through an external command such as `gofmt`.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    /// Creates a formatter running `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Adds a command line argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Returns a formatter running `gofmt`.
    #[must_use]
    pub fn gofmt() -> Self {
        Self::new("gofmt")
    }
}

impl SourceFormatter for CommandFormatter {
    fn format(&self, source: &str) -> Result<String, CodegenError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CodegenError::format(format!("{} has no stdin", self.program)))?;
        let input = source.to_string();
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child.wait_with_output()?;
        writer
            .join()
            .map_err(|_| CodegenError::format("formatter input thread panicked"))??;

        if !output.status.success() {
            return Err(CodegenError::format(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|err| CodegenError::format(format!("{} produced invalid UTF-8: {err}", self.program)))
    }
}

/// Destination of generated files.
pub trait OutputSink {
    /// Writes `contents` to `relative`, replacing any previous file.
    ///
    /// # Errors
    /// Returns [`CodegenError::Io`] if the file cannot be written.
    fn write(&mut self, relative: &Path, contents: &str) -> Result<(), CodegenError>;
}

/// Writes files below a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Creates a sink rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl OutputSink for DirectorySink {
    fn write(&mut self, relative: &Path, contents: &str) -> Result<(), CodegenError> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        std::fs::write(&path, contents)?;
        tracing::info!("Wrote {}", path.display());
        Ok(())
    }
}

/// Keeps files in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: BTreeMap<PathBuf, String>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the contents written to `relative`.
    #[must_use]
    pub fn get(&self, relative: impl AsRef<Path>) -> Option<&str> {
        self.files.get(relative.as_ref()).map(String::as_str)
    }

    /// Iterates over written files sorted by path.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files.iter().map(|(p, c)| (p.as_path(), c.as_str()))
    }

    /// Returns the number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, relative: &Path, contents: &str) -> Result<(), CodegenError> {
        self.files.insert(relative.to_path_buf(), contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough() {
        assert_eq!(
            PassthroughFormatter.format("package p\n").expect("format"),
            "package p\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_command_formatter() {
        let formatted = CommandFormatter::new("cat")
            .format("package p\n")
            .expect("format");
        assert_eq!(formatted, "package p\n");

        let err = CommandFormatter::new("false").format("x").unwrap_err();
        assert!(matches!(err, CodegenError::Format { .. }));
    }

    #[test]
    fn test_missing_formatter() {
        let err = CommandFormatter::new("typewright-no-such-formatter")
            .format("x")
            .unwrap_err();
        assert!(matches!(err, CodegenError::Io(_)));
    }

    #[test]
    fn test_directory_sink_replaces() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sink = DirectorySink::new(dir.path());
        let relative = Path::new("apis/storage/zz_bucket_types.go");

        sink.write(relative, "old").expect("write");
        sink.write(relative, "new").expect("write");

        let written = std::fs::read_to_string(dir.path().join(relative)).expect("read");
        assert_eq!(written, "new");
        assert_eq!(sink.root(), dir.path());
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        sink.write(Path::new("b.go"), "b").expect("write");
        sink.write(Path::new("a.go"), "a").expect("write");

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.get("a.go"), Some("a"));
        let order: Vec<_> = sink.iter().map(|(p, _)| p.to_path_buf()).collect();
        assert_eq!(order, vec![PathBuf::from("a.go"), PathBuf::from("b.go")]);
    }
}
