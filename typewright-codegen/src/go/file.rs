//! Go source file assembly.

use crate::error::CodegenError;
use crate::go::types::Rendered;
use crate::imports::ImportSet;
use crate::printer::PrintedFunction;

/// A Go source file under construction.
#[derive(Debug, Clone, Default)]
pub struct GoFile {
    header: String,
    package: String,
    imports: ImportSet,
    fragments: Vec<String>,
}

impl GoFile {
    /// Creates an empty file for package `package`.
    #[must_use]
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Self::default()
        }
    }

    /// Sets the header emitted verbatim above the package clause.
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Appends a top-level fragment and the imports it needs.
    ///
    /// # Errors
    /// Returns [`CodegenError::ImportAliasConflict`] on alias collisions.
    pub fn push(&mut self, text: &str, imports: &ImportSet) -> Result<(), CodegenError> {
        self.imports.merge(imports)?;
        let text = text.trim_matches('\n');
        if !text.is_empty() {
            self.fragments.push(text.to_string());
        }
        Ok(())
    }

    /// Appends a rendered declaration.
    ///
    /// # Errors
    /// Returns [`CodegenError::ImportAliasConflict`] on alias collisions.
    pub fn push_rendered(&mut self, rendered: &Rendered) -> Result<(), CodegenError> {
        self.push(&rendered.text, &rendered.imports)
    }

    /// Appends a printed function.
    ///
    /// # Errors
    /// Returns [`CodegenError::ImportAliasConflict`] on alias collisions.
    pub fn push_function(&mut self, function: &PrintedFunction) -> Result<(), CodegenError> {
        self.push(&function.text, &function.imports)
    }

    /// Returns the imports collected so far.
    #[must_use]
    pub fn imports(&self) -> &ImportSet {
        &self.imports
    }

    /// Returns the number of fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns true if no fragment was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Renders the complete file.
    #[must_use]
    pub fn render(&self) -> String {
        let mut output = String::new();
        let header = self.header.trim();
        if !header.is_empty() {
            output.push_str(header);
            output.push_str("\n\n");
        }
        output.push_str(&format!("package {}\n", self.package));

        let mut body = self.imports.render();
        for fragment in &self.fragments {
            body.push('\n');
            body.push_str(fragment);
            body.push('\n');
        }
        if !body.is_empty() {
            output.push('\n');
            output.push_str(&reindent(&body));
        }
        output
    }
}

/// Re-indents Go source by brace and parenthesis depth.
///
/// Leading whitespace is replaced with tabs, runs of blank lines collapse to
/// one, and blank lines right after an opening line or before a closing line
/// are dropped.
#[must_use]
pub fn reindent(source: &str) -> String {
    let mut output = String::new();
    let mut depth = 0usize;
    let mut pending_blank = false;
    let mut after_open = true;

    for raw in source.lines() {
        let line = raw.trim();
        if line.is_empty() {
            pending_blank = !after_open;
            continue;
        }

        let scan = scan_line(line);
        if pending_blank && scan.leading_closes == 0 {
            output.push('\n');
        }
        pending_blank = false;

        let indent = depth.saturating_sub(scan.leading_closes);
        for _ in 0..indent {
            output.push('\t');
        }
        output.push_str(line);
        output.push('\n');

        depth = (depth + scan.opens).saturating_sub(scan.closes);
        after_open = line.ends_with('{') || line.ends_with('(');
    }
    output
}

#[derive(Debug, Default)]
struct LineScan {
    opens: usize,
    closes: usize,
    leading_closes: usize,
}

/// Counts delimiters outside of literals and comments.
fn scan_line(line: &str) -> LineScan {
    let mut scan = LineScan::default();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut leading = true;
    let mut previous = '\0';

    for c in line.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' && q != '`' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '`' | '\'' => {
                quote = Some(c);
                leading = false;
            }
            '/' if previous == '/' => break,
            '{' | '(' => {
                scan.opens += 1;
                leading = false;
            }
            '}' | ')' => {
                scan.closes += 1;
                if leading {
                    scan.leading_closes += 1;
                }
            }
            c if c.is_whitespace() => {}
            _ => leading = false,
        }
        previous = c;
    }
    scan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reindent() {
        let source = "func f(a *A) bool {\n\nif a == nil {\n  return false\n}\n\n\nfor i := range a.X {\nx := \"{\"\n}\nreturn true\n}\n";
        assert_eq!(
            reindent(source),
            "func f(a *A) bool {\n\tif a == nil {\n\t\treturn false\n\t}\n\n\tfor i := range a.X {\n\t\tx := \"{\"\n\t}\n\treturn true\n}\n"
        );
    }

    #[test]
    fn test_reindent_else_and_parens() {
        let source = "if x {\na()\n} else {\nb()\n}\nimport (\n\"fmt\"\n)\n";
        assert_eq!(
            reindent(source),
            "if x {\n\ta()\n} else {\n\tb()\n}\nimport (\n\t\"fmt\"\n)\n"
        );
    }

    #[test]
    fn test_reindent_ignores_comments_and_tags() {
        let source = "type T struct {\n// see {docs}\nName string `json:\"name{\"`\n}\n";
        assert_eq!(
            reindent(source),
            "type T struct {\n\t// see {docs}\n\tName string `json:\"name{\"`\n}\n"
        );
    }

    #[test]
    fn test_render_file() {
        let mut imports = ImportSet::new();
        imports
            .insert("example.com/sdk/storage", "sdkstorage")
            .expect("insert");

        let mut file = GoFile::new("v1alpha1").with_header("// Code generated by typewright. DO NOT EDIT.");
        file.push("type A struct {\nB sdkstorage.B\n}\n", &imports)
            .expect("push");
        file.push("\n", &ImportSet::new()).expect("push");
        assert_eq!(file.len(), 1);

        assert_eq!(
            file.render(),
            "// Code generated by typewright. DO NOT EDIT.\n\n\
             package v1alpha1\n\n\
             import (\n\tsdkstorage \"example.com/sdk/storage\"\n)\n\n\
             type A struct {\n\tB sdkstorage.B\n}\n"
        );
    }

    #[test]
    fn test_render_empty_file() {
        assert_eq!(GoFile::new("p").render(), "package p\n");
    }
}
