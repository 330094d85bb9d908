//! Line-oriented source buffer with scoped indentation.
//!
//! Indentation is held in an `Rc<Cell<_>>` so an [`IndentGuard`] can be alive
//! while the writer itself is borrowed mutably for the lines it indents.
use std::cell::Cell;
use std::rc::Rc;

const INDENT: &str = "    ";

pub struct CodeWriter {
    out: String,
    indent_level: Rc<Cell<usize>>,
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeWriter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent_level: Rc::new(Cell::new(0)),
        }
    }

    /// One indented line. Blank text produces a bare newline with no trailing spaces.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.trim().is_empty() {
            for _ in 0..self.indent_level.get() {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub fn blank_line(&mut self) {
        self.out.push('\n');
    }

    /// Indentation increases while the guard is alive.
    pub fn indent(&mut self) -> IndentGuard {
        self.indent_level.set(self.indent_level.get() + 1);
        IndentGuard {
            indent_level: Rc::clone(&self.indent_level),
        }
    }

    /// `header {`, the indented body, then `}`.
    pub fn block(&mut self, header: &str, body: impl FnOnce(&mut Self)) {
        self.line(format!("{header} {{"));
        {
            let _indent = self.indent();
            body(self);
        }
        self.line("}");
    }

    /// `///` lines for trimmed `text`; interior blank lines stay as bare `///`.
    pub fn doc_comment(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        for line in text.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                self.line("///");
            } else {
                self.line(format!("/// {line}"));
            }
        }
    }

    #[cfg(test)]
    fn indent_level(&self) -> usize {
        self.indent_level.get()
    }

    pub fn finish(self) -> String {
        self.out
    }
}

pub struct IndentGuard {
    indent_level: Rc<Cell<usize>>,
}

impl Drop for IndentGuard {
    fn drop(&mut self) {
        self.indent_level.set(self.indent_level.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_scope_indentation() {
        let mut w = CodeWriter::new();
        w.line("a");
        {
            let _outer = w.indent();
            w.line("b");
            {
                let _inner = w.indent();
                assert_eq!(w.indent_level(), 2);
                w.line("c");
            }
            w.line("");
            w.line("d");
        }
        w.line("e");
        assert_eq!(w.finish(), "a\n    b\n        c\n\n    d\ne\n");
    }

    #[test]
    fn blocks_wrap_their_body() {
        let mut w = CodeWriter::new();
        w.block("impl Foo", |w| {
            w.block("fn bar(&self)", |w| w.line("todo!()"));
        });
        assert_eq!(w.finish(), "impl Foo {\n    fn bar(&self) {\n        todo!()\n    }\n}\n");
    }

    #[test]
    fn doc_comments_keep_paragraph_breaks() {
        let mut w = CodeWriter::new();
        let guard = w.indent();
        w.doc_comment("  First line.  \r\n\nSecond paragraph.\n");
        w.doc_comment("   ");
        drop(guard);
        assert_eq!(w.finish(), "    /// First line.\n    ///\n    /// Second paragraph.\n");
    }
}
