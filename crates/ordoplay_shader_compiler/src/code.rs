// SPDX-License-Identifier: MIT OR Apache-2.0
//! Indented text buffer.

/// Accumulates lines of source at the current indentation
#[derive(Debug, Clone, Default)]
pub struct CodeBuffer {
    text: String,
    indent: usize,
}

impl CodeBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line
    pub fn line(&mut self, line: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.text.push('\t');
        }
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    /// Increase indentation
    pub fn indent(&mut self) {
        self.indent += 1;
    }

    /// Decrease indentation
    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Open a `{` block
    pub fn open(&mut self) {
        self.line("{");
        self.indent();
    }

    /// Close a `}` block
    pub fn close(&mut self) {
        self.dedent();
        self.line("}");
    }

    /// Append captured text, re-indented to the current level
    pub fn splice(&mut self, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.text.push('\n');
            } else {
                self.line(line);
            }
        }
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Text written so far
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume into the written text
    pub fn into_string(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation() {
        let mut buffer = CodeBuffer::new();
        buffer.line("void main()");
        buffer.open();
        buffer.line("float v0 = 1.0;");
        buffer.close();
        assert_eq!(buffer.as_str(), "void main()\n{\n\tfloat v0 = 1.0;\n}\n");
    }

    #[test]
    fn test_splice_reindents() {
        let mut inner = CodeBuffer::new();
        inner.line("if (v0 > 0.0)");
        inner.line("\tbreak;");

        let mut outer = CodeBuffer::new();
        outer.open();
        outer.splice(inner.as_str());
        outer.close();
        assert_eq!(outer.into_string(), "{\n\tif (v0 > 0.0)\n\t\tbreak;\n}\n");
    }
}
