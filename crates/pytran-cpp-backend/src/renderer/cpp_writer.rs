// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Line-based writer for generating C++ with proper indentation.
//!
//! This is the emission buffer every pass appends to. It is append-only by
//! construction: ordering between output sections comes from pass sequencing,
//! never from rewinding or patching earlier output.

/// Writer context for generating C++ code.
/// Tracks indentation and handles line-based output.
pub struct CppWriter {
    out: String,
    indent: usize,
    at_line_start: bool,
}

impl CppWriter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
            at_line_start: true,
        }
    }

    /// Write a string, applying indentation at line starts.
    pub fn write(&mut self, s: &str) {
        for c in s.chars() {
            if c == '\n' {
                self.out.push('\n');
                self.at_line_start = true;
            } else {
                if self.at_line_start {
                    for _ in 0..self.indent {
                        self.out.push_str("  ");
                    }
                }
                self.at_line_start = false;
                self.out.push(c);
            }
        }
    }

    /// Write a complete line (adds newline at end).
    pub fn line(&mut self, s: &str) {
        self.write(s);
        self.write("\n");
    }

    /// Write an empty line.
    pub fn blank(&mut self) {
        self.out.push('\n');
        self.at_line_start = true;
    }

    /// Increase indentation for subsequent lines.
    pub fn indent(&mut self) {
        self.indent += 1;
    }

    /// Decrease indentation for subsequent lines.
    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "unbalanced dedent");
        if self.indent > 0 {
            self.indent -= 1;
        }
    }

    /// Bytes written so far. Passes compare this before and after a section
    /// to decide whether a separator is warranted.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Consume the writer and return the accumulated output.
    pub fn into_inner(self) -> String {
        self.out
    }
}

impl Default for CppWriter {
    fn default() -> Self {
        Self::new()
    }
}
