//! Indentation-aware text builder

/// Accumulates generated source text
///
/// `indented()` returns a view that shares the buffer but prefixes every
/// `writeln`/`write` with four more spaces; `append*` never indents.
#[derive(Debug)]
pub struct IndentedWriter<'a> {
    buffer: &'a mut String,
    indent: usize,
}

impl<'a> IndentedWriter<'a> {
    pub fn new(buffer: &'a mut String) -> Self {
        Self { buffer, indent: 0 }
    }

    pub fn indented(&mut self) -> IndentedWriter<'_> {
        IndentedWriter {
            buffer: &mut *self.buffer,
            indent: self.indent + 4,
        }
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn writeln(&mut self, text: &str) {
        self.write(text);
        self.buffer.push('\n');
    }

    pub fn write(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.buffer.push(' ');
        }
        self.buffer.push_str(text);
    }

    pub fn append(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn appendln(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    pub fn newline(&mut self) {
        self.buffer.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_indentation() {
        let mut out = String::new();
        {
            let mut w = IndentedWriter::new(&mut out);
            w.write("class A");
            w.appendln(" {");
            {
                let mut inner = w.indented();
                inner.writeln("var a: Int");
                inner.indented().writeln("deep");
            }
            w.writeln("}");
        }
        assert_eq!(out, "class A {\n    var a: Int\n        deep\n}\n");
    }
}
