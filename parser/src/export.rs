use std::fmt::Write;

use crate::{ast::AstNode, lexer::escape_json};

fn escape_dot(string: &str) -> String {
    string.replace('\\', "\\\\").replace('"', "\\\"")
}

impl AstNode {
    /// Indented outline, two spaces per level.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out, 0);
        out
    }

    fn write_text(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(self.kind().name());
        if let Some(value) = self.value() {
            let _ = write!(out, " ({value})");
        }
        out.push('\n');

        for child in self.children() {
            child.write_text(out, depth + 1);
        }
    }

    /// Graphviz rendering. Node ids are handed out in pre-order starting at 0.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph AST {\n  node [shape=box, fontname=\"Arial\"];\n");
        let mut counter = 0;
        self.write_dot(&mut out, None, &mut counter);
        out.push_str("}\n");
        out
    }

    fn write_dot(&self, out: &mut String, parent: Option<usize>, counter: &mut usize) {
        let id = *counter;
        *counter += 1;

        let _ = write!(out, "  node{id} [label=\"{}", self.kind().name());
        if let Some(value) = self.value() {
            let _ = write!(out, "\\n{}", escape_dot(value));
        }
        out.push_str("\"];\n");

        if let Some(parent) = parent {
            let _ = writeln!(out, "  node{parent} -> node{id};");
        }

        for child in self.children() {
            child.write_dot(out, Some(id), counter);
        }
    }

    pub fn to_json(&self) -> String {
        let mut out = String::from("{\n  \"ast\": ");
        self.write_json(&mut out, 1);
        out.push_str("\n}\n");
        out
    }

    fn write_json(&self, out: &mut String, depth: usize) {
        let inner = "  ".repeat(depth + 1);

        out.push_str("{\n");
        let _ = writeln!(out, "{inner}\"type\": \"{}\",", self.kind().name());
        match self.value() {
            Some(value) => {
                let _ = writeln!(out, "{inner}\"value\": \"{}\",", escape_json(value));
            }
            None => {
                let _ = writeln!(out, "{inner}\"value\": null,");
            }
        }

        if self.children().is_empty() {
            let _ = writeln!(out, "{inner}\"children\": []");
        } else {
            let _ = writeln!(out, "{inner}\"children\": [");
            let child_indent = "  ".repeat(depth + 2);
            for (i, child) in self.children().iter().enumerate() {
                out.push_str(&child_indent);
                child.write_json(out, depth + 2);
                if i + 1 != self.children().len() {
                    out.push(',');
                }
                out.push('\n');
            }
            let _ = writeln!(out, "{inner}]");
        }

        out.push_str(&"  ".repeat(depth));
        out.push('}');
    }
}
