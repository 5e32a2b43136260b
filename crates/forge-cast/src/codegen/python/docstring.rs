//! Docstrings
//!
//! reStructuredText field lists in `'''` quotes. Documentation text is
//! written verbatim.

use crate::codegen::writer::CodeWriter;
use crate::ir::{Docs, Stability};
use crate::symbol::naming::python_parameter_name;

const QUOTES: &str = "'''";

/// A documented argument (`:param name: ...`)
#[derive(Debug, Clone)]
pub struct DocArgument<'a> {
    pub name: &'a str,
    pub docs: Option<&'a Docs>,
}

/// Summary with its stability prefix
pub fn render_summary(docs: &Docs) -> String {
    let summary = docs.summary.as_deref().unwrap_or_default();
    match docs.stability {
        Some(Stability::Experimental) => format!("(experimental) {}", summary),
        Some(Stability::Deprecated) => format!("(deprecated) {}", summary),
        _ => summary.to_string(),
    }
}

/// One-line description used for arguments
pub fn oneline_description(docs: Option<&Docs>) -> String {
    let Some(docs) = docs.filter(|d| !d.is_empty()) else {
        return "-".to_string();
    };

    let mut parts = Vec::new();
    if docs.summary.is_some() {
        parts.push(render_summary(docs));
    }
    if let Some(remarks) = &docs.remarks {
        parts.push(remarks.clone());
    }
    if let Some(default) = &docs.default {
        parts.push(format!("Default: {}", default));
    }
    parts.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collects docstring lines, collapsing consecutive blank lines
#[derive(Default)]
struct Lines(Vec<String>);

impl Lines {
    fn push(&mut self, line: impl Into<String>) {
        self.0.push(line.into());
    }

    fn brk(&mut self) {
        if self.0.last().map_or(false, |l| !l.trim().is_empty()) {
            self.0.push(String::new());
        }
    }

    fn block(&mut self, heading: &str, content: &str, brk: bool) {
        if brk {
            self.brk();
        }
        let content_lines: Vec<&str> = content.split('\n').collect();
        if content_lines.len() <= 1 {
            self.push(format!(":{}: {}", heading, content_lines.concat()).trim().to_string());
        } else {
            self.push(format!(":{}:", heading));
            self.brk();
            for line in content_lines {
                self.push(line.trim());
            }
        }
        if brk {
            self.brk();
        }
    }
}

/// Write the docstring of a declaration or member
///
/// Nothing is written for empty docs unless arguments are given: the
/// `:param:` lines are what documentation tooling hangs type annotations on.
pub fn emit_docstring(
    code: &mut CodeWriter,
    docs: Option<&Docs>,
    arguments: Option<&[DocArgument<'_>]>,
    trailing_newline: bool,
) {
    let empty = Docs::default();
    let docs = docs.unwrap_or(&empty);
    if docs.is_empty() && arguments.is_none() {
        return;
    }

    let mut lines = Lines::default();

    if docs.summary.is_some() {
        for line in render_summary(docs).split('\n') {
            lines.push(line);
        }
        lines.brk();
    } else {
        lines.push("");
    }

    if let Some(remarks) = &docs.remarks {
        lines.brk();
        for line in remarks.split('\n') {
            lines.push(line);
        }
        lines.brk();
    }

    if let Some(arguments) = arguments.filter(|a| !a.is_empty()) {
        lines.brk();
        for arg in arguments {
            lines.push(format!(
                ":param {}: {}",
                python_parameter_name(arg.name, &[]),
                oneline_description(arg.docs)
            ));
        }
        lines.brk();
    }

    if let Some(default) = &docs.default {
        lines.block("default", default, true);
    }
    if let Some(returns) = &docs.returns {
        lines.block("return", returns, true);
    }
    if let Some(deprecated) = &docs.deprecated {
        lines.block("deprecated", deprecated, true);
    }
    if let Some(see) = &docs.see {
        lines.block("see", see, false);
    }
    if let Some(stability) = docs.stability.filter(Stability::is_notable) {
        lines.block("stability", stability.as_str(), false);
    }
    if docs.subclassable {
        lines.block("subclassable", "Yes", true);
    }
    for (key, value) in &docs.custom {
        lines.block(key, value, false);
    }

    if let Some(example) = &docs.example {
        lines.brk();
        lines.push("Example::");
        lines.push("");
        for line in example.split('\n') {
            lines.push(format!("    {}", line));
        }
        lines.brk();
    }

    let mut lines = lines.0;
    while lines.last().map_or(false, String::is_empty) {
        lines.pop();
    }

    match lines.as_slice() {
        [] => return,
        [only] => code.line(format!("{}{}{}", QUOTES, only, QUOTES)),
        [first, rest @ ..] => {
            code.line(format!("{}{}", QUOTES, first));
            for line in rest {
                code.line(line.trim_end());
            }
            code.line(QUOTES);
        }
    }

    if trailing_newline {
        code.blank();
    }
}
