//! Indentation-aware source writer
//!
//! [`CodeWriter`] accumulates lines at the current indentation level.
//! [`open_signature`] and [`emit_list`] implement the Black-compatible
//! wrapping rules: one line when it fits in [`TARGET_LINE_LENGTH`],
//! otherwise one element per line with trailing commas.

use std::fmt;

/// Target line length of the generated code
pub const TARGET_LINE_LENGTH: usize = 88;

const INDENT: &str = "    ";

/// Line buffer with an indentation level
#[derive(Debug, Default, Clone)]
pub struct CodeWriter {
    out: String,
    level: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a line at the current level; an empty line carries no indentation
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            self.out.push_str(&INDENT.repeat(self.level));
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    /// Write an empty line
    pub fn blank(&mut self) {
        self.line("");
    }

    /// Write a line, then indent
    pub fn indent(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.level += 1;
    }

    /// Unindent, then write a line
    pub fn unindent(&mut self, text: impl AsRef<str>) {
        self.dedent();
        self.line(text);
    }

    /// Unindent without writing
    pub fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Write `text:` and indent
    pub fn open_block(&mut self, text: impl AsRef<str>) {
        self.indent(format!("{}:", text.as_ref()));
    }

    /// Close a block opened with [`CodeWriter::open_block`]
    pub fn close_block(&mut self) {
        self.dedent();
    }

    /// Width of the current indentation
    pub fn current_indent_length(&self) -> usize {
        self.level * INDENT.len()
    }

    /// The text written so far
    pub fn finish(self) -> String {
        self.out
    }
}

impl fmt::Display for CodeWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.out)
    }
}

/// Summed length of `strings` and of the separators between them
pub fn total_size_of(strings: &[String], join: &str) -> (usize, usize) {
    let elements: usize = strings.iter().map(|s| s.chars().count()).sum();
    let joins = join.len() * strings.len().saturating_sub(1);
    (elements, joins)
}

/// Keyword of a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureKind {
    Class,
    Def,
}

impl SignatureKind {
    fn keyword(&self) -> &'static str {
        match self {
            SignatureKind::Class => "class",
            SignatureKind::Def => "def",
        }
    }
}

/// Open a `class` or `def` block
///
/// Parameters carrying a trailing `# comment` always force the exploded
/// form, since the comment would otherwise swallow the rest of the line.
pub fn open_signature(
    code: &mut CodeWriter,
    kind: SignatureKind,
    name: &str,
    params: &[String],
    returns: Option<&str>,
    comment: Option<&str>,
) {
    let prefix = format!("{} {}", kind.keyword(), name);
    let suffix = returns.map(|r| format!(" -> {}", r)).unwrap_or_default();
    let trailer = comment.map(|c| format!("  # {}", c)).unwrap_or_default();

    if params.is_empty() {
        let parens = if returns.is_some() { "()" } else { "" };
        code.open_block(format!("{}{}{}", prefix, parens, suffix));
        return;
    }

    let join = ", ";
    let (elements, joins) = total_size_of(params, join);
    let has_comments = params.iter().any(|p| has_trailing_comment(p));

    if !has_comments
        && TARGET_LINE_LENGTH
            > code.current_indent_length() + prefix.len() + elements + joins + suffix.len() + 2
    {
        code.indent(format!("{}({}){}:{}", prefix, params.join(join), suffix, trailer));
        return;
    }

    code.indent(format!("{}(", prefix));
    for param in params {
        code.line(with_trailing_comma(param));
    }
    code.dedent();
    code.indent(format!("){}:{}", suffix, trailer));
}

fn has_trailing_comment(param: &str) -> bool {
    param
        .find('#')
        .map_or(false, |i| !param[i + 1..].trim().is_empty())
}

/// Insert a comma before a trailing `# comment`, or append one
fn with_trailing_comma(param: &str) -> String {
    match param.find(" # ") {
        Some(i) => {
            let code_end = param[..i].trim_end().len();
            format!("{},{}", &param[..code_end], &param[code_end..])
        }
        None => format!("{},", param),
    }
}

/// Emit `prefix` + comma-separated `elements` + `suffix`, wrapping as needed
///
/// `if_multi` is placed around the elements when they do not fit on the
/// first line (parentheses for `from x import (...)`).
pub fn emit_list(
    code: &mut CodeWriter,
    prefix: &str,
    elements: &[String],
    suffix: &str,
    if_multi: Option<(&str, &str)>,
) {
    if elements.is_empty() {
        code.line(format!("{}{}", prefix, suffix));
        return;
    }

    let join = ", ";
    let (size, joins) = total_size_of(elements, join);
    if TARGET_LINE_LENGTH > code.current_indent_length() + prefix.len() + size + joins + suffix.len() {
        code.line(format!("{}{}{}", prefix, elements.join(join), suffix));
        return;
    }

    let (before, after) = if_multi.unwrap_or(("", ""));
    code.indent(format!("{}{}", prefix, before));
    if elements.len() == 1 {
        code.line(&elements[0]);
    } else if TARGET_LINE_LENGTH > code.current_indent_length() + size + joins {
        code.line(elements.join(join));
    } else {
        for element in elements {
            code.line(format!("{},", element));
        }
    }
    code.unindent(format!("{}{}", after, suffix));
}

/// Assign a dictionary literal, one entry per line
///
/// The compact form keeps everything on one line when it fits.
pub fn assign_dictionary(
    code: &mut CodeWriter,
    variable: &str,
    elements: &[String],
    trailing: &str,
    compact: bool,
) {
    let space = if compact { "" } else { " " };
    let prefix = format!("{}{}={}{{", variable, space, space);
    let suffix = format!("}}{}", trailing);

    if elements.is_empty() {
        code.line(format!("{}{}", prefix, suffix));
        return;
    }

    if compact {
        let (size, joins) = total_size_of(elements, ", ");
        if TARGET_LINE_LENGTH > prefix.len() + code.current_indent_length() + size + joins + suffix.len() {
            code.line(format!("{}{}{}", prefix, elements.join(", "), suffix));
            return;
        }
    }

    code.indent(prefix);
    for element in elements {
        code.line(format!("{},", element));
    }
    code.unindent(suffix);
}

/// Assign the result of a call, keyword arguments wrapped as needed
pub fn assign_call_result(code: &mut CodeWriter, variable: &str, function: &str, args: &[String]) {
    let prefix = format!("{} = {}(", variable, function);
    let suffix = ")";

    if args.is_empty() {
        code.line(format!("{}{}", prefix, suffix));
        return;
    }

    let join = ", ";
    let (size, joins) = total_size_of(args, join);
    if TARGET_LINE_LENGTH > code.current_indent_length() + prefix.len() + size + joins + suffix.len() {
        code.line(format!("{}{}{}", prefix, args.join(join), suffix));
        return;
    }

    code.indent(prefix);
    if TARGET_LINE_LENGTH > code.current_indent_length() + size + joins {
        code.line(args.join(join));
    } else {
        for arg in args {
            code.line(format!("{},", arg));
        }
    }
    code.unindent(suffix);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_blocks_and_blank_lines() {
        let mut code = CodeWriter::new();
        code.open_block("if x");
        code.line("pass");
        code.blank();
        code.close_block();
        code.line("done");
        assert_eq!(code.finish(), "if x:\n    pass\n\ndone\n");
    }

    #[test]
    fn test_signature_single_line() {
        let mut code = CodeWriter::new();
        open_signature(
            &mut code,
            SignatureKind::Def,
            "spin",
            &strings(&["self", "speed: jsii.Number"]),
            Some("None"),
            None,
        );
        code.line("...");
        assert_eq!(code.finish(), "def spin(self, speed: jsii.Number) -> None:\n    ...\n");
    }

    #[test]
    fn test_signature_without_params() {
        let mut code = CodeWriter::new();
        open_signature(&mut code, SignatureKind::Class, "_GadgetProxy", &[], None, None);
        open_signature(&mut code, SignatureKind::Def, "stub", &[], Some("None"), None);
        assert_eq!(code.finish(), "class _GadgetProxy:\n    def stub() -> None:\n");
    }

    #[test]
    fn test_signature_exploded_with_comment() {
        let mut code = CodeWriter::new();
        open_signature(
            &mut code,
            SignatureKind::Class,
            "_BaseProxy",
            &strings(&["Base", "jsii.proxy_for(Other) # type: ignore[misc]"]),
            None,
            None,
        );
        code.line("pass");
        assert_eq!(
            code.finish(),
            "class _BaseProxy(\n    Base,\n    jsii.proxy_for(Other), # type: ignore[misc]\n):\n    pass\n"
        );
    }

    #[test]
    fn test_signature_line_comment() {
        let mut code = CodeWriter::new();
        open_signature(
            &mut code,
            SignatureKind::Def,
            "value",
            &strings(&["cls"]),
            Some("jsii.Number"),
            Some("pyright: ignore [reportGeneralTypeIssues]"),
        );
        assert_eq!(
            code.finish(),
            "def value(cls) -> jsii.Number:  # pyright: ignore [reportGeneralTypeIssues]\n"
        );
    }

    #[test]
    fn test_signature_too_long_explodes() {
        let mut code = CodeWriter::new();
        let params = strings(&[
            "self",
            "first_parameter_name: typing.Optional[builtins.str] = None",
            "second: jsii.Number",
        ]);
        open_signature(&mut code, SignatureKind::Def, "method", &params, Some("None"), None);
        assert_eq!(
            code.finish(),
            "def method(\n    self,\n    first_parameter_name: typing.Optional[builtins.str] = None,\n    second: jsii.Number,\n) -> None:\n"
        );
    }

    #[test]
    fn test_emit_list_forms() {
        let mut code = CodeWriter::new();
        emit_list(&mut code, "from .core import ", &strings(&["A as _A"]), "", Some(("(", ")")));
        emit_list(&mut code, "@jsii.enum(", &[], ")", None);

        let long: Vec<String> = (0..8).map(|i| format!("Element{} as _Element{}_abcdef12", i, i)).collect();
        emit_list(&mut code, "from .core import ", &long, "", Some(("(", ")")));
        let out = code.finish();

        assert!(out.starts_with("from .core import A as _A\n@jsii.enum()\nfrom .core import (\n"));
        assert!(out.contains("    Element0 as _Element0_abcdef12,\n"));
        assert!(out.ends_with(")\n"));
    }

    #[test]
    fn test_assign_dictionary_compact() {
        let mut code = CodeWriter::new();
        assign_dictionary(&mut code, "name_mapping", &strings(&["\"size\": \"size\""]), ",", true);
        assign_dictionary(&mut code, "self._values", &strings(&["\"size\": size"]), "", false);
        assert_eq!(
            code.finish(),
            "name_mapping={\"size\": \"size\"},\nself._values = {\n    \"size\": size,\n}\n"
        );
    }

    #[test]
    fn test_assign_call_result() {
        let mut code = CodeWriter::new();
        assign_call_result(&mut code, "props", "GadgetProps", &strings(&["size=size"]));
        assert_eq!(code.finish(), "props = GadgetProps(size=size)\n");
    }
}
