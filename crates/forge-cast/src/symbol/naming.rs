//! Target naming conventions (Python)
//!
//! Pure string transformations. Everything that decides *what* a
//! declaration is called in the generated package funnels through here so
//! the same IR name always lands on the same identifier.

/// Python reserved words that cannot be used as identifiers
pub const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Escape a Python reserved word by appending `_`
pub fn to_python_identifier(name: &str) -> String {
    if PYTHON_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Convert camelCase / PascalCase to snake_case
///
/// Leading and trailing underscores are kept. All-caps words are lowered
/// as a whole, and acronym runs are split before their last capital
/// (`HTTPServer` becomes `http_server`).
pub fn to_snake_case(name: &str) -> String {
    let leading = name.len() - name.trim_start_matches('_').len();
    let trimmed = name.trim_start_matches('_');
    let trailing = trimmed.len() - trimmed.trim_end_matches('_').len();
    let core = &trimmed[..trimmed.len() - trailing];

    let mut result = "_".repeat(leading);
    if core.to_uppercase() == core {
        result.push_str(&core.to_lowercase());
    } else {
        let chars: Vec<char> = core.chars().collect();
        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && c.is_uppercase() {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
                if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                    result.push('_');
                }
            }
            result.extend(c.to_lowercase());
        }
    }
    result.push_str(&"_".repeat(trailing));
    result
}

/// Python name of a method
pub fn python_method_name(name: &str, protected: bool) -> String {
    let value = to_python_identifier(&to_snake_case(name));
    if protected {
        format!("_{}", value)
    } else {
        value
    }
}

/// Python name of a property or struct field
pub fn python_property_name(name: &str, constant: bool, protected: bool) -> String {
    let mut value = to_python_identifier(&to_snake_case(name));
    if constant {
        value = value.to_uppercase();
    }
    if protected {
        value = format!("_{}", value);
    }
    value
}

/// Python name of a parameter
///
/// Positional parameters that collide with a lifted keyword argument get
/// trailing `_` until they are unique.
pub fn python_parameter_name(name: &str, lifted: &[String]) -> String {
    let mut result = to_python_identifier(&to_snake_case(name));
    while lifted.iter().any(|l| *l == result) {
        result.push('_');
    }
    result
}

/// Append `_` to `name` until it is not in `in_use`
pub fn slugify_as_needed(name: &str, in_use: &[String]) -> String {
    let mut name = name.to_string();
    while in_use.iter().any(|u| *u == name) {
        name.push('_');
    }
    name
}
