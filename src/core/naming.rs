//! core::naming
//!
//! Name derivations shared by every emitter.
//!
//! # Features
//!
//! - Turn dotted method names into C identifier fragments
//! - Derive category identities
//! - Escape text for C string literals

/// Convert a dotted name into a C identifier fragment.
///
/// # Example
///
/// ```
/// use apiconf::core::naming::c_ident;
///
/// assert_eq!(c_ident("WT_SESSION.create"), "WT_SESSION_create");
/// assert_eq!(c_ident("open"), "open");
/// ```
pub fn c_ident(name: &str) -> String {
    name.replace('.', "_")
}

/// Whether `name` is usable as a C identifier.
pub fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Upper-case the first character, leaving the rest untouched.
///
/// # Example
///
/// ```
/// use apiconf::core::naming::capitalize_first;
///
/// assert_eq!(capitalize_first("checkpoint"), "Checkpoint");
/// assert_eq!(capitalize_first("Log"), "Log");
/// assert_eq!(capitalize_first(""), "");
/// ```
pub fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Escape text for the inside of a C string literal.
pub fn c_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}
