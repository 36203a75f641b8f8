//! Lexical well-formedness of identifiers and selectors.
//!
//! The installer checks every name it is asked to define against these
//! rules, since definition records may come from sources that never went
//! through a parser.

/// Characters allowed in binary selectors.
const BINARY_CHARS: &str = "!%&*+,/<=>?@\\~|-";

/// `letter (letter | digit | '_')*`, where `_` counts as a letter.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The syntactic category of a message selector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    /// `printString`
    Unary,
    /// `+`, `->`, `~=`
    Binary,
    /// `at:put:` with the number of keyword parts.
    Keyword(usize),
}

impl SelectorKind {
    /// Number of arguments a message with this selector takes.
    pub fn arity(self) -> usize {
        match self {
            SelectorKind::Unary => 0,
            SelectorKind::Binary => 1,
            SelectorKind::Keyword(parts) => parts,
        }
    }
}

/// Classify a selector, or `None` if it is malformed.
pub fn selector_kind(text: &str) -> Option<SelectorKind> {
    if is_identifier(text) {
        return Some(SelectorKind::Unary);
    }
    if !text.is_empty() && text.chars().all(|c| BINARY_CHARS.contains(c)) {
        return Some(SelectorKind::Binary);
    }
    let body = text.strip_suffix(':')?;
    let mut parts = 0;
    for keyword in body.split(':') {
        if !is_identifier(keyword) {
            return None;
        }
        parts += 1;
    }
    Some(SelectorKind::Keyword(parts))
}
