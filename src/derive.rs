//! Alias derivation: the pure rules that turn a key into its alternate
//! spellings.
//!
//! Derivation is stable (same input, same output) and side-effect free;
//! the ambient expansion flag is read by callers and passed in, never
//! consulted here.

use unicode_ident::{is_xid_continue, is_xid_start};

use crate::key::Key;

/// Reserved words excluded from identifier aliases (strict and reserved
/// keywords). Sorted for binary search.
const KEYWORDS: &[&str] = &[
    "Self", "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
    "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

pub(crate) fn is_keyword(s: &str) -> bool {
    KEYWORDS.binary_search(&s).is_ok()
}

/// True when `s` is usable as an attribute name: identifier syntax and
/// not a reserved word.
pub(crate) fn is_identifier(s: &str) -> bool {
    if s == "_" || is_keyword(s) {
        return false;
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || is_xid_start(c) => chars.all(is_xid_continue),
        _ => false,
    }
}

/// Rewrite `text` into an identifier-shaped spelling: prefix `_` when the
/// text is empty, starts with a numeric character, or is a reserved word,
/// then replace each character that is illegal at its position with `_`.
pub(crate) fn normalize_identifier(text: &str) -> String {
    let needs_prefix = text.is_empty()
        || text.chars().next().is_some_and(char::is_numeric)
        || is_keyword(text);
    let base: std::borrow::Cow<'_, str> = if needs_prefix {
        format!("_{text}").into()
    } else {
        text.into()
    };
    base.chars()
        .enumerate()
        .map(|(i, c)| {
            let legal = if i == 0 {
                c == '_' || is_xid_start(c)
            } else {
                is_xid_continue(c)
            };
            if legal {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Ordered candidate spellings for `key`: the key itself first, then each
/// derived alias not already present.
///
/// With `expand` false the result is exactly `[key]`. With it true:
///
/// - an integer-like key with value `n` gains `"_{n}"`, plus `"_True"`
///   when `n == 1` and `"_False"` when `n == 0`;
/// - any other key gains its text form when that is an identifier and the
///   key is not itself textual, and its normalized identifier form when
///   that differs from the text.
pub fn aliases_for(key: &Key, expand: bool) -> Vec<Key> {
    let mut out = vec![key.clone()];
    if !expand {
        return out;
    }
    if let Some(n) = key.as_int() {
        push_unique(&mut out, Key::Str(format!("_{n}")));
        if n == 1 {
            push_unique(&mut out, Key::Str("_True".to_string()));
        }
        if n == 0 {
            push_unique(&mut out, Key::Str("_False".to_string()));
        }
    } else {
        let text = match key {
            Key::Str(s) => s.clone(),
            other => {
                let t = other.to_string();
                if is_identifier(&t) {
                    push_unique(&mut out, Key::Str(t.clone()));
                }
                t
            }
        };
        let norm = normalize_identifier(&text);
        if norm != text {
            push_unique(&mut out, Key::Str(norm));
        }
    }
    out
}

fn push_unique(out: &mut Vec<Key>, key: Key) {
    if !out.contains(&key) {
        out.push(key);
    }
}
