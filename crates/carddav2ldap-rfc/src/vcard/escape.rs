//! Backslash escapes in property values (RFC 6350 §3.4).

/// Resolves `\n`, `\N`, `\,`, `\;`, `\:` and `\\`.
///
/// Any other escape is left as written.
#[must_use]
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(escaped @ (',' | ';' | ':' | '\\')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Splits on every `separator` that is not preceded by a backslash.
///
/// Escapes inside the parts are kept, so the result can be split again
/// or passed to [`unescape`].
#[must_use]
pub fn split_unescaped(s: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut chars = s.char_indices();

    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == separator {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }

    parts.push(&s[start..]);
    parts
}
