//! Logical lines and content-line syntax (RFC 6350 §3.2, §3.3).

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::property::{Parameter, Property};

/// Logical lines of a document, numbered from 1.
///
/// A line break followed by a space or tab is a fold and is removed along
/// with that whitespace character. CRLF and bare LF both end a line.
/// Blank lines are counted but not yielded.
pub struct LogicalLines<'a> {
    rest: &'a str,
    number: usize,
}

impl<'a> LogicalLines<'a> {
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            number: 0,
        }
    }
}

impl Iterator for LogicalLines<'_> {
    type Item = (usize, String);

    fn next(&mut self) -> Option<Self::Item> {
        while !self.rest.is_empty() {
            let mut line = String::new();
            loop {
                let (physical, remaining) = self
                    .rest
                    .split_once('\n')
                    .unwrap_or((self.rest, ""));
                line.push_str(physical.strip_suffix('\r').unwrap_or(physical));

                match remaining.as_bytes().first() {
                    Some(b' ' | b'\t') => self.rest = &remaining[1..],
                    _ => {
                        self.rest = remaining;
                        break;
                    }
                }
            }

            self.number += 1;
            if !line.trim().is_empty() {
                return Some((self.number, line));
            }
        }
        None
    }
}

/// ## Summary
/// Parses `[group.]NAME[;PARAM[=value[,value]*]]*:value`.
///
/// A parameter without `=` is a vCard 2.1 bare type (`TEL;HOME;FAX:`) and
/// becomes a `TYPE` parameter.
///
/// ## Errors
/// Fails when the `:` is missing, the name is not a token or a parameter
/// has an empty name.
pub fn parse_property(line: &str, number: usize) -> ParseResult<Property> {
    let colon = value_colon(line).ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::MalformedLine,
            number,
            "no ':' between name and value",
        )
    })?;
    let (head, value) = (&line[..colon], &line[colon + 1..]);

    let mut segments = split_outside_quotes(head, ';').into_iter();
    let qualified = segments.next().unwrap_or_default();
    let (group, name) = match qualified.split_once('.') {
        Some((group, name)) => (Some(group), name),
        None => (None, qualified),
    };

    if !is_token(name) || group.is_some_and(|g| !is_token(g)) {
        return Err(ParseError::new(
            ParseErrorKind::MalformedLine,
            number,
            format!("invalid property name '{qualified}'"),
        ));
    }

    let params = segments
        .filter(|segment| !segment.is_empty())
        .map(|segment| parse_parameter(segment, number))
        .collect::<ParseResult<Vec<_>>>()?;

    Ok(Property {
        group: group.map(str::to_string),
        name: name.to_ascii_uppercase(),
        params,
        value: value.to_string(),
    })
}

fn parse_parameter(segment: &str, number: usize) -> ParseResult<Parameter> {
    let Some((name, raw)) = segment.split_once('=') else {
        return Ok(Parameter::new("TYPE", decode_param_value(segment)));
    };

    if name.trim().is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::InvalidParameter,
            number,
            format!("parameter without a name: '{segment}'"),
        ));
    }

    Ok(Parameter {
        name: name.trim().to_ascii_uppercase(),
        values: split_outside_quotes(raw, ',')
            .into_iter()
            .map(decode_param_value)
            .collect(),
    })
}

/// Removes surrounding quotes and resolves `^n`, `^'` and `^^` (RFC 6868).
fn decode_param_value(raw: &str) -> String {
    let raw = raw
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(raw);

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '^' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\'') => out.push('"'),
            Some('^') | None => out.push('^'),
            Some(other) => {
                out.push('^');
                out.push(other);
            }
        }
    }
    out
}

/// Position of the first `:` outside a quoted parameter value.
fn value_colon(line: &str) -> Option<usize> {
    let mut quoted = false;
    line.char_indices().find_map(|(i, c)| match c {
        '"' => {
            quoted = !quoted;
            None
        }
        ':' if !quoted => Some(i),
        _ => None,
    })
}

fn split_outside_quotes(s: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;

    for (i, c) in s.char_indices() {
        if c == '"' {
            quoted = !quoted;
        } else if c == separator && !quoted {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }

    parts.push(&s[start..]);
    parts
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &str) -> Vec<(usize, String)> {
        LogicalLines::new(input).collect()
    }

    #[test]
    fn folds_are_joined() {
        assert_eq!(lines("FN:John\r\n  Doe\r\n"), vec![(1, "FN:John Doe".to_string())]);
        assert_eq!(lines("FN:John\n\tDoe"), vec![(1, "FN:JohnDoe".to_string())]);
    }

    #[test]
    fn blank_lines_are_counted_not_yielded() {
        assert_eq!(
            lines("A:1\r\n\r\nB:2"),
            vec![(1, "A:1".to_string()), (3, "B:2".to_string())]
        );
        assert!(lines("").is_empty());
    }

    #[test]
    fn plain_property() {
        let prop = parse_property("fn:John Doe", 1).unwrap();
        assert_eq!(prop.name, "FN");
        assert!(prop.group.is_none());
        assert!(prop.params.is_empty());
        assert_eq!(prop.value, "John Doe");
    }

    #[test]
    fn grouped_property() {
        let prop = parse_property("item1.TEL:+1-555-555-5555", 1).unwrap();
        assert_eq!(prop.group.as_deref(), Some("item1"));
        assert_eq!(prop.name, "TEL");
    }

    #[test]
    fn dot_in_parameter_is_not_a_group() {
        let prop = parse_property("EMAIL;X-LABEL=a.b:jane@example.com", 1).unwrap();
        assert!(prop.group.is_none());
        assert_eq!(prop.name, "EMAIL");
        assert_eq!(prop.param("X-LABEL"), Some("a.b"));
    }

    #[test]
    fn parameter_lists_and_quotes() {
        let prop = parse_property("TEL;type=home,voice;PREF=1:+1", 1).unwrap();
        assert_eq!(prop.params[0].name, "TYPE");
        assert_eq!(prop.params[0].values, vec!["home", "voice"]);
        assert_eq!(prop.param("pref"), Some("1"));

        let quoted = parse_property("TEL;TYPE=\"voice,cell\":tel:+1", 1).unwrap();
        assert_eq!(quoted.params[0].values, vec!["voice,cell"]);
        assert_eq!(quoted.value, "tel:+1");
    }

    #[test]
    fn colon_inside_quoted_parameter() {
        let prop = parse_property("ADR;LABEL=\"Suite 5: Back\":;;1 Main St", 1).unwrap();
        assert_eq!(prop.param("LABEL"), Some("Suite 5: Back"));
        assert_eq!(prop.value, ";;1 Main St");
    }

    #[test]
    fn caret_encoding() {
        let prop = parse_property("ADR;LABEL=\"^'Home^'^n1 Main^^\":;;", 1).unwrap();
        assert_eq!(prop.param("LABEL"), Some("\"Home\"\n1 Main^"));
    }

    #[test]
    fn bare_parameters_become_types() {
        let prop = parse_property("TEL;HOME;FAX:+1 555 0199", 1).unwrap();
        assert_eq!(prop.types().collect::<Vec<_>>(), vec!["HOME", "FAX"]);
    }

    #[test]
    fn malformed_lines() {
        let err = parse_property("FN John Doe", 4).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MalformedLine);
        assert_eq!(err.line, 4);

        let err = parse_property("BAD NAME:x", 1).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MalformedLine);

        let err = parse_property("TEL;=home:+1", 2).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidParameter);
    }
}
