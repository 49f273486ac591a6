use super::card::{VCard, Version};
use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::line::{LogicalLines, parse_property};

/// ## Summary
/// Reads every vCard in a document.
///
/// Lines outside a `BEGIN:VCARD` .. `END:VCARD` block are ignored, so an
/// input with no card at all yields an empty list.
///
/// ## Errors
/// Fails on a malformed content line inside a card, an unsupported
/// `VERSION`, a nested `BEGIN` or a card left open at the end of input.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<Vec<VCard>> {
    let mut cards = Vec::new();
    let mut open: Option<(usize, VCard)> = None;

    for (number, line) in LogicalLines::new(input) {
        if open.is_none() {
            if is_marker(&line, "BEGIN") {
                open = Some((number, VCard::default()));
            }
            continue;
        }

        if is_marker(&line, "END") {
            cards.extend(open.take().map(|(_, card)| card));
            continue;
        }

        let property = parse_property(&line, number)?;
        let Some((_, card)) = open.as_mut() else {
            continue;
        };

        match property.name.as_str() {
            "BEGIN" => {
                return Err(ParseError::new(
                    ParseErrorKind::Nested,
                    number,
                    format!("BEGIN:{} inside an open vCard", property.value),
                ));
            }
            "VERSION" => {
                let version = Version::parse(&property.value).ok_or_else(|| {
                    ParseError::new(
                        ParseErrorKind::UnsupportedVersion,
                        number,
                        format!("VERSION:{}", property.value),
                    )
                })?;
                card.version = Some(version);
            }
            _ => card.properties.push(property),
        }
    }

    if let Some((start, _)) = open {
        return Err(ParseError::new(
            ParseErrorKind::Unterminated,
            start,
            "BEGIN:VCARD without END:VCARD",
        ));
    }

    tracing::trace!(count = cards.len(), "Parsed vCards");
    Ok(cards)
}

fn is_marker(line: &str, keyword: &str) -> bool {
    line.trim()
        .split_once(':')
        .is_some_and(|(name, value)| {
            name.trim().eq_ignore_ascii_case(keyword) && value.trim().eq_ignore_ascii_case("VCARD")
        })
}
