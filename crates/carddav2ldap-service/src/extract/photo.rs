//! Inline PHOTO decoding.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use carddav2ldap_rfc::vcard::Property;

use crate::contact::Photo;

/// Why a PHOTO property could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhotoError {
    #[error("photo is a remote reference")]
    Remote,
    #[error("unsupported photo media type: {0}")]
    UnsupportedType(String),
    #[error("invalid base64 photo data: {0}")]
    Base64(String),
    #[error("photo data is empty")]
    Empty,
}

/// Decodes an inline JPEG PHOTO property.
///
/// Accepts vCard 3 `ENCODING=b` (or `BASE64`) values with `TYPE=JPEG`, and
/// vCard 4 `data:image/jpeg;base64,` URIs. `jpegPhoto` only holds JPEG, so
/// PNG, GIF and every other media type are refused.
///
/// ## Errors
/// Returns an error for remote references, non-JPEG media types and
/// payloads that are not valid base64.
pub fn decode_photo(prop: &Property) -> Result<Photo, PhotoError> {
    let raw = prop.value.trim();

    let payload = if let Some(encoding) = prop.param("ENCODING") {
        if !(encoding.eq_ignore_ascii_case("b") || encoding.eq_ignore_ascii_case("base64")) {
            return Err(PhotoError::UnsupportedType(format!("encoding {encoding}")));
        }
        let media = prop.types().next().unwrap_or_default();
        if !is_jpeg(media) {
            return Err(PhotoError::UnsupportedType(media.into()));
        }
        raw
    } else if let Some(rest) = strip_prefix_ignore_case(raw, "data:") {
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| PhotoError::UnsupportedType(rest.chars().take(32).collect()))?;
        let (media, is_base64) = match header.rsplit_once(';') {
            Some((media, marker)) => (media, marker.eq_ignore_ascii_case("base64")),
            None => (header, false),
        };
        if !is_base64 {
            return Err(PhotoError::UnsupportedType(header.to_string()));
        }
        if !is_jpeg(media) {
            return Err(PhotoError::UnsupportedType(media.into()));
        }
        payload
    } else {
        return Err(PhotoError::Remote);
    };

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let data = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| PhotoError::Base64(e.to_string()))?;

    if data.is_empty() {
        return Err(PhotoError::Empty);
    }

    Ok(Photo { data })
}

/// Matches a vCard 3 `TYPE` value or a media type naming JPEG.
fn is_jpeg(media: &str) -> bool {
    let media = media.trim();
    let subtype = strip_prefix_ignore_case(media, "image/").unwrap_or(media);
    ["jpeg", "jpg", "pjpeg"]
        .iter()
        .any(|name| subtype.eq_ignore_ascii_case(name))
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    s.get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .map(|_| &s[prefix.len()..])
}
