//! Multistatus response parsing.
//!
//! Only the parts a CardDAV client needs are kept: the href of each
//! response, its resource type, display name, etag and address data.
//! Elements count only when bound to the `DAV:` or `CardDAV` namespace.

use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};

use super::error::{ParseError, ParseResult};
use super::namespace::{CARDDAV_NS, DAV_NS};

/// A single `DAV:response` element from a multistatus body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DavResponse {
    /// Trimmed `DAV:href` text.
    pub href: String,
    /// `DAV:displayname`, if present and non-empty.
    pub display_name: Option<String>,
    /// Whether `DAV:resourcetype` contains `CARDDAV:addressbook`.
    pub is_addressbook: bool,
    /// Whether `DAV:resourcetype` contains `DAV:collection`.
    pub is_collection: bool,
    /// Raw `CARDDAV:address-data` text (a vCard document).
    pub address_data: Option<String>,
    /// `DAV:getetag`, if present.
    pub etag: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ns {
    Dav,
    CardDav,
    Other,
}

impl Ns {
    fn of(resolved: &ResolveResult<'_>) -> Self {
        match resolved {
            ResolveResult::Bound(Namespace(uri)) if *uri == DAV_NS.as_bytes() => Self::Dav,
            ResolveResult::Bound(Namespace(uri)) if *uri == CARDDAV_NS.as_bytes() => {
                Self::CardDav
            }
            _ => Self::Other,
        }
    }
}

/// Elements whose text content is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Href,
    DisplayName,
    AddressData,
    Etag,
}

impl Capture {
    fn from_name(ns: Ns, local_name: &str) -> Option<Self> {
        match (ns, local_name) {
            (Ns::Dav, "href") => Some(Self::Href),
            (Ns::Dav, "displayname") => Some(Self::DisplayName),
            (Ns::Dav, "getetag") => Some(Self::Etag),
            (Ns::CardDav, "address-data") => Some(Self::AddressData),
            _ => None,
        }
    }
}

#[derive(Default)]
struct ResponseBuilder {
    response: DavResponse,
    href_seen: bool,
}

impl ResponseBuilder {
    fn finish_capture(&mut self, capture: Capture, text: String) {
        match capture {
            Capture::Href => {
                // Only the first href of a response identifies it
                if !self.href_seen {
                    self.response.href = text.trim().to_string();
                    self.href_seen = true;
                }
            }
            Capture::DisplayName => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    self.response.display_name = Some(trimmed.to_string());
                }
            }
            Capture::AddressData => {
                self.response.address_data = Some(text);
            }
            Capture::Etag => {
                self.response.etag = Some(text.trim().to_string());
            }
        }
    }

    fn mark_resource_type(&mut self, ns: Ns, local_name: &str) {
        match (ns, local_name) {
            (Ns::CardDav, "addressbook") => self.response.is_addressbook = true,
            (Ns::Dav, "collection") => self.response.is_collection = true,
            _ => {}
        }
    }
}

/// Parses a `207 Multi-Status` body into its responses.
///
/// ## Summary
/// Walks every `DAV:response` element. Prefixes are resolved against the
/// declared namespaces, so any prefix the server chose is accepted while
/// same-named elements from foreign namespaces are ignored.
///
/// ## Errors
/// Returns an error if the XML is malformed or no `DAV:multistatus`
/// element is present.
#[tracing::instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_multistatus(xml: &[u8]) -> ParseResult<Vec<DavResponse>> {
    tracing::trace!("Parsing multistatus body");

    let mut reader = NsReader::from_reader(xml);

    let mut buf = Vec::new();
    let mut seen_multistatus = false;
    let mut stack: Vec<(Ns, String)> = Vec::new();
    let mut responses = Vec::new();
    let mut current: Option<ResponseBuilder> = None;
    let mut capture: Option<(Capture, usize)> = None;
    let mut text = String::new();

    loop {
        let (ns, event) = reader
            .read_resolved_event_into(&mut buf)
            .map(|(resolved, event)| (Ns::of(&resolved), event))?;

        match event {
            Event::Start(ref e) => {
                let local_name_bytes = e.local_name();
                let local_name = std::str::from_utf8(local_name_bytes.as_ref())?.to_owned();

                match (ns, local_name.as_str()) {
                    (Ns::Dav, "multistatus") => seen_multistatus = true,
                    (Ns::Dav, "response") if seen_multistatus => {
                        current = Some(ResponseBuilder::default());
                    }
                    (ns, name) => {
                        if let Some(builder) = current.as_mut() {
                            if in_resourcetype(&stack) {
                                builder.mark_resource_type(ns, name);
                            } else if capture.is_none()
                                && let Some(kind) = Capture::from_name(ns, name)
                            {
                                capture = Some((kind, stack.len()));
                                text.clear();
                            }
                        }
                    }
                }

                stack.push((ns, local_name));
            }
            Event::Empty(ref e) => {
                let local_name_bytes = e.local_name();
                let local_name = std::str::from_utf8(local_name_bytes.as_ref())?;

                if let Some(builder) = current.as_mut()
                    && in_resourcetype(&stack)
                {
                    builder.mark_resource_type(ns, local_name);
                }
            }
            Event::Text(ref e) => {
                if capture.is_some() {
                    let decoded = reader.decoder().decode(e.as_ref())?;
                    text.push_str(&decoded);
                }
            }
            Event::CData(ref e) => {
                if capture.is_some() {
                    let cdata = std::str::from_utf8(e.as_ref())?;
                    text.push_str(cdata);
                }
            }
            Event::GeneralRef(ref e) => {
                if capture.is_some() {
                    if let Some(ch) = e.resolve_char_ref()? {
                        text.push(ch);
                    } else {
                        let name = e.decode()?;
                        let resolved =
                            quick_xml::escape::resolve_predefined_entity(&name).ok_or_else(|| {
                                ParseError::UnknownEntity(name.to_string())
                            })?;
                        text.push_str(resolved);
                    }
                }
            }
            Event::End(ref e) => {
                stack.pop();

                let local_name_bytes = e.local_name();
                let local_name = std::str::from_utf8(local_name_bytes.as_ref())?;

                if let Some((kind, depth)) = capture
                    && depth == stack.len()
                {
                    if let Some(builder) = current.as_mut() {
                        builder.finish_capture(kind, std::mem::take(&mut text));
                    }
                    capture = None;
                }

                if ns == Ns::Dav
                    && local_name == "response"
                    && let Some(builder) = current.take()
                {
                    responses.push(builder.response);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_multistatus {
        return Err(ParseError::UnexpectedRoot("multistatus"));
    }

    tracing::trace!(count = responses.len(), "Parsed multistatus responses");

    Ok(responses)
}

fn in_resourcetype(stack: &[(Ns, String)]) -> bool {
    stack
        .last()
        .is_some_and(|(ns, name)| *ns == Ns::Dav && name == "resourcetype")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISCOVERY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:" xmlns:card="urn:ietf:params:xml:ns:carddav">
  <d:response>
    <d:href>/dav.php/addressbooks/user/</d:href>
    <d:propstat>
      <d:prop>
        <d:resourcetype><d:collection/></d:resourcetype>
      </d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
  <d:response>
    <d:href>
      /dav.php/addressbooks/user/contacts/
    </d:href>
    <d:propstat>
      <d:prop>
        <d:resourcetype>
          <d:collection/>
          <card:addressbook/>
        </d:resourcetype>
        <d:displayname>Contacts</d:displayname>
      </d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

    #[test_log::test]
    fn parse_discovery_response() {
        let responses = parse_multistatus(DISCOVERY.as_bytes()).unwrap();
        assert_eq!(responses.len(), 2);

        assert_eq!(responses[0].href, "/dav.php/addressbooks/user/");
        assert!(responses[0].is_collection);
        assert!(!responses[0].is_addressbook);
        assert!(responses[0].display_name.is_none());

        assert_eq!(responses[1].href, "/dav.php/addressbooks/user/contacts/");
        assert!(responses[1].is_addressbook);
        assert_eq!(responses[1].display_name.as_deref(), Some("Contacts"));
    }

    #[test]
    fn parse_address_data_with_entities() {
        let xml = r#"<?xml version="1.0"?>
<multistatus xmlns="DAV:" xmlns:C="urn:ietf:params:xml:ns:carddav">
  <response>
    <href>/book/jane.vcf</href>
    <propstat>
      <prop>
        <getetag>"abc"</getetag>
        <C:address-data>BEGIN:VCARD&#13;
VERSION:3.0&#13;
FN:Jane &amp; John&#13;
END:VCARD&#13;
</C:address-data>
      </prop>
    </propstat>
  </response>
</multistatus>"#;

        let responses = parse_multistatus(xml.as_bytes()).unwrap();
        assert_eq!(responses.len(), 1);

        let response = &responses[0];
        assert_eq!(response.href, "/book/jane.vcf");
        assert_eq!(response.etag.as_deref(), Some("\"abc\""));

        let data = response.address_data.as_deref().unwrap();
        assert!(data.starts_with("BEGIN:VCARD\r\n"));
        assert!(data.contains("FN:Jane & John\r\n"));
        assert!(data.contains("END:VCARD"));
    }

    #[test]
    fn parse_address_data_in_cdata() {
        let xml = r"<D:multistatus xmlns:D='DAV:' xmlns:C='urn:ietf:params:xml:ns:carddav'>
<D:response><D:href>/a.vcf</D:href><D:propstat><D:prop>
<C:address-data><![CDATA[BEGIN:VCARD
FN:A <B>
END:VCARD
]]></C:address-data>
</D:prop></D:propstat></D:response></D:multistatus>";

        let responses = parse_multistatus(xml.as_bytes()).unwrap();
        assert_eq!(
            responses[0].address_data.as_deref(),
            Some("BEGIN:VCARD\nFN:A <B>\nEND:VCARD\n")
        );
    }

    #[test]
    fn response_without_address_data() {
        let xml = "<D:multistatus xmlns:D='DAV:'><D:response><D:href>/x/</D:href>\
                   <D:propstat><D:prop><D:resourcetype/></D:prop></D:propstat>\
                   </D:response></D:multistatus>";

        let responses = parse_multistatus(xml.as_bytes()).unwrap();
        assert_eq!(responses.len(), 1);
        assert!(responses[0].address_data.is_none());
        assert!(!responses[0].is_addressbook);
    }

    #[test]
    fn foreign_namespace_elements_are_ignored() {
        let xml = r#"<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:carddav"
    xmlns:x="http://example.com/ns">
  <D:response>
    <x:href>/decoy/</x:href>
    <D:href>/book/</D:href>
    <D:propstat><D:prop>
      <D:resourcetype><D:collection/><x:addressbook/></D:resourcetype>
      <x:displayname>Decoy</x:displayname>
      <x:address-data>BEGIN:VCARD</x:address-data>
    </D:prop></D:propstat>
  </D:response>
</D:multistatus>"#;

        let responses = parse_multistatus(xml.as_bytes()).unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].href, "/book/");
        assert!(responses[0].is_collection);
        assert!(!responses[0].is_addressbook);
        assert!(responses[0].display_name.is_none());
        assert!(responses[0].address_data.is_none());
    }

    #[test]
    fn multistatus_outside_dav_namespace_is_rejected() {
        let err = parse_multistatus(b"<multistatus><response><href>/a/</href></response></multistatus>")
            .unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedRoot("multistatus")));
    }

    #[test]
    fn missing_multistatus_is_an_error() {
        let err = parse_multistatus(b"<html><body>Login</body></html>").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedRoot("multistatus")));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let err = parse_multistatus(b"<D:multistatus xmlns:D='DAV:'><D:response></D:href>")
            .unwrap_err();
        assert!(matches!(err, ParseError::Xml(_)));
    }
}
