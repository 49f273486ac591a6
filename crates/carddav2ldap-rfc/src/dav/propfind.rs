//! PROPFIND request bodies.

use super::namespace::{CARDDAV_NS, DAV_NS};

const PROPFIND_OPEN: &str = const_str::concat!(
    r#"<?xml version="1.0" encoding="utf-8" ?>"#,
    "\n",
    r#"<D:propfind xmlns:D=""#,
    DAV_NS,
    r#"" xmlns:C=""#,
    CARDDAV_NS,
    r#"">"#,
    "\n  <D:prop>\n"
);

const PROPFIND_CLOSE: &str = "  </D:prop>\n</D:propfind>\n";

/// Lists the child collections of the discovery URL with their type and name.
pub const DISCOVERY_PROPFIND: &str = const_str::concat!(
    PROPFIND_OPEN,
    "    <D:resourcetype/>\n    <D:displayname/>\n",
    PROPFIND_CLOSE
);

/// Fetches every vCard of an address book in one round trip.
pub const ADDRESS_DATA_PROPFIND: &str = const_str::concat!(
    PROPFIND_OPEN,
    "    <D:getetag/>\n    <C:address-data/>\n",
    PROPFIND_CLOSE
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_body_declares_namespaces() {
        assert!(DISCOVERY_PROPFIND.contains(r#"xmlns:D="DAV:""#));
        assert!(DISCOVERY_PROPFIND.contains(r#"xmlns:C="urn:ietf:params:xml:ns:carddav""#));
        assert!(DISCOVERY_PROPFIND.contains("<D:resourcetype/>"));
        assert!(DISCOVERY_PROPFIND.ends_with("</D:propfind>\n"));
    }

    #[test]
    fn address_data_body_requests_vcards() {
        assert!(ADDRESS_DATA_PROPFIND.contains("<C:address-data/>"));
        assert!(!ADDRESS_DATA_PROPFIND.contains("<D:displayname/>"));
    }
}
