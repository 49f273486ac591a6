//! `CardDAV` client: address book discovery and vCard retrieval.

use carddav2ldap_core::config::Settings;
use carddav2ldap_core::constants::USER_AGENT;
use carddav2ldap_rfc::dav::{
    ADDRESS_DATA_PROPFIND, DISCOVERY_PROPFIND, DavResponse, parse_multistatus,
};
use carddav2ldap_rfc::error::RfcError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode, Url};

use crate::error::{ServiceError, ServiceResult};
use crate::pipeline::AddressBookBatch;
use crate::policy::FilterPolicy;

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// An address book collection found during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBook {
    /// Last path segment of the collection URL.
    pub id: String,
    pub url: Url,
    pub display_name: Option<String>,
}

impl AddressBook {
    #[must_use]
    pub fn new(url: Url, display_name: Option<String>) -> Self {
        Self {
            id: collection_id(&url),
            url,
            display_name,
        }
    }
}

/// HTTP Basic authenticated `CardDAV` client.
pub struct CardDavClient {
    client: reqwest::Client,
    discovery_url: Url,
    username: String,
    password: String,
}

impl CardDavClient {
    /// ## Summary
    /// Builds a client for the configured discovery URL.
    ///
    /// ## Errors
    /// Returns an error if the discovery URL is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(settings: &Settings) -> ServiceResult<Self> {
        let discovery_url = Url::parse(&settings.carddav_base_discovery_url)
            .map_err(|e| ServiceError::UrlError(e.to_string()))?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(!settings.carddav_ssl_verify)
            .build()?;

        if !settings.carddav_ssl_verify {
            tracing::warn!("TLS certificate verification is disabled for CardDAV");
        }

        Ok(Self {
            client,
            discovery_url,
            username: settings.carddav_username.clone(),
            password: settings.carddav_password.clone(),
        })
    }

    /// ## Summary
    /// Lists the address books below the discovery URL.
    ///
    /// Falls back to the discovery URL itself when no collection reports
    /// an `addressbook` resource type.
    ///
    /// ## Errors
    /// Returns an error if the request fails, the server does not answer
    /// `207 Multi-Status` or the body is not a multistatus document.
    #[tracing::instrument(skip(self), fields(url = %self.discovery_url))]
    pub async fn discover(&self) -> ServiceResult<Vec<AddressBook>> {
        let responses = self
            .propfind(&self.discovery_url, DISCOVERY_PROPFIND)
            .await?;

        let books = address_books_from(&self.discovery_url, responses);
        tracing::info!(count = books.len(), "Discovered address books");
        Ok(books)
    }

    /// ## Summary
    /// Fetches every non-empty `address-data` blob of one address book.
    ///
    /// ## Errors
    /// Returns an error if the request fails or the response is unusable.
    #[tracing::instrument(skip(self, book), fields(address_book = %book.id))]
    pub async fn fetch_blobs(&self, book: &AddressBook) -> ServiceResult<Vec<String>> {
        let responses = self.propfind(&book.url, ADDRESS_DATA_PROPFIND).await?;

        let blobs = blobs_from(responses);

        tracing::debug!(count = blobs.len(), "Fetched vCard blobs");
        Ok(blobs)
    }

    /// ## Summary
    /// Discovers, filters and fetches every address book.
    ///
    /// Books rejected by the address-book lists are never fetched. A book
    /// whose fetch fails is logged and left out.
    ///
    /// ## Errors
    /// Returns an error only when discovery fails.
    pub async fn collect(&self, policy: &FilterPolicy) -> ServiceResult<Vec<AddressBookBatch>> {
        let books = self.discover().await?;
        let mut batches = Vec::with_capacity(books.len());

        for book in books {
            if !policy.admit_address_book(&book.id, book.display_name.as_deref()) {
                tracing::info!(
                    address_book = %book.id,
                    display_name = ?book.display_name,
                    "Address book excluded by filter"
                );
                continue;
            }

            match self.fetch_blobs(&book).await {
                Ok(blobs) => batches.push(AddressBookBatch::new(book.id, blobs)),
                Err(e) => {
                    tracing::warn!(address_book = %book.id, url = %book.url, error = %e, "Skipping address book");
                }
            }
        }

        Ok(batches)
    }

    async fn propfind(&self, url: &Url, body: &'static str) -> ServiceResult<Vec<DavResponse>> {
        let method = Method::from_bytes(b"PROPFIND")
            .map_err(|e| ServiceError::InvalidConfiguration(e.to_string()))?;

        let response = self
            .client
            .request(method, url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header("Depth", "1")
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::MULTI_STATUS {
            return Err(ServiceError::UnexpectedStatus(status));
        }

        let body = response.bytes().await?;
        let responses = parse_multistatus(&body).map_err(RfcError::from)?;
        Ok(responses)
    }
}

/// Keeps the non-empty `address-data` of every member resource.
///
/// The collection itself is listed in the same multistatus and carries no
/// vCard, so collection responses are dropped.
#[must_use]
pub fn blobs_from(responses: Vec<DavResponse>) -> Vec<String> {
    responses
        .into_iter()
        .filter(|r| !r.is_collection)
        .filter_map(|r| {
            let data = r.address_data.filter(|data| !data.trim().is_empty());
            if data.is_none() {
                tracing::debug!(href = %r.href, etag = ?r.etag, "Resource carries no vCard");
            }
            data
        })
        .collect()
}

/// Turns discovery responses into address books, resolving each href
/// against the discovery URL.
#[must_use]
pub fn address_books_from(discovery_url: &Url, responses: Vec<DavResponse>) -> Vec<AddressBook> {
    let mut books = Vec::new();

    for response in responses.into_iter().filter(|r| r.is_addressbook) {
        match discovery_url.join(&response.href) {
            Ok(url) => {
                if books.iter().any(|b: &AddressBook| b.url == url) {
                    continue;
                }
                books.push(AddressBook::new(url, response.display_name));
            }
            Err(e) => {
                tracing::warn!(href = %response.href, error = %e, "Ignoring unresolvable href");
            }
        }
    }

    if books.is_empty() {
        tracing::info!("No address book collections found; using the discovery URL");
        books.push(AddressBook::new(discovery_url.clone(), None));
    }

    books
}

fn collection_id(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map_or_else(|| url.to_string(), ToString::to_string)
}
