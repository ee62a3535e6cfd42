//! Graph-style HTTP client for the remote drive API.
//!
//! # Overview
//!
//! Implements [`DriveApi`] with `reqwest` against a Microsoft-Graph shaped
//! endpoint: paginated children listings with `@odata.nextLink` continuation
//! cursors, and delete-by-id. Response classification (429 / 5xx / other)
//! happens here; retry scheduling lives in [`backoff`](super::backoff).
//!
//! Listing pages are decoded item by item so a single malformed entry is
//! logged and skipped instead of failing the page.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use super::{
    AccessToken, ApiError, DriveApi, ItemPage, RemoteContainer, RemoteFile, RemoteItem,
};

/// Default API base.
const GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";
/// Fields requested per item; keeps listing payloads small.
const LIST_SELECT: &str = "id,name,size,lastModifiedDateTime,file,folder,parentReference";
/// Page size for children listings.
const PAGE_SIZE: u32 = 200;
/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for a Graph-style drive endpoint.
pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
}

impl GraphClient {
    /// Create a client against the default endpoint.
    ///
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(GRAPH_BASE)
    }

    /// Create a client against a custom base URL (proxies, national clouds,
    /// test servers).
    ///
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn children_url(&self, container_id: Option<&str>) -> String {
        match container_id {
            Some(id) => format!(
                "{}/me/drive/items/{id}/children?$select={LIST_SELECT}&$top={PAGE_SIZE}",
                self.base_url
            ),
            None => format!(
                "{}/me/drive/root/children?$select={LIST_SELECT}&$top={PAGE_SIZE}",
                self.base_url
            ),
        }
    }
}

impl DriveApi for GraphClient {
    async fn list_children(
        &self,
        token: &AccessToken,
        container_id: Option<&str>,
        cursor: Option<&str>,
    ) -> Result<ItemPage, ApiError> {
        // The continuation cursor is a complete URL; use it verbatim.
        let url = cursor.map_or_else(|| self.children_url(container_id), str::to_string);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token.secret())
            .send()
            .await?;
        if let Some(err) = classify_status(&response) {
            return Err(err);
        }

        let body = response.text().await?;
        let listing: ListingBody = serde_json::from_str(&body)?;
        Ok(parse_listing(listing))
    }

    async fn delete_item(&self, token: &AccessToken, item_id: &str) -> Result<(), ApiError> {
        let url = format!("{}/me/drive/items/{item_id}", self.base_url);
        let response = self
            .http
            .delete(&url)
            .bearer_auth(token.secret())
            .send()
            .await?;
        if let Some(err) = classify_status(&response) {
            return Err(err);
        }
        Ok(())
    }
}

/// Map a non-success status onto the error taxonomy.
fn classify_status(response: &Response) -> Option<ApiError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Some(ApiError::RateLimited {
            retry_after: parse_retry_after(response),
        });
    }
    if status.is_server_error() {
        return Some(ApiError::Server {
            status: status.as_u16(),
        });
    }
    if !status.is_success() {
        return Some(ApiError::Request {
            status: status.as_u16(),
        });
    }
    None
}

/// `Retry-After` header in seconds, when present and well-formed.
fn parse_retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[derive(Debug, Deserialize)]
struct ListingBody {
    #[serde(default)]
    value: Vec<serde_json::Value>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDriveItem {
    id: String,
    name: String,
    size: Option<u64>,
    last_modified_date_time: DateTime<Utc>,
    file: Option<RawFileFacet>,
    folder: Option<RawFolderFacet>,
    parent_reference: Option<RawParentReference>,
}

#[derive(Debug, Deserialize)]
struct RawFileFacet {
    #[serde(default)]
    hashes: Option<RawHashes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHashes {
    sha256_hash: Option<String>,
    quick_xor_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFolderFacet {}

#[derive(Debug, Deserialize)]
struct RawParentReference {
    id: Option<String>,
}

/// Convert one listing page, skipping entries that fail to parse.
fn parse_listing(body: ListingBody) -> ItemPage {
    let mut items = Vec::with_capacity(body.value.len());
    for raw in body.value {
        match serde_json::from_value::<RawDriveItem>(raw) {
            Ok(item) => {
                if let Some(item) = classify_item(item) {
                    items.push(item);
                }
            }
            Err(err) => log::warn!("skipping malformed drive item: {err}"),
        }
    }
    ItemPage {
        items,
        next_cursor: body.next_link,
    }
}

/// Classify a parsed item as container or file.
///
/// Items with neither facet (packages, remote shares) carry no content to
/// dedupe and are dropped quietly.
fn classify_item(item: RawDriveItem) -> Option<RemoteItem> {
    if item.folder.is_some() {
        return Some(RemoteItem::Container(RemoteContainer {
            id: item.id,
            name: item.name,
        }));
    }
    let Some(file) = item.file else {
        log::trace!("ignoring non-file item: {}", item.name);
        return None;
    };
    let hashes = file.hashes.unwrap_or_default();
    Some(RemoteItem::File(RemoteFile {
        id: item.id,
        name: item.name,
        size: item.size,
        last_modified: item.last_modified_date_time,
        sha256: hashes.sha256_hash,
        quick_xor: hashes.quick_xor_hash,
        parent_id: item.parent_reference.and_then(|parent| parent.id),
    }))
}
