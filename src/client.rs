//! Microsoft Graph client for site and drive operations.

use std::path::Path;
use std::sync::LazyLock;

use futures::StreamExt;
use regex::Regex;
use reqwest::{header, Body, Client, Response};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::auth::{Authenticator, DEFAULT_AUTHORITY};
use crate::config::ConnectConfig;
use crate::error::{Error, Result};
use crate::models::{
    ApiErrorResponse, DriveInfo, DriveInfoList, DriveItem, DriveItemList, SiteInfo, UploadSession,
};
use crate::path;

/// Base URL for Microsoft Graph v1.0.
const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Threshold above which uploads go through an upload session (4 MB).
const UPLOAD_SESSION_THRESHOLD: u64 = 4 * 1024 * 1024;

/// Upload session chunk size; Graph requires a multiple of 320 KiB.
const UPLOAD_CHUNK_SIZE: usize = 10 * 327_680;

/// Pattern for site URLs: hostname plus optional server-relative path.
static SITE_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://([^/\s]+)(/[^\s]*)?$").expect("Invalid site URL regex"));

/// Connect to a SharePoint site.
///
/// Validates the configuration, performs (or reuses, if a valid token for
/// the same registration is already cached in-process) the device-code
/// credential exchange, and resolves the site against Microsoft Graph.
pub async fn connect(config: &ConnectConfig) -> Result<Site> {
    config.validate()?;

    let authority = config
        .options
        .authority_host
        .as_deref()
        .unwrap_or(DEFAULT_AUTHORITY);
    let graph_base = config
        .options
        .graph_base
        .as_deref()
        .unwrap_or(GRAPH_API_BASE)
        .trim_end_matches('/')
        .to_string();

    let (hostname, site_path) = parse_site_url(&config.site_url)?;
    let auth = Authenticator::with_authority(&config.tenant, &config.app_id, authority);
    let token = auth.get_access_token().await?;

    let url = if site_path.is_empty() {
        format!("{}/sites/{}", graph_base, hostname)
    } else {
        format!("{}/sites/{}:{}", graph_base, hostname, site_path)
    };

    let http = Client::new();
    let response = http.get(&url).bearer_auth(&token).send().await?;
    let status = response.status();
    if status.as_u16() == 404 {
        return Err(Error::NotFound(format!("site '{}'", config.site_url)));
    }
    if !status.is_success() {
        return Err(api_error(response).await);
    }

    let site: SiteInfo = response.json().await?;
    info!(site_id = %site.id, "connected to site");

    Ok(Site {
        site_id: site.id,
        auth,
        http,
        graph_base,
    })
}

/// Split a site URL into its hostname and server-relative path.
fn parse_site_url(site_url: &str) -> Result<(String, String)> {
    let captures = SITE_URL_REGEX.captures(site_url.trim()).ok_or_else(|| {
        Error::Configuration(format!("'{}' is not a valid site URL", site_url))
    })?;
    let hostname = captures
        .get(1)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let site_path = captures
        .get(2)
        .map(|m| m.as_str().trim_end_matches('/').to_string())
        .unwrap_or_default();
    Ok((hostname, site_path))
}

/// Shared parsing of non-success Graph responses.
async fn api_error(response: Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(&body) {
        return Error::Api {
            status,
            message: format!("{}: {}", parsed.error.code, parsed.error.message),
        };
    }
    Error::Api {
        status,
        message: body,
    }
}

/// An authenticated connection to one SharePoint site.
#[derive(Debug)]
pub struct Site {
    site_id: String,
    auth: Authenticator,
    http: Client,
    graph_base: String,
}

impl Site {
    /// The resolved Graph site id.
    pub fn id(&self) -> &str {
        &self.site_id
    }

    /// Resolve a named document library on this site.
    pub async fn drive(&self, name: &str) -> Result<Drive> {
        let drives = self.drives().await?;
        match drives
            .into_iter()
            .find(|d| d.name.as_deref() == Some(name))
        {
            Some(found) => Ok(Drive {
                drive_id: found.id,
                auth: self.auth.clone(),
                http: self.http.clone(),
                graph_base: self.graph_base.clone(),
            }),
            None => Err(Error::NotFound(format!("drive '{}'", name))),
        }
    }

    /// List the document libraries on this site.
    pub async fn drives(&self) -> Result<Vec<DriveInfo>> {
        let token = self.auth.get_access_token().await?;

        let response = self
            .http
            .get(format!("{}/sites/{}/drives", self.graph_base, self.site_id))
            .bearer_auth(&token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let list: DriveInfoList = response.json().await?;
        Ok(list.value)
    }
}

/// A document library within a site, addressed by logical paths.
#[derive(Clone, Debug)]
pub struct Drive {
    drive_id: String,
    auth: Authenticator,
    http: Client,
    graph_base: String,
}

impl Drive {
    /// Create a drive handle from an already-known drive id.
    pub fn new(auth: Authenticator, drive_id: String) -> Self {
        Self::with_graph_base(auth, drive_id, GRAPH_API_BASE)
    }

    #[doc(hidden)]
    pub fn with_graph_base(auth: Authenticator, drive_id: String, graph_base: &str) -> Self {
        Self {
            drive_id,
            auth,
            http: Client::new(),
            graph_base: graph_base.trim_end_matches('/').to_string(),
        }
    }

    /// The drive id.
    pub fn id(&self) -> &str {
        &self.drive_id
    }

    fn item_url(&self, path: &str) -> String {
        format!(
            "{}/drives/{}/root:/{}",
            self.graph_base,
            self.drive_id,
            path::encode(path)
        )
    }

    /// Look up the item at `path`. Returns `None` when the item does not
    /// exist (404); other failures are surfaced.
    pub async fn probe(&self, path: &str) -> Result<Option<DriveItem>> {
        let token = self.auth.get_access_token().await?;

        let response = self
            .http
            .get(self.item_url(path))
            .bearer_auth(&token)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }

        let item: DriveItem = response.json().await?;
        Ok(Some(item))
    }

    /// List the children of a folder, following pagination. An empty path
    /// lists the drive root.
    pub async fn list(&self, folder: &str) -> Result<Vec<DriveItem>> {
        let token = self.auth.get_access_token().await?;
        let mut all_items = Vec::new();
        let mut url = if folder.trim_matches('/').is_empty() {
            format!("{}/drives/{}/root/children", self.graph_base, self.drive_id)
        } else {
            format!("{}:/children", self.item_url(folder))
        };

        loop {
            let response = self.http.get(&url).bearer_auth(&token).send().await?;

            if !response.status().is_success() {
                return Err(api_error(response).await);
            }

            let page: DriveItemList = response.json().await?;
            all_items.extend(page.value);

            match page.next_link {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(all_items)
    }

    /// Download the file at `path` into the local file `dest`, streaming
    /// to disk.
    pub async fn download(&self, path: &str, dest: &Path) -> Result<()> {
        let token = self.auth.get_access_token().await?;
        debug!(path, "downloading drive item");

        let response = self
            .http
            .get(format!("{}:/content", self.item_url(path)))
            .bearer_auth(&token)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(Error::NotFound(format!("'{}' on drive {}", path, self.drive_id)));
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }

        // Stream to file
        let mut file = File::create(dest).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(())
    }

    /// Upload the local file to `dest_path` on the drive, replacing any
    /// existing item. Files above the session threshold are sent in
    /// chunks through an upload session.
    pub async fn upload(&self, local: &Path, dest_path: &str) -> Result<DriveItem> {
        let file_size = tokio::fs::metadata(local).await?.len();
        debug!(path = dest_path, file_size, "uploading drive item");

        if file_size > UPLOAD_SESSION_THRESHOLD {
            self.upload_session(local, dest_path, file_size).await
        } else {
            self.upload_small(local, dest_path, file_size).await
        }
    }

    /// Upload a file with a single content PUT (for smaller files).
    async fn upload_small(
        &self,
        local: &Path,
        dest_path: &str,
        file_size: u64,
    ) -> Result<DriveItem> {
        let token = self.auth.get_access_token().await?;
        let mime_type = mime_guess::from_path(local)
            .first_or_octet_stream()
            .to_string();

        let file = File::open(local).await?;
        let body = Body::wrap_stream(ReaderStream::new(file));

        let response = self
            .http
            .put(format!("{}:/content", self.item_url(dest_path)))
            .bearer_auth(&token)
            .query(&[("@microsoft.graph.conflictBehavior", "replace")])
            .header(header::CONTENT_TYPE, mime_type)
            .header(header::CONTENT_LENGTH, file_size)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let item: DriveItem = response.json().await?;
        Ok(item)
    }

    /// Upload a file through an upload session (for larger files).
    async fn upload_session(
        &self,
        local: &Path,
        dest_path: &str,
        file_size: u64,
    ) -> Result<DriveItem> {
        let token = self.auth.get_access_token().await?;

        // Step 1: create the session
        let request_body = serde_json::json!({
            "item": { "@microsoft.graph.conflictBehavior": "replace" }
        });

        let response = self
            .http
            .post(format!("{}:/createUploadSession", self.item_url(dest_path)))
            .bearer_auth(&token)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let session: UploadSession = response.json().await?;

        // Step 2: upload the content in ranges
        let content = tokio::fs::read(local).await?;
        let total = content.len();
        let mut start = 0usize;

        while start < total {
            let end = usize::min(start + UPLOAD_CHUNK_SIZE, total);
            let chunk = content[start..end].to_vec();

            let response = self
                .http
                .put(&session.upload_url)
                .header(header::CONTENT_LENGTH, (end - start) as u64)
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", start, end - 1, total),
                )
                .body(chunk)
                .send()
                .await?;

            let status = response.status();
            if status.as_u16() == 200 || status.as_u16() == 201 {
                let item: DriveItem = response.json().await?;
                return Ok(item);
            }
            if !status.is_success() {
                return Err(api_error(response).await);
            }

            start = end;
        }

        Err(Error::Api {
            status: 500,
            message: format!(
                "upload session for '{}' ended after {} bytes without a completed item",
                dest_path, file_size
            ),
        })
    }
}
