//! Data models for Microsoft Graph API responses.

use serde::Deserialize;

/// Metadata for a file or folder in a document library.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub folder: Option<FolderFacet>,
    #[serde(default)]
    pub file: Option<FileFacet>,
    #[serde(default)]
    pub last_modified_date_time: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

impl DriveItem {
    /// Whether this item is a folder.
    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }
}

impl std::fmt::Display for DriveItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size_str = self
            .size
            .map(format_size)
            .unwrap_or_else(|| "-".to_string());
        let kind = if self.is_folder() {
            "folder"
        } else {
            self.file
                .as_ref()
                .and_then(|file| file.mime_type.as_deref())
                .unwrap_or("-")
        };
        write!(f, "{}\t{}\t{}\t{}", self.id, size_str, kind, self.name)
    }
}

/// Folder facet on a drive item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderFacet {
    #[serde(default)]
    pub child_count: Option<i64>,
}

/// File facet on a drive item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFacet {
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// One page of a children listing.
#[derive(Debug, Deserialize)]
pub struct DriveItemList {
    #[serde(default)]
    pub value: Vec<DriveItem>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

/// A collaboration site.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// A document library on a site.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub drive_type: Option<String>,
}

/// Response from the site drives endpoint.
#[derive(Debug, Deserialize)]
pub struct DriveInfoList {
    #[serde(default)]
    pub value: Vec<DriveInfo>,
}

/// Response from the createUploadSession endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSession {
    pub upload_url: String,
}

/// Device authorization response from the Azure AD devicecode endpoint.
#[derive(Debug, Deserialize)]
pub struct DeviceCodeResponse {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub expires_in: u64,
    #[serde(default)]
    pub interval: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// OAuth2 error response from the token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Graph API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
        assert_eq!(format_size(1073741824), "1.00 GB");
    }

    #[test]
    fn test_drive_item_deserialize() {
        let json = r#"{
            "id": "01ABCDEF",
            "name": "report.csv",
            "size": 2048,
            "file": { "mimeType": "text/csv" },
            "webUrl": "https://contoso.sharepoint.com/sites/a/Shared%20Documents/report.csv"
        }"#;

        let item: DriveItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "01ABCDEF");
        assert_eq!(item.name, "report.csv");
        assert_eq!(item.size, Some(2048));
        assert!(!item.is_folder());
        assert_eq!(
            item.file.unwrap().mime_type,
            Some("text/csv".to_string())
        );
    }

    #[test]
    fn test_drive_item_folder() {
        let json = r#"{
            "id": "01FOLDER",
            "name": "reports",
            "folder": { "childCount": 3 }
        }"#;

        let item: DriveItem = serde_json::from_str(json).unwrap();
        assert!(item.is_folder());
        assert_eq!(item.folder.unwrap().child_count, Some(3));
        assert_eq!(item.size, None);
    }

    #[test]
    fn test_drive_item_list_next_link() {
        let json = r#"{
            "value": [
                { "id": "f1", "name": "a.csv" },
                { "id": "f2", "name": "b.csv" }
            ],
            "@odata.nextLink": "https://graph.microsoft.com/v1.0/drives/d/root/children?$skiptoken=x"
        }"#;

        let list: DriveItemList = serde_json::from_str(json).unwrap();
        assert_eq!(list.value.len(), 2);
        assert!(list.next_link.is_some());
    }

    #[test]
    fn test_drive_item_display() {
        let item = DriveItem {
            id: "01ABCDEF".to_string(),
            name: "report.csv".to_string(),
            size: Some(1024),
            folder: None,
            file: Some(FileFacet {
                mime_type: Some("text/csv".to_string()),
            }),
            last_modified_date_time: None,
            web_url: None,
        };

        let display = format!("{}", item);
        assert!(display.contains("01ABCDEF"));
        assert!(display.contains("report.csv"));
        assert!(display.contains("1.00 KB"));
    }
}
