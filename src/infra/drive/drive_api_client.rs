use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use crate::core::drive::{DriveClient, DriveError, Entry, FieldSelector};
use crate::infra::drive::ServiceAccountAuth;

/// Minimal Drive v3 REST client. It deliberately exposes only the calls
/// the core layer needs: one listing query per folder and a content
/// download.
pub struct DriveApiClient {
    client: Client,
    auth: ServiceAccountAuth,
    base_url: String,
}

impl DriveApiClient {
    pub fn new(auth: ServiceAccountAuth) -> Result<Self, DriveError> {
        let mut headers = HeaderMap::new();
        headers.insert("User-Agent", HeaderValue::from_static("DriveFolderBot/1.0"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| DriveError::Api(e.to_string()))?;

        Ok(Self {
            client,
            auth,
            base_url: "https://www.googleapis.com/drive/v3".to_string(),
        })
    }

    fn parse_datetime(value: Option<String>) -> Option<DateTime<Utc>> {
        value
            .as_deref()
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn map_file(api: ApiFile) -> Option<Entry> {
        api.id.map(|id| Entry {
            id,
            name: api.name.unwrap_or_else(|| "Untitled".to_string()),
            trashed: api.trashed.unwrap_or(false),
            mime_type: api
                .mime_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            file_extension: api.file_extension,
            modified_time: Self::parse_datetime(api.modified_time),
            size: api.size.and_then(|s| s.parse().ok()),
        })
    }
}

#[async_trait]
impl DriveClient for DriveApiClient {
    async fn list_children(
        &self,
        folder_id: &str,
        fields: &FieldSelector,
    ) -> Result<Vec<Entry>, DriveError> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/files", self.base_url);

        tracing::debug!(folder_id, "Listing Drive folder");

        // Exactly one query; response order is preserved because the
        // resolver's "first README.md" rule depends on it.
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("q", format!("'{folder_id}' in parents").as_str()),
                ("fields", fields.as_query()),
            ])
            .send()
            .await
            .map_err(|e| DriveError::Api(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(DriveError::Api(format!(
                "Drive returned {status} for folder listing: {text}"
            )));
        }

        let listing: ApiFileList = resp
            .json()
            .await
            .map_err(|e| DriveError::Api(e.to_string()))?;

        Ok(listing
            .files
            .into_iter()
            .filter_map(Self::map_file)
            .collect())
    }

    async fn download_to(&self, file_id: &str, dest: &Path) -> Result<(), DriveError> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/files/{}", self.base_url, file_id);

        tracing::debug!(file_id, dest = %dest.display(), "Downloading Drive file");

        let mut resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(|e| DriveError::Api(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(DriveError::Api(format!(
                "Drive returned {status} for file content: {text}"
            )));
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DriveError::Store(e.to_string()))?;
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| DriveError::Store(e.to_string()))?;

        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| DriveError::Api(e.to_string()))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| DriveError::Store(e.to_string()))?;
        }

        file.flush()
            .await
            .map_err(|e| DriveError::Store(e.to_string()))?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ApiFileList {
    #[serde(default)]
    files: Vec<ApiFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiFile {
    id: Option<String>,
    name: Option<String>,
    trashed: Option<bool>,
    mime_type: Option<String>,
    file_extension: Option<String>,
    modified_time: Option<String>,
    // Drive serializes sizes as strings.
    size: Option<String>,
}
