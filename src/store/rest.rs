//! Supabase-compatible REST implementation of [`ContentStore`].
//!
//! Rows live behind `rest/v1/{table}` with PostgREST query syntax; raw
//! bytes behind `storage/v1/object/{bucket}/{path}`. Every request carries
//! the same service-key pair: an `apikey` header plus `Authorization:
//! Bearer`. Updates ask for `return=minimal` since the pipeline never reads
//! its own writes.

use async_trait::async_trait;
use tracing::debug;

use super::{ContentStore, DocumentPatch, DocumentRow, StoreError};

/// Default table holding customer document rows.
pub const DEFAULT_TABLE: &str = "customer_documents";
/// Default storage bucket holding the uploaded files.
pub const DEFAULT_BUCKET: &str = "customer-documents";

pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    table: String,
    bucket: String,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            table: DEFAULT_TABLE.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    fn select_url(&self, id: &str) -> String {
        format!(
            "{}/rest/v1/{}?id=eq.{}&select=file_url,mime_type",
            self.base_url, self.table, id
        )
    }

    fn update_url(&self, id: &str) -> String {
        format!("{}/rest/v1/{}?id=eq.{}", self.base_url, self.table, id)
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            path.trim_start_matches('/')
        )
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

/// Map a non-success response into [`StoreError::RequestFailed`].
async fn checked(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::RequestFailed {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ContentStore for RestStore {
    async fn fetch_document(&self, id: &str) -> Result<DocumentRow, StoreError> {
        let url = self.select_url(id);
        debug!(%id, "Fetching document row");

        let response = self
            .authed(self.client.get(&url))
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;
        let response = checked(response).await?;

        let rows: Vec<DocumentRow> = response
            .json()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update_document(&self, id: &str, patch: &DocumentPatch) -> Result<(), StoreError> {
        let url = self.update_url(id);
        debug!(%id, "Patching document row");

        let response = self
            .authed(self.client.patch(&url))
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;
        checked(response).await?;
        Ok(())
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        let url = self.object_url(path);
        debug!(%path, "Downloading stored object");

        let response = self
            .authed(self.client.get(&url))
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;
        let response = checked(response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_url_filters_by_id_and_narrows_columns() {
        let store = RestStore::new("https://proj.supabase.co", "key");
        assert_eq!(
            store.select_url("doc-1"),
            "https://proj.supabase.co/rest/v1/customer_documents?id=eq.doc-1&select=file_url,mime_type"
        );
    }

    #[test]
    fn update_url_has_no_column_selection() {
        let store = RestStore::new("https://proj.supabase.co", "key");
        assert_eq!(
            store.update_url("doc-1"),
            "https://proj.supabase.co/rest/v1/customer_documents?id=eq.doc-1"
        );
    }

    #[test]
    fn object_url_joins_bucket_and_path() {
        let store = RestStore::new("https://proj.supabase.co", "key");
        assert_eq!(
            store.object_url("uploads/policy.jpg"),
            "https://proj.supabase.co/storage/v1/object/customer-documents/uploads/policy.jpg"
        );
        // A stored path with a leading slash must not double up.
        assert_eq!(
            store.object_url("/uploads/policy.jpg"),
            "https://proj.supabase.co/storage/v1/object/customer-documents/uploads/policy.jpg"
        );
    }

    #[test]
    fn trailing_slash_on_base_url_is_trimmed() {
        let store = RestStore::new("https://proj.supabase.co/", "key");
        assert_eq!(
            store.update_url("d"),
            "https://proj.supabase.co/rest/v1/customer_documents?id=eq.d"
        );
    }

    #[test]
    fn table_and_bucket_are_overridable() {
        let store = RestStore::new("https://proj.supabase.co", "key")
            .with_table("tenant_documents")
            .with_bucket("tenant-files");
        assert!(store.select_url("d").contains("/rest/v1/tenant_documents?"));
        assert!(store.object_url("f").contains("/storage/v1/object/tenant-files/"));
    }
}
