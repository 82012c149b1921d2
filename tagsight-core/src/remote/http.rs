use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use sha2::{Digest, Sha256};
use tagsight_model::{AssetId, CatalogEntity, ImageArtifact};
use tracing::{debug, info};
use url::Url;

use crate::create::EntityFields;
use crate::remote::directory::{CreatedRecord, EntityDirectory};
use crate::remote::error::DirectoryError;

/// Integrity header sent alongside uploaded artifact bytes.
const DIGEST_HEADER: &str = "x-artifact-sha256";

/// HTTP binding of [`EntityDirectory`].
///
/// Uses a plain [`reqwest::Client`] with transport-default timeouts; the
/// caller decides when an operation has waited long enough by cancelling the
/// surrounding task.
#[derive(Debug, Clone)]
pub struct HttpEntityDirectory {
    client: Client,
    assets_url: Url,
    artifact_segment: String,
}

impl HttpEntityDirectory {
    /// Build a directory client rooted at `base_url`, e.g.
    /// `http://127.0.0.1:8080/api` with `assets_path = "assets"` and
    /// `artifact_segment = "artifact"`.
    pub fn new(
        base_url: &str,
        assets_path: &str,
        artifact_segment: &str,
    ) -> Result<Self, DirectoryError> {
        let mut assets_url = Url::parse(base_url).map_err(|err| {
            DirectoryError::InvalidEndpoint(format!("{base_url}: {err}"))
        })?;
        {
            let mut segments = assets_url.path_segments_mut().map_err(|()| {
                DirectoryError::InvalidEndpoint(format!(
                    "{base_url} cannot carry path segments"
                ))
            })?;
            segments.pop_if_empty();
            segments.extend(assets_path.split('/').filter(|part| !part.is_empty()));
        }

        Ok(Self {
            client: Client::new(),
            assets_url,
            artifact_segment: artifact_segment.trim_matches('/').to_owned(),
        })
    }

    fn artifact_url(&self, id: &AssetId) -> Result<Url, DirectoryError> {
        let mut url = self.assets_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                DirectoryError::InvalidEndpoint(
                    "assets url cannot carry path segments".into(),
                )
            })?;
            segments.push(id.as_str());
            if !self.artifact_segment.is_empty() {
                segments.push(&self.artifact_segment);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl EntityDirectory for HttpEntityDirectory {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntity>, DirectoryError> {
        debug!(target: "remote", url = %self.assets_url, "fetching catalog");
        let response = self.client.get(self.assets_url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let catalog: Vec<CatalogEntity> = serde_json::from_str(&body)
            .map_err(|err| DirectoryError::InvalidBody(err.to_string()))?;
        info!(target: "remote", entities = catalog.len(), "catalog fetched");
        Ok(catalog)
    }

    async fn create_entity(
        &self,
        fields: &EntityFields,
    ) -> Result<CreatedRecord, DirectoryError> {
        debug!(target: "remote", url = %self.assets_url, "creating entity");
        let response = self
            .client
            .post(self.assets_url.clone())
            .json(fields)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw: serde_json::Value = serde_json::from_str(&body)
            .map_err(|err| DirectoryError::InvalidBody(err.to_string()))?;
        let id = extract_created_id(&raw).ok_or(DirectoryError::MissingIdentifier)?;
        info!(target: "remote", %id, "entity created");
        Ok(CreatedRecord { id, raw })
    }

    async fn attach_artifact(
        &self,
        id: &AssetId,
        artifact: &ImageArtifact,
    ) -> Result<(), DirectoryError> {
        let url = self.artifact_url(id)?;
        debug!(
            target: "remote",
            url = %url,
            bytes = artifact.bytes().len(),
            "attaching artifact"
        );
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, artifact.mime())
            .header(DIGEST_HEADER, hex_digest(artifact.bytes()))
            .body(artifact.bytes().to_vec())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!(target: "remote", %id, "artifact attached");
        Ok(())
    }
}

/// Pull the created identifier out of a creation response body. The
/// directory hands back `id` as either a JSON string or a bare number.
fn extract_created_id(raw: &serde_json::Value) -> Option<AssetId> {
    match raw.get("id")? {
        serde_json::Value::String(id) if !id.is_empty() => {
            Some(AssetId::new(id.clone()))
        }
        serde_json::Value::Number(id) => Some(AssetId::new(id.to_string())),
        _ => None,
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
