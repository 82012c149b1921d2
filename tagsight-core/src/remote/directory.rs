use async_trait::async_trait;
use tagsight_model::{AssetId, CatalogEntity, ImageArtifact};

use crate::create::EntityFields;
use crate::remote::error::DirectoryError;

/// A record freshly created by the directory: the extracted identifier plus
/// the raw response body for anything the caller wants to inspect.
#[derive(Debug, Clone)]
pub struct CreatedRecord {
    pub id: AssetId,
    pub raw: serde_json::Value,
}

/// Remote asset directory, as consumed by the core.
///
/// `fetch_catalog` returns entities in directory order; resolution depends on
/// that order being preserved. `create_entity` and `attach_artifact` are the
/// two independent remote writes behind the two-phase create protocol.
#[async_trait]
pub trait EntityDirectory: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntity>, DirectoryError>;

    async fn create_entity(
        &self,
        fields: &EntityFields,
    ) -> Result<CreatedRecord, DirectoryError>;

    async fn attach_artifact(
        &self,
        id: &AssetId,
        artifact: &ImageArtifact,
    ) -> Result<(), DirectoryError>;
}
