use chrono::{DateTime, Utc};
use serde::Serialize;
use tagsight_model::{DraftId, ImageArtifact};

use crate::error::{Result, ScanError};

/// Entity fields submitted in phase 1 of creation. The image artifact never
/// travels with these; it is attached separately in phase 2.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFields {
    pub name: String,
    pub property_number: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Form state for a new asset: the user-entered fields plus the captured
/// image. Consumed by value on submission.
#[derive(Debug, Clone)]
pub struct CreationDraft {
    id: DraftId,
    name: String,
    property_number: String,
    code: String,
    description: Option<String>,
    artifact: Option<ImageArtifact>,
    created_at: DateTime<Utc>,
}

impl CreationDraft {
    pub fn new() -> Self {
        Self {
            id: DraftId::new(),
            name: String::new(),
            property_number: String::new(),
            code: String::new(),
            description: None,
            artifact: None,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> DraftId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_property_number(mut self, property_number: impl Into<String>) -> Self {
        self.property_number = property_number.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Free-form note carried along with the entity fields. Optional; never
    /// part of validation.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_artifact(mut self, artifact: ImageArtifact) -> Self {
        self.artifact = Some(artifact);
        self
    }

    /// Split the draft into its submission parts, validating first. All
    /// entity fields must be non-empty and an image artifact with actual
    /// bytes must be attached.
    pub(crate) fn into_submission(
        self,
    ) -> Result<(DraftId, EntityFields, ImageArtifact)> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.property_number.is_empty() {
            missing.push("property number");
        }
        if self.code.is_empty() {
            missing.push("code");
        }
        if !missing.is_empty() {
            return Err(ScanError::DraftIncomplete(format!(
                "draft is missing: {}",
                missing.join(", ")
            )));
        }

        let artifact = match self.artifact {
            Some(artifact) if !artifact.is_empty() => artifact,
            _ => {
                return Err(ScanError::DraftIncomplete(
                    "draft has no usable image artifact".into(),
                ));
            }
        };

        Ok((
            self.id,
            EntityFields {
                name: self.name,
                property_number: self.property_number,
                code: self.code,
                description: self.description,
            },
            artifact,
        ))
    }
}

impl Default for CreationDraft {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn complete_draft() -> CreationDraft {
        CreationDraft::new()
            .with_name("Projector")
            .with_property_number("PN-1024")
            .with_code("QR-77")
            .with_artifact(ImageArtifact::png(vec![1, 2, 3]))
    }

    #[test]
    fn a_complete_draft_converts_to_a_submission() {
        let draft = complete_draft().with_description("third floor, lab B");
        let draft_id = draft.id();

        let (id, fields, artifact) = draft.into_submission().unwrap();
        assert_eq!(id, draft_id);
        assert_eq!(fields.name, "Projector");
        assert_eq!(fields.property_number, "PN-1024");
        assert_eq!(fields.code, "QR-77");
        assert_eq!(fields.description.as_deref(), Some("third floor, lab B"));
        assert_eq!(artifact.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn a_description_is_never_required() {
        let (_, fields, _) = complete_draft().into_submission().unwrap();
        assert!(fields.description.is_none());
    }

    #[test]
    fn missing_fields_are_reported_together() {
        let draft = CreationDraft::new().with_name("Projector");

        let err = draft.into_submission().unwrap_err();
        let ScanError::DraftIncomplete(message) = err else {
            panic!("expected DraftIncomplete, got {err:?}");
        };
        assert!(message.contains("property number"));
        assert!(message.contains("code"));
        assert!(!message.contains("name"));
    }

    #[test]
    fn an_absent_or_empty_artifact_fails_validation() {
        let without = CreationDraft::new()
            .with_name("Projector")
            .with_property_number("PN-1024")
            .with_code("QR-77");
        assert!(matches!(
            without.clone().into_submission(),
            Err(ScanError::DraftIncomplete(_))
        ));

        let empty = without.with_artifact(ImageArtifact::png(Vec::new()));
        assert!(matches!(
            empty.into_submission(),
            Err(ScanError::DraftIncomplete(_))
        ));
    }

    #[test]
    fn entity_fields_serialize_camel_case() {
        let fields = EntityFields {
            name: "Projector".into(),
            property_number: "PN-1024".into(),
            code: "QR-77".into(),
            description: None,
        };
        // An absent description stays out of the request body entirely.
        assert_eq!(
            serde_json::to_value(&fields).unwrap(),
            json!({
                "name": "Projector",
                "propertyNumber": "PN-1024",
                "code": "QR-77",
            })
        );
    }
}
