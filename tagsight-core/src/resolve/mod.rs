//! Payload-to-catalog resolution.
//!
//! A decoded payload is looked up against the asset catalog as fetched, in
//! order. There is no case folding and no partial matching; an entity matches
//! only when one of its candidate fields equals the payload text exactly,
//! either as-is or through the canonical text rendering of a numeric field.

use tagsight_model::{CatalogEntity, DecodedPayload};
use tracing::debug;

/// Find the first catalog entity whose candidate fields match `payload`.
///
/// Candidate fields are checked in entity order, `property_number` before
/// `code`. Absent fields never match. `None` means no match, an expected
/// outcome rather than an error.
pub fn resolve<'a>(
    payload: &str,
    catalog: &'a [CatalogEntity],
) -> Option<&'a CatalogEntity> {
    let found = catalog
        .iter()
        .find(|entity| entity.matches_payload(payload));
    match found {
        Some(entity) => debug!(
            target: "resolve",
            asset = %entity.id,
            "payload resolved to catalog entity"
        ),
        None => debug!(
            target: "resolve",
            payload_len = payload.len(),
            "payload resolved to no entity"
        ),
    }
    found
}

/// [`resolve`] over a decode outcome.
pub fn resolve_payload<'a>(
    payload: &DecodedPayload,
    catalog: &'a [CatalogEntity],
) -> Option<&'a CatalogEntity> {
    resolve(payload.text(), catalog)
}
