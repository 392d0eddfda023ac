use std::sync::Arc;

use tracing::debug;

use mbsearch_core::error::{Error, Result};
use mbsearch_core::types::{EntityType, Hit, QueryResult};
use mbsearch_mmd::{ListAccessor, ListEntry, Metadata, StoredRecordCodec};

/// Scale a raw relevance score against the best score of the result set.
///
/// Returns 100 when there is no usable maximum.
pub fn normalize_score(score: f32, max_score: Option<f32>) -> u32 {
    match max_score {
        Some(max) if max.is_finite() && max > 0.0 => {
            let scaled = (score / max * 100.0).round();
            if scaled.is_finite() { scaled.clamp(0.0, 100.0) as u32 } else { 0 }
        }
        _ => 100,
    }
}

/// Builds the response aggregate for one entity type from ranked hits.
pub struct ResultAssembler {
    codec: StoredRecordCodec,
    accessor: Arc<dyn ListAccessor>,
    store_field: String,
}

impl ResultAssembler {
    pub fn new(accessor: Arc<dyn ListAccessor>, store_field: impl Into<String>) -> Self {
        Self { codec: StoredRecordCodec::new(accessor.entity_type()), accessor, store_field: store_field.into() }
    }

    pub fn entity_type(&self) -> EntityType {
        self.accessor.entity_type()
    }

    /// Decode the stored record of every hit, in order, into the list for
    /// this entity type. The list always exists, even without hits.
    pub fn assemble(&self, result: &QueryResult) -> Result<Metadata> {
        let mut metadata = Metadata::default();
        {
            let list = self.accessor.list_mut(&mut metadata);
            list.count = result.count;
            list.offset = result.offset;
        }
        for hit in &result.hits {
            let entry = self.decode_hit(hit, result.max_score)?;
            self.accessor.append(&mut metadata, entry);
        }
        debug!(entity_type = %self.entity_type(), count = result.count, offset = result.offset, entries = result.hits.len(), "assembled result list");
        Ok(metadata)
    }

    fn decode_hit(&self, hit: &Hit, max_score: Option<f32>) -> Result<ListEntry> {
        let payload = hit
            .field(&self.store_field)
            .ok_or_else(|| Error::StoreFieldMissing { id: hit.id.clone() })?;
        let entity = self.codec.decode(payload).map_err(|e| {
            debug!(id = %hit.id, reason = %e, "stored record does not decode as {}", self.entity_type());
            Error::StoreDecodeFailed { payload: payload.to_string(), reason: e.to_string() }
        })?;
        Ok(ListEntry { entity, score: Some(normalize_score(hit.score, max_score)) })
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_score;

    #[test]
    fn scores_scale_against_the_maximum() {
        assert_eq!(normalize_score(2.0, Some(4.0)), 50);
        assert_eq!(normalize_score(4.0, Some(4.0)), 100);
        assert_eq!(normalize_score(1.0, Some(3.0)), 33);
        assert_eq!(normalize_score(0.0, Some(3.0)), 0);
    }

    #[test]
    fn missing_or_degenerate_maximum_means_full_score() {
        assert_eq!(normalize_score(1.5, None), 100);
        assert_eq!(normalize_score(1.5, Some(0.0)), 100);
        assert_eq!(normalize_score(1.5, Some(f32::NAN)), 100);
        assert_eq!(normalize_score(1.5, Some(f32::INFINITY)), 100);
    }

    #[test]
    fn scores_above_the_maximum_are_capped() {
        assert_eq!(normalize_score(8.0, Some(4.0)), 100);
    }
}
