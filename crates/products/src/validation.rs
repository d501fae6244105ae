//! Id-set helpers used by bulk product validation.

use std::collections::HashSet;

use catalog_core::ProductId;

/// Distinct ids, keeping the order of first occurrence.
pub fn dedup_ids(ids: &[ProductId]) -> Vec<ProductId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Requested ids (in request order) that are not among `found`.
pub fn missing_ids(
    requested: &[ProductId],
    found: impl IntoIterator<Item = ProductId>,
) -> Vec<ProductId> {
    let found: HashSet<ProductId> = found.into_iter().collect();
    requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(raw: &[i32]) -> Vec<ProductId> {
        raw.iter().copied().map(ProductId::new).collect()
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        assert_eq!(dedup_ids(&ids(&[3, 1, 3, 2, 1])), ids(&[3, 1, 2]));
        assert!(dedup_ids(&[]).is_empty());
    }

    #[test]
    fn missing_reports_absent_ids_in_request_order() {
        let requested = ids(&[5, 1, 9, 2]);
        let missing = missing_ids(&requested, ids(&[1, 2]));
        assert_eq!(missing, ids(&[5, 9]));
    }

    #[test]
    fn nothing_missing_when_all_found() {
        let requested = ids(&[1, 2]);
        assert!(missing_ids(&requested, ids(&[2, 1, 7])).is_empty());
    }

    proptest! {
        /// Property: deduplication is idempotent and loses no distinct id.
        #[test]
        fn dedup_is_idempotent(raw in prop::collection::vec(0i32..20, 0..40)) {
            let input = ids(&raw);
            let once = dedup_ids(&input);
            prop_assert_eq!(dedup_ids(&once), once.clone());

            let distinct: HashSet<ProductId> = input.iter().copied().collect();
            prop_assert_eq!(once.len(), distinct.len());
        }
    }
}
