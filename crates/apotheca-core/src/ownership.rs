use apotheca_db::Store;
use apotheca_types::models::Pharmacy;

use crate::error::{ServiceError, ServiceResult};

/// Guard for owner-scoped operations: the pharmacy must exist and belong to
/// `owner_id`. Returns the loaded pharmacy so callers can reuse it.
pub fn verify_ownership(
    store: &dyn Store,
    pharmacy_id: &str,
    owner_id: &str,
) -> ServiceResult<Pharmacy> {
    let pharmacy = store
        .get_pharmacy(pharmacy_id)?
        .ok_or_else(|| ServiceError::not_found("Pharmacy"))?;

    if pharmacy.owner_id != owner_id {
        return Err(ServiceError::Forbidden(
            "You do not have access to this pharmacy".into(),
        ));
    }

    Ok(pharmacy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn owner_passes_guard() {
        let db = fixtures::db();
        fixtures::seed_pharmacy(&db, "ph-1", "own-1");

        let pharmacy = verify_ownership(db.as_ref(), "ph-1", "own-1").unwrap();
        assert_eq!(pharmacy.id, "ph-1");
    }

    #[test]
    fn other_owner_is_forbidden() {
        let db = fixtures::db();
        fixtures::seed_pharmacy(&db, "ph-1", "own-1");
        fixtures::seed_pharmacy(&db, "ph-2", "own-2");

        let err = verify_ownership(db.as_ref(), "ph-1", "own-2").unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[test]
    fn missing_pharmacy_is_not_found() {
        let db = fixtures::db();
        let err = verify_ownership(db.as_ref(), "nope", "own-1").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
