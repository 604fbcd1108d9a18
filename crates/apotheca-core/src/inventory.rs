use std::collections::HashSet;
use std::sync::Arc;

use apotheca_db::Store;
use apotheca_types::models::{
    Availability, Medicine, Pharmacy, PharmacyMedicine, PharmacyMedicineDetails,
};
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::notifications::{AvailabilityEvent, NotificationQueue};
use crate::ownership::verify_ownership;

/// Per-pharmacy stock of catalog medicines. Every operation is owner-scoped
/// and starts with the ownership guard.
pub struct InventoryManager {
    store: Arc<dyn Store>,
    queue: NotificationQueue,
}

impl InventoryManager {
    pub fn new(store: Arc<dyn Store>, queue: NotificationQueue) -> Self {
        Self { store, queue }
    }

    pub fn add_medicine(
        &self,
        pharmacy_id: &str,
        owner_id: &str,
        medicine_id: &str,
        status: Option<Availability>,
    ) -> ServiceResult<PharmacyMedicine> {
        let pharmacy = verify_ownership(self.store.as_ref(), pharmacy_id, owner_id)?;

        let medicine = self
            .store
            .get_medicine(medicine_id)?
            .ok_or_else(|| ServiceError::not_found("Medicine"))?;

        if self.store.find_inventory_row(pharmacy_id, medicine_id)?.is_some() {
            return Err(already_added());
        }

        let now = Utc::now();
        let row = PharmacyMedicine {
            id: Uuid::new_v4().to_string(),
            pharmacy_id: pharmacy_id.to_string(),
            medicine_id: medicine_id.to_string(),
            status: status.unwrap_or(Availability::Available),
            added_at: now,
            updated_at: now,
            added_by: owner_id.to_string(),
        };
        // A concurrent add of the same pair trips the UNIQUE backstop.
        if let Err(e) = self.store.insert_inventory_row(&row) {
            return Err(match self.store.find_inventory_row(pharmacy_id, medicine_id)? {
                Some(_) => already_added(),
                None => e.into(),
            });
        }
        info!(
            "Added medicine {} to pharmacy {} ({})",
            medicine_id, pharmacy_id, row.status
        );

        if row.status == Availability::Available {
            self.notify(&pharmacy, &medicine);
        }

        Ok(row)
    }

    pub fn update_status(
        &self,
        row_id: &str,
        pharmacy_id: &str,
        owner_id: &str,
        new_status: Availability,
    ) -> ServiceResult<PharmacyMedicine> {
        let pharmacy = verify_ownership(self.store.as_ref(), pharmacy_id, owner_id)?;
        let mut row = self.load_row(row_id, pharmacy_id)?;

        let now = Utc::now();
        if !self.store.update_inventory_status(row_id, new_status, now)? {
            return Err(ServiceError::not_found("Pharmacy medicine"));
        }

        let previous = row.status;
        row.status = new_status;
        row.updated_at = now;
        debug!("Inventory row {}: {} -> {}", row_id, previous, new_status);

        if new_status == Availability::Available && previous != Availability::Available {
            match self.store.get_medicine(&row.medicine_id) {
                Ok(Some(medicine)) => self.notify(&pharmacy, &medicine),
                Ok(None) => debug!(
                    "Medicine {} no longer in catalog, not notifying",
                    row.medicine_id
                ),
                Err(e) => warn!(
                    "Failed to load medicine {} for notification: {}",
                    row.medicine_id, e
                ),
            }
        }

        Ok(row)
    }

    pub fn remove_medicine(&self, row_id: &str, pharmacy_id: &str, owner_id: &str) -> ServiceResult<()> {
        verify_ownership(self.store.as_ref(), pharmacy_id, owner_id)?;
        self.load_row(row_id, pharmacy_id)?;

        if !self.store.delete_inventory_row(row_id)? {
            return Err(ServiceError::not_found("Pharmacy medicine"));
        }
        info!("Removed inventory row {} from pharmacy {}", row_id, pharmacy_id);
        Ok(())
    }

    /// Inventory rows with their catalog entries inlined. A row whose
    /// medicine was deleted from the catalog carries `medicine: None`.
    pub fn list_for_pharmacy(
        &self,
        pharmacy_id: &str,
        owner_id: &str,
    ) -> ServiceResult<Vec<PharmacyMedicineDetails>> {
        verify_ownership(self.store.as_ref(), pharmacy_id, owner_id)?;

        self.store
            .list_inventory_rows(pharmacy_id)?
            .into_iter()
            .map(|row| -> ServiceResult<PharmacyMedicineDetails> {
                let medicine = self.store.get_medicine(&row.medicine_id)?;
                Ok(PharmacyMedicineDetails { row, medicine })
            })
            .collect()
    }

    /// Catalog medicines this pharmacy does not stock yet.
    pub fn list_addable(&self, pharmacy_id: &str, owner_id: &str) -> ServiceResult<Vec<Medicine>> {
        verify_ownership(self.store.as_ref(), pharmacy_id, owner_id)?;

        let stocked: HashSet<String> = self
            .store
            .list_inventory_rows(pharmacy_id)?
            .into_iter()
            .map(|row| row.medicine_id)
            .collect();

        Ok(self
            .store
            .list_medicines()?
            .into_iter()
            .filter(|m| !stocked.contains(&m.id))
            .collect())
    }

    fn load_row(&self, row_id: &str, pharmacy_id: &str) -> ServiceResult<PharmacyMedicine> {
        let row = self
            .store
            .get_inventory_row(row_id)?
            .ok_or_else(|| ServiceError::not_found("Pharmacy medicine"))?;

        if row.pharmacy_id != pharmacy_id {
            return Err(ServiceError::Forbidden(
                "This medicine does not belong to your pharmacy".into(),
            ));
        }
        Ok(row)
    }

    fn notify(&self, pharmacy: &Pharmacy, medicine: &Medicine) {
        if medicine.title.trim().is_empty() {
            debug!("Medicine {} has no title, not notifying", medicine.id);
            return;
        }
        self.queue.enqueue(AvailabilityEvent {
            pharmacy_id: pharmacy.id.clone(),
            pharmacy_name: pharmacy.title.clone(),
            medicine_name: medicine.title.clone(),
        });
    }
}

fn already_added() -> ServiceError {
    ServiceError::Conflict("Medicine already added to this pharmacy".into())
}
