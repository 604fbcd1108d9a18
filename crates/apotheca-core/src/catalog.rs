//! Admin-managed medicine catalog and pharmacy directory.
//!
//! Store writes are synchronous. Operations that replace or drop images
//! return the stale URLs so the caller can remove them with
//! [`CatalogService::discard_images`] once the write has committed.

use std::sync::Arc;

use apotheca_db::{AccountRow, Store};
use apotheca_types::api::{
    CreateMedicineRequest, CreatePharmacyRequest, CreatePharmacyResponse, PharmacyWithOwner,
    UpdateMedicineRequest, UpdatePharmacyRequest,
};
use apotheca_types::models::{
    AccountProfile, AccountStatus, Availability, Medicine, Pharmacy, PharmacyStatus, Role,
};
use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::object_store::{ObjectStore, check_image, object_key};

pub const MEDICINE_IMAGE_FOLDER: &str = "medicines";
pub const PHARMACY_IMAGE_FOLDER: &str = "pharmacies";
pub const CATALOG_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Case-insensitive substring match used by the admin search routes.
pub(crate) fn matches_query(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Result of a write that may have orphaned stored images.
#[derive(Debug)]
pub struct Updated<T> {
    pub item: T,
    pub stale_images: Vec<String>,
}

pub struct CatalogService {
    store: Arc<dyn Store>,
    objects: Arc<dyn ObjectStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { store, objects }
    }

    // -- Medicines --

    pub fn create_medicine(&self, admin_id: &str, req: CreateMedicineRequest) -> ServiceResult<Medicine> {
        let title = req.title.trim();
        if title.is_empty() {
            return Err(ServiceError::BadRequest("Title is required".into()));
        }

        let now = Utc::now();
        let medicine = Medicine {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: req.description,
            front_image_url: req.front_image_url.unwrap_or_default(),
            back_image_url: req.back_image_url.unwrap_or_default(),
            status: req.status.unwrap_or(Availability::Available),
            created_at: now,
            updated_at: now,
            created_by: admin_id.to_string(),
        };
        self.store.insert_medicine(&medicine)?;

        info!("Admin {} created medicine {} ('{}')", admin_id, medicine.id, medicine.title);
        Ok(medicine)
    }

    /// Newest first, optionally only one availability.
    pub fn list_medicines(&self, status: Option<Availability>) -> ServiceResult<Vec<Medicine>> {
        let mut medicines = self.store.list_medicines()?;
        if let Some(status) = status {
            medicines.retain(|m| m.status == status);
        }
        Ok(medicines)
    }

    pub fn search_medicines(&self, query: &str) -> ServiceResult<Vec<Medicine>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(ServiceError::BadRequest("Search query is required".into()));
        }
        let mut medicines = self.store.list_medicines()?;
        medicines.retain(|m| matches_query(&m.title, &needle));
        Ok(medicines)
    }

    pub fn get_medicine(&self, id: &str) -> ServiceResult<Medicine> {
        self.store
            .get_medicine(id)?
            .ok_or_else(|| ServiceError::not_found("Medicine"))
    }

    /// Applies the present fields. Replaced image URLs come back as stale.
    pub fn update_medicine(
        &self,
        id: &str,
        req: UpdateMedicineRequest,
    ) -> ServiceResult<Updated<Medicine>> {
        let mut medicine = self.get_medicine(id)?;
        let mut stale_images = Vec::new();

        if let Some(title) = req.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(ServiceError::BadRequest("Title cannot be empty".into()));
            }
            medicine.title = title.to_string();
        }
        if let Some(description) = req.description {
            medicine.description = description;
        }
        if let Some(url) = req.front_image_url {
            replace_image(&mut medicine.front_image_url, url, &mut stale_images);
        }
        if let Some(url) = req.back_image_url {
            replace_image(&mut medicine.back_image_url, url, &mut stale_images);
        }
        if let Some(status) = req.status {
            medicine.status = status;
        }
        medicine.updated_at = Utc::now();

        if !self.store.update_medicine(&medicine)? {
            return Err(ServiceError::not_found("Medicine"));
        }
        info!("Updated medicine {}", id);
        Ok(Updated {
            item: medicine,
            stale_images,
        })
    }

    /// Hard delete. Inventory rows pointing at the medicine are left in
    /// place. Returns the images the medicine referenced.
    pub fn delete_medicine(&self, id: &str) -> ServiceResult<Vec<String>> {
        let medicine = self.get_medicine(id)?;
        if !self.store.delete_medicine(id)? {
            return Err(ServiceError::not_found("Medicine"));
        }
        info!("Deleted medicine {} ('{}')", id, medicine.title);

        Ok([medicine.front_image_url, medicine.back_image_url]
            .into_iter()
            .filter(|url| !url.is_empty())
            .collect())
    }

    // -- Pharmacies --

    /// Creates the pharmacy and its owner account together. The password
    /// must already be hashed.
    pub fn create_pharmacy(
        &self,
        admin_id: &str,
        req: CreatePharmacyRequest,
        password_hash: String,
    ) -> ServiceResult<CreatePharmacyResponse> {
        let title = req.title.trim();
        if title.is_empty() {
            return Err(ServiceError::BadRequest("Title is required".into()));
        }
        let email = normalize_email(&req.owner_email);
        if email.is_empty() {
            return Err(ServiceError::BadRequest("Owner email is required".into()));
        }
        if self
            .store
            .get_account_by_email(Role::PharmacyOwner, &email)?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "Pharmacy owner with this email already exists".into(),
            ));
        }

        let now = Utc::now();
        let pharmacy = Pharmacy {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: req.description,
            image_url: req.image_url.unwrap_or_default(),
            location: req.location,
            owner_id: Uuid::new_v4().to_string(),
            working_hours: req.working_hours,
            status: req.status.unwrap_or(PharmacyStatus::Active),
            created_at: now,
            updated_at: now,
            created_by: admin_id.to_string(),
        };
        let owner = AccountRow {
            id: pharmacy.owner_id.clone(),
            role: Role::PharmacyOwner,
            name: req
                .owner_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| format!("{} Owner", pharmacy.title)),
            email,
            password: password_hash,
            status: AccountStatus::Active,
            pharmacy_id: Some(pharmacy.id.clone()),
            notifications_enabled: None,
            created_at: now,
            updated_at: now,
            created_by: Some(admin_id.to_string()),
        };
        self.store.create_pharmacy_with_owner(&pharmacy, &owner)?;

        info!(
            "Admin {} created pharmacy {} with owner {}",
            admin_id, pharmacy.id, owner.id
        );
        Ok(CreatePharmacyResponse {
            owner: owner.profile(),
            pharmacy,
        })
    }

    pub fn list_pharmacies(&self, status: Option<PharmacyStatus>) -> ServiceResult<Vec<Pharmacy>> {
        let mut pharmacies = self.store.list_pharmacies()?;
        if let Some(status) = status {
            pharmacies.retain(|p| p.status == status);
        }
        Ok(pharmacies)
    }

    /// A blank query lists every pharmacy.
    pub fn search_pharmacies(&self, query: &str) -> ServiceResult<Vec<Pharmacy>> {
        let needle = query.trim().to_lowercase();
        let mut pharmacies = self.store.list_pharmacies()?;
        pharmacies.retain(|p| matches_query(&p.title, &needle));
        Ok(pharmacies)
    }

    pub fn get_pharmacy(&self, id: &str) -> ServiceResult<Pharmacy> {
        self.store
            .get_pharmacy(id)?
            .ok_or_else(|| ServiceError::not_found("Pharmacy"))
    }

    pub fn pharmacy_with_owner(&self, id: &str) -> ServiceResult<PharmacyWithOwner> {
        let pharmacy = self.get_pharmacy(id)?;
        let owner = self.store.get_account(&pharmacy.owner_id)?.map(|o| o.profile());
        Ok(PharmacyWithOwner { pharmacy, owner })
    }

    /// Partial update of the pharmacy and, through the `owner*` fields, its
    /// owner account. Both are written in one transaction.
    pub fn update_pharmacy(
        &self,
        id: &str,
        req: UpdatePharmacyRequest,
        owner_password_hash: Option<String>,
    ) -> ServiceResult<Updated<PharmacyWithOwner>> {
        let mut pharmacy = self.get_pharmacy(id)?;
        let mut stale_images = Vec::new();
        let now = Utc::now();

        if let Some(title) = req.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(ServiceError::BadRequest("Title cannot be empty".into()));
            }
            pharmacy.title = title.to_string();
        }
        if let Some(description) = req.description {
            pharmacy.description = description;
        }
        if let Some(url) = req.image_url {
            replace_image(&mut pharmacy.image_url, url, &mut stale_images);
        }
        if let Some(location) = req.location {
            pharmacy.location = location;
        }
        if let Some(hours) = req.working_hours {
            pharmacy.working_hours = hours;
        }
        if let Some(status) = req.status {
            pharmacy.status = status;
        }
        pharmacy.updated_at = now;

        let owner_changed =
            req.owner_name.is_some() || req.owner_email.is_some() || owner_password_hash.is_some();
        let owner = if owner_changed {
            let mut owner = self
                .store
                .get_account(&pharmacy.owner_id)?
                .ok_or_else(|| ServiceError::not_found("Owner"))?;

            if let Some(name) = req.owner_name.filter(|n| !n.trim().is_empty()) {
                owner.name = name.trim().to_string();
            }
            if let Some(email) = req.owner_email {
                let email = normalize_email(&email);
                if !email.contains('@') {
                    return Err(ServiceError::BadRequest("Invalid email format".into()));
                }
                if let Some(other) = self.store.get_account_by_email(Role::PharmacyOwner, &email)? {
                    if other.id != owner.id {
                        return Err(ServiceError::Conflict(
                            "Email already in use by another owner".into(),
                        ));
                    }
                }
                owner.email = email;
            }
            if let Some(hash) = owner_password_hash {
                owner.password = hash;
            }
            owner.updated_at = now;
            Some(owner)
        } else {
            None
        };

        if !self.store.update_pharmacy(&pharmacy, owner.as_ref())? {
            return Err(ServiceError::not_found("Pharmacy"));
        }
        info!("Updated pharmacy {}", id);

        let owner = match owner {
            Some(owner) => Some(owner.profile()),
            None => self.store.get_account(&pharmacy.owner_id)?.map(|o| o.profile()),
        };
        Ok(Updated {
            item: PharmacyWithOwner { pharmacy, owner },
            stale_images,
        })
    }

    /// Removes the pharmacy together with its inventory and owner account.
    /// Returns the pharmacy image, if any.
    pub fn delete_pharmacy(&self, id: &str) -> ServiceResult<Vec<String>> {
        let pharmacy = self.get_pharmacy(id)?;
        if !self.store.delete_pharmacy_with_owner(id)? {
            return Err(ServiceError::not_found("Pharmacy"));
        }
        info!("Deleted pharmacy {} and owner {}", id, pharmacy.owner_id);

        Ok(Some(pharmacy.image_url)
            .filter(|url| !url.is_empty())
            .into_iter()
            .collect())
    }

    pub fn list_owners(&self) -> ServiceResult<Vec<AccountProfile>> {
        Ok(self
            .store
            .list_accounts(Role::PharmacyOwner)?
            .iter()
            .map(AccountRow::profile)
            .collect())
    }

    pub fn get_owner(&self, id: &str) -> ServiceResult<AccountProfile> {
        self.store
            .get_account(id)?
            .filter(|a| a.role == Role::PharmacyOwner)
            .map(|a| a.profile())
            .ok_or_else(|| ServiceError::not_found("Owner"))
    }

    // -- Images --

    /// Stores a catalog image (medicine or pharmacy) and returns its URL.
    pub async fn upload_image(
        &self,
        folder: &str,
        data: Bytes,
        content_type: &str,
    ) -> ServiceResult<String> {
        check_image(&data, content_type, CATALOG_IMAGE_TYPES)?;
        let key = object_key(folder, content_type);
        Ok(self.objects.upload(data, content_type, &key).await?)
    }

    /// Best-effort removal of images that no record references any more.
    pub async fn discard_images(&self, urls: Vec<String>) {
        for url in urls {
            if let Err(e) = self.objects.delete(&url).await {
                warn!("Failed to delete image {}: {}", url, e);
            }
        }
    }
}

fn replace_image(slot: &mut String, url: String, stale: &mut Vec<String>) {
    if *slot == url {
        return;
    }
    let old = std::mem::replace(slot, url);
    if !old.is_empty() {
        stale.push(old);
    }
}
