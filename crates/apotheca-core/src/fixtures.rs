//! Seed data for the service tests.

use std::sync::Arc;

use apotheca_db::{AccountRow, AccountStore, CatalogStore, Database, DirectoryStore, SubscriptionStore};
use apotheca_types::models::{
    AccountStatus, Availability, Location, Medicine, MedicineSubscription, Pharmacy,
    PharmacyStatus, Role,
};
use chrono::Utc;

pub fn db() -> Arc<Database> {
    Arc::new(Database::open_in_memory().unwrap())
}

pub fn account(id: &str, role: Role, name: &str) -> AccountRow {
    let now = Utc::now();
    AccountRow {
        id: id.into(),
        role,
        name: name.into(),
        email: format!("{id}@example.com"),
        password: "hash".into(),
        status: AccountStatus::Active,
        pharmacy_id: None,
        notifications_enabled: None,
        created_at: now,
        updated_at: now,
        created_by: None,
    }
}

pub fn seed_pharmacy(db: &Database, id: &str, owner_id: &str) -> Pharmacy {
    let now = Utc::now();
    let pharmacy = Pharmacy {
        id: id.into(),
        title: format!("Pharmacy {id}"),
        description: "Neighbourhood pharmacy".into(),
        image_url: String::new(),
        location: Location {
            latitude: 40.0,
            longitude: 29.0,
            address: None,
        },
        owner_id: owner_id.into(),
        working_hours: vec![],
        status: PharmacyStatus::Active,
        created_at: now,
        updated_at: now,
        created_by: "admin-1".into(),
    };
    db.create_pharmacy_with_owner(&pharmacy, &account(owner_id, Role::PharmacyOwner, "Owner"))
        .unwrap();
    pharmacy
}

pub fn seed_medicine(db: &Database, id: &str, title: &str) -> Medicine {
    let now = Utc::now();
    let medicine = Medicine {
        id: id.into(),
        title: title.into(),
        description: String::new(),
        front_image_url: String::new(),
        back_image_url: String::new(),
        status: Availability::Available,
        created_at: now,
        updated_at: now,
        created_by: "admin-1".into(),
    };
    db.insert_medicine(&medicine).unwrap();
    medicine
}

pub fn seed_user(db: &Database, id: &str, notifications_enabled: Option<bool>) -> AccountRow {
    let mut user = account(id, Role::User, "Patient");
    user.notifications_enabled = notifications_enabled;
    db.insert_account(&user).unwrap();
    user
}

pub fn seed_subscription(
    db: &Database,
    id: &str,
    user_id: &str,
    pharmacy_id: &str,
    medicine_name: &str,
) {
    db.insert_subscription(&MedicineSubscription {
        id: id.into(),
        user_id: user_id.into(),
        pharmacy_id: pharmacy_id.into(),
        medicine_name: medicine_name.into(),
        pharmacy_name: format!("Pharmacy {pharmacy_id}"),
        notified: false,
        triggered: false,
        triggered_at: None,
    })
    .unwrap();
}
