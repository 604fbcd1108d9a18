use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Row, params};

use apotheca_types::models::{
    Availability, Medicine, MedicineSubscription, Pharmacy, PharmacyMedicine, Role,
    UserPreferences,
};

use crate::Database;
use crate::codec::{OptionalExt, decode_enum, decode_json, decode_opt_ts, decode_ts, encode_ts};
use crate::models::AccountRow;
use crate::store::{AccountStore, CatalogStore, DirectoryStore, InventoryStore, SubscriptionStore};

const ACCOUNT_COLUMNS: &str = "id, role, name, email, password, status, pharmacy_id, \
     notifications_enabled, created_at, updated_at, created_by";

const PHARMACY_COLUMNS: &str = "id, title, description, image_url, location, owner_id, \
     working_hours, status, created_at, updated_at, created_by";

const MEDICINE_COLUMNS: &str = "id, title, description, front_image_url, back_image_url, \
     status, created_at, updated_at, created_by";

const INVENTORY_COLUMNS: &str =
    "id, pharmacy_id, medicine_id, status, added_at, updated_at, added_by";

const SUBSCRIPTION_COLUMNS: &str =
    "id, user_id, pharmacy_id, medicine_name, pharmacy_name, notified, triggered, triggered_at";

// -- Accounts --

impl AccountStore for Database {
    fn insert_account(&self, account: &AccountRow) -> Result<()> {
        self.with_conn_mut(|conn| {
            insert_account_row(conn, account)?;
            Ok(())
        })
    }

    fn get_account(&self, id: &str) -> Result<Option<AccountRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
                [id],
                map_account,
            )
            .optional()
        })
    }

    fn get_account_by_email(&self, role: Role, email: &str) -> Result<Option<AccountRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE role = ?1 AND email = ?2"),
                params![role.as_str(), email],
                map_account,
            )
            .optional()
        })
    }

    fn get_user_preferences(&self, user_id: &str) -> Result<Option<UserPreferences>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT notifications_enabled FROM accounts WHERE id = ?1 AND role = ?2",
                params![user_id, Role::User.as_str()],
                |row| {
                    Ok(UserPreferences {
                        notifications_enabled: row.get(0)?,
                    })
                },
            )
            .optional()
        })
    }

    fn list_accounts(&self, role: Role) -> Result<Vec<AccountRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE role = ?1
                 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt
                .query_map([role.as_str()], map_account)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn update_account(&self, account: &AccountRow) -> Result<bool> {
        self.with_conn_mut(|conn| Ok(update_account_row(conn, account)? > 0))
    }

    fn delete_account(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM accounts WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }
}

fn update_account_row(conn: &rusqlite::Connection, account: &AccountRow) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE accounts SET name = ?1, email = ?2, password = ?3, status = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            account.name,
            account.email,
            account.password,
            account.status.as_str(),
            encode_ts(&account.updated_at),
            account.id,
        ],
    )
}

fn insert_account_row(conn: &rusqlite::Connection, account: &AccountRow) -> rusqlite::Result<usize> {
    conn.execute(
        &format!("INSERT INTO accounts ({ACCOUNT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"),
        params![
            account.id,
            account.role.as_str(),
            account.name,
            account.email,
            account.password,
            account.status.as_str(),
            account.pharmacy_id,
            account.notifications_enabled,
            encode_ts(&account.created_at),
            encode_ts(&account.updated_at),
            account.created_by,
        ],
    )
}

fn map_account(row: &Row<'_>) -> rusqlite::Result<AccountRow> {
    Ok(AccountRow {
        id: row.get(0)?,
        role: decode_enum(1, row.get(1)?)?,
        name: row.get(2)?,
        email: row.get(3)?,
        password: row.get(4)?,
        status: decode_enum(5, row.get(5)?)?,
        pharmacy_id: row.get(6)?,
        notifications_enabled: row.get(7)?,
        created_at: decode_ts(8, row.get(8)?)?,
        updated_at: decode_ts(9, row.get(9)?)?,
        created_by: row.get(10)?,
    })
}

// -- Pharmacies --

impl DirectoryStore for Database {
    fn create_pharmacy_with_owner(&self, pharmacy: &Pharmacy, owner: &AccountRow) -> Result<()> {
        let location = serde_json::to_string(&pharmacy.location)?;
        let working_hours = serde_json::to_string(&pharmacy.working_hours)?;

        self.with_conn_mut(|conn| {
            let tx = conn.unchecked_transaction()?;
            insert_account_row(&tx, owner)?;
            tx.execute(
                &format!("INSERT INTO pharmacies ({PHARMACY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"),
                params![
                    pharmacy.id,
                    pharmacy.title,
                    pharmacy.description,
                    pharmacy.image_url,
                    location,
                    pharmacy.owner_id,
                    working_hours,
                    pharmacy.status.as_str(),
                    encode_ts(&pharmacy.created_at),
                    encode_ts(&pharmacy.updated_at),
                    pharmacy.created_by,
                ],
            )?;
            tx.execute(
                "UPDATE accounts SET pharmacy_id = ?1 WHERE id = ?2",
                params![pharmacy.id, owner.id],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    fn get_pharmacy(&self, id: &str) -> Result<Option<Pharmacy>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {PHARMACY_COLUMNS} FROM pharmacies WHERE id = ?1"),
                [id],
                map_pharmacy,
            )
            .optional()
        })
    }

    fn get_pharmacy_by_owner(&self, owner_id: &str) -> Result<Option<Pharmacy>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {PHARMACY_COLUMNS} FROM pharmacies WHERE owner_id = ?1 LIMIT 1"),
                [owner_id],
                map_pharmacy,
            )
            .optional()
        })
    }

    fn list_pharmacies(&self) -> Result<Vec<Pharmacy>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PHARMACY_COLUMNS} FROM pharmacies ORDER BY created_at DESC"
            ))?;
            let rows = stmt
                .query_map([], map_pharmacy)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn update_pharmacy(&self, pharmacy: &Pharmacy, owner: Option<&AccountRow>) -> Result<bool> {
        let location = serde_json::to_string(&pharmacy.location)?;
        let working_hours = serde_json::to_string(&pharmacy.working_hours)?;

        self.with_conn_mut(|conn| {
            let tx = conn.unchecked_transaction()?;
            let n = tx.execute(
                "UPDATE pharmacies SET title = ?1, description = ?2, image_url = ?3,
                    location = ?4, working_hours = ?5, status = ?6, updated_at = ?7
                 WHERE id = ?8",
                params![
                    pharmacy.title,
                    pharmacy.description,
                    pharmacy.image_url,
                    location,
                    working_hours,
                    pharmacy.status.as_str(),
                    encode_ts(&pharmacy.updated_at),
                    pharmacy.id,
                ],
            )?;
            if n == 0 {
                return Ok(false);
            }
            if let Some(owner) = owner {
                update_account_row(&tx, owner)?;
            }
            tx.commit()?;
            Ok(true)
        })
    }

    fn delete_pharmacy_with_owner(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.unchecked_transaction()?;
            let owner_id: Option<String> = tx
                .query_row("SELECT owner_id FROM pharmacies WHERE id = ?1", [id], |r| r.get(0))
                .optional()?;
            let Some(owner_id) = owner_id else {
                return Ok(false);
            };

            tx.execute("DELETE FROM pharmacy_medicines WHERE pharmacy_id = ?1", [id])?;
            tx.execute("DELETE FROM pharmacies WHERE id = ?1", [id])?;
            tx.execute("DELETE FROM accounts WHERE id = ?1", [&owner_id])?;
            tx.commit()?;
            Ok(true)
        })
    }
}

fn map_pharmacy(row: &Row<'_>) -> rusqlite::Result<Pharmacy> {
    Ok(Pharmacy {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        image_url: row.get(3)?,
        location: decode_json(4, row.get(4)?)?,
        owner_id: row.get(5)?,
        working_hours: decode_json(6, row.get(6)?)?,
        status: decode_enum(7, row.get(7)?)?,
        created_at: decode_ts(8, row.get(8)?)?,
        updated_at: decode_ts(9, row.get(9)?)?,
        created_by: row.get(10)?,
    })
}

// -- Medicine catalog --

impl CatalogStore for Database {
    fn insert_medicine(&self, medicine: &Medicine) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                &format!("INSERT INTO medicines ({MEDICINE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
                params![
                    medicine.id,
                    medicine.title,
                    medicine.description,
                    medicine.front_image_url,
                    medicine.back_image_url,
                    medicine.status.as_str(),
                    encode_ts(&medicine.created_at),
                    encode_ts(&medicine.updated_at),
                    medicine.created_by,
                ],
            )?;
            Ok(())
        })
    }

    fn get_medicine(&self, id: &str) -> Result<Option<Medicine>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE id = ?1"),
                [id],
                map_medicine,
            )
            .optional()
        })
    }

    fn list_medicines(&self) -> Result<Vec<Medicine>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MEDICINE_COLUMNS} FROM medicines ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt
                .query_map([], map_medicine)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn update_medicine(&self, medicine: &Medicine) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE medicines SET title = ?1, description = ?2, front_image_url = ?3,
                    back_image_url = ?4, status = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    medicine.title,
                    medicine.description,
                    medicine.front_image_url,
                    medicine.back_image_url,
                    medicine.status.as_str(),
                    encode_ts(&medicine.updated_at),
                    medicine.id,
                ],
            )?;
            Ok(n > 0)
        })
    }

    fn delete_medicine(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM medicines WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }
}

fn map_medicine(row: &Row<'_>) -> rusqlite::Result<Medicine> {
    Ok(Medicine {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        front_image_url: row.get(3)?,
        back_image_url: row.get(4)?,
        status: decode_enum(5, row.get(5)?)?,
        created_at: decode_ts(6, row.get(6)?)?,
        updated_at: decode_ts(7, row.get(7)?)?,
        created_by: row.get(8)?,
    })
}

// -- Inventory --

impl InventoryStore for Database {
    fn insert_inventory_row(&self, row: &PharmacyMedicine) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                &format!("INSERT INTO pharmacy_medicines ({INVENTORY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
                params![
                    row.id,
                    row.pharmacy_id,
                    row.medicine_id,
                    row.status.as_str(),
                    encode_ts(&row.added_at),
                    encode_ts(&row.updated_at),
                    row.added_by,
                ],
            )?;
            Ok(())
        })
    }

    fn get_inventory_row(&self, id: &str) -> Result<Option<PharmacyMedicine>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {INVENTORY_COLUMNS} FROM pharmacy_medicines WHERE id = ?1"),
                [id],
                map_inventory_row,
            )
            .optional()
        })
    }

    fn find_inventory_row(
        &self,
        pharmacy_id: &str,
        medicine_id: &str,
    ) -> Result<Option<PharmacyMedicine>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {INVENTORY_COLUMNS} FROM pharmacy_medicines
                     WHERE pharmacy_id = ?1 AND medicine_id = ?2 LIMIT 1"
                ),
                params![pharmacy_id, medicine_id],
                map_inventory_row,
            )
            .optional()
        })
    }

    fn list_inventory_rows(&self, pharmacy_id: &str) -> Result<Vec<PharmacyMedicine>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {INVENTORY_COLUMNS} FROM pharmacy_medicines
                 WHERE pharmacy_id = ?1 ORDER BY added_at, id"
            ))?;
            let rows = stmt
                .query_map([pharmacy_id], map_inventory_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn update_inventory_status(
        &self,
        id: &str,
        status: Availability,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE pharmacy_medicines SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), encode_ts(&updated_at), id],
            )?;
            Ok(n > 0)
        })
    }

    fn delete_inventory_row(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM pharmacy_medicines WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }
}

fn map_inventory_row(row: &Row<'_>) -> rusqlite::Result<PharmacyMedicine> {
    Ok(PharmacyMedicine {
        id: row.get(0)?,
        pharmacy_id: row.get(1)?,
        medicine_id: row.get(2)?,
        status: decode_enum(3, row.get(3)?)?,
        added_at: decode_ts(4, row.get(4)?)?,
        updated_at: decode_ts(5, row.get(5)?)?,
        added_by: row.get(6)?,
    })
}

// -- Subscriptions --

impl SubscriptionStore for Database {
    fn insert_subscription(&self, subscription: &MedicineSubscription) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                &format!("INSERT INTO medicine_subscriptions ({SUBSCRIPTION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
                params![
                    subscription.id,
                    subscription.user_id,
                    subscription.pharmacy_id,
                    subscription.medicine_name,
                    subscription.pharmacy_name,
                    subscription.notified,
                    subscription.triggered,
                    subscription.triggered_at.as_ref().map(encode_ts),
                ],
            )?;
            Ok(())
        })
    }

    fn get_subscription(&self, id: &str) -> Result<Option<MedicineSubscription>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {SUBSCRIPTION_COLUMNS} FROM medicine_subscriptions WHERE id = ?1"),
                [id],
                map_subscription,
            )
            .optional()
        })
    }

    fn list_untriggered_subscriptions(
        &self,
        pharmacy_id: &str,
        medicine_name: &str,
    ) -> Result<Vec<MedicineSubscription>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUBSCRIPTION_COLUMNS} FROM medicine_subscriptions
                 WHERE pharmacy_id = ?1 AND medicine_name = ?2 AND triggered = 0"
            ))?;
            let rows = stmt
                .query_map(params![pharmacy_id, medicine_name], map_subscription)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn mark_subscription_triggered(&self, id: &str, at: DateTime<Utc>) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE medicine_subscriptions SET triggered = 1, triggered_at = ?1
                 WHERE id = ?2 AND triggered = 0",
                params![encode_ts(&at), id],
            )?;
            Ok(n > 0)
        })
    }

    fn list_pending_subscriptions(&self, pharmacy_id: &str) -> Result<Vec<MedicineSubscription>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUBSCRIPTION_COLUMNS} FROM medicine_subscriptions
                 WHERE pharmacy_id = ?1 AND notified = 0"
            ))?;
            let rows = stmt
                .query_map([pharmacy_id], map_subscription)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn map_subscription(row: &Row<'_>) -> rusqlite::Result<MedicineSubscription> {
    Ok(MedicineSubscription {
        id: row.get(0)?,
        user_id: row.get(1)?,
        pharmacy_id: row.get(2)?,
        medicine_name: row.get(3)?,
        pharmacy_name: row.get(4)?,
        notified: row.get(5)?,
        triggered: row.get(6)?,
        triggered_at: decode_opt_ts(7, row.get(7)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use apotheca_types::models::{AccountStatus, Location, PharmacyStatus};

    fn owner(id: &str, email: &str) -> AccountRow {
        let now = Utc::now();
        AccountRow {
            id: id.into(),
            role: Role::PharmacyOwner,
            name: "Owner".into(),
            email: email.into(),
            password: "hash".into(),
            status: AccountStatus::Active,
            pharmacy_id: None,
            notifications_enabled: None,
            created_at: now,
            updated_at: now,
            created_by: Some("admin-1".into()),
        }
    }

    fn pharmacy(id: &str, owner_id: &str) -> Pharmacy {
        let now = Utc::now();
        Pharmacy {
            id: id.into(),
            title: "Corner Pharmacy".into(),
            description: "Open late".into(),
            image_url: String::new(),
            location: Location {
                latitude: 41.0,
                longitude: 29.0,
                address: Some("Main St 1".into()),
            },
            owner_id: owner_id.into(),
            working_hours: vec![],
            status: PharmacyStatus::Active,
            created_at: now,
            updated_at: now,
            created_by: "admin-1".into(),
        }
    }

    #[test]
    fn pharmacy_with_owner_is_linked() {
        let db = Database::open_in_memory().unwrap();
        db.create_pharmacy_with_owner(&pharmacy("ph-1", "own-1"), &owner("own-1", "o@x.io"))
            .unwrap();

        let stored = db.get_pharmacy("ph-1").unwrap().unwrap();
        assert_eq!(stored.owner_id, "own-1");
        assert_eq!(stored.location.address.as_deref(), Some("Main St 1"));

        let account = db.get_account("own-1").unwrap().unwrap();
        assert_eq!(account.pharmacy_id.as_deref(), Some("ph-1"));
        assert_eq!(db.get_pharmacy_by_owner("own-1").unwrap().unwrap().id, "ph-1");
    }

    #[test]
    fn failed_pharmacy_insert_rolls_back_owner() {
        let db = Database::open_in_memory().unwrap();
        db.create_pharmacy_with_owner(&pharmacy("ph-1", "own-1"), &owner("own-1", "a@x.io"))
            .unwrap();

        // Same pharmacy id: the pharmacy insert fails after the owner insert.
        let result =
            db.create_pharmacy_with_owner(&pharmacy("ph-1", "own-2"), &owner("own-2", "b@x.io"));
        assert!(result.is_err());
        assert!(db.get_account("own-2").unwrap().is_none());
    }

    #[test]
    fn pharmacy_update_writes_owner_in_same_transaction() {
        let db = Database::open_in_memory().unwrap();
        db.create_pharmacy_with_owner(&pharmacy("ph-1", "own-1"), &owner("own-1", "a@x.io"))
            .unwrap();
        db.insert_account(&owner("own-2", "b@x.io")).unwrap();

        let mut ph = db.get_pharmacy("ph-1").unwrap().unwrap();
        ph.title = "Night Pharmacy".into();
        ph.status = PharmacyStatus::Inactive;

        // Taking another owner's email violates UNIQUE(role, email).
        let mut clash = db.get_account("own-1").unwrap().unwrap();
        clash.email = "b@x.io".into();
        assert!(db.update_pharmacy(&ph, Some(&clash)).is_err());
        assert_eq!(db.get_pharmacy("ph-1").unwrap().unwrap().title, "Corner Pharmacy");

        let mut renamed = db.get_account("own-1").unwrap().unwrap();
        renamed.name = "Olga".into();
        assert!(db.update_pharmacy(&ph, Some(&renamed)).unwrap());
        let stored = db.get_pharmacy("ph-1").unwrap().unwrap();
        assert_eq!(stored.title, "Night Pharmacy");
        assert_eq!(stored.status, PharmacyStatus::Inactive);
        assert_eq!(db.get_account("own-1").unwrap().unwrap().name, "Olga");

        ph.id = "missing".into();
        assert!(!db.update_pharmacy(&ph, None).unwrap());
    }

    #[test]
    fn pharmacy_delete_takes_inventory_and_owner() {
        let db = Database::open_in_memory().unwrap();
        db.create_pharmacy_with_owner(&pharmacy("ph-1", "own-1"), &owner("own-1", "a@x.io"))
            .unwrap();
        let now = Utc::now();
        db.insert_inventory_row(&PharmacyMedicine {
            id: "row-1".into(),
            pharmacy_id: "ph-1".into(),
            medicine_id: "med-1".into(),
            status: Availability::Available,
            added_at: now,
            updated_at: now,
            added_by: "own-1".into(),
        })
        .unwrap();

        assert!(db.delete_pharmacy_with_owner("ph-1").unwrap());
        assert!(db.get_pharmacy("ph-1").unwrap().is_none());
        assert!(db.get_inventory_row("row-1").unwrap().is_none());
        assert!(db.get_account("own-1").unwrap().is_none());
        assert!(!db.delete_pharmacy_with_owner("ph-1").unwrap());
    }

    #[test]
    fn accounts_are_listed_per_role_and_updated_in_place() {
        let db = Database::open_in_memory().unwrap();
        db.insert_account(&owner("own-1", "o@x.io")).unwrap();
        let mut user = owner("usr-1", "u@x.io");
        user.role = Role::User;
        db.insert_account(&user).unwrap();

        let users = db.list_accounts(Role::User).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "usr-1");

        user.status = AccountStatus::Banned;
        user.name = "Renamed".into();
        assert!(db.update_account(&user).unwrap());
        let stored = db.get_account("usr-1").unwrap().unwrap();
        assert_eq!(stored.status, AccountStatus::Banned);
        assert_eq!(stored.name, "Renamed");

        assert!(db.delete_account("usr-1").unwrap());
        assert!(!db.delete_account("usr-1").unwrap());
        assert!(db.list_accounts(Role::User).unwrap().is_empty());
    }

    #[test]
    fn preferences_only_for_end_users() {
        let db = Database::open_in_memory().unwrap();
        db.insert_account(&owner("own-1", "o@x.io")).unwrap();
        assert!(db.get_user_preferences("own-1").unwrap().is_none());

        let mut user = owner("usr-1", "u@x.io");
        user.role = Role::User;
        user.notifications_enabled = Some(false);
        db.insert_account(&user).unwrap();

        let prefs = db.get_user_preferences("usr-1").unwrap().unwrap();
        assert_eq!(prefs.notifications_enabled, Some(false));
    }

    #[test]
    fn subscription_trigger_and_pending_queries() {
        let db = Database::open_in_memory().unwrap();
        let sub = MedicineSubscription {
            id: "sub-1".into(),
            user_id: "usr-1".into(),
            pharmacy_id: "ph-1".into(),
            medicine_name: "Aspirin".into(),
            pharmacy_name: "Corner".into(),
            notified: false,
            triggered: false,
            triggered_at: None,
        };
        db.insert_subscription(&sub).unwrap();

        assert_eq!(db.list_untriggered_subscriptions("ph-1", "Aspirin").unwrap().len(), 1);
        assert!(db.list_untriggered_subscriptions("ph-1", "Ibuprofen").unwrap().is_empty());

        assert!(db.mark_subscription_triggered("sub-1", Utc::now()).unwrap());
        assert!(!db.mark_subscription_triggered("sub-1", Utc::now()).unwrap());
        assert!(db.list_untriggered_subscriptions("ph-1", "Aspirin").unwrap().is_empty());

        // Triggered but not yet delivered: still pending.
        let pending = db.list_pending_subscriptions("ph-1").unwrap();
        assert_eq!(pending.len(), 1);
        assert!(pending[0].triggered);
        assert!(pending[0].triggered_at.is_some());
    }
}
