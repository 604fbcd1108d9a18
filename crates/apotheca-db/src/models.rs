/// Database row types that must not leave the storage and auth layers.
/// Everything else maps straight onto the apotheca-types models.
use apotheca_types::models::{AccountProfile, AccountStatus, Role};
use chrono::{DateTime, Utc};

/// Admin, pharmacy-owner or end-user account, including the password hash.
#[derive(Debug, Clone)]
pub struct AccountRow {
    pub id: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub password: String,
    pub status: AccountStatus,
    pub pharmacy_id: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
}

impl AccountRow {
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id.clone(),
            role: self.role,
            name: self.name.clone(),
            email: self.email.clone(),
            status: self.status,
            pharmacy_id: self.pharmacy_id.clone(),
            created_at: self.created_at,
        }
    }
}
