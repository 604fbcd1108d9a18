//! Admin view over end-user accounts: listing, profile edits, bans and
//! removal. Admin and pharmacy-owner accounts are out of reach here.

use std::sync::Arc;

use apotheca_db::{AccountRow, Store};
use apotheca_types::api::UpdateUserRequest;
use apotheca_types::models::{AccountProfile, AccountStatus, Role};
use chrono::Utc;
use tracing::info;

use crate::catalog::{matches_query, normalize_email};
use crate::error::{ServiceError, ServiceResult};

pub struct AccountAdmin {
    store: Arc<dyn Store>,
}

impl AccountAdmin {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Newest first, optionally only one status.
    pub fn list_users(&self, status: Option<AccountStatus>) -> ServiceResult<Vec<AccountProfile>> {
        Ok(self
            .store
            .list_accounts(Role::User)?
            .iter()
            .filter(|a| status.is_none_or(|s| a.status == s))
            .map(AccountRow::profile)
            .collect())
    }

    /// Matches name or email.
    pub fn search_users(&self, query: &str) -> ServiceResult<Vec<AccountProfile>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(ServiceError::BadRequest("Search query is required".into()));
        }
        Ok(self
            .store
            .list_accounts(Role::User)?
            .iter()
            .filter(|a| matches_query(&a.name, &needle) || matches_query(&a.email, &needle))
            .map(AccountRow::profile)
            .collect())
    }

    pub fn get_user(&self, id: &str) -> ServiceResult<AccountProfile> {
        Ok(self.user_row(id)?.profile())
    }

    pub fn update_user(&self, id: &str, req: UpdateUserRequest) -> ServiceResult<AccountProfile> {
        let mut user = self.user_row(id)?;

        if let Some(name) = req.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(ServiceError::BadRequest("Name cannot be empty".into()));
            }
            user.name = name.to_string();
        }
        if let Some(email) = req.email {
            let email = normalize_email(&email);
            if !email.contains('@') {
                return Err(ServiceError::BadRequest("Invalid email format".into()));
            }
            if let Some(other) = self.store.get_account_by_email(Role::User, &email)? {
                if other.id != user.id {
                    return Err(ServiceError::Conflict("Email already in use".into()));
                }
            }
            user.email = email;
        }
        user.updated_at = Utc::now();

        self.save(&user)?;
        info!("Updated user {}", id);
        Ok(user.profile())
    }

    /// Bans or reinstates a user. Only `active` and `banned` are accepted.
    pub fn set_user_status(&self, id: &str, status: AccountStatus) -> ServiceResult<AccountProfile> {
        if !matches!(status, AccountStatus::Active | AccountStatus::Banned) {
            return Err(ServiceError::BadRequest(
                "Status must be either active or banned".into(),
            ));
        }
        let mut user = self.user_row(id)?;
        user.status = status;
        user.updated_at = Utc::now();

        self.save(&user)?;
        info!("User {} is now {}", id, status.as_str());
        Ok(user.profile())
    }

    pub fn delete_user(&self, id: &str) -> ServiceResult<()> {
        self.user_row(id)?;
        if !self.store.delete_account(id)? {
            return Err(ServiceError::not_found("User"));
        }
        info!("Deleted user {}", id);
        Ok(())
    }

    fn user_row(&self, id: &str) -> ServiceResult<AccountRow> {
        self.store
            .get_account(id)?
            .filter(|a| a.role == Role::User)
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    fn save(&self, user: &AccountRow) -> ServiceResult<()> {
        if !self.store.update_account(user)? {
            return Err(ServiceError::not_found("User"));
        }
        Ok(())
    }
}
