//! The storage capability set the services are built against.
//!
//! Each trait covers one group of collections. `Database` implements all of
//! them; services hold an `Arc<dyn Store>` so tests and alternative backends
//! can be substituted at construction time. Absence is reported as
//! `Ok(None)` / `Ok(false)`, never as an error.

use anyhow::Result;
use chrono::{DateTime, Utc};

use apotheca_types::models::{
    Availability, Conversation, Medicine, MedicineSubscription, Message, MessageType, Pharmacy,
    PharmacyMedicine, Role, SenderType, UserPreferences,
};

use crate::models::AccountRow;

pub trait AccountStore {
    fn insert_account(&self, account: &AccountRow) -> Result<()>;
    fn get_account(&self, id: &str) -> Result<Option<AccountRow>>;
    fn get_account_by_email(&self, role: Role, email: &str) -> Result<Option<AccountRow>>;
    /// `None` when no end-user account with this id exists.
    fn get_user_preferences(&self, user_id: &str) -> Result<Option<UserPreferences>>;
    /// Accounts of one role, newest first.
    fn list_accounts(&self, role: Role) -> Result<Vec<AccountRow>>;
    /// Writes name, email, password hash, status and `updated_at`.
    fn update_account(&self, account: &AccountRow) -> Result<bool>;
    fn delete_account(&self, id: &str) -> Result<bool>;
}

pub trait DirectoryStore {
    /// Inserts the owner account and the pharmacy, then links the owner to
    /// the pharmacy, all in one transaction.
    fn create_pharmacy_with_owner(&self, pharmacy: &Pharmacy, owner: &AccountRow) -> Result<()>;
    fn get_pharmacy(&self, id: &str) -> Result<Option<Pharmacy>>;
    fn get_pharmacy_by_owner(&self, owner_id: &str) -> Result<Option<Pharmacy>>;
    fn list_pharmacies(&self) -> Result<Vec<Pharmacy>>;
    /// Writes the pharmacy's editable fields and, when given, the owner
    /// account, in one transaction.
    fn update_pharmacy(&self, pharmacy: &Pharmacy, owner: Option<&AccountRow>) -> Result<bool>;
    /// Deletes the pharmacy, its inventory rows and its owner account in one
    /// transaction.
    fn delete_pharmacy_with_owner(&self, id: &str) -> Result<bool>;
}

pub trait CatalogStore {
    fn insert_medicine(&self, medicine: &Medicine) -> Result<()>;
    fn get_medicine(&self, id: &str) -> Result<Option<Medicine>>;
    /// Newest first.
    fn list_medicines(&self) -> Result<Vec<Medicine>>;
    fn update_medicine(&self, medicine: &Medicine) -> Result<bool>;
    fn delete_medicine(&self, id: &str) -> Result<bool>;
}

pub trait InventoryStore {
    fn insert_inventory_row(&self, row: &PharmacyMedicine) -> Result<()>;
    fn get_inventory_row(&self, id: &str) -> Result<Option<PharmacyMedicine>>;
    fn find_inventory_row(&self, pharmacy_id: &str, medicine_id: &str)
    -> Result<Option<PharmacyMedicine>>;
    fn list_inventory_rows(&self, pharmacy_id: &str) -> Result<Vec<PharmacyMedicine>>;
    fn update_inventory_status(
        &self,
        id: &str,
        status: Availability,
        updated_at: DateTime<Utc>,
    ) -> Result<bool>;
    fn delete_inventory_row(&self, id: &str) -> Result<bool>;
}

pub trait SubscriptionStore {
    fn insert_subscription(&self, subscription: &MedicineSubscription) -> Result<()>;
    fn get_subscription(&self, id: &str) -> Result<Option<MedicineSubscription>>;
    /// Subscriptions for (pharmacy, medicine name) whose `triggered` flag is
    /// still false.
    fn list_untriggered_subscriptions(
        &self,
        pharmacy_id: &str,
        medicine_name: &str,
    ) -> Result<Vec<MedicineSubscription>>;
    /// Sets `triggered = true, triggered_at = at` on a subscription that is
    /// not yet triggered. Returns false when there was nothing to flip.
    fn mark_subscription_triggered(&self, id: &str, at: DateTime<Utc>) -> Result<bool>;
    /// Subscriptions for the pharmacy with `notified == false`.
    fn list_pending_subscriptions(&self, pharmacy_id: &str) -> Result<Vec<MedicineSubscription>>;
}

/// Preview fields written onto a conversation after a message is stored.
#[derive(Debug, Clone)]
pub struct LastMessage {
    pub text: String,
    pub message_type: MessageType,
    pub at: DateTime<Utc>,
    pub sender_id: String,
    pub sender_type: SenderType,
}

pub trait ChatStore {
    fn find_conversation(&self, user_id: &str, pharmacy_owner_id: &str)
    -> Result<Option<Conversation>>;
    fn insert_conversation(&self, conversation: &Conversation) -> Result<()>;
    fn get_conversation(&self, id: &str) -> Result<Option<Conversation>>;
    /// Active conversations where `participant_id` is on `side`, most recent
    /// `last_message_at` first.
    fn list_active_conversations(
        &self,
        side: SenderType,
        participant_id: &str,
        limit: u32,
    ) -> Result<Vec<Conversation>>;
    /// Writes the preview fields and increments the unread counter of the
    /// sender's counterpart by one, as a single statement.
    fn record_last_message(&self, conversation_id: &str, last: &LastMessage) -> Result<bool>;
    fn archive_conversation(&self, id: &str, at: DateTime<Utc>) -> Result<bool>;

    fn insert_message(&self, message: &Message) -> Result<()>;
    fn get_message(&self, id: &str) -> Result<Option<Message>>;
    /// Newest first. With `after`, only messages strictly after that message
    /// in the same (created_at, id) descending order.
    fn list_messages(
        &self,
        conversation_id: &str,
        limit: u32,
        after: Option<&Message>,
    ) -> Result<Vec<Message>>;
    /// Messages in the conversation whose status is not `read`.
    fn list_unread_messages(&self, conversation_id: &str) -> Result<Vec<Message>>;
    /// In one transaction: mark every listed message read at `at` and reset
    /// the reader side's unread counter to zero. Returns the number of
    /// message rows updated.
    fn mark_messages_read(
        &self,
        conversation_id: &str,
        message_ids: &[String],
        reader: SenderType,
        at: DateTime<Utc>,
    ) -> Result<usize>;
}

/// Everything a service may need. Blanket-implemented.
pub trait Store:
    AccountStore + DirectoryStore + CatalogStore + InventoryStore + SubscriptionStore + ChatStore + Send + Sync
{
}

impl<T> Store for T where
    T: AccountStore
        + DirectoryStore
        + CatalogStore
        + InventoryStore
        + SubscriptionStore
        + ChatStore
        + Send
        + Sync
{
}
