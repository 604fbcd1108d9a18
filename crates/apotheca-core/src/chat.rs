//! Two-party conversations between an end user and a pharmacy owner.
//!
//! Each message write is followed by a best-effort update of the parent
//! conversation's preview fields and the counterpart's unread counter.
//! Reading resets the reader's counter in the same transaction that flags
//! the messages.

use std::sync::Arc;

use apotheca_db::{LastMessage, Store};
use apotheca_types::models::{
    Conversation, ConversationStatus, Message, MessageStatus, MessageType, Role, SenderType,
};
use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::object_store::{ObjectStore, check_image, object_key};
use crate::ownership::verify_ownership;

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const CONVERSATION_LIST_LIMIT: u32 = 100;

pub const IMAGE_FOLDER: &str = "chat-images";
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Preview text for messages that carry only an image.
const IMAGE_PREVIEW: &str = "[Image]";

/// An authenticated chat account: who they are and which side they talk from.
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: String,
    pub side: SenderType,
    pub name: String,
}

pub struct ChatService {
    store: Arc<dyn Store>,
    objects: Arc<dyn ObjectStore>,
}

impl ChatService {
    pub fn new(store: Arc<dyn Store>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { store, objects }
    }

    /// Resolve an account id into a chat participant.
    pub fn participant(&self, account_id: &str) -> ServiceResult<Participant> {
        let account = self
            .store
            .get_account(account_id)?
            .ok_or_else(|| ServiceError::Unauthorized("Account not found".into()))?;

        let side = SenderType::from_role(account.role)
            .ok_or_else(|| ServiceError::Forbidden("Chat is only for users and pharmacy owners".into()))?;

        Ok(Participant {
            id: account.id,
            side,
            name: account.name,
        })
    }

    /// The conversation between this user and owner, created on first
    /// contact. `pharmacy_id` is only recorded on creation, and only after
    /// checking that the user is an end user and the owner owns that
    /// pharmacy.
    pub fn get_or_create(
        &self,
        user_id: &str,
        pharmacy_owner_id: &str,
        pharmacy_id: &str,
    ) -> ServiceResult<Conversation> {
        if let Some(existing) = self.store.find_conversation(user_id, pharmacy_owner_id)? {
            return Ok(existing);
        }
        self.check_new_pair(user_id, pharmacy_owner_id, pharmacy_id)?;

        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            pharmacy_owner_id: pharmacy_owner_id.to_string(),
            pharmacy_id: pharmacy_id.to_string(),
            last_message: String::new(),
            last_message_type: MessageType::Text,
            last_message_at: now,
            last_message_sender_id: String::new(),
            last_message_sender_type: SenderType::User,
            unread_count_user: 0,
            unread_count_pharmacy_owner: 0,
            status: ConversationStatus::Active,
            created_at: now,
            updated_at: now,
        };

        match self.store.insert_conversation(&conversation) {
            Ok(()) => {
                info!(
                    "Created conversation {} between {} and {}",
                    conversation.id, user_id, pharmacy_owner_id
                );
                Ok(conversation)
            }
            // Lost a race against a concurrent create for the same pair.
            Err(e) => match self.store.find_conversation(user_id, pharmacy_owner_id)? {
                Some(existing) => Ok(existing),
                None => Err(e.into()),
            },
        }
    }

    fn check_new_pair(
        &self,
        user_id: &str,
        pharmacy_owner_id: &str,
        pharmacy_id: &str,
    ) -> ServiceResult<()> {
        let has_role = |id: &str, role: Role| -> ServiceResult<bool> {
            Ok(self.store.get_account(id)?.is_some_and(|a| a.role == role))
        };
        if !has_role(user_id, Role::User)? {
            return Err(ServiceError::not_found("User"));
        }
        if !has_role(pharmacy_owner_id, Role::PharmacyOwner)? {
            return Err(ServiceError::not_found("Pharmacy owner"));
        }
        match verify_ownership(self.store.as_ref(), pharmacy_id, pharmacy_owner_id) {
            Ok(_) => Ok(()),
            Err(ServiceError::Forbidden(_)) => Err(ServiceError::BadRequest(
                "Pharmacy does not belong to this owner".into(),
            )),
            Err(e) => Err(e),
        }
    }

    /// Active conversations of this participant, most recent activity first.
    pub fn list_conversations(&self, who: &Participant) -> ServiceResult<Vec<Conversation>> {
        Ok(self
            .store
            .list_active_conversations(who.side, &who.id, CONVERSATION_LIST_LIMIT)?)
    }

    /// Archived conversations stay readable by id.
    pub fn get_conversation(
        &self,
        conversation_id: &str,
        participant_id: &str,
    ) -> ServiceResult<Conversation> {
        let conversation = self.load(conversation_id)?;
        if conversation.side_of(participant_id).is_none() {
            return Err(not_a_participant());
        }
        Ok(conversation)
    }

    pub fn send_message(
        &self,
        conversation_id: &str,
        sender: &Participant,
        content: Option<String>,
        image_url: Option<String>,
    ) -> ServiceResult<Message> {
        let content = content.filter(|c| !c.trim().is_empty());
        let image_url = image_url.filter(|u| !u.trim().is_empty());
        let message_type = MessageType::derive(content.is_some(), image_url.is_some())
            .ok_or_else(|| ServiceError::BadRequest("Message must have content or an image".into()))?;

        self.load_as(conversation_id, &sender.id, sender.side)?;

        let now = Utc::now();
        let message = Message {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            sender_id: sender.id.clone(),
            sender_type: sender.side,
            sender_name: sender.name.clone(),
            content: content.unwrap_or_default(),
            image_url,
            message_type,
            status: MessageStatus::Sent,
            delivered_at: None,
            read_at: None,
            created_at: now,
        };
        self.store.insert_message(&message)?;
        debug!("Stored message {} in {}", message.id, conversation_id);

        let preview = if message.content.is_empty() {
            IMAGE_PREVIEW.to_string()
        } else {
            message.content.clone()
        };
        let last = LastMessage {
            text: preview,
            message_type,
            at: now,
            sender_id: sender.id.clone(),
            sender_type: sender.side,
        };
        match self.store.record_last_message(conversation_id, &last) {
            Ok(true) => {}
            Ok(false) => warn!("Conversation {} vanished before preview update", conversation_id),
            Err(e) => warn!(
                "Failed to update conversation {} after message {}: {}",
                conversation_id, message.id, e
            ),
        }

        Ok(message)
    }

    /// Newest first. `cursor` is the id of the last message of the previous
    /// page; an unknown cursor starts from the newest message.
    pub fn get_messages(
        &self,
        conversation_id: &str,
        participant_id: &str,
        limit: Option<u32>,
        cursor: Option<&str>,
    ) -> ServiceResult<Vec<Message>> {
        self.get_conversation(conversation_id, participant_id)?;

        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let after = match cursor {
            Some(id) => self
                .store
                .get_message(id)?
                .filter(|m| m.conversation_id == conversation_id),
            None => None,
        };

        Ok(self.store.list_messages(conversation_id, limit, after.as_ref())?)
    }

    /// Flag every unread message from the other side as read and zero the
    /// reader's unread counter. The reader's own messages are never touched.
    pub fn mark_read(
        &self,
        conversation_id: &str,
        reader_id: &str,
        reader_type: SenderType,
    ) -> ServiceResult<usize> {
        self.load_as(conversation_id, reader_id, reader_type)?;

        let ids: Vec<String> = self
            .store
            .list_unread_messages(conversation_id)?
            .into_iter()
            .filter(|m| m.sender_id != reader_id)
            .map(|m| m.id)
            .collect();

        let marked = self
            .store
            .mark_messages_read(conversation_id, &ids, reader_type, Utc::now())?;
        debug!("{} marked {} messages read in {}", reader_id, marked, conversation_id);
        Ok(marked)
    }

    pub fn archive(&self, conversation_id: &str, participant_id: &str) -> ServiceResult<()> {
        self.get_conversation(conversation_id, participant_id)?;

        if !self.store.archive_conversation(conversation_id, Utc::now())? {
            return Err(ServiceError::not_found("Conversation"));
        }
        info!("Archived conversation {}", conversation_id);
        Ok(())
    }

    pub async fn upload_image(&self, data: Bytes, content_type: &str) -> ServiceResult<String> {
        check_image(&data, content_type, ALLOWED_IMAGE_TYPES)?;

        let key = object_key(IMAGE_FOLDER, content_type);
        Ok(self.objects.upload(data, content_type, &key).await?)
    }

    fn load(&self, conversation_id: &str) -> ServiceResult<Conversation> {
        self.store
            .get_conversation(conversation_id)?
            .ok_or_else(|| ServiceError::not_found("Conversation"))
    }

    fn load_as(
        &self,
        conversation_id: &str,
        participant_id: &str,
        side: SenderType,
    ) -> ServiceResult<Conversation> {
        let conversation = self.load(conversation_id)?;
        if conversation.side_of(participant_id) != Some(side) {
            return Err(not_a_participant());
        }
        Ok(conversation)
    }
}

fn not_a_participant() -> ServiceError {
    ServiceError::Forbidden("You are not a participant of this conversation".into())
}
