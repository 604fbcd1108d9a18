use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored string did not match any variant of a wire enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed string-literal enum with its wire spelling.
/// The same spelling is used by serde, by `as_str` and by `FromStr`,
/// so JSON bodies and database columns always agree.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Availability of a catalog medicine, or of a medicine at one pharmacy.
    Availability {
        Available => "available",
        Unavailable => "unavailable",
    }
}

wire_enum! {
    Role {
        Admin => "admin",
        PharmacyOwner => "pharmacy-owner",
        User => "user",
    }
}

wire_enum! {
    AccountStatus {
        Active => "active",
        Inactive => "inactive",
        Banned => "banned",
    }
}

wire_enum! {
    PharmacyStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

wire_enum! {
    /// Which side of a conversation an action came from.
    SenderType {
        User => "user",
        PharmacyOwner => "pharmacy-owner",
    }
}

wire_enum! {
    MessageType {
        Text => "text",
        Image => "image",
        TextImage => "text-image",
    }
}

wire_enum! {
    MessageStatus {
        Sent => "sent",
        Delivered => "delivered",
        Read => "read",
    }
}

wire_enum! {
    ConversationStatus {
        Active => "active",
        Archived => "archived",
    }
}

impl SenderType {
    /// The other participant of a two-party conversation.
    pub fn counterpart(self) -> Self {
        match self {
            Self::User => Self::PharmacyOwner,
            Self::PharmacyOwner => Self::User,
        }
    }

    /// Chat roles are the non-admin account roles.
    pub fn from_role(role: Role) -> Option<Self> {
        match role {
            Role::User => Some(Self::User),
            Role::PharmacyOwner => Some(Self::PharmacyOwner),
            Role::Admin => None,
        }
    }
}

impl MessageType {
    /// Derive the message type from which payloads are present.
    /// Returns `None` when the message would be empty.
    pub fn derive(has_text: bool, has_image: bool) -> Option<Self> {
        match (has_text, has_image) {
            (true, true) => Some(Self::TextImage),
            (false, true) => Some(Self::Image),
            (true, false) => Some(Self::Text),
            (false, false) => None,
        }
    }
}

// -- Directory --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    pub day: String,
    pub is_open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pharmacy {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub location: Location,
    pub owner_id: String,
    pub working_hours: Vec<WorkingHours>,
    pub status: PharmacyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
}

/// Public view of an admin, owner or end-user account. Never carries the
/// password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub id: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub status: AccountStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pharmacy_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-user notification preference. `None` means the user never chose,
/// which counts as opted in.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub notifications_enabled: Option<bool>,
}

// -- Catalog and inventory --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: String,
    pub title: String,
    pub description: String,
    pub front_image_url: String,
    pub back_image_url: String,
    pub status: Availability,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
}

/// Inventory row: one catalog medicine stocked by one pharmacy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyMedicine {
    pub id: String,
    pub pharmacy_id: String,
    pub medicine_id: String,
    pub status: Availability,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub added_by: String,
}

/// Inventory row with its catalog entry inlined. `medicine` is `None` when
/// the catalog entry has since been deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyMedicineDetails {
    #[serde(flatten)]
    pub row: PharmacyMedicine,
    pub medicine: Option<Medicine>,
}

// -- Notifications --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineSubscription {
    pub id: String,
    pub user_id: String,
    pub pharmacy_id: String,
    pub medicine_name: String,
    pub pharmacy_name: String,
    pub notified: bool,
    pub triggered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_at: Option<DateTime<Utc>>,
}

// -- Chat --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    pub pharmacy_owner_id: String,
    pub pharmacy_id: String,
    pub last_message: String,
    pub last_message_type: MessageType,
    pub last_message_at: DateTime<Utc>,
    pub last_message_sender_id: String,
    pub last_message_sender_type: SenderType,
    pub unread_count_user: u32,
    pub unread_count_pharmacy_owner: u32,
    pub status: ConversationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Which side `participant_id` is on, if either.
    pub fn side_of(&self, participant_id: &str) -> Option<SenderType> {
        if self.user_id == participant_id {
            Some(SenderType::User)
        } else if self.pharmacy_owner_id == participant_id {
            Some(SenderType::PharmacyOwner)
        } else {
            None
        }
    }

    pub fn unread_count(&self, side: SenderType) -> u32 {
        match side {
            SenderType::User => self.unread_count_user,
            SenderType::PharmacyOwner => self.unread_count_pharmacy_owner,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub sender_type: SenderType,
    pub sender_name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub status: MessageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
