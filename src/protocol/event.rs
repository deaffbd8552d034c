//! Payloads of asynchronous `event` server messages.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

pub const EVENT_TARGET_ROOM: &str = "room";
pub const EVENT_TARGET_ROOMLIST: &str = "roomlist";
pub const EVENT_TARGET_PARTICIPANTS: &str = "participants";
pub const EVENT_TARGET_MESSAGE: &str = "message";

pub const EVENT_TYPE_INVITE: &str = "invite";
pub const EVENT_TYPE_DISINVITE: &str = "disinvite";
pub const EVENT_TYPE_UPDATE: &str = "update";

/// An event pushed to a client.
///
/// Which optional fields are filled depends on `target`:
/// - `room`: `join`, `leave`, `change`
/// - `roomlist` / `participants`: `invite`, `disinvite`, `update`
/// - `message`: `message`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventServerMessage {
    pub target: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub join: Vec<EventServerMessageSessionEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leave: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub change: Vec<EventServerMessageSessionEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite: Option<RoomEventServerMessage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disinvite: Option<RoomEventServerMessage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<RoomEventServerMessage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<RoomEventMessage>,
}

impl EventServerMessage {
    pub fn new(target: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// True for `target`/`type` equal to the given pair.
    pub fn is(&self, target: &str, kind: &str) -> bool {
        self.target == target && self.kind == kind
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventServerMessageSessionEntry {
    #[serde(rename = "sessionid")]
    pub session_id: String,

    #[serde(rename = "userid")]
    pub user_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<RawValue>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomEventServerMessage {
    #[serde(rename = "roomid")]
    pub room_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Box<RawValue>>,

    #[serde(rename = "incall", default, skip_serializing_if = "Option::is_none")]
    pub in_call: Option<Box<RawValue>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed: Vec<serde_json::Map<String, serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl RoomEventServerMessage {
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomEventMessage {
    #[serde(rename = "roomid")]
    pub room_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<RawValue>>,
}
