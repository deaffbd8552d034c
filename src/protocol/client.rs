//! Messages sent from a client to the server.
//!
//! # Data Flow
//! ```text
//! inbound frame (JSON)
//!     → ClientEnvelope (one optional slot per type)
//!     → ClientMessage (tagged payload, validated)
//!     → business logic
//!
//! on rejection:
//!     → DecodeError → ServerMessage { type: "error", id: <request id> }
//! ```

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;
use thiserror::Error;
use url::Url;

use crate::protocol::error::{Error, ValidationError};
use crate::protocol::server::{ServerMessage, ServerPayload};

/// Version that must be sent in a "hello" message.
pub const HELLO_VERSION: &str = "1.0";

pub const AUTH_TYPE_CLIENT: &str = "client";
pub const AUTH_TYPE_INTERNAL: &str = "internal";

pub const RECIPIENT_TYPE_SESSION: &str = "session";
pub const RECIPIENT_TYPE_USER: &str = "user";
pub const RECIPIENT_TYPE_ROOM: &str = "room";

/// Wire shape of a client message.
///
/// Only the slot named by `type` is consulted when converting into a
/// [`ClientMessage`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientEnvelope {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub hello: Option<HelloClientMessage>,

    #[serde(default)]
    pub bye: Option<ByeClientMessage>,

    #[serde(default)]
    pub room: Option<RoomClientMessage>,

    #[serde(default)]
    pub message: Option<MessageClientMessage>,

    #[serde(default)]
    pub control: Option<ControlClientMessage>,
}

/// A decoded client message.
#[derive(Debug, Clone)]
pub struct ClientMessage {
    /// Correlation id chosen by the client, echoed on the response.
    pub id: Option<String>,
    pub payload: ClientPayload,
}

/// The typed payload of a client message.
#[derive(Debug, Clone)]
pub enum ClientPayload {
    Hello(HelloClientMessage),
    Bye(ByeClientMessage),
    Room(RoomClientMessage),
    Message(MessageClientMessage),
    Control(ControlClientMessage),
    /// A type this layer does not know. Higher layers reject or ignore it.
    Other(String),
}

impl ClientPayload {
    /// The `type` discriminator of this payload.
    pub fn kind(&self) -> &str {
        match self {
            ClientPayload::Hello(_) => "hello",
            ClientPayload::Bye(_) => "bye",
            ClientPayload::Room(_) => "room",
            ClientPayload::Message(_) => "message",
            ClientPayload::Control(_) => "control",
            ClientPayload::Other(kind) => kind,
        }
    }
}

/// Failure to turn an inbound frame into a [`ClientMessage`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid message format: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("{error}")]
    Invalid {
        id: Option<String>,
        #[source]
        error: ValidationError,
    },
}

impl DecodeError {
    /// Build the `error` reply for the peer, echoing the request id if known.
    pub fn into_server_message(self) -> ServerMessage {
        match self {
            DecodeError::Malformed(_) => ServerMessage::error(None, Error::invalid_format()),
            DecodeError::Invalid { id, error } => ServerMessage::error(id, error.into()),
        }
    }
}

impl ClientMessage {
    pub fn new(id: Option<String>, payload: ClientPayload) -> Self {
        Self { id, payload }
    }

    /// Parse and validate a JSON frame.
    pub fn from_json(input: &str) -> Result<Self, DecodeError> {
        let envelope: ClientEnvelope = serde_json::from_str(input)?;
        Self::try_from(envelope)
    }

    /// Check the payload against the rules of its type.
    pub fn check_valid(&self) -> Result<(), ValidationError> {
        match &self.payload {
            ClientPayload::Hello(hello) => hello.check_valid(),
            ClientPayload::Message(message) => message.check_valid(),
            ClientPayload::Control(control) => control.check_valid(),
            ClientPayload::Bye(_) | ClientPayload::Room(_) | ClientPayload::Other(_) => Ok(()),
        }
    }

    /// Reply to this request with an error.
    pub fn error_reply(&self, error: Error) -> ServerMessage {
        ServerMessage::new(self.id.clone(), ServerPayload::Error(error))
    }

    /// Reply to this request with an `internal_error` wrapping `err`.
    pub fn internal_error_reply(&self, err: impl std::fmt::Display) -> ServerMessage {
        self.error_reply(Error::internal(err))
    }
}

impl TryFrom<ClientEnvelope> for ClientMessage {
    type Error = DecodeError;

    fn try_from(envelope: ClientEnvelope) -> Result<Self, Self::Error> {
        let ClientEnvelope {
            id,
            kind,
            hello,
            bye,
            room,
            message,
            control,
        } = envelope;
        let id = id.filter(|id| !id.is_empty());

        let payload = match kind.as_str() {
            "" => Err(ValidationError::TypeMissing),
            "hello" => hello
                .map(ClientPayload::Hello)
                .ok_or(ValidationError::PayloadMissing("hello")),
            "bye" => Ok(ClientPayload::Bye(bye.unwrap_or_default())),
            "room" => room
                .map(ClientPayload::Room)
                .ok_or(ValidationError::PayloadMissing("room")),
            "message" => message
                .map(ClientPayload::Message)
                .ok_or(ValidationError::PayloadMissing("message")),
            "control" => control
                .map(ClientPayload::Control)
                .ok_or(ValidationError::PayloadMissing("control")),
            other => Ok(ClientPayload::Other(other.to_owned())),
        };

        let checked = payload.and_then(|payload| {
            let message = ClientMessage::new(id.clone(), payload);
            message.check_valid()?;
            Ok(message)
        });
        checked.map_err(|error| DecodeError::Invalid { id, error })
    }
}

impl Serialize for ClientMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(id) = &self.id {
            map.serialize_entry("id", id)?;
        }
        map.serialize_entry("type", self.payload.kind())?;
        match &self.payload {
            ClientPayload::Hello(hello) => map.serialize_entry("hello", hello)?,
            ClientPayload::Bye(bye) => map.serialize_entry("bye", bye)?,
            ClientPayload::Room(room) => map.serialize_entry("room", room)?,
            ClientPayload::Message(message) => map.serialize_entry("message", message)?,
            ClientPayload::Control(control) => map.serialize_entry("control", control)?,
            ClientPayload::Other(_) => {}
        }
        map.end()
    }
}

// Type "hello"

/// Authentication kind of a hello request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Client,
    Internal,
}

impl AuthKind {
    /// An empty kind selects [`AuthKind::Client`].
    pub fn parse(kind: &str) -> Result<Self, ValidationError> {
        match kind {
            "" | AUTH_TYPE_CLIENT => Ok(AuthKind::Client),
            AUTH_TYPE_INTERNAL => Ok(AuthKind::Internal),
            _ => Err(ValidationError::UnsupportedAuthType),
        }
    }
}

/// Parameters of an `internal` hello.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InternalAuthParams {
    pub random: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HelloClientMessageAuth {
    /// Leave empty for the default `client` kind.
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default)]
    pub params: Option<Box<RawValue>>,

    #[serde(default)]
    pub url: String,
}

/// Credentials extracted from a valid hello, handed to the verifier.
#[derive(Debug, Clone)]
pub enum HelloAuth {
    Client { url: Url, params: Box<RawValue> },
    Internal(InternalAuthParams),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HelloClientMessage {
    #[serde(default)]
    pub version: String,

    #[serde(rename = "resumeid", default)]
    pub resume_id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,

    #[serde(default)]
    pub auth: HelloClientMessageAuth,
}

impl HelloClientMessage {
    pub fn check_valid(&self) -> Result<(), ValidationError> {
        self.validated_auth().map(|_| ())
    }

    /// Validate the request and return its credentials.
    ///
    /// Returns `Ok(None)` for a resume, which carries no credentials.
    pub fn validated_auth(&self) -> Result<Option<HelloAuth>, ValidationError> {
        if self.version != HELLO_VERSION {
            return Err(ValidationError::UnsupportedVersion(self.version.clone()));
        }
        if !self.resume_id.is_empty() {
            return Ok(None);
        }

        let params = match &self.auth.params {
            Some(params) if !params.get().is_empty() => params,
            _ => return Err(ValidationError::ParamsMissing),
        };

        let auth = match AuthKind::parse(&self.auth.kind)? {
            AuthKind::Client => {
                if self.auth.url.is_empty() {
                    return Err(ValidationError::UrlMissing);
                }
                HelloAuth::Client {
                    url: Url::parse(&self.auth.url)?,
                    params: params.clone(),
                }
            }
            AuthKind::Internal => HelloAuth::Internal(serde_json::from_str(params.get())?),
        };
        Ok(Some(auth))
    }
}

// Type "bye"

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ByeClientMessage {}

// Type "room"

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomClientMessage {
    #[serde(rename = "roomid", default)]
    pub room_id: String,

    #[serde(rename = "sessionid", default, skip_serializing_if = "String::is_empty")]
    pub session_id: String,
}

// Type "message"

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageClientMessageRecipient {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(rename = "sessionid", default, skip_serializing_if = "String::is_empty")]
    pub session_id: String,

    #[serde(rename = "userid", default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageClientMessage {
    #[serde(default)]
    pub recipient: MessageClientMessageRecipient,

    #[serde(default)]
    pub data: Option<Box<RawValue>>,
}

impl MessageClientMessage {
    pub fn check_valid(&self) -> Result<(), ValidationError> {
        match &self.data {
            Some(data) if !data.get().is_empty() => {}
            _ => return Err(ValidationError::MessageEmpty),
        }
        match self.recipient.kind.as_str() {
            RECIPIENT_TYPE_ROOM => Ok(()),
            RECIPIENT_TYPE_SESSION if self.recipient.session_id.is_empty() => {
                Err(ValidationError::SessionIdMissing)
            }
            RECIPIENT_TYPE_SESSION => Ok(()),
            RECIPIENT_TYPE_USER if self.recipient.user_id.is_empty() => {
                Err(ValidationError::UserIdMissing)
            }
            RECIPIENT_TYPE_USER => Ok(()),
            other => Err(ValidationError::UnsupportedRecipientType(other.to_owned())),
        }
    }
}

// Type "control"

/// Same shape and rules as a "message" payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlClientMessage {
    pub message: MessageClientMessage,
}

impl ControlClientMessage {
    pub fn check_valid(&self) -> Result<(), ValidationError> {
        self.message.check_valid()
    }
}
