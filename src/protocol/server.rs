//! Messages sent from the server to a client.

use serde::de::{self, Deserializer};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;

use crate::protocol::error::Error;
use crate::protocol::event::{
    EventServerMessage, EVENT_TARGET_PARTICIPANTS, EVENT_TARGET_ROOMLIST, EVENT_TYPE_DISINVITE,
    EVENT_TYPE_UPDATE,
};

/// Feature advertised when a media server is attached.
pub const SERVER_FEATURE_MCU: &str = "mcu";

const SERVER_MESSAGE_TYPES: &[&str] = &["error", "hello", "bye", "room", "message", "control", "event"];

/// What the transport knows about the session a message is sent to.
pub trait SessionContext {
    /// Id of the room the session is currently in, if any.
    fn current_room_id(&self) -> Option<String>;
}

/// A message sent from the server to a client.
#[derive(Debug, Clone)]
pub struct ServerMessage {
    /// Id of the request this answers. `None` for pushed messages.
    pub id: Option<String>,
    pub payload: ServerPayload,
}

#[derive(Debug, Clone)]
pub enum ServerPayload {
    Error(Error),
    Hello(HelloServerMessage),
    Bye(ByeServerMessage),
    Room(RoomServerMessage),
    Message(MessageServerMessage),
    Control(ControlServerMessage),
    Event(EventServerMessage),
}

impl ServerPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerPayload::Error(_) => "error",
            ServerPayload::Hello(_) => "hello",
            ServerPayload::Bye(_) => "bye",
            ServerPayload::Room(_) => "room",
            ServerPayload::Message(_) => "message",
            ServerPayload::Control(_) => "control",
            ServerPayload::Event(_) => "event",
        }
    }
}

impl ServerMessage {
    pub fn new(id: Option<String>, payload: ServerPayload) -> Self {
        Self { id, payload }
    }

    pub fn error(id: Option<String>, error: Error) -> Self {
        Self::new(id, ServerPayload::Error(error))
    }

    /// An asynchronous event; never carries a correlation id.
    pub fn event(event: EventServerMessage) -> Self {
        Self::new(None, ServerPayload::Event(event))
    }

    /// Whether the connection should be closed once this message is sent.
    ///
    /// A `bye` always closes. A `roomlist`/`disinvite` event closes only if it
    /// disinvites the session from the room it is currently in.
    pub fn close_after_send(&self, session: Option<&dyn SessionContext>) -> bool {
        match &self.payload {
            ServerPayload::Bye(_) => true,
            ServerPayload::Event(event) if event.is(EVENT_TARGET_ROOMLIST, EVENT_TYPE_DISINVITE) => {
                match (session, &event.disinvite) {
                    (Some(session), Some(disinvite)) => {
                        session.current_room_id().as_deref() == Some(disinvite.room_id.as_str())
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// True for a message whose data is `{"type":"chat","chat":{"refresh":true}}`.
    ///
    /// Undecodable data yields `false`.
    pub fn is_chat_refresh(&self) -> bool {
        let ServerPayload::Message(message) = &self.payload else {
            return false;
        };
        let Some(data) = &message.data else {
            return false;
        };
        match serde_json::from_str::<MessageServerMessageData>(data.get()) {
            Ok(data) => data.kind == "chat" && data.chat.map_or(false, |chat| chat.refresh),
            Err(_) => false,
        }
    }

    pub fn is_participants_update(&self) -> bool {
        matches!(
            &self.payload,
            ServerPayload::Event(event) if event.is(EVENT_TARGET_PARTICIPANTS, EVENT_TYPE_UPDATE)
        )
    }
}

impl Serialize for ServerMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(id) = &self.id {
            map.serialize_entry("id", id)?;
        }
        map.serialize_entry("type", self.payload.kind())?;
        match &self.payload {
            ServerPayload::Error(error) => map.serialize_entry("error", error)?,
            ServerPayload::Hello(hello) => map.serialize_entry("hello", hello)?,
            ServerPayload::Bye(bye) => map.serialize_entry("bye", bye)?,
            ServerPayload::Room(room) => map.serialize_entry("room", room)?,
            ServerPayload::Message(message) => map.serialize_entry("message", message)?,
            ServerPayload::Control(control) => map.serialize_entry("control", control)?,
            ServerPayload::Event(event) => map.serialize_entry("event", event)?,
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct ServerEnvelope {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    error: Option<Error>,
    #[serde(default)]
    hello: Option<HelloServerMessage>,
    #[serde(default)]
    bye: Option<ByeServerMessage>,
    #[serde(default)]
    room: Option<RoomServerMessage>,
    #[serde(default)]
    message: Option<MessageServerMessage>,
    #[serde(default)]
    control: Option<ControlServerMessage>,
    #[serde(default)]
    event: Option<EventServerMessage>,
}

fn required<T, E: de::Error>(slot: Option<T>, name: &'static str) -> Result<T, E> {
    slot.ok_or_else(|| E::missing_field(name))
}

impl<'de> Deserialize<'de> for ServerMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let envelope = ServerEnvelope::deserialize(deserializer)?;
        let payload = match envelope.kind.as_str() {
            "error" => ServerPayload::Error(required(envelope.error, "error")?),
            "hello" => ServerPayload::Hello(required(envelope.hello, "hello")?),
            "bye" => ServerPayload::Bye(envelope.bye.unwrap_or_default()),
            "room" => ServerPayload::Room(required(envelope.room, "room")?),
            "message" => ServerPayload::Message(required(envelope.message, "message")?),
            "control" => ServerPayload::Control(required(envelope.control, "control")?),
            "event" => ServerPayload::Event(required(envelope.event, "event")?),
            other => return Err(de::Error::unknown_variant(other, SERVER_MESSAGE_TYPES)),
        };
        Ok(Self {
            id: envelope.id.filter(|id| !id.is_empty()),
            payload,
        })
    }
}

// Type "hello"

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HelloServerMessageServer {
    pub version: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HelloServerMessage {
    pub version: String,

    #[serde(rename = "sessionid")]
    pub session_id: String,

    #[serde(rename = "resumeid")]
    pub resume_id: String,

    #[serde(rename = "userid")]
    pub user_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<HelloServerMessageServer>,
}

// Type "bye"

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ByeServerMessage {
    #[serde(default)]
    pub reason: String,
}

// Type "room"

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomServerMessage {
    #[serde(rename = "roomid")]
    pub room_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Box<RawValue>>,
}

// Type "message" / "control"

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageServerMessageSender {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(rename = "sessionid", default, skip_serializing_if = "String::is_empty")]
    pub session_id: String,

    #[serde(rename = "userid", default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageServerMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<MessageServerMessageSender>,

    #[serde(default)]
    pub data: Option<Box<RawValue>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlServerMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<MessageServerMessageSender>,

    #[serde(default)]
    pub data: Option<Box<RawValue>>,
}

/// The part of a message's data the server looks at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageServerMessageData {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<MessageServerMessageDataChat>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MessageServerMessageDataChat {
    #[serde(default)]
    pub refresh: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::event::{RoomEventServerMessage, EVENT_TARGET_ROOM};

    struct InRoom(Option<&'static str>);

    impl SessionContext for InRoom {
        fn current_room_id(&self) -> Option<String> {
            self.0.map(str::to_owned)
        }
    }

    fn disinvite(room_id: &str) -> ServerMessage {
        let mut event = EventServerMessage::new(EVENT_TARGET_ROOMLIST, EVENT_TYPE_DISINVITE);
        event.disinvite = Some(RoomEventServerMessage::new(room_id));
        ServerMessage::event(event)
    }

    fn message_with(data: &str) -> ServerMessage {
        ServerMessage::new(
            None,
            ServerPayload::Message(MessageServerMessage {
                sender: None,
                data: Some(RawValue::from_string(data.to_owned()).unwrap()),
            }),
        )
    }

    #[test]
    fn test_close_after_bye_not_hello() {
        let bye = ServerMessage::new(Some("1".into()), ServerPayload::Bye(ByeServerMessage::default()));
        assert!(bye.close_after_send(None));

        let hello = ServerMessage::new(Some("1".into()), ServerPayload::Hello(HelloServerMessage::default()));
        assert!(!hello.close_after_send(Some(&InRoom(Some("room-1")))));
    }

    #[test]
    fn test_close_after_disinvite_from_current_room() {
        let msg = disinvite("room-1");
        assert!(msg.close_after_send(Some(&InRoom(Some("room-1")))));
        assert!(!msg.close_after_send(Some(&InRoom(Some("room-2")))));
        assert!(!msg.close_after_send(Some(&InRoom(None))));
        assert!(!msg.close_after_send(None));

        let mut invite = EventServerMessage::new(EVENT_TARGET_ROOMLIST, "invite");
        invite.invite = Some(RoomEventServerMessage::new("room-1"));
        assert!(!ServerMessage::event(invite).close_after_send(Some(&InRoom(Some("room-1")))));
    }

    #[test]
    fn test_chat_refresh_detection() {
        assert!(message_with(r#"{"type":"chat","chat":{"refresh":true}}"#).is_chat_refresh());
        assert!(!message_with(r#"{"type":"chat","chat":{"refresh":false}}"#).is_chat_refresh());
        assert!(!message_with(r#"{"type":"chat"}"#).is_chat_refresh());
        assert!(!message_with(r#"{"type":"offer","chat":{"refresh":true}}"#).is_chat_refresh());
        assert!(!message_with(r#""chat""#).is_chat_refresh());
        assert!(!message_with(r#"{"type":"chat","chat":{"refresh":"yes"}}"#).is_chat_refresh());

        let empty = ServerMessage::new(None, ServerPayload::Message(MessageServerMessage::default()));
        assert!(!empty.is_chat_refresh());
    }

    #[test]
    fn test_participants_update() {
        let update = EventServerMessage::new(EVENT_TARGET_PARTICIPANTS, EVENT_TYPE_UPDATE);
        assert!(ServerMessage::event(update).is_participants_update());

        let room_update = EventServerMessage::new(EVENT_TARGET_ROOM, EVENT_TYPE_UPDATE);
        assert!(!ServerMessage::event(room_update).is_participants_update());
        assert!(!message_with("{}").is_participants_update());
    }

    #[test]
    fn test_wire_shape() {
        let hello = ServerMessage::new(
            Some("abc".into()),
            ServerPayload::Hello(HelloServerMessage {
                version: "1.0".into(),
                session_id: "s".into(),
                resume_id: "r".into(),
                user_id: "u".into(),
                server: Some(HelloServerMessageServer {
                    version: "2.0.0".into(),
                    features: vec![SERVER_FEATURE_MCU.into()],
                }),
            }),
        );
        let value = serde_json::to_value(&hello).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["type"], "hello");
        assert_eq!(value["hello"]["sessionid"], "s");
        assert_eq!(value["hello"]["server"]["features"][0], "mcu");

        let pushed = serde_json::to_value(disinvite("room-1")).unwrap();
        assert!(pushed.get("id").is_none());
        assert_eq!(pushed["event"]["disinvite"]["roomid"], "room-1");
    }

    #[test]
    fn test_decode_requires_payload_for_type() {
        let decoded: ServerMessage =
            serde_json::from_str(r#"{"id":"7","type":"error","error":{"code":"x","message":"y"}}"#)
                .unwrap();
        assert_eq!(decoded.id.as_deref(), Some("7"));
        assert!(matches!(decoded.payload, ServerPayload::Error(ref e) if e.code == "x"));

        assert!(serde_json::from_str::<ServerMessage>(r#"{"type":"hello"}"#).is_err());
        assert!(serde_json::from_str::<ServerMessage>(r#"{"type":"nope"}"#).is_err());
    }
}
