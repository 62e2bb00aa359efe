//! # Realtime Chat Events
//!
//! Every WebSocket frame is a JSON object `{"event": "<name>", "data": <payload>}`.
//! [`ClientEvent`] covers what browsers send, [`ServerEvent`] what the gateway emits.
//! Events without a payload (`merchant:online`, `merchant:offline`) omit `data`.

use serde::{Deserialize, Serialize};

use super::chat::{ChatMessage, SenderType, SessionInfo};

/// Payload of `customer:join`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerJoin {
    pub merchant_id: String,
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_token: Option<String>,
}

/// Payload of `merchant:join`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MerchantJoin {
    pub merchant_id: String,
}

/// Payload of `message:send`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageSend {
    pub session_id: String,
    pub content: String,
    pub sender_type: SenderType,
}

/// Payload carrying only a session id (typing, takeover, close).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRef {
    pub session_id: String,
}

/// Typing relay delivered to the other party.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypingNotice {
    pub session_id: String,
    pub sender_type: SenderType,
}

/// Rejection reported to the originating connection only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventError {
    pub code: String,
    pub message: String,
}

/// Events sent by customer and merchant clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "customer:join")]
    CustomerJoin(CustomerJoin),
    #[serde(rename = "merchant:join")]
    MerchantJoin(MerchantJoin),
    #[serde(rename = "message:send")]
    MessageSend(MessageSend),
    #[serde(rename = "typing:start")]
    TypingStart(SessionRef),
    #[serde(rename = "typing:stop")]
    TypingStop(SessionRef),
    #[serde(rename = "merchant:takeover")]
    Takeover(SessionRef),
    #[serde(rename = "merchant:release_takeover")]
    ReleaseTakeover(SessionRef),
}

impl ClientEvent {
    /// Wire name of the event, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::CustomerJoin(_) => "customer:join",
            ClientEvent::MerchantJoin(_) => "merchant:join",
            ClientEvent::MessageSend(_) => "message:send",
            ClientEvent::TypingStart(_) => "typing:start",
            ClientEvent::TypingStop(_) => "typing:stop",
            ClientEvent::Takeover(_) => "merchant:takeover",
            ClientEvent::ReleaseTakeover(_) => "merchant:release_takeover",
        }
    }
}

/// Events emitted by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "session:created")]
    SessionCreated(SessionInfo),
    #[serde(rename = "session:history")]
    SessionHistory(Vec<ChatMessage>),
    #[serde(rename = "message:receive")]
    MessageReceive(ChatMessage),
    #[serde(rename = "ai:response")]
    AiResponse(ChatMessage),
    #[serde(rename = "typing:start")]
    TypingStart(TypingNotice),
    #[serde(rename = "typing:stop")]
    TypingStop(TypingNotice),
    #[serde(rename = "merchant:online")]
    MerchantOnline,
    #[serde(rename = "merchant:offline")]
    MerchantOffline,
    #[serde(rename = "merchant:takeover")]
    MerchantTakeover(SessionRef),
    #[serde(rename = "merchant:release_takeover")]
    MerchantReleaseTakeover(SessionRef),
    #[serde(rename = "session:closed")]
    SessionClosed(SessionRef),
    #[serde(rename = "error")]
    Error(EventError),
}

impl ServerEvent {
    /// Wire name of the event, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::SessionCreated(_) => "session:created",
            ServerEvent::SessionHistory(_) => "session:history",
            ServerEvent::MessageReceive(_) => "message:receive",
            ServerEvent::AiResponse(_) => "ai:response",
            ServerEvent::TypingStart(_) => "typing:start",
            ServerEvent::TypingStop(_) => "typing:stop",
            ServerEvent::MerchantOnline => "merchant:online",
            ServerEvent::MerchantOffline => "merchant:offline",
            ServerEvent::MerchantTakeover(_) => "merchant:takeover",
            ServerEvent::MerchantReleaseTakeover(_) => "merchant:release_takeover",
            ServerEvent::SessionClosed(_) => "session:closed",
            ServerEvent::Error(_) => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_customer_join_accepts_missing_optionals() {
        let raw = json!({
            "event": "customer:join",
            "data": {"merchantId": "m1", "customerName": "Alice", "customerId": "c-1"}
        });

        let event: ClientEvent = serde_json::from_value(raw).unwrap();

        assert_eq!(
            event,
            ClientEvent::CustomerJoin(CustomerJoin {
                merchant_id: "m1".to_string(),
                customer_name: "Alice".to_string(),
                customer_email: None,
                customer_id: "c-1".to_string(),
                customer_token: None,
            })
        );
    }

    #[test]
    fn test_message_send_uses_lowercase_sender_type() {
        let raw = r#"{"event":"message:send","data":{"sessionId":"s1","content":"Hi","senderType":"customer"}}"#;

        let event: ClientEvent = serde_json::from_str(raw).unwrap();

        match event {
            ClientEvent::MessageSend(send) => {
                assert_eq!(send.sender_type, SenderType::Customer);
                assert_eq!(send.content, "Hi");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_presence_events_have_no_data() {
        let value = serde_json::to_value(ServerEvent::MerchantOnline).unwrap();
        assert_eq!(value, json!({"event": "merchant:online"}));

        let parsed: ServerEvent = serde_json::from_str(r#"{"event":"merchant:offline"}"#).unwrap();
        assert_eq!(parsed, ServerEvent::MerchantOffline);
    }

    #[test]
    fn test_typing_relay_carries_sender_type() {
        let event = ServerEvent::TypingStart(TypingNotice {
            session_id: "s1".to_string(),
            sender_type: SenderType::Merchant,
        });

        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(
            value,
            json!({"event": "typing:start", "data": {"sessionId": "s1", "senderType": "merchant"}})
        );
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let result = serde_json::from_str::<ClientEvent>(r#"{"event":"catalog:update","data":{}}"#);
        assert!(result.is_err());
    }
}
