use arena_core::Chips;
use arena_core::Position;
use arena_gameplay::ActionKind;
use serde::Deserialize;

/// First frame on any connection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HelloFrame {
    pub team: Option<String>,
    pub join_code: Option<String>,
    pub role: Option<Role>,
    pub mode: Option<SpectateMode>,
}

/// A seat's answer to an `act` prompt.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActionFrame {
    pub hand_id: String,
    pub action: ActionKind,
    pub amount: Option<Chips>,
}

/// Operator command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ControlFrame {
    pub command: ControlCommand,
    pub seat: Option<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Spectator,
    Operator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectateMode {
    Live,
    Presentation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlCommand {
    StartHand,
    SkipAction,
    ForfeitSeat,
}

/// Inbound envelopes after schema validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Hello(HelloFrame),
    Action(ActionFrame),
    Control(ControlFrame),
}

/// Decode failures, split so unknown types can be dropped while malformed
/// payloads draw BAD_SCHEMA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    Malformed(String),
    UnknownType(String),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(s) => write!(f, "malformed frame: {}", s),
            Self::UnknownType(s) => write!(f, "unknown message type: {}", s),
        }
    }
}

impl std::error::Error for CodecError {}

/// Validates one text frame into a typed envelope. The `type` field is
/// inspected first so that unrecognized types surface as such instead of
/// generic schema errors.
pub fn decode(raw: &str) -> Result<ClientMessage, CodecError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| CodecError::Malformed(e.to_string()))?;
    let kind = value
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or_else(|| CodecError::Malformed("missing type".to_string()))?;
    match kind {
        "hello" => serde_json::from_value(value.clone())
            .map(ClientMessage::Hello)
            .map_err(|e| CodecError::Malformed(e.to_string())),
        "action" => serde_json::from_value(value.clone())
            .map(ClientMessage::Action)
            .map_err(|e| CodecError::Malformed(e.to_string())),
        "control" => serde_json::from_value(value.clone())
            .map(ClientMessage::Control)
            .map_err(|e| CodecError::Malformed(e.to_string())),
        other => Err(CodecError::UnknownType(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_bot_hello() {
        let msg = decode(r#"{"type":"hello","v":1,"team":"Alpha","join_code":"C1"}"#).unwrap();
        match msg {
            ClientMessage::Hello(hello) => {
                assert_eq!(hello.team.as_deref(), Some("Alpha"));
                assert_eq!(hello.join_code.as_deref(), Some("C1"));
                assert!(hello.role.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn decodes_spectator_hello() {
        let msg = decode(r#"{"type":"hello","role":"operator","mode":"live"}"#).unwrap();
        match msg {
            ClientMessage::Hello(hello) => {
                assert_eq!(hello.role, Some(Role::Operator));
                assert_eq!(hello.mode, Some(SpectateMode::Live));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn decodes_action_with_amount() {
        let msg =
            decode(r#"{"type":"action","hand_id":"H-20240101-00000","action":"RAISE_TO","amount":400}"#)
                .unwrap();
        match msg {
            ClientMessage::Action(action) => {
                assert_eq!(action.action, ActionKind::RaiseTo);
                assert_eq!(action.amount, Some(400));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn decodes_control() {
        let msg = decode(r#"{"type":"control","command":"FORFEIT_SEAT","seat":3}"#).unwrap();
        match msg {
            ClientMessage::Control(control) => {
                assert_eq!(control.command, ControlCommand::ForfeitSeat);
                assert_eq!(control.seat, Some(3));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_type_is_distinguished() {
        assert_eq!(
            decode(r#"{"type":"ping"}"#),
            Err(CodecError::UnknownType("ping".to_string()))
        );
    }

    #[test]
    fn malformed_frames_are_schema_errors() {
        assert!(matches!(decode("not json"), Err(CodecError::Malformed(_))));
        assert!(matches!(decode(r#"{"v":1}"#), Err(CodecError::Malformed(_))));
        assert!(matches!(
            decode(r#"{"type":"action","hand_id":"H","action":"DANCE"}"#),
            Err(CodecError::Malformed(_))
        ));
    }
}
