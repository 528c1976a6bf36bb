//! Wire-level frames for the live notification socket.
//!
//! Every frame is a JSON object with an `event` tag and a `data` payload.

use serde::{Deserialize, Serialize};

use crate::domain::NotificationEvent;

/// Frames a client may send.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientFrame {
    /// Subscribe to new-product announcements for a college.
    JoinCollege(String),
}

/// Acknowledgement for a successful join.
#[derive(Debug, Serialize)]
pub struct JoinedRoom<'a> {
    pub room: &'a str,
}

/// Soft rejection that leaves the connection open.
#[derive(Debug, Serialize)]
pub struct FrameError<'a> {
    pub message: &'a str,
}

/// Frames the server sends.
#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerFrame<'a> {
    Joined(JoinedRoom<'a>),
    NewProduct(&'a NotificationEvent),
    Error(FrameError<'a>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn parses_join_frame() {
        let frame: ClientFrame =
            serde_json::from_str(r#"{"event":"join-college","data":"IIT Delhi"}"#)
                .expect("join frame");
        assert_eq!(frame, ClientFrame::JoinCollege("IIT Delhi".to_owned()));
    }

    #[rstest]
    #[case(r#"{"event":"leave-college","data":"IIT Delhi"}"#)]
    #[case(r#"{"event":"join-college","data":42}"#)]
    #[case(r#"{"data":"IIT Delhi"}"#)]
    #[case("join-college")]
    fn rejects_unknown_or_malformed_frames(#[case] raw: &str) {
        assert!(serde_json::from_str::<ClientFrame>(raw).is_err());
    }

    #[rstest]
    fn joined_frame_shape() {
        let frame = ServerFrame::Joined(JoinedRoom {
            room: "college-iit-delhi",
        });
        assert_eq!(
            serde_json::to_value(&frame).expect("serialise"),
            json!({"event": "joined", "data": {"room": "college-iit-delhi"}})
        );
    }
}
