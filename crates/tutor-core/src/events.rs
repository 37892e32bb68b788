//! Tutor event types

use crate::transcript::RequestId;
use serde::{Deserialize, Serialize};

/// Events emitted while a request runs, tagged with the request they belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TutorEvent {
    /// Input passed the gate and a request started
    Started { request: RequestId },

    /// A fragment was appended to the transcript
    Fragment { request: RequestId, delta: String },

    /// The request finished with a non-empty transcript
    Completed {
        request: RequestId,
        transcript: String,
    },

    /// The request failed; any partial transcript was discarded
    Failed { request: RequestId, message: String },

    /// The gate rejected the input; no request was started
    Rejected { message: String },

    /// The transcript was cleared
    Cleared,
}

impl TutorEvent {
    /// The request this event belongs to, if any
    pub fn request(&self) -> Option<RequestId> {
        match self {
            TutorEvent::Started { request }
            | TutorEvent::Fragment { request, .. }
            | TutorEvent::Completed { request, .. }
            | TutorEvent::Failed { request, .. } => Some(*request),
            TutorEvent::Rejected { .. } | TutorEvent::Cleared => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_tag() {
        let request = RequestId::default();
        assert_eq!(TutorEvent::Started { request }.request(), Some(request));
        assert_eq!(
            TutorEvent::Failed {
                request,
                message: "boom".into()
            }
            .request(),
            Some(request)
        );
        assert_eq!(
            TutorEvent::Rejected {
                message: "no".into()
            }
            .request(),
            None
        );
    }

    #[test]
    fn test_serialized_tag() {
        let json = serde_json::to_value(TutorEvent::Cleared).unwrap();
        assert_eq!(json["type"], "cleared");
        assert_eq!(TutorEvent::Cleared.request(), None);
    }
}
