use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::RepositoryEvent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// The normalized payload handed to the dispatch queue after an accept.
pub struct DispatchEnvelope {
    pub event_id: String,
    pub kind: String,
    pub payload: Value,
}

impl DispatchEnvelope {
    /// Builds the envelope with a stable payload-derived identity, so a
    /// redelivered webhook yields the same `event_id`. No dedup record is
    /// kept; downstream consumers can key on it.
    pub fn for_event(event: &RepositoryEvent) -> Self {
        let event_id = match event {
            RepositoryEvent::IssueOpened { issue } => format!("issue-opened:{}", issue.id),
            RepositoryEvent::PullRequestReviewSubmitted { review, .. } => {
                format!("pr-review-submitted:{}", review.id)
            }
            RepositoryEvent::IssueCommentCreated { comment, .. } => {
                format!("issue-comment-created:{}", comment.id)
            }
            RepositoryEvent::PullRequestOpened { pull_request } => {
                format!("pr-opened:{}", pull_request.id)
            }
        };
        Self {
            event_id,
            kind: event.kind().to_string(),
            payload: serde_json::to_value(event).unwrap_or(Value::Null),
        }
    }
}
