use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Public struct `EventUser` used across Rho components.
pub struct EventUser {
    pub id: u64,
    pub login: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Public struct `IssuePayload` used across Rho components.
pub struct IssuePayload {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub user: EventUser,
    /// Present when the issue is the comment thread of a pull request.
    #[serde(default)]
    pub pull_request: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Public struct `PullRequestPayload` used across Rho components.
pub struct PullRequestPayload {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub user: EventUser,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Public struct `ReviewPayload` used across Rho components.
pub struct ReviewPayload {
    pub id: u64,
    pub body: Option<String>,
    pub state: String,
    pub user: EventUser,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Public struct `CommentPayload` used across Rho components.
pub struct CommentPayload {
    pub id: u64,
    pub body: Option<String>,
    pub user: EventUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Normalized repository event consumed by the classifier, independent of
/// the originating transport encoding.
pub enum RepositoryEvent {
    IssueOpened {
        issue: IssuePayload,
    },
    PullRequestReviewSubmitted {
        action: String,
        review: ReviewPayload,
        pull_request: PullRequestPayload,
    },
    IssueCommentCreated {
        issue: IssuePayload,
        comment: CommentPayload,
    },
    PullRequestOpened {
        pull_request: PullRequestPayload,
    },
}

impl RepositoryEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IssueOpened { .. } => "issue_opened",
            Self::PullRequestReviewSubmitted { .. } => "pull_request_review_submitted",
            Self::IssueCommentCreated { .. } => "issue_comment_created",
            Self::PullRequestOpened { .. } => "pull_request_opened",
        }
    }
}
