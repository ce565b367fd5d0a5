use crate::event::RepositoryEvent;

const REVIEW_ACTION_SUBMITTED: &str = "submitted";
const ACTIONABLE_REVIEW_STATES: [&str; 2] = ["changes_requested", "commented"];

#[derive(Debug, Clone)]
/// Externally supplied trigger configuration: the mention token, the
/// command token set, and the automation's own account identity. All
/// values are opaque strings.
pub struct TriggerConfig {
    pub mention_token: String,
    pub command_tokens: Vec<String>,
    pub bot_identity: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates supported `ClassifierDecision` values.
pub enum ClassifierDecision {
    Accept,
    Reject { reason: &'static str },
}

impl ClassifierDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

fn body_contains(body: Option<&str>, token: &str) -> bool {
    !token.is_empty() && body.is_some_and(|text| text.contains(token))
}

fn body_contains_any(body: Option<&str>, tokens: &[String]) -> bool {
    tokens.iter().any(|token| body_contains(body, token))
}

/// Pure accept/reject decision for one event against the trigger table.
///
/// Holds no state across events; containment checks are raw substring
/// checks on body text, so overlapping substrings count as matches.
pub fn classify(event: &RepositoryEvent, config: &TriggerConfig) -> ClassifierDecision {
    match event {
        RepositoryEvent::IssueOpened { issue } => {
            if body_contains(issue.body.as_deref(), &config.mention_token) {
                ClassifierDecision::Accept
            } else {
                ClassifierDecision::Reject {
                    reason: "issue body has no mention token",
                }
            }
        }
        RepositoryEvent::PullRequestReviewSubmitted {
            action,
            review,
            pull_request,
        } => {
            let addressed = body_contains(review.body.as_deref(), &config.mention_token)
                || (!config.bot_identity.is_empty()
                    && pull_request.user.id.to_string() == config.bot_identity);
            if !addressed {
                return ClassifierDecision::Reject {
                    reason: "review does not address the automation",
                };
            }
            if action != REVIEW_ACTION_SUBMITTED {
                return ClassifierDecision::Reject {
                    reason: "review action is not submitted",
                };
            }
            if !ACTIONABLE_REVIEW_STATES.contains(&review.state.as_str()) {
                return ClassifierDecision::Reject {
                    reason: "review state is not actionable",
                };
            }
            ClassifierDecision::Accept
        }
        RepositoryEvent::IssueCommentCreated { issue, comment } => {
            if issue.pull_request.is_none() {
                return ClassifierDecision::Reject {
                    reason: "comment is not on a pull request",
                };
            }
            if body_contains_any(comment.body.as_deref(), &config.command_tokens) {
                ClassifierDecision::Accept
            } else {
                ClassifierDecision::Reject {
                    reason: "comment body has no command token",
                }
            }
        }
        RepositoryEvent::PullRequestOpened { pull_request } => {
            if body_contains_any(pull_request.body.as_deref(), &config.command_tokens) {
                ClassifierDecision::Accept
            } else {
                ClassifierDecision::Reject {
                    reason: "pull request body has no command token",
                }
            }
        }
    }
}
