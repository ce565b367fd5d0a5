use std::sync::Arc;

use anyhow::{Context, Result};
use rho_events::{DispatchEnvelope, RepositoryEvent};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::edit_job::{run_edit_job, EditJob, EditJobContext, EditOutcome};

/// Public struct `WorkerContext` used across Rho components.
pub struct WorkerContext {
    pub edit: EditJobContext,
}

/// Drains the dispatch queue until the sender side closes. One failed job
/// never stops the loop; failures surface here, not to the webhook sender.
pub async fn run_worker(mut receiver: UnboundedReceiver<DispatchEnvelope>, ctx: Arc<WorkerContext>) {
    while let Some(envelope) = receiver.recv().await {
        tracing::info!(
            event_id = %envelope.event_id,
            kind = %envelope.kind,
            "dispatch event received"
        );
        match handle_envelope(&envelope, &ctx).await {
            Ok(outcome) => tracing::info!(
                event_id = %envelope.event_id,
                branch = %outcome.branch,
                files = outcome.written_paths.len(),
                "edit job completed"
            ),
            Err(error) => tracing::error!(
                event_id = %envelope.event_id,
                %error,
                "edit job failed"
            ),
        }
    }
    tracing::debug!("dispatch queue closed, worker stopping");
}

async fn handle_envelope(
    envelope: &DispatchEnvelope,
    ctx: &WorkerContext,
) -> Result<EditOutcome> {
    let event: RepositoryEvent = serde_json::from_value(envelope.payload.clone())
        .context("dispatch payload does not match the event model")?;
    let job = edit_job_for_event(&event);
    run_edit_job(&ctx.edit, &job).await
}

/// Maps an accepted event onto the edit job the worker runs for it. Review
/// and comment events edit against the reviewer's text; opened events edit
/// against the original body.
pub fn edit_job_for_event(event: &RepositoryEvent) -> EditJob {
    match event {
        RepositoryEvent::IssueOpened { issue } => EditJob {
            issue_number: issue.number,
            issue_title: issue.title.clone(),
            issue_body: issue.body.clone().unwrap_or_default(),
        },
        RepositoryEvent::PullRequestReviewSubmitted {
            review,
            pull_request,
            ..
        } => EditJob {
            issue_number: pull_request.number,
            issue_title: pull_request.title.clone(),
            issue_body: review.body.clone().unwrap_or_default(),
        },
        RepositoryEvent::IssueCommentCreated { issue, comment } => EditJob {
            issue_number: issue.number,
            issue_title: issue.title.clone(),
            issue_body: comment.body.clone().unwrap_or_default(),
        },
        RepositoryEvent::PullRequestOpened { pull_request } => EditJob {
            issue_number: pull_request.number,
            issue_title: pull_request.title.clone(),
            issue_body: pull_request.body.clone().unwrap_or_default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use rho_events::{
        CommentPayload, EventUser, IssuePayload, PullRequestPayload, RepositoryEvent, ReviewPayload,
    };

    use super::edit_job_for_event;

    fn user() -> EventUser {
        EventUser {
            id: 1,
            login: "alice".to_string(),
        }
    }

    #[test]
    fn unit_issue_opened_maps_to_issue_body_job() {
        let event = RepositoryEvent::IssueOpened {
            issue: IssuePayload {
                id: 9,
                number: 3,
                title: "Add settings".to_string(),
                body: Some("please @rho".to_string()),
                user: user(),
                pull_request: None,
            },
        };
        let job = edit_job_for_event(&event);
        assert_eq!(job.issue_number, 3);
        assert_eq!(job.issue_title, "Add settings");
        assert_eq!(job.issue_body, "please @rho");
    }

    #[test]
    fn functional_review_submitted_edits_against_the_review_text() {
        let event = RepositoryEvent::PullRequestReviewSubmitted {
            action: "submitted".to_string(),
            review: ReviewPayload {
                id: 31,
                body: Some("rename the helper".to_string()),
                state: "changes_requested".to_string(),
                user: user(),
            },
            pull_request: PullRequestPayload {
                id: 21,
                number: 8,
                title: "Add helper".to_string(),
                body: Some("original description".to_string()),
                user: user(),
            },
        };
        let job = edit_job_for_event(&event);
        assert_eq!(job.issue_number, 8);
        assert_eq!(job.issue_body, "rename the helper");
    }

    #[test]
    fn regression_missing_bodies_become_empty_strings() {
        let event = RepositoryEvent::IssueCommentCreated {
            issue: IssuePayload {
                id: 9,
                number: 3,
                title: "t".to_string(),
                body: None,
                user: user(),
                pull_request: Some(serde_json::json!({ "url": "x" })),
            },
            comment: CommentPayload {
                id: 41,
                body: None,
                user: user(),
            },
        };
        assert_eq!(edit_job_for_event(&event).issue_body, "");
    }
}
