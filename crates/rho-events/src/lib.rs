//! Repository event model, trigger classification, and dispatch plumbing.
//!
//! Normalizes heterogeneous webhook payloads into one event shape,
//! evaluates each event against a fixed trigger table, and hands accepted
//! events to an injected dispatch queue exactly once per decision.

mod classifier;
mod envelope;
mod event;
mod queue;

pub use classifier::{classify, ClassifierDecision, TriggerConfig};
pub use envelope::DispatchEnvelope;
pub use event::{
    CommentPayload, EventUser, IssuePayload, PullRequestPayload, RepositoryEvent, ReviewPayload,
};
pub use queue::{DispatchQueue, MpscDispatchQueue, RecordingDispatchQueue};
