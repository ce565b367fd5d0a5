use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use rho_ai::{ChatRequest, LlmClient, Message};
use rho_core::current_unix_timestamp_ms;
use rho_pack::{
    decode_pack, encode_pack, walk_repository, FileRecord, IgnoreRuleset, InclusionFilter,
    FILE_MARKER,
};

use crate::check::WorkspaceCheck;
use crate::extract::extract_edit_targets;

const CODE_EDIT_TEMPERATURE: f32 = 0.2;
const MIN_GENERATED_REPLY_CHARS: usize = 10;

const CODE_EDIT_SYSTEM_PROMPT: &str = "You are an expert software engineer resolving an issue \
in the provided codebase. Reply with every changed or created file rendered as \
__FILEPATH__<relative path>__FILEPATH__ followed immediately by the complete file content. \
Output nothing else.";

#[derive(Clone)]
/// Dependencies for one edit job: completion client, model, identity, and
/// the working copy. At most one job may operate on a working copy at a
/// time; concurrent jobs need disjoint copies.
pub struct EditJobContext {
    pub client: Arc<dyn LlmClient>,
    pub model: String,
    pub bot_name: String,
    pub workdir: PathBuf,
    pub check: Arc<dyn WorkspaceCheck>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `EditJob` used across Rho components.
pub struct EditJob {
    pub issue_number: u64,
    pub issue_title: String,
    pub issue_body: String,
}

#[derive(Debug, Clone)]
/// Public struct `EditOutcome` used across Rho components.
pub struct EditOutcome {
    pub branch: String,
    pub written_paths: Vec<PathBuf>,
    pub plan: String,
}

/// Branch the reconstructed edit lands on; the timestamp keeps repeated
/// runs for one issue distinct.
pub fn edit_branch_name(bot_name: &str, issue_number: u64, now_unix_ms: u64) -> String {
    format!("{bot_name}-issue-{issue_number}-{now_unix_ms}")
}

/// Runs the full edit pipeline: snapshot the working copy, extract edit
/// targets, pack the selected files, request the rewrite, and reconstruct
/// the reply in place. Fails without retrying on empty target lists and
/// on replies too short or missing the file marker.
pub async fn run_edit_job(ctx: &EditJobContext, job: &EditJob) -> Result<EditOutcome> {
    let issue_text = format!("{} {}", job.issue_title, job.issue_body);
    let ruleset = IgnoreRuleset::load(&ctx.workdir)?;
    let records = walk_repository(&ctx.workdir, &ruleset, &InclusionFilter::default())
        .context("failed to snapshot the working copy")?;
    let project_files: Vec<String> = records
        .iter()
        .map(|record| record.relative_path.clone())
        .collect();

    let targets =
        extract_edit_targets(ctx.client.as_ref(), &ctx.model, &project_files, &issue_text).await?;
    if targets.files_to_update.is_empty() {
        bail!("no files to update");
    }
    tracing::info!(
        issue = job.issue_number,
        files = targets.files_to_update.len(),
        "extracted edit targets"
    );

    let filter = InclusionFilter::from_entries(&targets.files_to_update);
    let selected: Vec<FileRecord> = records
        .into_iter()
        .filter(|record| {
            let file_name = record
                .relative_path
                .rsplit('/')
                .next()
                .unwrap_or(record.relative_path.as_str());
            let absolute = ctx.workdir.join(&record.relative_path);
            filter.matches(
                &record.relative_path,
                file_name,
                &absolute.to_string_lossy(),
            )
        })
        .collect();
    let code = encode_pack(&selected);

    let reply = request_code_edits(ctx, &code, job, &targets.plan).await?;
    if reply.len() < MIN_GENERATED_REPLY_CHARS || !reply.contains(FILE_MARKER) {
        bail!("no code generated");
    }

    let branch = edit_branch_name(&ctx.bot_name, job.issue_number, current_unix_timestamp_ms());
    let written_paths = decode_pack(&reply, &ctx.workdir)?;

    let report = ctx.check.check(&ctx.workdir).await?;
    if !report.passed {
        bail!("workspace check failed: {}", report.output);
    }

    Ok(EditOutcome {
        branch,
        written_paths,
        plan: targets.plan,
    })
}

async fn request_code_edits(
    ctx: &EditJobContext,
    code: &str,
    job: &EditJob,
    plan: &str,
) -> Result<String> {
    let user_prompt = format!(
        "Issue:\n{}\n\nPlan:\n{}\n\nCode:\n{}",
        job.issue_body, plan, code
    );
    let request = ChatRequest {
        model: ctx.model.clone(),
        messages: vec![
            Message::system(CODE_EDIT_SYSTEM_PROMPT),
            Message::user(user_prompt),
        ],
        max_tokens: None,
        temperature: Some(CODE_EDIT_TEMPERATURE),
    };
    let response = ctx
        .client
        .complete(request)
        .await
        .context("code edit request failed")?;
    Ok(response.message.content)
}
