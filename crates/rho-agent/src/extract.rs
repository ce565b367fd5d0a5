use anyhow::{anyhow, Context, Result};
use rho_ai::{ChatRequest, LlmClient, Message};
use serde::Deserialize;

const EXTRACT_TEMPERATURE: f32 = 0.2;

const EXTRACT_SYSTEM_PROMPT: &str = "You review a software issue and decide which files a \
developer would change to address it. Reply with a single JSON object of the shape \
{\"plan\": string, \"files_to_update\": [string], \"files_to_create\": [string]}. Entries in \
files_to_update must come from the provided list of valid file paths; files_to_create must not.";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
/// Edit targets extracted from an issue: the plan plus the files to touch.
pub struct EditTargets {
    #[serde(default)]
    pub plan: String,
    #[serde(default)]
    pub files_to_update: Vec<String>,
    #[serde(default)]
    pub files_to_create: Vec<String>,
}

/// Asks the completion service which files an issue concerns.
pub async fn extract_edit_targets(
    client: &dyn LlmClient,
    model: &str,
    project_files: &[String],
    issue_text: &str,
) -> Result<EditTargets> {
    let user_prompt = format!(
        "Valid file paths:\n{}\n\nIssue:\n{}",
        project_files.join("\n"),
        issue_text
    );
    let request = ChatRequest {
        model: model.to_string(),
        messages: vec![
            Message::system(EXTRACT_SYSTEM_PROMPT),
            Message::user(user_prompt),
        ],
        max_tokens: None,
        temperature: Some(EXTRACT_TEMPERATURE),
    };
    let response = client
        .complete(request)
        .await
        .context("edit-target extraction request failed")?;
    parse_edit_targets(&response.message.content)
}

/// Parses the extraction reply, tolerating prose around the JSON object.
pub fn parse_edit_targets(reply: &str) -> Result<EditTargets> {
    let json_slice = extract_json_object(reply)
        .ok_or_else(|| anyhow!("extraction reply contains no JSON object"))?;
    serde_json::from_str(json_slice).context("extraction reply JSON has an unexpected shape")
}

fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end >= start).then(|| &reply[start..=end])
}
