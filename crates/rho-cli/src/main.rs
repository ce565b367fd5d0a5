//! Rho binary: configuration, tracing bootstrap, and the serve loop that
//! wires the webhook gateway to the edit worker through the dispatch queue.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rho_agent::{run_worker, AlwaysPassCheck, EditJobContext, WorkerContext};
use rho_ai::{OpenAiClient, OpenAiConfig};
use rho_events::{MpscDispatchQueue, TriggerConfig};
use rho_gateway::{serve_gateway, GatewayConfig, GatewayState};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "rho",
    about = "Repository automation agent: classifies collaboration events and turns them into multi-file code edits",
    version
)]
struct RhoArgs {
    /// Address the webhook gateway listens on.
    #[arg(long, env = "RHO_LISTEN_ADDR", default_value = "0.0.0.0:4000")]
    listen_addr: SocketAddr,

    /// Mention token whose presence marks an event as addressed to the bot.
    #[arg(long, env = "RHO_MENTION_TOKEN", default_value = "@rho")]
    mention_token: String,

    /// Command tokens accepted in pull-request and comment bodies.
    #[arg(
        long = "command-token",
        env = "RHO_COMMAND_TOKENS",
        value_delimiter = ','
    )]
    command_tokens: Vec<String>,

    /// Account id the automation opens pull requests as; review events on
    /// its own pull requests are processed without a mention.
    #[arg(long, env = "RHO_BOT_IDENTITY", default_value = "")]
    bot_identity: String,

    /// Name used in generated branch names.
    #[arg(long, env = "RHO_BOT_NAME", default_value = "rho")]
    bot_name: String,

    /// Webhook signing secret; unset disables signature verification.
    #[arg(long, env = "RHO_WEBHOOK_SECRET")]
    webhook_secret: Option<String>,

    /// Working copy the edit worker operates on.
    #[arg(long, env = "RHO_WORKDIR", default_value = ".")]
    workdir: PathBuf,

    /// Completion model identifier.
    #[arg(long, env = "RHO_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    /// Completion service API base.
    #[arg(long, env = "RHO_API_BASE", default_value = "https://api.openai.com/v1")]
    api_base: String,

    /// Completion service API key.
    #[arg(long, env = "RHO_API_KEY", default_value = "")]
    api_key: String,

    /// Per-request timeout against the completion service.
    #[arg(long, env = "RHO_REQUEST_TIMEOUT_MS", default_value_t = 120_000)]
    request_timeout_ms: u64,

    /// Retries for retryable completion-service failures.
    #[arg(long, env = "RHO_MAX_RETRIES", default_value_t = 3)]
    max_retries: usize,
}

fn default_command_tokens(mention_token: &str) -> Vec<String> {
    vec![
        format!("{mention_token} fix"),
        format!("{mention_token} create"),
    ]
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = RhoArgs::parse();

    let command_tokens = if args.command_tokens.is_empty() {
        default_command_tokens(&args.mention_token)
    } else {
        args.command_tokens.clone()
    };

    let client = Arc::new(OpenAiClient::new(OpenAiConfig {
        api_base: args.api_base.clone(),
        api_key: args.api_key.clone(),
        request_timeout_ms: args.request_timeout_ms,
        max_retries: args.max_retries,
        retry_jitter: true,
    })?);

    let (queue, receiver) = MpscDispatchQueue::channel();
    let worker_ctx = Arc::new(WorkerContext {
        edit: EditJobContext {
            client,
            model: args.model.clone(),
            bot_name: args.bot_name.clone(),
            workdir: args.workdir.clone(),
            check: Arc::new(AlwaysPassCheck),
        },
    });
    tokio::spawn(run_worker(receiver, worker_ctx));

    let state = Arc::new(GatewayState {
        config: GatewayConfig {
            triggers: TriggerConfig {
                mention_token: args.mention_token.clone(),
                command_tokens,
                bot_identity: args.bot_identity.clone(),
            },
            webhook_secret: args.webhook_secret.clone(),
        },
        queue: Arc::new(queue),
    });

    tracing::info!(addr = %args.listen_addr, workdir = %args.workdir.display(), "starting webhook gateway");
    serve_gateway(args.listen_addr, state).await
}
