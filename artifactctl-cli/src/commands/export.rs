//! Export commands: export (remote), extract (local file), orgs
//!
//! Commands: export, extract, orgs

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use artifactctl_core::config::SESSION_KEY_ENV;
use artifactctl_core::{
    ClaudeClient, ExportConfig, ExportJob, ExportOptions, ExportReport, FileDownloader,
    HttpRemoteSource, LocalSource, RemoteSource, ZipArchiveSink,
};
use clap::Parser;
use tracing::{info, warn};

use crate::ui::{self, BarProgress};

// === Arg Structs ===

#[derive(Parser, Debug)]
pub struct SessionArgs {
    /// claude.ai session key (sessionKey cookie)
    #[arg(long, env = SESSION_KEY_ENV, hide_env_values = true)]
    pub session_key: Option<String>,

    /// API base URL (default: https://claude.ai/api)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Organization id (default: config, CLAUDE_ORG_ID, or the first organization)
    #[arg(long, value_name = "ID")]
    pub org: Option<String>,

    /// Directory the archive is saved into
    #[arg(long = "out", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Delay between conversation fetches in milliseconds
    #[arg(long, value_name = "MS")]
    pub pacing_ms: Option<u64>,

    /// Print the export result as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Conversations file (single conversation object or array, e.g. conversations.json)
    #[arg(long = "in", value_name = "PATH")]
    pub input: PathBuf,

    /// Directory the archive is saved into
    #[arg(long = "out", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Print the export result as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct OrgsArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// === Command Implementation ===

pub async fn run_export(args: ExportArgs) -> Result<()> {
    let mut config = ExportConfig::load();
    if let Some(ms) = args.pacing_ms {
        config.export.pacing = Duration::from_millis(ms);
    }
    if let Some(dir) = args.output {
        config.export.output_dir = dir;
    }

    let client = build_client(&args.session, &config)?;
    let org_id = match args.org.or_else(|| config.remote.org_id.clone()) {
        Some(org) => org,
        None => {
            let orgs = client
                .organizations()
                .await
                .context("failed to list organizations")?;
            let first = orgs
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("session has no organizations"))?;
            info!(org = %first.uuid, "no organization configured, using the first one");
            first.uuid
        }
    };

    info!(
        org = %org_id,
        pacing_ms = config.export.pacing.as_millis() as u64,
        out = %config.export.output_dir.display(),
        "starting export"
    );

    let source = HttpRemoteSource::new(client, org_id);
    let options = ExportOptions {
        pacing: config.export.pacing,
        ..Default::default()
    };
    let report = run_job(source, options, config.export.output_dir).await;
    report_outcome(&report, args.json)
}

pub async fn run_extract(args: ExtractArgs) -> Result<()> {
    let config = ExportConfig::load();
    let output_dir = args.output.unwrap_or(config.export.output_dir);

    let source = LocalSource::from_path(&args.input)
        .with_context(|| format!("failed to read {:?}", args.input))?;
    info!(conversations = source.len(), input = ?args.input, "extracting from local export");

    // Nothing remote to be polite to
    let options = ExportOptions {
        pacing: Duration::ZERO,
        ..Default::default()
    };
    let report = run_job(source, options, output_dir).await;
    report_outcome(&report, args.json)
}

pub async fn run_orgs(args: OrgsArgs) -> Result<()> {
    let config = ExportConfig::load();
    let client = build_client(&args.session, &config)?;
    let orgs = client
        .organizations()
        .await
        .context("failed to list organizations")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&orgs)?);
    } else if orgs.is_empty() {
        println!("No organizations found");
    } else {
        for org in orgs {
            println!("{}  {}", org.uuid, org.name.unwrap_or_default());
        }
    }
    Ok(())
}

fn build_client(session: &SessionArgs, config: &ExportConfig) -> Result<ClaudeClient> {
    let key = session
        .session_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            anyhow!("no session key: pass --session-key or set {SESSION_KEY_ENV}")
        })?;
    let base_url = session
        .base_url
        .clone()
        .unwrap_or_else(|| config.remote.base_url.clone());

    ClaudeClient::new(base_url, key, &config.remote.user_agent)
        .context("failed to build HTTP client")
}

async fn run_job<S: RemoteSource>(
    source: S,
    options: ExportOptions,
    output_dir: PathBuf,
) -> ExportReport {
    let progress = BarProgress::new();
    let bar = progress.handle();

    let report = ExportJob::new(
        source,
        ZipArchiveSink::new(),
        Box::new(progress),
        Box::new(FileDownloader::new(output_dir)),
    )
    .with_options(options)
    .run()
    .await;

    ui::finish(bar);
    report
}

fn report_outcome(report: &ExportReport, json: bool) -> Result<()> {
    for failure in report.failures() {
        if let Err(err) = &failure.result {
            warn!(conversation = %failure.name, "skipped: {}", err);
        }
    }

    let result = &report.result;
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else if result.succeeded {
        println!(
            "✓ Exported {} artifact(s) from {} of {} conversation(s)",
            result.artifact_count,
            result.conversations_with_artifacts_count,
            result.total_conversations
        );
        if let Some(path) = &result.saved_to {
            println!("  saved to {}", path.display());
        }
    }

    if !result.succeeded {
        bail!(
            "export failed: {}",
            result.error_message.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}
