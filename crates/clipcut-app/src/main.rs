//! ClipCut - Long video to short clips, from the command line
//!
//! Submits a job, waits for the clips, optionally captions them and
//! finalizes the result.

mod args;
mod batch;
mod report;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clipcut_core::EditorConfig;
use clipcut_service::{HttpClipService, ServiceConfig};
use clipcut_timeline::ClipId;
use clipcut_workflow::{EditorSession, JobPhase};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::args::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = match Args::parse(std::env::args().skip(1))? {
        Some(args) => args,
        None => {
            println!("{}", args::USAGE);
            return Ok(());
        }
    };

    let config = EditorConfig::from_env().context("Invalid configuration")?;
    info!("ClipCut starting against {}", config.service_url);

    let service = HttpClipService::new(ServiceConfig::new(config.service_url.clone()))
        .context("Failed to build HTTP client")?;
    let mut session = EditorSession::new(config, Arc::new(service));

    session.submit(args.url.clone(), args.prompt.clone())?;
    match session.run_until_settled().await {
        JobPhase::Editing => {}
        JobPhase::Error => bail!(
            "Job failed: {}",
            session.error_message().unwrap_or("unknown error")
        ),
        phase => bail!("Job stopped in unexpected state {phase}"),
    }

    let Some(clips) = session.clips() else {
        bail!("Job finished without clips");
    };
    report::print_clips(clips);

    if args.captions {
        let ids: Vec<ClipId> = clips.iter().map(|c| c.id().clone()).collect();
        batch::generate_all(&mut session, &ids);
        session.run_until_idle().await;

        if args.apply_captions {
            let started = batch::apply_all(&mut session, &ids);
            info!(clips = started, "Burning in captions");
            session.run_until_idle().await;
        }

        if let Some(dir) = &args.srt_dir {
            if let Some(clips) = session.clips() {
                report::write_srt_files(clips, dir)?;
            }
        }
    }

    if args.finalize {
        session.finalize()?;
        match session.run_until_settled().await {
            JobPhase::Complete => {
                if let Some(finalized) = session.finalized() {
                    report::print_finalized(finalized);
                }
            }
            _ => {
                if let Some(recovered) = session.recovered_clips() {
                    warn!(clips = recovered.len(), "Edited clips kept for retry");
                }
                bail!(
                    "Finalize failed: {}",
                    session.error_message().unwrap_or("unknown error")
                );
            }
        }
    }

    Ok(())
}
