mod display;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use proofbrief_core::poller::{PollError, PollerState, WatchSnapshot};
use proofbrief_core::submission::SubmissionProgress;
use proofbrief_core::{
    create_credential_provider, load_config, load_config_from_env, render_report,
    validate_config, Config, CredentialProvider, HttpRecordClient, HttpResultFetcher,
    HttpTransferClient, PresignedTransfer, Record, RecordApi, RecordError, RecordId, RecordStatus,
    ResultFetcher,
    ResumePayload, SanitizedConfig, StatusPoller, Subject, SubmissionOrchestrator,
    SubmissionRequest,
};

/// Config file used when neither `--config` nor `PROOFBRIEF_CONFIG` is set.
const DEFAULT_CONFIG: &str = "proofbrief.toml";

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

/// `watch` gives up after this many `NotFound` fetches in a row when the
/// brief was never seen.
const UNKNOWN_BRIEF_FETCHES: u32 = 3;

#[derive(Debug, Parser)]
#[command(
    name = "proofbrief",
    version,
    about = "Submit candidate briefs and follow their analysis"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, env = "PROOFBRIEF_CONFIG")]
    config: Option<PathBuf>,

    /// Print records as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a brief, upload both documents and start processing
    Submit {
        /// Candidate full name
        #[arg(long)]
        name: String,
        /// Job title
        #[arg(long)]
        title: String,
        /// Resume file (PDF)
        #[arg(long)]
        resume: PathBuf,
        /// Plain-text job description file
        #[arg(long = "job-description")]
        job_description: PathBuf,
        /// Follow the brief until it settles
        #[arg(long)]
        watch: bool,
        /// Retry a failed step this many times against the same brief
        #[arg(long, default_value_t = 0)]
        retries: u32,
    },
    /// Show the current state of a brief
    Status { id: String },
    /// Poll a brief until it settles, then print its result
    Watch { id: String },
    /// List your briefs, newest first
    List,
    /// Delete a brief
    Delete { id: String },
    /// Fetch and print the analysis of a finished brief
    #[command(name = "result")]
    Report { id: String },
    /// Print the effective configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output only.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load(cli.config.as_deref())?;

    if let Command::Config = cli.command {
        let sanitized = SanitizedConfig::from(&config);
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&sanitized)?);
        } else {
            print!("{}", toml::to_string_pretty(&sanitized)?);
        }
        return Ok(());
    }

    let app = App::new(config)?;

    match cli.command {
        Command::Submit {
            name,
            title,
            resume,
            job_description,
            watch,
            retries,
        } => {
            let id = app
                .submit(Subject::new(name, title), &resume, &job_description, retries)
                .await?;
            if watch {
                app.watch(&id, cli.json).await?;
            }
        }
        Command::Status { id } => app.status(&RecordId::new(id), cli.json).await?,
        Command::Watch { id } => app.watch(&RecordId::new(id), cli.json).await?,
        Command::List => app.list(cli.json).await?,
        Command::Delete { id } => app.delete(&RecordId::new(id)).await?,
        Command::Report { id } => app.report(&RecordId::new(id), cli.json).await?,
        Command::Config => {}
    }

    Ok(())
}

/// Load and validate configuration. A missing file falls back to env only.
fn load(config_path: Option<&Path>) -> Result<Config> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    let config = if path.exists() {
        info!("Loading configuration from {:?}", path);
        load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))?
    } else {
        info!(
            "No config file at {:?}, reading configuration from environment",
            path
        );
        load_config_from_env()
            .context("Failed to load configuration from environment (is PROOFBRIEF_API__BASE_URL set?)")?
    };

    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

/// Wired-up clients for one invocation.
struct App {
    config: Config,
    records: Arc<dyn RecordApi>,
    transfer: Arc<dyn PresignedTransfer>,
    results: HttpResultFetcher,
}

impl App {
    fn new(config: Config) -> Result<Self> {
        let credentials: Arc<dyn CredentialProvider> = Arc::from(
            create_credential_provider(&config.auth)
                .context("Failed to create credential provider")?,
        );
        info!("Using credential provider: {}", credentials.method_name());

        let records: Arc<dyn RecordApi> = Arc::new(
            HttpRecordClient::new(&config.api, credentials)
                .context("Failed to create brief API client")?,
        );
        let transfer: Arc<dyn PresignedTransfer> = Arc::new(
            HttpTransferClient::new(&config.api).context("Failed to create transfer client")?,
        );
        let results =
            HttpResultFetcher::new(&config.api).context("Failed to create result fetcher")?;

        Ok(Self {
            config,
            records,
            transfer,
            results,
        })
    }

    async fn submit(
        &self,
        subject: Subject,
        resume_path: &Path,
        job_description_path: &Path,
        retries: u32,
    ) -> Result<RecordId> {
        let resume = ResumePayload::from_path(resume_path)
            .await
            .with_context(|| format!("Failed to read resume {:?}", resume_path))?;
        let job_description = tokio::fs::read_to_string(job_description_path)
            .await
            .with_context(|| {
                format!("Failed to read job description {:?}", job_description_path)
            })?;
        let request = SubmissionRequest::new(subject, resume, job_description);

        let orchestrator =
            SubmissionOrchestrator::new(Arc::clone(&self.records), Arc::clone(&self.transfer))
                .with_progress_callback(Arc::new(|progress: &SubmissionProgress| {
                    println!("{}", display::progress_line(progress));
                }));

        let mut outcome = orchestrator.submit(request).await;
        let mut retries_left = retries;
        let id = loop {
            let err = match outcome {
                Ok(id) => break id,
                Err(err) => err,
            };
            if retries_left == 0 || !err.is_resumable() {
                return Err(display::submission_failure(err));
            }
            retries_left -= 1;
            warn!("{}; retrying ({} retries left)", err, retries_left);
            match err.into_pending() {
                Some(pending) => outcome = orchestrator.resume(pending).await,
                None => bail!("Submission cannot be resumed"),
            }
        };

        println!("Submitted brief {}", id);
        Ok(id)
    }

    async fn status(&self, id: &RecordId, json: bool) -> Result<()> {
        let record = self
            .records
            .get(id)
            .await
            .with_context(|| format!("Failed to fetch brief {}", id))?;
        if json {
            println!("{}", serde_json::to_string_pretty(&record)?);
        } else {
            println!("{}", display::record_card(&record));
        }
        Ok(())
    }

    async fn watch(&self, id: &RecordId, json: bool) -> Result<()> {
        let poller = StatusPoller::new(Arc::clone(&self.records), self.config.poller.clone());
        let subscription = poller.watch(id).await;
        let mut updates = Box::pin(subscription.updates());

        let mut last = None;
        loop {
            tokio::select! {
                update = updates.next() => match update {
                    Some(snapshot) => {
                        println!("{}", display::snapshot_line(&snapshot));
                        if is_unknown_brief(&snapshot) {
                            poller.cancel(id).await;
                            bail!(
                                "Brief {} was not found after {} fetches",
                                id,
                                snapshot.consecutive_failures
                            );
                        }
                        last = Some(snapshot);
                    }
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, cancelling watch on brief {}", id);
                    poller.cancel(id).await;
                    bail!("Watch on brief {} cancelled", id);
                }
            }
        }

        let Some(snapshot) = last else {
            bail!("Watch on brief {} ended without an update", id);
        };
        match (snapshot.state, snapshot.record) {
            (PollerState::Settled, Some(record)) if record.status == RecordStatus::Done => {
                self.print_result(&record, json).await
            }
            (PollerState::Settled, Some(record)) => {
                bail!("Brief {} finished with status {}", id, record.status)
            }
            (PollerState::TimedOut, _) => bail!(
                "Brief {} did not settle after {} fetches",
                id,
                snapshot.attempts
            ),
            (state, _) => bail!("Watch on brief {} ended: {}", id, state),
        }
    }

    async fn list(&self, json: bool) -> Result<()> {
        let summaries = self.records.list().await.context("Failed to list briefs")?;
        if json {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        } else {
            println!("{}", display::records_table(&summaries));
        }
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        let ack = self
            .records
            .delete(id)
            .await
            .with_context(|| format!("Failed to delete brief {}", id))?;
        match ack.message {
            Some(message) => println!("{}", message),
            None => println!("Deleted brief {}", id),
        }
        Ok(())
    }

    async fn report(&self, id: &RecordId, json: bool) -> Result<()> {
        let record = self
            .records
            .get(id)
            .await
            .with_context(|| format!("Failed to fetch brief {}", id))?;
        self.print_result(&record, json).await
    }

    async fn print_result(&self, record: &Record, json: bool) -> Result<()> {
        let result = self
            .results
            .fetch_for_record(record)
            .await
            .with_context(|| format!("No result for brief {}", record.id))?;
        if json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print!("{}", render_report(&result));
        }
        Ok(())
    }
}

/// Every fetch so far answered `NotFound` and no record was ever returned.
fn is_unknown_brief(snapshot: &WatchSnapshot) -> bool {
    let not_found = matches!(
        &snapshot.last_error,
        Some(PollError::FetchFailed { source, .. })
            if matches!(source.as_ref(), RecordError::NotFound(_))
    );
    not_found
        && snapshot.record.is_none()
        && snapshot.consecutive_failures >= UNKNOWN_BRIEF_FETCHES
}
