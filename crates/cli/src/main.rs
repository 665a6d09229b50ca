//! Article image CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: load `config.toml` and apply `GITHUB_*`
//!    environment overrides.
//! 2. **Wire observability**: configure `tracing-subscriber` with an
//!    `EnvFilter` and either a human-readable or a JSON layer. All `tracing`
//!    spans and events emitted by every crate in the workspace flow through it.
//! 3. **Construct infrastructure**: create the `GithubContentsClient`, the
//!    `JsonFileStore`, and the terminal presentation ports, and inject them into
//!    the domain components.
//! 4. **Dispatch** the selected subcommand.

mod settings;
mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use github::GithubContentsClient;
use media::{
    ArticleId, ArticleIdGenerator, ConfigStore, ConfigValidator, EditingSession,
    ImageLifecycleManager, LocalImageIndex, NotificationPort, NotificationRequest,
    PartialFailurePolicy,
};
use storage::JsonFileStore;
use tracing_subscriber::EnvFilter;

use crate::terminal::{ArgumentTitle, LoggedVisibility, TerminalNotifier};

#[derive(Debug, Parser)]
#[command(name = "article-images", version, about = "Manage article images stored in a GitHub repository")]
struct Cli {
    /// Configuration file (default: <config dir>/article-images/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Local image index file (default: <data dir>/article-images/index.json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check the token and repository settings against GitHub
    Validate,
    /// List the images recorded for an article
    List { article: String },
    /// Upload image files into an article's image directory
    Upload {
        article: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Delete one image of an article
    Delete {
        article: String,
        filename: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Delete every image of an article
    Purge {
        article: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
        /// Forget images whose remote delete failed instead of keeping them
        #[arg(long)]
        clear_failed: bool,
    },
    /// Generate an identifier for a new article
    NewId {
        #[arg(long)]
        title: Option<String>,
    },
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(err) = installed {
        eprintln!("warning: logging not initialised: {err}");
    }
}

struct App {
    config: ConfigStore,
    notifier: Arc<dyn NotificationPort>,
    remote: Arc<GithubContentsClient>,
    index: LocalImageIndex,
}

impl App {
    async fn build(cli: &Cli) -> Result<Self> {
        let config = ConfigStore::new(settings::load(cli.config.as_deref())?);
        let remote = Arc::new(
            GithubContentsClient::with_api_base(&settings::api_base())
                .context("Failed to create GitHub client")?,
        );
        let store_path = match &cli.store {
            Some(path) => path.clone(),
            None => settings::default_store_path()?,
        };
        let store = JsonFileStore::open(&store_path)
            .await
            .with_context(|| format!("Failed to open image index: {}", store_path.display()))?;
        Ok(Self {
            config,
            notifier: Arc::new(TerminalNotifier::new()),
            remote,
            index: LocalImageIndex::new(Arc::new(store)),
        })
    }

    fn manager(&self) -> ImageLifecycleManager {
        ImageLifecycleManager::new(
            self.config.clone(),
            self.remote.clone(),
            self.index.clone(),
            Arc::clone(&self.notifier),
        )
    }

    fn validator(&self) -> ConfigValidator {
        ConfigValidator::new(
            self.config.clone(),
            self.remote.clone(),
            Arc::clone(&self.notifier),
            Arc::new(LoggedVisibility),
        )
    }
}

fn article_id(raw: &str) -> Result<ArticleId> {
    ArticleId::new(raw).context("Article id must not be empty")
}

async fn run(cli: Cli) -> Result<ExitCode> {
    if let Command::NewId { title } = &cli.command {
        let generator = ArticleIdGenerator::new(Arc::new(ArgumentTitle(title.clone())));
        println!("{}", generator.generate_article_id());
        return Ok(ExitCode::SUCCESS);
    }

    let app = App::build(&cli).await?;

    match cli.command {
        Command::Validate => Ok(if app.validator().validate().await {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }),

        Command::List { article } => {
            let article = article_id(&article)?;
            let images = app.index.list_images(&article).await?;
            if images.is_empty() {
                println!("No images recorded for {article}");
            }
            for image in images {
                println!("{}\t{}\t{}", image.filename, image.sha, image.url);
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Upload { article, files } => {
            let article = article_id(&article)?;
            let manager = app.manager();
            let mut session = EditingSession::new(article.clone());
            let mut failures = 0usize;

            for file in files {
                let Some(filename) = file.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                    bail!("Not a file path: {}", file.display());
                };
                if session.has_upload(&filename) {
                    tracing::warn!(%filename, "Skipping repeated file name");
                    continue;
                }
                let content = tokio::fs::read(&file)
                    .await
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                match manager.upload_image(&article, &filename, &content).await {
                    Ok(record) => {
                        app.notifier
                            .notify(NotificationRequest::success(format!("Uploaded {filename}: {}", record.url)));
                        session.record_upload(record);
                    }
                    Err(err) => {
                        failures += 1;
                        app.notifier
                            .notify(NotificationRequest::error(format!("Failed to upload {filename}: {err}")));
                    }
                }
            }

            tracing::info!(uploaded = session.upload_count(), failed = failures, "Upload finished");
            Ok(if failures == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Command::Delete {
            article,
            filename,
            yes,
        } => {
            let article = article_id(&article)?;
            let record = app
                .index
                .list_images(&article)
                .await?
                .into_iter()
                .find(|r| r.filename == filename)
                .with_context(|| format!("No image named {filename} recorded for {article}"))?;
            let manager = app.manager();

            let result = if yes {
                manager
                    .delete_single_image_from_github(&article, &record.filename, &record.sha)
                    .await
                    .map(|_| true)
            } else {
                manager
                    .confirm_and_delete_image(&article, &record.filename, &record.sha)
                    .await
            };
            match result {
                Ok(true) => {
                    app.notifier
                        .notify(NotificationRequest::success(format!("Deleted {filename}")));
                    Ok(ExitCode::SUCCESS)
                }
                Ok(false) => Ok(ExitCode::SUCCESS),
                Err(err) => {
                    app.notifier.notify(NotificationRequest::error(err.to_string()));
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::Purge {
            article,
            yes,
            clear_failed,
        } => {
            let article = article_id(&article)?;
            let policy = if clear_failed {
                PartialFailurePolicy::ClearAll
            } else {
                PartialFailurePolicy::RetainFailed
            };
            let manager = app.manager().with_partial_failure_policy(policy);

            let summary = if yes {
                Some(manager.delete_article_images(&article).await?)
            } else {
                manager.confirm_and_delete_article_images(&article).await?
            };
            Ok(match summary {
                Some(summary) if !summary.is_complete() => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            })
        }

        Command::NewId { .. } => Ok(ExitCode::SUCCESS),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "Command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
