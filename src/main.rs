use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

use lurecheck::config::Config;
use lurecheck::features;
use lurecheck::model::{self, ActiveModel, LogisticModel, TrainOptions};
use lurecheck::output::terminal;
use lurecheck::store::{CsvStore, DatasetStore, FeedbackLog, LabeledRecord};
use lurecheck::web;

/// Lurecheck: lexical phishing URL detection.
///
/// Extracts twenty lexical features from a URL string and classifies it as
/// phishing or legitimate with a locally trained model. No network lookups,
/// no page fetches.
#[derive(Parser)]
#[command(name = "lurecheck", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the training dataset and feedback log files
    Init,

    /// Train a model from the dataset and save it
    Train {
        /// Seed for the train/test shuffle (default: LURECHECK_TRAIN_SEED)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Classify a URL with the saved model
    Check {
        /// The URL to classify
        url: String,

        /// Also print the full extracted feature vector
        #[arg(long)]
        features: bool,
    },

    /// Featurize a URL and append it to the training dataset
    Add {
        /// The URL to add
        url: String,

        /// Its label: phishing/1 or legitimate/0
        #[arg(value_parser = parse_label)]
        label: u8,
    },

    /// Record a user-asserted label in the feedback log
    Feedback {
        /// The URL the feedback is about
        url: String,

        /// Its label: phishing/1 or legitimate/0
        #[arg(value_parser = parse_label)]
        label: u8,
    },

    /// Merge the feedback log into the training dataset
    MergeFeedback,

    /// Start the web server (prediction + admin API)
    Serve {
        /// Port to listen on (default: 3000)
        #[arg(long, default_value = "3000")]
        port: u16,

        /// Address to bind (default: 127.0.0.1)
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },

    /// Show dataset, feedback, and model status
    Status,
}

/// Accepts "phishing"/"1" and "legitimate"/"0" (case-insensitive).
fn parse_label(raw: &str) -> Result<u8, String> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "phishing" | "phish" => Ok(1),
        "0" | "legitimate" | "legit" => Ok(0),
        other => Err(format!(
            "label must be phishing/1 or legitimate/0, got {other:?}"
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lurecheck=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            let store = CsvStore::new(&config.dataset_path);
            store.ensure_initialized().await?;
            let feedback = FeedbackLog::new(&config.feedback_path);
            feedback.ensure_initialized().await?;

            println!("Dataset: {}", config.dataset_path.display());
            println!("Feedback log: {}", config.feedback_path.display());
            println!("\nLurecheck is ready. Next steps:");
            println!("  lurecheck add <url> <label>   (build up the dataset)");
            println!("  lurecheck train               (fit and save a model)");
        }

        Commands::Train { seed } => {
            let store = CsvStore::new(&config.dataset_path);
            let records = store.load_all().await?;
            info!(rows = records.len(), "Loaded training dataset");

            let opts = TrainOptions {
                seed: seed.unwrap_or(config.train_seed),
                ..TrainOptions::default()
            };
            let (trained, report) = model::fit(&records, &opts)?;
            trained.save(&config.model_path)?;

            terminal::display_train_report(&report);
            println!("Model saved to: {}", config.model_path.display());
        }

        Commands::Check {
            url,
            features: show_features,
        } => {
            if !config.model_path.exists() {
                anyhow::bail!(
                    "no model at {} — run `lurecheck train` first",
                    config.model_path.display()
                );
            }
            let trained = LogisticModel::load(&config.model_path)?;
            let verdict = model::classify(&trained, &url);
            terminal::display_verdict(&url, &verdict);

            if show_features {
                let vector = features::extract(&url);
                terminal::display_features(&url, &vector);
            }
        }

        Commands::Add { url, label } => {
            let store = CsvStore::new(&config.dataset_path);
            store.append(&LabeledRecord::from_url(&url, label)).await?;
            let rows = store.row_count().await?;
            println!(
                "Added {} as {} ({rows} rows total)",
                url,
                label_name(label)
            );
        }

        Commands::Feedback { url, label } => {
            let feedback = FeedbackLog::new(&config.feedback_path);
            feedback.append(&url, label).await?;
            println!("Recorded feedback: {} is {}", url, label_name(label));
            println!(
                "{}",
                "Feedback trains nothing until merged: lurecheck merge-feedback".dimmed()
            );
        }

        Commands::MergeFeedback => {
            let store = CsvStore::new(&config.dataset_path);
            store.ensure_initialized().await?;
            let feedback = FeedbackLog::new(&config.feedback_path);

            // Rows leave the log only once they are in the training store;
            // a failed append leaves the rest in place for a retry.
            let entries = feedback.read_all().await?;
            let mut merged = 0usize;
            let mut failure = None;
            for entry in &entries {
                match store
                    .append(&LabeledRecord::from_url(&entry.url, entry.label))
                    .await
                {
                    Ok(()) => merged += 1,
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }
            feedback.remove_first(merged).await?;
            if let Some(e) = failure {
                return Err(e.context(format!(
                    "merge stopped after {merged} rows; the rest are still in the feedback log"
                )));
            }

            println!("Merged {merged} feedback rows into the dataset");
            if merged > 0 {
                println!("{}", "Run `lurecheck train` to pick them up".dimmed());
            }
        }

        Commands::Serve { port, bind } => {
            config.require_web_auth()?;

            let store: Arc<dyn DatasetStore> = Arc::new(CsvStore::new(&config.dataset_path));
            store.ensure_initialized().await?;
            let feedback = Arc::new(FeedbackLog::new(&config.feedback_path));
            feedback.ensure_initialized().await?;

            let active = if config.model_path.exists() {
                let trained = LogisticModel::load(&config.model_path)?;
                info!(
                    trained_at = %trained.trained_at,
                    accuracy = trained.held_out_accuracy,
                    "Loaded model"
                );
                ActiveModel::with(trained)
            } else {
                warn!(
                    "No model at {} — /api/predict returns 503 until one is trained",
                    config.model_path.display()
                );
                ActiveModel::empty()
            };

            web::run_server(config, store, feedback, Arc::new(active), port, &bind).await?;
        }

        Commands::Status => {
            let store = CsvStore::new(&config.dataset_path);
            let feedback = FeedbackLog::new(&config.feedback_path);

            println!("\n{}", "=== Lurecheck Status ===".bold());
            println!("  Dataset rows: {}", store.row_count().await?);
            println!("  Feedback rows: {}", feedback.row_count().await?);

            if config.model_path.exists() {
                match LogisticModel::load(&config.model_path) {
                    Ok(m) => {
                        println!("  Model: {}", "loaded".green());
                        println!("    Trained at: {}", m.trained_at.to_rfc3339());
                        println!(
                            "    Held-out accuracy: {:.2}%",
                            m.held_out_accuracy * 100.0
                        );
                        println!("    Fitted on: {} rows", m.dataset_rows);
                    }
                    Err(e) => println!("  Model: {} ({e})", "unreadable".red()),
                }
            } else {
                println!("  Model: {}", "not trained".yellow());
            }
            println!();
        }
    }

    Ok(())
}

fn label_name(label: u8) -> &'static str {
    if label == 1 {
        "phishing"
    } else {
        "legitimate"
    }
}
