//! # Etiket CLI
//!
//! Command-line front end for the label backend.
//!
//! ## Usage
//!
//! ```bash
//! # Check that the backend is up
//! etiket health
//!
//! # Dump the stored composition to a layout file
//! etiket pull --out layout.json
//!
//! # Render a layout and save the bitmap
//! etiket preview --layout layout.json --out preview.bmp
//!
//! # Embed an image into icon entry 3 of a layout
//! etiket icon --layout layout.json --id 3 --image logo.png
//!
//! # Save and print
//! etiket push --layout layout.json
//! etiket print --layout layout.json
//! ```
//!
//! The backend address comes from `--backend` or `ETIKET_BACKEND_URL`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use etiket::{
    CompositionClient, EtiketError, Session, Snapshot,
    config::{BACKEND_URL_ENV, ClientConfig, DEFAULT_BACKEND_URL},
    ingest::{self, Ingestor},
    model::{EntryId, LabelSettings},
};

/// Etiket - label composer client
#[derive(Parser, Debug)]
#[command(name = "etiket")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = BACKEND_URL_ENV, default_value = DEFAULT_BACKEND_URL)]
    backend: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show backend health
    Health,

    /// Load the stored composition and label settings
    Pull {
        /// Write the layout to FILE instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Render a composition and save the bitmap
    Preview {
        /// Layout file (defaults to the composition stored on the backend)
        #[arg(long, value_name = "FILE")]
        layout: Option<PathBuf>,

        /// Where to write the decoded bitmap
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },

    /// Save a layout file on the backend
    Push {
        #[arg(long, value_name = "FILE")]
        layout: PathBuf,
    },

    /// Print a composition
    Print {
        /// Layout file (defaults to the composition stored on the backend)
        #[arg(long, value_name = "FILE")]
        layout: Option<PathBuf>,
    },

    /// Embed an image into an icon entry of a layout file
    Icon {
        #[arg(long, value_name = "FILE")]
        layout: PathBuf,

        /// Icon entry id
        #[arg(long)]
        id: String,

        /// Image file path or http(s) URL
        #[arg(long, value_name = "PATH_OR_URL")]
        image: String,

        /// Reject files that are not a recognised image format
        #[arg(long)]
        validate: bool,
    },

    /// Show the backend's printer settings
    PrinterSettings,
}

/// On-disk layout: label settings plus the three entry collections.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LayoutFile {
    #[serde(default)]
    settings: LabelSettings,
    #[serde(flatten)]
    entries: Snapshot,
}

impl LayoutFile {
    fn read(path: &Path) -> Result<Self, EtiketError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn from_session(session: &Session) -> Self {
        Self {
            settings: session.settings().clone(),
            entries: session.snapshot(),
        }
    }

    fn write(&self, path: Option<&Path>) -> Result<(), EtiketError> {
        let json = serde_json::to_string_pretty(self)?;
        match path {
            Some(path) => std::fs::write(path, json + "\n")?,
            None => println!("{}", json),
        }
        Ok(())
    }

    fn into_session(self) -> Session {
        Session::with_composition(self.entries, self.settings)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), EtiketError> {
    let cli = Cli::parse();
    let client = CompositionClient::new(ClientConfig::new(&cli.backend)?)?;

    match cli.command {
        Commands::Health => {
            let health = client.health().await?;
            println!("status:  {}", health.status);
            println!("version: {}", health.version);
            println!("time:    {}", health.timestamp);
        }

        Commands::Pull { out } => {
            let mut session = Session::new();
            let result = session.load_all(&client).await;
            print_notices(&mut session);
            result?;
            LayoutFile::from_session(&session).write(out.as_deref())?;
            if let Some(path) = out {
                println!("Saved to {}", path.display());
                print_label_size(session.settings());
            }
        }

        Commands::Preview { layout, out } => {
            let mut session = open_session(&client, layout.as_deref()).await?;
            let result = session.preview(&client).await.map(str::to_string);
            print_notices(&mut session);
            let bitmap = STANDARD
                .decode(result?)
                .map_err(|e| EtiketError::Config(format!("preview is not valid base64: {}", e)))?;
            std::fs::write(&out, bitmap)?;
            println!("Saved to {}", out.display());
        }

        Commands::Push { layout } => {
            let mut session = LayoutFile::read(&layout)?.into_session();
            let result = session.persist(&client).await;
            print_notices(&mut session);
            result?;
        }

        Commands::Print { layout } => {
            let mut session = open_session(&client, layout.as_deref()).await?;
            let missing = session.store().icons().iter().filter(|i| !i.has_image()).count();
            if missing > 0 {
                eprintln!("Warning: {} icon entries have no image", missing);
            }
            print_label_size(session.settings());
            println!("Printing {} entries...", session.snapshot().len());
            let result = session.print(&client).await;
            print_notices(&mut session);
            result?;
        }

        Commands::Icon {
            layout,
            id,
            image,
            validate,
        } => {
            let mut session = LayoutFile::read(&layout)?.into_session();
            let id = EntryId::from(id.as_str());
            let ingestor = if validate {
                Ingestor::validating()
            } else {
                Ingestor::new()
            };
            let source = ingest::source_for(&image, client.http());
            let updated = session.attach_icon(&id, source.as_ref(), &ingestor).await;
            print_notices(&mut session);
            if !updated? {
                return Err(EtiketError::Config(format!(
                    "no icon entry with id {} in {}",
                    id,
                    layout.display()
                )));
            }
            LayoutFile::from_session(&session).write(Some(&layout))?;
            println!("Updated {}", layout.display());
        }

        Commands::PrinterSettings => {
            let settings = client.printer_settings().await?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}

/// Session from a layout file, or loaded from the backend.
async fn open_session(
    client: &CompositionClient,
    layout: Option<&Path>,
) -> Result<Session, EtiketError> {
    match layout {
        Some(path) => Ok(LayoutFile::read(path)?.into_session()),
        None => {
            let mut session = Session::new();
            let result = session.load_all(client).await;
            print_notices(&mut session);
            result.map(|_| session)
        }
    }
}

fn print_label_size(settings: &LabelSettings) {
    let (w, h) = settings.size_dots();
    println!(
        "Label: {} x {} mm at {} dpi ({} x {} dots)",
        settings.width, settings.height, settings.dpi, w, h
    );
}

fn print_notices(session: &mut Session) {
    for notice in session.take_notices() {
        eprintln!("{}", notice);
    }
}
