use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pdf_builder::{
    BuilderEvent, BuilderOptions, BuilderSession, DropEvent, Envelope, FormSchema, HttpTransport,
    InputEvent, UploadFile, UploadOutcome,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

#[derive(Parser)]
#[command(
    name = "pdfbuilder",
    about = "Place form fields onto PDF documents",
    version,
    author
)]
struct Cli {
    /// Builder options file (JSON with pdfServer, attachMode, skipInit)
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the field types available in the sidebar
    Fields,

    /// Drag a field onto the document and drop it at an offset
    Place {
        /// Form schema file
        #[arg(short, long)]
        form: PathBuf,

        /// Field type to drop (e.g. textfield, signature)
        #[arg(short = 't', long = "type")]
        field_type: String,

        /// Horizontal drop offset
        #[arg(short, long, allow_negative_numbers = true)]
        x: f64,

        /// Vertical drop offset
        #[arg(short, long, allow_negative_numbers = true)]
        y: f64,

        /// Key of the container to add the field to
        #[arg(short, long)]
        container: Option<String>,

        /// Output file for the updated schema (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replay recorded input events and viewer messages against a form
    Replay {
        /// Form schema file
        #[arg(short, long)]
        form: PathBuf,

        /// JSON lines file, one input event or viewer message per line
        #[arg(short, long)]
        events: PathBuf,

        /// Output file for the final schema (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload a PDF to the configured PDF server
    Upload {
        /// PDF file to upload
        file: PathBuf,

        /// Upload endpoint, overrides pdfServer from the options file
        #[arg(short, long)]
        server: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_builder=info,pdfbuilder=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = match &cli.options {
        Some(path) => BuilderOptions::from_json_file(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => BuilderOptions::new(),
    };

    match cli.command {
        Commands::Fields => {
            let session = BuilderSession::new(options);
            let registry = session.registry();
            for group in registry.groups() {
                println!("{} ({})", group.title, group.key);
                for field_type in &group.components {
                    let label = registry
                        .template(field_type)
                        .and_then(|template| template.label.as_deref())
                        .unwrap_or_default();
                    println!("  {field_type:<12} {label}");
                }
            }
        }

        Commands::Place {
            form,
            field_type,
            x,
            y,
            container,
            output,
        } => {
            if !x.is_finite() || !y.is_finite() {
                bail!("Drop offset must be a finite number, got ({x}, {y})");
            }
            let mut session = open_session(options, &form)?;
            if !session.has_pdf() {
                bail!("Form has no PDF attached; upload one first");
            }
            session.attach();
            session.select_container(container.as_deref())?;

            session.on_drag_start(&field_type);
            session.on_dropzone_drop(DropEvent::on_dropzone(x, y));
            let node = session
                .on_drag_end(Some(&field_type))?
                .context("Drop was not recorded")?;

            info!(key = %node.key, "field placed");
            write_form(session.form(), output.as_deref())?;
            if output.is_some() {
                println!("Placed {} ({}) at ({x}, {y})", node.key, node.component_type);
            }
        }

        Commands::Replay {
            form,
            events,
            output,
        } => {
            let mut session = open_session(options, &form)?;
            session.attach();
            let mut listener = session.subscribe();

            let script = fs::read_to_string(&events)
                .with_context(|| format!("Failed to read {}", events.display()))?;
            for (index, line) in script.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let value: Value = serde_json::from_str(line)
                    .with_context(|| format!("Line {}: invalid JSON", index + 1))?;
                replay_line(&mut session, value)
                    .with_context(|| format!("Line {}", index + 1))?;
                print_events(&mut listener);
            }

            write_form(session.form(), output.as_deref())?;
        }

        Commands::Upload { file, server } => {
            let options = match server {
                Some(server) => options.with_pdf_server(server),
                None => options,
            };
            let mut session = BuilderSession::new(options);
            session.attach();

            let upload = UploadFile::from_path(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let transport = HttpTransport::new();
            match session.upload(&transport, &upload).await {
                UploadOutcome::Uploaded(Some(pdf)) => {
                    println!("{}", serde_json::to_string_pretty(&pdf)?);
                }
                UploadOutcome::Uploaded(None) => {
                    println!("Uploaded {}", upload.name);
                }
                UploadOutcome::NotConfigured
                | UploadOutcome::Rejected { .. }
                | UploadOutcome::Failed => {
                    bail!("{}", session.upload_panel().error_text());
                }
            }
        }
    }

    Ok(())
}

fn open_session(options: BuilderOptions, form_path: &Path) -> Result<BuilderSession> {
    let content = fs::read_to_string(form_path)
        .with_context(|| format!("Failed to read {}", form_path.display()))?;
    let form: FormSchema = serde_json::from_str(&content)
        .with_context(|| format!("Invalid form schema in {}", form_path.display()))?;

    let mut session = BuilderSession::new(options);
    session.set_form(form)?;
    Ok(session)
}

/// Lines are either `{"input": <event>}` or a `{name, data}` viewer message
fn replay_line(session: &mut BuilderSession, mut value: Value) -> Result<()> {
    if let Some(input) = value.get_mut("input").map(Value::take) {
        let event: InputEvent = serde_json::from_value(input)?;
        debug!(?event, "input");
        session.handle_input(event)?;
        return Ok(());
    }

    let envelope: Envelope = serde_json::from_value(value)?;
    debug!(message = %envelope.name, "viewer message");
    session.handle_envelope(envelope);
    Ok(())
}

fn print_events(listener: &mut UnboundedReceiver<BuilderEvent>) {
    while let Ok(event) = listener.try_recv() {
        match &event {
            BuilderEvent::AddComponent(node) | BuilderEvent::UpdateComponent(node) => {
                eprintln!("{} {}", event.name(), node.key);
            }
            BuilderEvent::Change(form) => {
                eprintln!("{} ({} components)", event.name(), form.component_count());
            }
        }
    }
}

fn write_form(form: &FormSchema, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(form)?;
    match output {
        Some(path) => fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
