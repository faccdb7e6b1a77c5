mod error;

use crate::error::{ErrorKind, Result};
use clap::{Parser, Subcommand};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vista_bridge::message::{DIGEST, INIT, READY};
use vista_bridge::{ChannelSurface, DigestBody, Message};
use vista_config::Config;
use vista_digest::{DigestRow, ZWS};
use vista_preview::{ActiveResource, AssetEditor, AssetViewer, Command, Host, Workbench};
use vista_storage::backend::{LocalBackend, ReadOnlyBackend};
use vista_storage::{AssetUri, AssociationStore, BackendHandle, JsonAssociations, pattern_for};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the digest of an asset file
    Digest {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the raw digest message instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the message a viewer would be initialized with
    View {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Present the asset as non-editable
        #[arg(long)]
        read_only: bool,
    },
    /// Choose which editor opens an extension by default
    Associate {
        /// Extension, with or without the leading dot
        #[arg(value_name = "EXT")]
        extension: String,

        /// Open in the text editor
        #[arg(long, conflicts_with = "digest")]
        text: bool,

        /// Open in the digest editor
        #[arg(long)]
        digest: bool,
    },
}

/// Commands issued from a surface have nowhere to go on the command line.
struct LoggingWorkbench;

impl Workbench for LoggingWorkbench {
    fn execute(&self, command: Command) -> vista_preview::error::Result<()> {
        info!(%command, "ignoring host command");
        Ok(())
    }

    fn reveal_viewer(&self) -> vista_preview::error::Result<()> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match cli.command {
        Commands::Digest { file, json } => digest(&config, &file, json).await,
        Commands::View { file, read_only } => view(&config, &file, read_only).await,
        Commands::Associate { extension, text, digest } => {
            let update = match (text, digest) {
                (false, false) => None,
                (text, _) => Some(text),
            };
            associate(&config, &extension, update).await
        },
    }
}

/// A backend rooted at the file's directory, and the file's absolute path.
fn backend_for(file: &Path) -> Result<(BackendHandle, PathBuf)> {
    let file = std::path::absolute(file).or_raise(|| ErrorKind::Storage(file.to_path_buf()))?;
    let root = file.parent().unwrap_or(Path::new("/"));
    let backend = LocalBackend::new("cli", root).or_raise(|| ErrorKind::Storage(root.to_path_buf()))?;
    Ok((Arc::new(backend), file))
}

fn associations(config: &Config) -> Result<Arc<JsonAssociations>> {
    let cwd = std::env::current_dir().or_raise(|| ErrorKind::Storage(PathBuf::from(".")))?;
    let backend = LocalBackend::new("workspace", &cwd).or_raise(|| ErrorKind::Storage(cwd.clone()))?;
    Ok(Arc::new(JsonAssociations::new(Arc::new(backend), &config.associations.file)))
}

async fn digest(config: &Config, file: &Path, json: bool) -> Result<()> {
    let (backend, path) = backend_for(file)?;
    let (doc, scan) = AssetEditor::open_document(AssetUri::file(&path), backend, config.extensions.clone())
        .or_raise(|| ErrorKind::Digest(path.clone()))?;

    let (surface, mut inbox) = ChannelSurface::new();
    let host = Host {
        workbench: Arc::new(LoggingWorkbench),
        associations: associations(config)?,
        active: ActiveResource::new(),
    };
    let editor = AssetEditor::resolve(doc, Arc::new(surface), host, config).await;
    editor.bridge().receive(Message::new(READY));

    let outcome = scan.await.or_raise(|| ErrorKind::Digest(path.clone()))?;
    outcome.or_raise(|| ErrorKind::Digest(path.clone()))?;
    editor.dispose();

    let mut last = None;
    while let Ok(message) = inbox.try_recv() {
        if message.is(DIGEST) {
            last = Some(message);
        }
    }
    let Some(message) = last else {
        exn::bail!(ErrorKind::Digest(path));
    };
    if json {
        println!("{}", message.body);
        return Ok(());
    }
    let body: DigestBody = serde_json::from_value(message.body).or_raise(|| ErrorKind::Digest(path.clone()))?;
    print!("{}", render_table(&body.digest));
    Ok(())
}

async fn view(config: &Config, file: &Path, read_only: bool) -> Result<()> {
    let (backend, path) = backend_for(file)?;
    let backend: BackendHandle = match read_only {
        true => Arc::new(ReadOnlyBackend::new(backend)),
        false => backend,
    };
    let (surface, mut inbox) = ChannelSurface::new();
    let viewer = AssetViewer::resolve(Arc::new(surface), backend, Arc::new(LoggingWorkbench));
    let uri = AssetUri::file(&path);
    let extension = uri.extension();
    if !viewer
        .open_if_supported(uri, &config.extensions)
        .or_raise(|| ErrorKind::Storage(path.clone()))?
    {
        exn::bail!(ErrorKind::Unsupported(extension));
    }
    viewer.bridge().receive(Message::new(READY));
    viewer.dispose();
    while let Ok(message) = inbox.try_recv() {
        if message.is(INIT) {
            println!("{}", message.body);
        }
    }
    Ok(())
}

/// Print the editor associated with `extension`, or switch it when
/// `text` is given.
async fn associate(config: &Config, extension: &str, text: Option<bool>) -> Result<()> {
    let extension = match extension.starts_with('.') {
        true => extension.to_lowercase(),
        false => format!(".{}", extension.to_lowercase()),
    };
    if !config.extensions.is_recognized(&extension) {
        exn::bail!(ErrorKind::Unsupported(extension));
    }
    let store = associations(config)?;
    let Some(text) = text else {
        let current = store.get(&pattern_for(&extension)).await.or_raise(|| ErrorKind::Association)?;
        println!("{}", current.as_deref().unwrap_or(&config.editor.id));
        return Ok(());
    };
    vista_preview::set_open_as_text_by_default(store.as_ref(), &config.editor, &extension, text)
        .await
        .or_raise(|| ErrorKind::Association)?;
    info!(%extension, text, "updated default editor");
    Ok(())
}

/// Two aligned columns, with the zero-width break hints removed.
fn render_table(rows: &[DigestRow]) -> String {
    let width = rows.iter().map(|row| row.label.chars().count()).max().unwrap_or(0);
    rows.iter()
        .map(|row| format!("{:<width$}  {}\n", row.label, row.value.replace(ZWS, "")))
        .collect()
}
