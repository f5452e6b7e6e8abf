//! # intake CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use intake_cli::documents::{
    run_documents, run_download, run_upload, DocumentsArgs, DownloadArgs, UploadArgs,
};
use intake_cli::session::{run_chat, run_logout, run_status, ChatArgs, LogoutArgs, StatusArgs};
use intake_cli::CliContext;

/// Client intake front end.
///
/// Converses with the intake backend to build the client profile, then
/// hands the requested documents over to the document store.
#[derive(Parser, Debug)]
#[command(name = "intake", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Session backend base URL. Overrides `INTAKE_API_URL`.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Authenticated user id. Overrides `INTAKE_USER_ID`. Anonymous when absent.
    #[arg(long, global = true)]
    user_id: Option<String>,

    /// File holding the anchored session id.
    #[arg(long, global = true)]
    anchor_file: Option<PathBuf>,

    /// Message locale (`pt-BR` or `en`).
    #[arg(long, global = true)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Converse with the intake assistant. Type /quit to leave.
    Chat(ChatArgs),

    /// Show the completion snapshot of the current session.
    Status(StatusArgs),

    /// List checklist lines with their upload status.
    Documents(DocumentsArgs),

    /// Upload a file against a checklist line.
    Upload(UploadArgs),

    /// Download a stored document you own.
    Download(DownloadArgs),

    /// Forget the locally anchored session.
    Logout(LogoutArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = match CliContext::resolve(
        cli.api_url.as_deref(),
        cli.user_id.as_deref(),
        cli.anchor_file.clone(),
        cli.locale.as_deref(),
    ) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    tracing::debug!(api = %ctx.api.base_url, anchor = %ctx.anchor.display(), "intake CLI starting");

    let result = match &cli.command {
        Commands::Chat(args) => run_chat(args, &ctx).await,
        Commands::Status(args) => run_status(args, &ctx).await,
        Commands::Documents(args) => run_documents(args, &ctx).await,
        Commands::Upload(args) => run_upload(args, &ctx).await,
        Commands::Download(args) => run_download(args, &ctx).await,
        Commands::Logout(args) => run_logout(args, &ctx).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
