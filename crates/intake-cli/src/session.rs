//! # Session Subcommands
//!
//! - `chat`: bootstrap a session and converse line by line.
//! - `status`: print the completion snapshot.
//! - `logout`: forget the locally anchored session.

use std::io::Write;

use anyhow::{bail, Result};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};

use intake_core::{DocumentRecommendationsResponse, Locale, UserMessage};
use intake_session::{GateOutcome, SessionError, SessionManager};

use crate::context::CliContext;

/// Command typed at the chat prompt to leave the loop.
pub const QUIT_COMMAND: &str = "/quit";

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Send a single message and exit instead of reading stdin.
    #[arg(long)]
    pub message: Option<String>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {}

#[derive(Args, Debug)]
pub struct LogoutArgs {}

fn render_error(err: &SessionError, ctx: &CliContext) -> String {
    if err.is_network() {
        UserMessage::ConnectionFailed {
            base_url: ctx.api.base_url.to_string(),
        }
        .render(ctx.locale)
    } else {
        err.user_message().render(ctx.locale)
    }
}

async fn bootstrap(manager: &SessionManager, ctx: &CliContext) -> Result<()> {
    match manager.bootstrap(ctx.user_id.clone()).await {
        Ok(session_id) => {
            tracing::info!(%session_id, "session ready");
            Ok(())
        }
        Err(err) => bail!("{}: {err}", render_error(&err, ctx)),
    }
}

pub fn print_checklist(response: &DocumentRecommendationsResponse, locale: Locale) {
    let heading = match locale {
        Locale::PtBr => "Documentos recomendados",
        Locale::En => "Recommended documents",
    };
    println!("{heading} ({}):", response.recommendations.len());
    for rec in response.prioritized() {
        let marker = if rec.is_mandatory { "*" } else { " " };
        println!(
            "  {marker} [{}] {} ({}) key={} id={}",
            rec.priority, rec.name, rec.category, rec.document_key, rec.recommendation_id
        );
    }
}

async fn show_checklist(manager: &SessionManager, ctx: &CliContext) {
    match manager.fetch_recommendations().await {
        Ok(GateOutcome::Loaded(_)) => {
            if let Some(response) = manager.recommendations() {
                print_checklist(&response, ctx.locale);
            }
        }
        Ok(GateOutcome::NotReady) => {
            println!("{}", UserMessage::NotReadyForDocuments.render(ctx.locale));
        }
        Ok(GateOutcome::Skipped) => {}
        Err(err) => eprintln!("{}", render_error(&err, ctx)),
    }
}

/// Send one line and print the reply. Returns `false` when the send failed.
///
/// Every turn taken with the gate open asks for the checklist again, so a
/// fetch the server refused as not ready is retried on the next turn.
pub async fn exchange(manager: &SessionManager, ctx: &CliContext, line: &str) -> bool {
    match manager.send_message(line).await {
        Ok(outcome) => {
            println!("< {}", outcome.reply);
            tracing::debug!(
                completion = outcome.completion_percentage,
                is_complete = outcome.is_complete,
                "reply received"
            );
            if outcome.became_ready {
                println!("{}", UserMessage::ReadyForDocuments.render(ctx.locale));
            }
            if outcome.ready_for_documents {
                show_checklist(manager, ctx).await;
            }
            true
        }
        Err(err) => {
            eprintln!("{}", render_error(&err, ctx));
            false
        }
    }
}

pub async fn run_chat(args: &ChatArgs, ctx: &CliContext) -> Result<u8> {
    let manager = ctx.session_manager()?;
    bootstrap(&manager, ctx).await?;

    for message in manager.messages() {
        let prefix = match message.role {
            intake_core::Role::User => ">",
            intake_core::Role::Assistant => "<",
        };
        println!("{prefix} {}", message.content);
    }
    if manager.is_ready_for_documents() {
        show_checklist(&manager, ctx).await;
    }

    if let Some(message) = &args.message {
        return Ok(if exchange(&manager, ctx, message).await { 0 } else { 1 });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line == QUIT_COMMAND {
            break;
        }
        if line.is_empty() {
            continue;
        }
        exchange(&manager, ctx, line).await;
    }
    Ok(0)
}

pub async fn run_status(_args: &StatusArgs, ctx: &CliContext) -> Result<u8> {
    let manager = ctx.session_manager()?;
    bootstrap(&manager, ctx).await?;

    let status = match manager.completion_status().await {
        Ok(status) => status,
        Err(err) => bail!("{}", render_error(&err, ctx)),
    };

    println!("session:   {}", status.session_id);
    println!("complete:  {}", status.is_complete);
    println!("progress:  {:.0}%", status.completion_percentage * 100.0);
    println!("personal:  {:.0}%", status.sections.personal_completion * 100.0);
    println!("family:    {:.0}%", status.sections.family_completion * 100.0);
    println!("assets:    {:.0}%", status.sections.assets_completion * 100.0);
    println!("goals:     {:.0}%", status.sections.goals_completion * 100.0);
    println!("documents: {}", manager.is_ready_for_documents());
    Ok(0)
}

pub async fn run_logout(_args: &LogoutArgs, ctx: &CliContext) -> Result<u8> {
    let manager = ctx.session_manager()?;
    if let Err(err) = manager.logout().await {
        bail!("clearing session anchor: {err}");
    }
    tracing::info!(anchor = %ctx.anchor.display(), "session anchor cleared");
    Ok(0)
}
