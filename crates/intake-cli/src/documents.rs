//! # Document Subcommands
//!
//! Operate on the document store configured through `INTAKE_STORE_URL` and
//! `INTAKE_STORE_KEY`. All of them require `--user-id`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;

use intake_core::{DocumentId, DocumentKey, Locale, RecommendationId, UploadStatus, UserMessage};
use intake_docs::{
    DocumentStore, HandoffPipeline, RetrievalGuard, SelectedFile, UploadError, UploadRequest,
};

use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct DocumentsArgs {}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Checklist line key (e.g. `matricula_imovel_1`).
    #[arg(long)]
    pub key: String,
    /// Recommendation id of the checklist line.
    #[arg(long)]
    pub recommendation: String,
    /// File to upload.
    #[arg(long)]
    pub file: PathBuf,
    /// MIME type, detected from the extension when omitted.
    #[arg(long)]
    pub mime_type: Option<String>,
    /// If the document is stored but the checklist update fails, try the
    /// checklist update once more.
    #[arg(long)]
    pub retry_status_sync: bool,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Identifier of the stored document.
    pub document_id: String,
    /// Where to write the file. Defaults to the stored file name.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

fn status_label(status: UploadStatus, locale: Locale) -> &'static str {
    match (locale, status) {
        (Locale::PtBr, UploadStatus::Pending) => "pendente",
        (Locale::PtBr, UploadStatus::Uploading) => "enviando",
        (Locale::PtBr, UploadStatus::Uploaded) => "enviado",
        (Locale::PtBr, UploadStatus::Error) => "erro",
        (Locale::En, UploadStatus::Pending) => "pending",
        (Locale::En, UploadStatus::Uploading) => "uploading",
        (Locale::En, UploadStatus::Uploaded) => "uploaded",
        (Locale::En, UploadStatus::Error) => "error",
    }
}

pub async fn run_documents(_args: &DocumentsArgs, ctx: &CliContext) -> Result<u8> {
    let user_id = ctx.require_user()?;
    let store = ctx.document_store()?;
    let lines = store
        .list_roadmap(&user_id)
        .await
        .context("listing the document checklist")?;

    let pipeline = HandoffPipeline::new(store);
    pipeline.reconcile(&lines);

    for line in &lines {
        let marker = if line.is_mandatory { "*" } else { " " };
        println!(
            "  {marker} {:<10} {} ({}) key={} id={}",
            status_label(pipeline.status(&line.document_key), ctx.locale),
            line.name,
            line.category,
            line.document_key,
            line.recommendation_id
        );
    }

    let progress = pipeline.progress(&lines);
    println!(
        "{}/{} ({}%)",
        progress.uploaded, progress.total, progress.percentage
    );
    for (category, counts) in &progress.by_category {
        println!("  {category}: {}/{}", counts.uploaded, counts.total);
    }
    Ok(0)
}

pub async fn run_upload(args: &UploadArgs, ctx: &CliContext) -> Result<u8> {
    let store: Arc<dyn DocumentStore> = ctx.document_store()?;
    let pipeline = HandoffPipeline::new(store);

    let mut file = SelectedFile::from_path(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;
    if let Some(mime) = &args.mime_type {
        file = file.with_mime_type(mime.clone());
    }

    let request = UploadRequest {
        user_id: ctx.user_id.clone(),
        file: Some(file),
        document_key: DocumentKey::new(args.key.clone()),
        recommendation_id: RecommendationId::parse(&args.recommendation),
    };

    match pipeline.submit(request).await {
        Ok(record) => {
            println!(
                "{}",
                UserMessage::UploadSucceeded {
                    file_name: record.file_name.clone()
                }
                .render(ctx.locale)
            );
            println!("document id: {}", record.id);
            Ok(0)
        }
        Err(err) => report_upload_failure(&pipeline, err, args.retry_status_sync, ctx).await,
    }
}

/// Exit code 1: nothing stored. Exit code 2: stored, checklist not updated.
async fn report_upload_failure(
    pipeline: &HandoffPipeline,
    err: UploadError,
    retry_status_sync: bool,
    ctx: &CliContext,
) -> Result<u8> {
    eprintln!("{}", err.user_message().render(ctx.locale));
    let Some(record) = err.stored_record() else {
        return Ok(1);
    };
    eprintln!("document id: {} (stored)", record.id);
    if !retry_status_sync {
        return Ok(2);
    }
    match pipeline.retry_status_sync(record).await {
        Ok(()) => {
            println!(
                "{}",
                UserMessage::UploadSucceeded {
                    file_name: record.file_name.clone()
                }
                .render(ctx.locale)
            );
            Ok(0)
        }
        Err(retry) => {
            eprintln!("{}", retry.user_message().render(ctx.locale));
            Ok(2)
        }
    }
}

pub async fn run_download(args: &DownloadArgs, ctx: &CliContext) -> Result<u8> {
    let user_id = ctx.require_user()?;
    let guard = RetrievalGuard::new(ctx.document_store()?);

    let document_id = DocumentId::parse(&args.document_id)
        .ok_or_else(|| anyhow::anyhow!("document id must not be blank"))?;
    let requested_name = args
        .out
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned());

    let document = match guard
        .retrieve(&document_id, &user_id, requested_name.as_deref())
        .await
    {
        Ok(document) => document,
        Err(err) => {
            let message = err
                .user_message()
                .map(|m| m.render(ctx.locale))
                .unwrap_or_else(|| err.to_string());
            bail!("{message}");
        }
    };

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&document.file_name));
    tokio::fs::write(&out, &document.bytes)
        .await
        .with_context(|| format!("writing {}", out.display()))?;
    println!(
        "{} ({} bytes, {})",
        out.display(),
        document.bytes.len(),
        document.content_type
    );
    Ok(0)
}
