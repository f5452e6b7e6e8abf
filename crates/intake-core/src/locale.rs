//! # User-Facing Messages
//!
//! The intake front end speaks Brazilian Portuguese by default. Messages
//! surfaced through the session manager and the document pipeline are
//! modelled as [`UserMessage`] values and rendered for a [`Locale`] at the
//! presentation edge, so the core never hard-codes display strings.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported presentation locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// Brazilian Portuguese (default).
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    /// English.
    #[serde(rename = "en")]
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(Self::PtBr),
            "en" | "en-us" | "en-gb" => Ok(Self::En),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PtBr => f.write_str("pt-BR"),
            Self::En => f.write_str("en"),
        }
    }
}

/// A user-facing message with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserMessage {
    SessionInitFailed,
    SessionNotInitialized,
    EmptyMessage,
    SendFailed,
    SendInFlight,
    RequestFailed,
    ConnectionFailed { base_url: String },
    NotReadyForDocuments,
    ReadyForDocuments,
    UserNotAuthenticated,
    NoFileSelected,
    MissingRecommendation,
    FileTooLarge { max_mib: u64 },
    FileReadFailed { detail: String },
    StorageFailed { detail: String },
    StatusSyncFailed { detail: String },
    UploadInFlight,
    UploadSucceeded { file_name: String },
    DocumentNotFound,
    DownloadForbidden,
}

impl UserMessage {
    /// Render the message for the given locale.
    pub fn render(&self, locale: Locale) -> String {
        match locale {
            Locale::PtBr => self.render_pt_br(),
            Locale::En => self.render_en(),
        }
    }

    fn render_pt_br(&self) -> String {
        match self {
            Self::SessionInitFailed => {
                "Não foi possível conectar ao serviço. Por favor, tente novamente.".into()
            }
            Self::SessionNotInitialized => "Sessão não inicializada.".into(),
            Self::EmptyMessage => "A mensagem não pode estar vazia.".into(),
            Self::SendFailed => {
                "Não foi possível enviar sua mensagem. Por favor, tente novamente.".into()
            }
            Self::SendInFlight => "Aguarde a resposta da mensagem anterior.".into(),
            Self::RequestFailed => {
                "Não foi possível carregar os dados da sessão. Por favor, tente novamente.".into()
            }
            Self::ConnectionFailed { base_url } => format!(
                "Erro de conexão com o servidor API ({base_url}). Verifique se o servidor está rodando e acessível."
            ),
            Self::NotReadyForDocuments => "Perfil ainda não está completo.".into(),
            Self::ReadyForDocuments => {
                "Perfil completo! Já podemos preparar a sua lista de documentos.".into()
            }
            Self::UserNotAuthenticated => "Usuário não autenticado.".into(),
            Self::NoFileSelected => "Nenhum arquivo selecionado.".into(),
            Self::MissingRecommendation => "ID da recomendação é obrigatório.".into(),
            Self::FileTooLarge { max_mib } => {
                format!("Arquivo muito grande. Máximo {max_mib}MB.")
            }
            Self::FileReadFailed { detail } => format!("Erro ao ler o arquivo: {detail}"),
            Self::StorageFailed { detail } => format!("Erro ao salvar documento: {detail}"),
            Self::StatusSyncFailed { detail } => format!(
                "Documento salvo, mas falha ao atualizar o status (sent) da recomendação: {detail}"
            ),
            Self::UploadInFlight => "Este documento já está sendo enviado.".into(),
            Self::UploadSucceeded { file_name } => format!(
                "{file_name} foi enviado e o status da recomendação foi atualizado."
            ),
            Self::DocumentNotFound => {
                "Arquivo não encontrado ou dados do arquivo ausentes.".into()
            }
            Self::DownloadForbidden => "Você não tem permissão para baixar este arquivo.".into(),
        }
    }

    fn render_en(&self) -> String {
        match self {
            Self::SessionInitFailed => "Could not connect to the service. Please try again.".into(),
            Self::SessionNotInitialized => "Session not initialized.".into(),
            Self::EmptyMessage => "The message cannot be empty.".into(),
            Self::SendFailed => "Could not send your message. Please try again.".into(),
            Self::SendInFlight => "Please wait for the previous reply.".into(),
            Self::RequestFailed => "Could not load the session data. Please try again.".into(),
            Self::ConnectionFailed { base_url } => format!(
                "Could not reach the API server ({base_url}). Check that it is running and reachable."
            ),
            Self::NotReadyForDocuments => "The profile is not complete yet.".into(),
            Self::ReadyForDocuments => {
                "Profile complete! Your document checklist can now be prepared.".into()
            }
            Self::UserNotAuthenticated => "User not authenticated.".into(),
            Self::NoFileSelected => "No file selected.".into(),
            Self::MissingRecommendation => "A recommendation id is required.".into(),
            Self::FileTooLarge { max_mib } => format!("File too large. Maximum {max_mib}MB."),
            Self::FileReadFailed { detail } => format!("Could not read the file: {detail}"),
            Self::StorageFailed { detail } => format!("Could not save the document: {detail}"),
            Self::StatusSyncFailed { detail } => format!(
                "Document saved, but updating the checklist status failed: {detail}"
            ),
            Self::UploadInFlight => "This document is already being uploaded.".into(),
            Self::UploadSucceeded { file_name } => {
                format!("{file_name} was uploaded and the checklist was updated.")
            }
            Self::DocumentNotFound => "File not found or file data missing.".into(),
            Self::DownloadForbidden => "You are not allowed to download this file.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_locale_is_pt_br() {
        assert_eq!(Locale::default(), Locale::PtBr);
    }

    #[test]
    fn locale_parses_common_spellings() {
        assert_eq!("pt-BR".parse::<Locale>().unwrap(), Locale::PtBr);
        assert_eq!("pt_br".parse::<Locale>().unwrap(), Locale::PtBr);
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn parameters_are_interpolated() {
        let msg = UserMessage::FileTooLarge { max_mib: 10 };
        assert_eq!(msg.render(Locale::PtBr), "Arquivo muito grande. Máximo 10MB.");
        assert_eq!(msg.render(Locale::En), "File too large. Maximum 10MB.");
    }

    #[test]
    fn status_sync_message_says_document_was_saved() {
        let msg = UserMessage::StatusSyncFailed {
            detail: "timeout".into(),
        };
        assert!(msg.render(Locale::PtBr).starts_with("Documento salvo"));
        assert!(msg.render(Locale::En).starts_with("Document saved"));
    }
}
