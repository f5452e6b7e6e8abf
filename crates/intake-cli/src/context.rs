//! Shared wiring for subcommands: configuration resolution and construction
//! of the session manager and document store from global flags.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use intake_client::{IntakeApiConfig, SessionClient};
use intake_core::{Locale, UserId};
use intake_docs::{RestDocumentStore, StoreConfig};
use intake_session::{FileSessionStore, SessionManager};

/// Global settings resolved from flags, falling back to the environment.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub api: IntakeApiConfig,
    pub user_id: Option<UserId>,
    pub anchor: PathBuf,
    pub locale: Locale,
}

impl CliContext {
    pub fn resolve(
        api_url: Option<&str>,
        user_id: Option<&str>,
        anchor_file: Option<PathBuf>,
        locale: Option<&str>,
    ) -> Result<Self> {
        let mut api = IntakeApiConfig::from_env().context("loading session backend config")?;
        if let Some(raw) = api_url {
            api.base_url = IntakeApiConfig::with_base_url(raw)
                .context("parsing --api-url")?
                .base_url;
        }

        let user_id = user_id
            .map(str::to_string)
            .or_else(|| std::env::var("INTAKE_USER_ID").ok())
            .and_then(|raw| UserId::parse(&raw));

        let anchor = match anchor_file {
            Some(path) => path,
            None => FileSessionStore::default_location()
                .context("locating the session anchor file")?
                .path()
                .to_path_buf(),
        };

        let locale = match locale {
            Some(raw) => raw.parse::<Locale>().map_err(anyhow::Error::msg)?,
            None => Locale::default(),
        };

        Ok(Self {
            api,
            user_id,
            anchor,
            locale,
        })
    }

    pub fn session_manager(&self) -> Result<SessionManager> {
        let client = SessionClient::new(self.api.clone()).context("building session client")?;
        Ok(SessionManager::new(
            Arc::new(client),
            Arc::new(FileSessionStore::new(self.anchor.clone())),
        ))
    }

    pub fn document_store(&self) -> Result<Arc<RestDocumentStore>> {
        let config = StoreConfig::from_env().context("loading document store config")?;
        Ok(Arc::new(
            RestDocumentStore::new(config).context("building document store client")?,
        ))
    }

    /// The user id, required by document commands.
    pub fn require_user(&self) -> Result<UserId> {
        self.user_id.clone().ok_or_else(|| {
            anyhow::anyhow!(intake_core::UserMessage::UserNotAuthenticated.render(self.locale))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let anchor = dir.path().join("anchor");
        let ctx = CliContext::resolve(
            Some("http://127.0.0.1:9000"),
            Some(" u-7 "),
            Some(anchor.clone()),
            Some("en"),
        )
        .unwrap();
        assert_eq!(ctx.api.base_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(ctx.user_id, Some(UserId::new("u-7")));
        assert_eq!(ctx.anchor, anchor);
        assert_eq!(ctx.locale, Locale::En);
    }

    #[test]
    fn blank_user_is_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let ctx =
            CliContext::resolve(None, Some("  "), Some(dir.path().join("a")), None).unwrap();
        assert!(ctx.user_id.is_none());
        assert_eq!(ctx.locale, Locale::PtBr);
    }

    #[test]
    fn unknown_locale_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = CliContext::resolve(None, None, Some(dir.path().join("a")), Some("fr"));
        assert!(result.is_err());
    }
}
