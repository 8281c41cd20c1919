//! Command implementations.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tryla_client::{
    ApiClient, ApiError, ClientConfig, FileSessionStore, RequestScope, SessionHandle, UiSink,
};

use crate::output::{ConsoleSink, Output};

/// Session file used when neither the flag nor the variable is set.
const DEFAULT_SESSION_PATH: &str = ".tryla/session.json";

/// Everything a command needs.
pub struct Context {
    pub client: ApiClient,
    pub out: Output,
    /// Cancelled on Ctrl-C.
    pub scope: RequestScope,
}

impl Context {
    /// Build the client from environment, flags and the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid backend URL or an unreadable session.
    pub fn new(
        api_url: Option<&str>,
        session_file: Option<&Path>,
        json: bool,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = ClientConfig::from_env()?;
        if let Some(url) = api_url {
            config = config.with_api_url(url)?;
        }

        let path = session_file.map_or_else(default_session_path, Path::to_path_buf);
        tracing::debug!(path = %path.display(), "session file");
        let session = SessionHandle::restore(Arc::new(FileSessionStore::new(path)))?;

        let sink: Arc<dyn UiSink> = Arc::new(ConsoleSink);
        let client = ApiClient::new(&config, session, sink)?;

        let scope = RequestScope::new();
        cancel_on_interrupt(scope.clone());

        Ok(Self {
            client,
            out: Output::new(json),
            scope,
        })
    }

    /// Run a client call that Ctrl-C can abort.
    pub async fn run<T>(
        &self,
        request: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, ApiError> {
        self.scope.run(request).await
    }
}

/// Cancel `scope` when the user presses Ctrl-C.
pub fn cancel_on_interrupt(scope: RequestScope) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling request");
            scope.cancel();
        }
    });
}

fn default_session_path() -> PathBuf {
    std::env::var_os("HOME").map_or_else(
        || PathBuf::from(DEFAULT_SESSION_PATH),
        |home| PathBuf::from(home).join(DEFAULT_SESSION_PATH),
    )
}
