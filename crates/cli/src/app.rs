use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use stockdesk_api::{
    AlwaysOnline, ApiClient, AuthStore, ClientConfig, ErrorPipeline, FileSessionStore, Navigator,
    Notifier, SessionStore,
};
use stockdesk_core::SIGN_IN_PATH;

pub(crate) const SESSION_FILE_ENV: &str = "STOCKDESK_SESSION_FILE";

/// Slack on top of the redirect delay so the scheduled redirect runs first.
const REDIRECT_GRACE: Duration = Duration::from_millis(50);

/// Prints notifications on stderr so stdout stays machine-readable.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn error(&self, message: &str) {
        tracing::debug!(target: "stockdesk::notify", kind = "error", "{message}");
        eprintln!("error: {message}");
    }

    fn success(&self, message: &str) {
        tracing::debug!(target: "stockdesk::notify", kind = "success", "{message}");
        eprintln!("{message}");
    }
}

/// The terminal has no routes; "navigating" tells the user what to run.
struct CommandHint;

impl Navigator for CommandHint {
    fn navigate(&self, path: &str) {
        if path == SIGN_IN_PATH {
            eprintln!("Run `stockdesk login` to sign in again.");
        } else {
            eprintln!("Next: {path}");
        }
    }
}

pub(crate) struct App {
    pub(crate) config: ClientConfig,
    pub(crate) auth: Arc<AuthStore>,
    pub(crate) client: Arc<ApiClient>,
    notifier: Arc<dyn Notifier>,
}

impl App {
    pub(crate) fn bootstrap(api_url: Option<&str>) -> Result<Self> {
        let mut config = ClientConfig::from_env();
        if let Some(url) = api_url {
            config = config.with_base_url(url);
        }

        let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(session_path()?));
        let notifier: Arc<dyn Notifier> = Arc::new(StderrNotifier);
        let pipeline = Arc::new(
            ErrorPipeline::new(Arc::new(AlwaysOnline), Arc::clone(&notifier), Arc::clone(&store))
                .with_redirect_delay(config.logout_redirect_delay),
        );
        let auth = Arc::new(AuthStore::load(store));
        let client = Arc::new(ApiClient::new(&config, Arc::clone(&auth), Arc::clone(&pipeline))?);

        pipeline.set_session_clearer(auth.clone());
        pipeline.set_navigator(Arc::new(CommandHint));
        tracing::debug!(base_url = client.base_url(), signed_in = auth.is_signed_in(), "bootstrapped");

        Ok(Self { config, auth, client, notifier })
    }

    pub(crate) fn notify_success(&self, message: &str) {
        self.notifier.success(message);
    }

    pub(crate) async fn wait_for_redirect(&self) {
        tokio::time::sleep(self.config.logout_redirect_delay + REDIRECT_GRACE).await;
    }
}

fn session_path() -> Result<PathBuf> {
    match std::env::var(SESSION_FILE_ENV) {
        Ok(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(FileSessionStore::default_path()?),
    }
}
