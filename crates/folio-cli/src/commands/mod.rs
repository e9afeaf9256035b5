//! Command handlers grouped by concern.

pub(crate) mod categories;
pub(crate) mod files;
pub(crate) mod folders;
pub(crate) mod pipeline;
pub(crate) mod session;
pub(crate) mod transfer;

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use folio_client::{Credentials, HttpOptions, HttpRemote, RetryPolicy};
    use folio_events::MemoryMarkerStore;
    use folio_tracker::ClassificationLedger;
    use httpmock::MockServer;

    use crate::cli::OutputFormat;
    use crate::client::AppContext;

    /// Context talking to `server` as user 1, with markers kept in memory and
    /// the classification ledger under `download_dir/state`.
    pub(crate) fn context_for(server: &MockServer, download_dir: PathBuf) -> AppContext {
        let remote = HttpRemote::new(
            server.base_url().parse().expect("valid URL"),
            Some(Credentials {
                user_id: 1,
                token: "tok".into(),
            }),
            HttpOptions {
                timeout: Duration::from_secs(5),
                retry: RetryPolicy::none(),
            },
        )
        .expect("client builds");
        AppContext {
            remote: Arc::new(remote),
            markers: Arc::new(MemoryMarkerStore::default()),
            ledger: ClassificationLedger::new(download_dir.join("state")),
            user_id: Some(1),
            poll_interval: Duration::from_millis(10),
            download_dir,
            output: OutputFormat::Table,
        }
    }
}
