use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::sources::FetchToken;

/// Lifecycle of one page load.
///
/// `content_ready` is the single entry point for the bootstrap: it spawns the
/// token fetch without waiting on it and hands back the task handle. A page
/// signals readiness once; later calls are refused and issue no request.
#[derive(Debug)]
pub struct PageSession<B> {
    bootstrapper: Arc<B>,
    started: AtomicBool,
}

impl<B> PageSession<B>
where
    B: FetchToken + Send + Sync + 'static,
{
    pub fn new(bootstrapper: B) -> Self {
        Self {
            bootstrapper: Arc::new(bootstrapper),
            started: AtomicBool::new(false),
        }
    }

    pub fn bootstrapper(&self) -> &B {
        &self.bootstrapper
    }

    pub fn has_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Must be called from within a tokio runtime
    pub fn content_ready(&self) -> Result<JoinHandle<()>> {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("content_ready signalled again; ignoring");
            return Err(anyhow!("csrf bootstrap already started for this page"));
        }

        info!("page content ready, fetching csrf token");
        let bootstrapper = self.bootstrapper.clone();
        Ok(tokio::spawn(async move { bootstrapper.fetch_token().await }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct CountingFetch {
        calls: AtomicUsize,
        release: Notify,
    }

    impl FetchToken for CountingFetch {
        async fn fetch_token(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
        }
    }

    #[tokio::test]
    async fn runs_bootstrap_at_most_once() {
        let session = PageSession::new(CountingFetch::default());
        let handle = session.content_ready().unwrap();
        assert!(session.has_started());
        assert!(session.content_ready().is_err());
        assert!(session.content_ready().is_err());

        session.bootstrapper().release.notify_one();
        handle.await.unwrap();

        assert!(session.content_ready().is_err());
        assert_eq!(session.bootstrapper().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn does_not_block_the_caller() {
        let session = PageSession::new(CountingFetch::default());
        // the fetch never completes until released, yet content_ready returns
        let handle = session.content_ready().unwrap();
        assert!(!handle.is_finished());
        session.bootstrapper().release.notify_one();
        handle.await.unwrap();
    }
}
