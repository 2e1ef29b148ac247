use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use brc_store::BlobStore;
use tokio::net::TcpListener;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::{AdmissionPolicy, ServerConfig};
use crate::error::{ServerError, ServerResult};
use crate::handler::serve_connection;

/// Store handle shared by every connection handler.
pub type SharedStore = Arc<dyn BlobStore>;

/// Pause after a failed `accept` so a persistent error (e.g. out of file
/// descriptors) does not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// BRC store server.
pub struct BrcServer {
    config: ServerConfig,
    store: SharedStore,
}

impl BrcServer {
    pub fn new(config: ServerConfig, store: SharedStore) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> ServerResult<TcpListener> {
        Ok(TcpListener::bind(self.config.bind_addr).await?)
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let listener = self.bind().await?;
        self.serve_with_shutdown(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for interrupt: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Accept connections on `listener` until `shutdown` resolves.
    ///
    /// Handlers already running are left to finish on their own; they are
    /// not awaited.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()>,
    {
        let permits = Arc::new(Semaphore::new(self.config.max_connections));
        let handler_config = self.config.handler_config();
        tokio::pin!(shutdown);

        if let Ok(addr) = listener.local_addr() {
            tracing::info!(
                "BRC store listening on {addr} (max_connections={}, admission={:?})",
                self.config.max_connections,
                self.config.admission
            );
        }

        loop {
            let queued = match self.config.admission {
                AdmissionPolicy::Queue => tokio::select! {
                    _ = &mut shutdown => break,
                    permit = Arc::clone(&permits).acquire_owned() => Some(
                        permit.map_err(|e| ServerError::Internal(e.to_string()))?,
                    ),
                },
                AdmissionPolicy::Reject => None,
            };

            let (stream, peer) = tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!("accept failed: {e}");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                        continue;
                    }
                },
            };

            let permit: OwnedSemaphorePermit = match queued {
                Some(permit) => permit,
                None => match Arc::clone(&permits).try_acquire_owned() {
                    Ok(permit) => permit,
                    Err(_) => {
                        tracing::warn!(%peer, "connection limit reached, closing");
                        drop(stream);
                        continue;
                    }
                },
            };

            tracing::debug!(%peer, "accepted");
            let store = Arc::clone(&self.store);
            tokio::spawn(async move {
                let _permit = permit;
                serve_connection(stream, store, handler_config).await;
            });
        }

        tracing::info!("shutdown requested, no longer accepting connections");
        Ok(())
    }
}
