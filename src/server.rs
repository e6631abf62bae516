use crate::config::Config;
use crate::device::Device;
use crate::discovery::{Advertisement, DiscoveryResponder};
use crate::error::{EmulatorError, Result};
use crate::http::{router, AppState};
use crate::net::local_ip;
use crate::token::TokenStore;
use crate::types::CONTROL_PATH;
use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use hyper_util::service::TowerToHyperService;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_native_tls::TlsAcceptor;

/// A bound emulator, ready to serve
///
/// Binding is separate from serving so callers (and tests) can learn the
/// actual listening address before clients connect.
///
/// # Example
///
/// ```no_run
/// use smarttv_emulator::{Config, Emulator};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let emulator = Emulator::bind(Config::default()).await?;
///     println!("listening on {}", emulator.local_addr()?);
///     emulator.run().await?;
///     Ok(())
/// }
/// ```
pub struct Emulator {
    config: Config,
    device: Device,
    tokens: TokenStore,
    tls: Option<TlsAcceptor>,
    listener: TcpListener,
}

impl Emulator {
    /// Load the pairing token and TLS material, then bind the listener
    ///
    /// Missing TLS material is fatal when the encrypted variant is requested.
    pub async fn bind(config: Config) -> Result<Self> {
        let tokens = TokenStore::load_or_create(&config.token_path)?;
        let tls = load_tls(&config)?;
        let listener = TcpListener::bind(config.listen_addr).await?;

        Ok(Self {
            config,
            device: Device::new(),
            tokens,
            tls,
            listener,
        })
    }

    /// Address of the HTTP/control listener
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle to the shared device state
    pub fn device(&self) -> Device {
        self.device.clone()
    }

    /// The pairing token every connect handshake receives
    pub fn token(&self) -> &str {
        self.tokens.token()
    }

    /// Serve until Ctrl-C
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves
    ///
    /// Starts the discovery responder when enabled. A discovery bind failure
    /// only disables discovery.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        let host = local_ip();
        let (http_scheme, ws_scheme) = if self.tls.is_some() {
            ("https", "wss")
        } else {
            ("http", "ws")
        };

        let discovery = if self.config.discovery {
            let advertisement = Advertisement::new(host, addr.port());
            match DiscoveryResponder::bind(self.config.discovery_port, advertisement).await {
                Ok(responder) => Some(tokio::spawn(responder.run())),
                Err(e) => {
                    tracing::warn!(
                        "Could not bind discovery port {}, skipping discovery responder: {}",
                        self.config.discovery_port,
                        e
                    );
                    None
                }
            }
        } else {
            None
        };

        tracing::info!("HTTP API on {}://{}:{}", http_scheme, host, addr.port());
        tracing::info!(
            "Control channel on {}://{}:{}{}",
            ws_scheme,
            host,
            addr.port(),
            CONTROL_PATH
        );
        tracing::debug!("Pairing token stored in {}", self.tokens.path().display());

        let app = router(AppState {
            device: self.device.clone(),
            token: Arc::from(self.tokens.token()),
        });

        let served = match self.tls {
            Some(acceptor) => serve_tls(self.listener, acceptor, app, shutdown).await,
            None => axum::serve(self.listener, app)
                .with_graceful_shutdown(shutdown)
                .await
                .map_err(EmulatorError::from),
        };

        if let Some(handle) = discovery {
            handle.abort();
        }
        tracing::info!("Emulator stopped");
        served
    }
}

fn load_tls(config: &Config) -> Result<Option<TlsAcceptor>> {
    if !config.use_tls {
        return Ok(None);
    }
    for path in [&config.cert_path, &config.key_path] {
        if !path.exists() {
            return Err(EmulatorError::MissingTlsMaterial(path.clone()));
        }
    }

    let cert = std::fs::read(&config.cert_path)?;
    let key = std::fs::read(&config.key_path)?;
    let identity = native_tls::Identity::from_pkcs8(&cert, &key)?;
    let acceptor = native_tls::TlsAcceptor::new(identity)?;
    Ok(Some(TlsAcceptor::from(acceptor)))
}

async fn serve_tls<F>(listener: TcpListener, acceptor: TlsAcceptor, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::pin!(shutdown);

    loop {
        let (tcp, peer) = tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    continue;
                }
            },
        };

        let acceptor = acceptor.clone();
        let service = TowerToHyperService::new(app.clone());
        tokio::spawn(async move {
            let stream = match acceptor.accept(tcp).await {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::debug!("TLS handshake with {} failed: {}", peer, e);
                    return;
                }
            };
            if let Err(e) = Builder::new(TokioExecutor::new())
                .serve_connection_with_upgrades(TokioIo::new(stream), service)
                .await
            {
                tracing::debug!("Connection from {} ended: {}", peer, e);
            }
        });
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_tls_material_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            use_tls: true,
            cert_path: dir.path().join("cert.pem"),
            key_path: dir.path().join("key.pem"),
            token_path: dir.path().join("tv_token.txt"),
            discovery: false,
            ..Config::default()
        };

        let err = Emulator::bind(config).await.err().unwrap();
        assert!(matches!(err, EmulatorError::MissingTlsMaterial(_)));
    }
}
