//! Scholarly Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebError, WebResult};
use axum::serve;
use scholarly_core::AppConfig;
use scholarly_mail::{EmailQueue, QueueSettings, SmtpMailer};
use scholarly_rag::RagPipeline;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Main scholarly web server
pub struct ScholarlyServer {
    config: Arc<AppConfig>,
    state: AppState,
    email_queue: Arc<EmailQueue>,
}

impl ScholarlyServer {
    /// Connect to the upstream services and start the contact email workers
    pub async fn new(config: AppConfig) -> WebResult<Self> {
        let config = Arc::new(config);

        let pipeline = RagPipeline::from_app_config(&config).await?;
        let mailer = SmtpMailer::from_settings(&config.email)?;
        let email_queue = Arc::new(EmailQueue::start(
            Arc::new(mailer),
            QueueSettings::from(&config.email),
        ));

        let state = AppState::new(config.clone(), Arc::new(pipeline), email_queue.clone());

        Ok(Self {
            config,
            state,
            email_queue,
        })
    }

    /// Start the web server and run until a shutdown signal arrives
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.server.address();

        info!("Starting scholarly web server");
        info!("Server address: http://{}", address);
        info!("Debug mode: {}", self.config.server.debug);
        info!(
            engine = %self.config.database.engine,
            name = %self.config.database.name,
            "Database settings loaded"
        );

        if self.config.server.uses_insecure_secret() && !self.config.server.debug {
            warn!("SECRET_KEY is not set; using the insecure built-in key");
        }
        if let Some(broker) = &self.config.email.broker_url {
            info!(broker = %broker, "BROKER_URL is set; contact jobs still run on the in-process queue");
        }

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        let result = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        info!("Draining contact email queue");
        self.email_queue.shutdown().await;

        if let Err(e) = result {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for ScholarlyServer
pub struct ScholarlyServerBuilder {
    config: AppConfig,
}

impl ScholarlyServerBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<ScholarlyServer> {
        ScholarlyServer::new(self.config).await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
