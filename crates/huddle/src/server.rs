//! `HuddleServer` builder and accept loop.
//!
//! This is the entry point for running a Huddle server. It ties the
//! layers together: transport → protocol → coordinator (sessions,
//! rooms, prompts).

use huddle_prompt::PromptProvider;
use huddle_protocol::JsonCodec;
use huddle_room::{Coordinator, CoordinatorConfig, spawn_coordinator};
use huddle_transport::{Transport, WebSocketTransport};

use crate::HuddleError;
use crate::handler::handle_connection;

/// Builder for configuring and starting a Huddle server.
///
/// # Example
///
/// ```rust,no_run
/// use huddle::HuddleServer;
/// use huddle_prompt::DisabledProvider;
///
/// # async fn run() -> Result<(), huddle::HuddleError> {
/// let server = HuddleServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(DisabledProvider)
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct HuddleServerBuilder {
    bind_addr: String,
    coordinator_config: CoordinatorConfig,
}

impl HuddleServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            coordinator_config: CoordinatorConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the coordinator configuration (retention, sweep cadence).
    pub fn coordinator_config(mut self, config: CoordinatorConfig) -> Self {
        self.coordinator_config = config;
        self
    }

    /// Builds the server: binds the transport and spawns the
    /// coordinator actor with the given prompt provider.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`, which is what the
    /// browser clients speak.
    pub async fn build<P: PromptProvider>(
        self,
        provider: P,
    ) -> Result<HuddleServer, HuddleError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let coordinator = spawn_coordinator(provider, self.coordinator_config);
        Ok(HuddleServer {
            transport,
            coordinator,
        })
    }
}

impl Default for HuddleServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Huddle server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct HuddleServer {
    transport: WebSocketTransport,
    coordinator: Coordinator,
}

impl HuddleServer {
    /// Creates a new builder.
    pub fn builder() -> HuddleServerBuilder {
        HuddleServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted connection. Runs until
    /// the process is terminated.
    pub async fn run(mut self) -> Result<(), HuddleError> {
        tracing::info!("Huddle server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let coordinator = self.coordinator.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, coordinator, JsonCodec).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
