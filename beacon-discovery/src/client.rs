//! Discovery client lifecycle and background registry maintenance.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::error::DiscoveryError;
use crate::instance::Instance;
use crate::net;
use crate::registry::SharedRegistry;
use crate::transport::RegistryTransport;

/// Upper bound on the deregistration call during shutdown.
const DEREGISTER_TIMEOUT: Duration = Duration::from_secs(10);

/// Lifecycle state of a [`DiscoveryClient`].
///
/// The client moves `Stopped -> Starting -> Running -> Stopping`.
/// `Stopping` is terminal. A stopped client stays registered with the
/// registry only until its lease expires; to rejoin, build a new client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Handle to a registered service instance.
///
/// [`start`](DiscoveryClient::start) registers the local instance and
/// spawns two background loops, one renewing the lease and one refreshing
/// the registry snapshot. [`stop`](DiscoveryClient::stop) cancels both
/// loops and deregisters the instance. Cloning the client shares the same
/// underlying instance and loops.
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    config: ClientConfig,
    instance: Instance,
    transport: RegistryTransport,
    registry: SharedRegistry,
    state: Mutex<ClientState>,
    shutdown: CancellationToken,
}

impl DiscoveryClient {
    /// Build a client for the configured registry.
    ///
    /// The local IP is taken from the configuration when set, otherwise
    /// resolved from the default route.
    pub fn new(config: ClientConfig) -> Result<Self, DiscoveryError> {
        let ip = match config.ip_addr {
            Some(ip) => ip,
            None => net::local_ip()?,
        };
        let instance = Instance::new(ip, &config);
        let transport = RegistryTransport::new(&config.registry_url);

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                instance,
                transport,
                registry: SharedRegistry::new(),
                state: Mutex::new(ClientState::Stopped),
                shutdown: CancellationToken::new(),
            }),
        })
    }

    /// Register the local instance and start the background loops.
    ///
    /// Returns once registration has succeeded. Calling `start` on a
    /// client that is already starting or running is a no-op. A failed
    /// registration leaves the client stopped so `start` can be retried.
    /// A [`stop`](DiscoveryClient::stop) issued while registration is in
    /// flight wins: `start` then returns the shut-down error and no loop
    /// is spawned.
    pub async fn start(&self) -> Result<(), DiscoveryError> {
        {
            let mut state = self.inner.state.lock();
            match *state {
                ClientState::Stopped => *state = ClientState::Starting,
                ClientState::Starting | ClientState::Running => {
                    debug!("Discovery client already started");
                    return Ok(());
                }
                ClientState::Stopping => return Err(DiscoveryError::ShutDown),
            }
        }

        info!(
            app = %self.inner.config.app_name,
            instance_id = %self.inner.instance.instance_id,
            "Starting discovery client"
        );

        if let Err(error) = self.inner.transport.register(&self.inner.instance).await {
            error!(error = %error, "Failed to register instance");
            let mut state = self.inner.state.lock();
            if *state == ClientState::Starting {
                *state = ClientState::Stopped;
            }
            return Err(error);
        }

        {
            let mut state = self.inner.state.lock();
            // A stop() issued while registration was in flight wins.
            if *state != ClientState::Starting {
                debug!("Discovery client stopped during registration");
                return Err(DiscoveryError::ShutDown);
            }
            *state = ClientState::Running;
        }

        self.spawn_heartbeat_loop();
        self.spawn_refresh_loop();

        info!("Registered instance {}", self.inner.instance.instance_id);
        Ok(())
    }

    /// Stop the background loops and deregister the instance.
    ///
    /// Deregistration is bounded by a 10 second deadline so shutdown
    /// never hangs on an unreachable registry. Calling `stop` again, or
    /// on a client that never started, does nothing beyond marking the
    /// client as shut down.
    pub async fn stop(&self) {
        let was_started = {
            let mut state = self.inner.state.lock();
            match *state {
                ClientState::Stopping => {
                    debug!("Discovery client already stopping");
                    return;
                }
                ClientState::Stopped => {
                    *state = ClientState::Stopping;
                    false
                }
                ClientState::Starting | ClientState::Running => {
                    *state = ClientState::Stopping;
                    true
                }
            }
        };

        self.inner.shutdown.cancel();

        if !was_started {
            return;
        }

        info!("Deregistering instance {}", self.inner.instance.instance_id);
        let deregister = self
            .inner
            .transport
            .deregister(&self.inner.instance.app, &self.inner.instance.instance_id);
        match timeout(DEREGISTER_TIMEOUT, deregister).await {
            Ok(Ok(())) => info!("Discovery client stopped"),
            Ok(Err(error)) => warn!(error = %error, "Failed to deregister instance"),
            Err(_) => warn!("Deregistration timed out"),
        }
    }

    /// Stop the client once the process receives a termination signal.
    ///
    /// Spawns a task waiting for SIGHUP, SIGINT, SIGTERM or SIGQUIT
    /// (Ctrl-C on non-unix platforms) and then runs [`stop`]. The
    /// returned handle completes after the shutdown has finished.
    ///
    /// [`stop`]: DiscoveryClient::stop
    pub fn shutdown_on_signal(&self) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            wait_for_termination().await;
            info!("Termination signal received, shutting down discovery client");
            client.stop().await;
        })
    }

    /// The registry handle kept fresh by the refresh loop.
    pub fn registry(&self) -> &SharedRegistry {
        &self.inner.registry
    }

    /// The local instance as registered.
    pub fn instance(&self) -> &Instance {
        &self.inner.instance
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ClientState {
        *self.inner.state.lock()
    }

    /// Whether the client is registered and maintaining its lease.
    pub fn is_running(&self) -> bool {
        self.state() == ClientState::Running
    }

    fn spawn_heartbeat_loop(&self) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval(inner.config.heartbeat_interval);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = inner.shutdown.cancelled() => {
                        debug!("Heartbeat loop stopped");
                        return;
                    }
                    _ = ticker.tick() => {}
                }

                if let Err(error) = inner
                    .transport
                    .heartbeat(&inner.instance.app, &inner.instance.instance_id)
                    .await
                {
                    warn!(error = %error, "Heartbeat failed");
                }
            }
        });
    }

    fn spawn_refresh_loop(&self) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval(inner.config.registry_fetch_interval);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = inner.shutdown.cancelled() => {
                        debug!("Registry refresh loop stopped");
                        return;
                    }
                    _ = ticker.tick() => {}
                }

                match inner.transport.list_applications().await {
                    Ok(snapshot) => inner.registry.replace(snapshot),
                    Err(error) => warn!(error = %error, "Registry refresh failed"),
                }
            }
        });
    }
}

#[cfg(unix)]
async fn wait_for_termination() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = signal(SignalKind::hangup()).expect("Failed to install SIGHUP handler");
    let mut interrupt = signal(SignalKind::interrupt()).expect("Failed to install SIGINT handler");
    let mut terminate = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
    let mut quit = signal(SignalKind::quit()).expect("Failed to install SIGQUIT handler");

    tokio::select! {
        _ = hangup.recv() => {}
        _ = interrupt.recv() => {}
        _ = terminate.recv() => {}
        _ = quit.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(error = %error, "Failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new("http://localhost:8761/eureka", "billing")
            .ip_addr("10.0.0.5".parse().unwrap())
            .port(8080)
    }

    #[test]
    fn test_new_builds_local_instance() {
        let client = DiscoveryClient::new(config()).unwrap();

        assert_eq!(client.instance().instance_id, "10.0.0.5:BILLING:8080");
        assert_eq!(client.state(), ClientState::Stopped);
        assert!(!client.is_running());
        assert_eq!(client.registry().snapshot().instance_count(), 0);
    }

    #[tokio::test]
    async fn test_stop_is_terminal_and_idempotent() {
        let client = DiscoveryClient::new(config()).unwrap();

        // Never started, so stopping skips the deregistration call.
        client.stop().await;
        assert_eq!(client.state(), ClientState::Stopping);

        client.stop().await;
        assert_eq!(client.state(), ClientState::Stopping);

        let error = client.start().await.unwrap_err();
        assert!(matches!(error, DiscoveryError::ShutDown));
    }
}
