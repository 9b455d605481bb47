//! # Controller Bootstrap
//!
//! Wires a validated `NotifyConfig` and a cluster client into a running
//! controller: routing table, renderer, webhook transport, both reconcilers
//! and the worker runtime.

use super::backoff::BackoffPolicy;
use super::event_reconciler::EventReconciler;
use super::lifecycle::LifecycleReconciler;
use super::runtime::Controller;
use crate::backend::{ReqwestTransport, TransportError, WebhookTransport};
use crate::cluster::{ClusterClient, ReconcileRequest};
use crate::config::{ConfigurationError, NotifyConfig};
use crate::events::EventPublisher;
use crate::registry::RoutingTable;
use crate::rendering::NotificationRenderer;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigurationError),

    #[error("failed to create webhook transport: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("controller task ended abnormally: {0}")]
    TaskFailed(#[from] JoinError),
}

/// Fully wired controller, ready to start
#[derive(Debug)]
pub struct ControllerSystem {
    config: NotifyConfig,
    routing: RoutingTable,
    controller: Arc<Controller>,
}

impl ControllerSystem {
    /// Bootstrap with the `reqwest` transport built from the delivery section
    pub fn bootstrap(config: NotifyConfig, cluster: Arc<dyn ClusterClient>) -> Result<Self, BootstrapError> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config.delivery)?;
        Self::bootstrap_with_transport(config, cluster, Arc::new(transport))
    }

    /// Bootstrap with an explicit transport
    pub fn bootstrap_with_transport(
        config: NotifyConfig,
        cluster: Arc<dyn ClusterClient>,
        transport: Arc<dyn WebhookTransport>,
    ) -> Result<Self, BootstrapError> {
        config.validate()?;

        let routing = RoutingTable::new();
        let renderer = NotificationRenderer::new(config.rendering.clone());
        let lifecycle = LifecycleReconciler::new(
            Arc::clone(&cluster),
            routing.clone(),
            config.controller.finalizer.clone(),
        );
        let events = EventReconciler::new(Arc::clone(&cluster), routing.clone(), renderer, transport);
        let controller = Controller::new(
            cluster,
            lifecycle,
            events,
            BackoffPolicy::from_config(&config.retry),
            EventPublisher::default(),
            config.controller.worker_count,
        );

        info!(
            worker_count = config.controller.worker_count,
            finalizer = %config.controller.finalizer,
            max_attempts = config.retry.max_attempts,
            "🏗️ Controller system bootstrapped"
        );

        Ok(Self {
            config,
            routing,
            controller: Arc::new(controller),
        })
    }

    pub fn config(&self) -> &NotifyConfig {
        &self.config
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    pub fn controller(&self) -> &Arc<Controller> {
        &self.controller
    }

    pub fn publisher(&self) -> &EventPublisher {
        self.controller.publisher()
    }

    /// Spawn the controller on the current runtime
    pub fn start(&self, requests: mpsc::UnboundedReceiver<ReconcileRequest>) -> ControllerHandle {
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(Arc::clone(&self.controller).run(requests, shutdown.clone()));
        ControllerHandle { shutdown, task }
    }
}

/// Handle for a spawned controller
#[derive(Debug)]
pub struct ControllerHandle {
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Cancel the controller and wait for its workers to exit
    pub async fn stop(self) -> Result<(), ControllerError> {
        self.shutdown.cancel();
        self.task.await.map_err(|e| {
            error!(error = %e, "💥 Controller task ended abnormally");
            ControllerError::from(e)
        })
    }
}
