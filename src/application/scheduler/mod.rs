// Scheduler module
pub mod backoff;
pub mod unit;

use crate::config::Config;
use crate::domain::ports::MarketDataSource;
use crate::infrastructure::signal_hub::SignalHub;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

use unit::{UnitSettings, WorkUnit};

/// Spawns one independent work unit task per watchlist entry and owns
/// their lifecycle. Units share the data source and the signal hub but
/// never block each other.
pub struct Scheduler {
    shutdown_tx: broadcast::Sender<()>,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn start(config: &Config, source: Arc<dyn MarketDataSource>, hub: SignalHub) -> Self {
        let settings = UnitSettings::from_config(config);
        let (shutdown_tx, _) = broadcast::channel(1);

        let mut handles = Vec::with_capacity(config.watchlist.len());
        for item in &config.watchlist {
            let unit = WorkUnit::new(item.clone(), settings.clone(), source.clone(), hub.clone());
            handles.push(tokio::spawn(unit.run(shutdown_tx.subscribe())));
        }

        info!("Scheduler: started {} work units", handles.len());
        Self { shutdown_tx, handles }
    }

    pub fn unit_count(&self) -> usize {
        self.handles.len()
    }

    /// Broadcasts shutdown and waits for every unit to finish its current
    /// cycle and exit
    pub async fn shutdown(self) {
        info!("Scheduler: stopping {} work units", self.handles.len());
        // Err here means every unit already exited
        let _ = self.shutdown_tx.send(());

        for result in join_all(self.handles).await {
            if let Err(join_error) = result {
                error!("Scheduler: work unit task failed: {}", join_error);
            }
        }
        info!("Scheduler: all work units stopped");
    }
}
