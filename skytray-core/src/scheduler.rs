//! Timer-driven refresh pipeline.
//!
//! The scheduler is the only active component: on every tick (scheduled or
//! manual) it runs resolve → fetch → normalize and publishes the result. The
//! state machine is `Idle → Fetching → {Succeeded, Failed}`; the cycle body is
//! awaited to completion before the next trigger is considered, so at most one
//! fetch is ever in flight. Manual refresh requests go through a single-slot
//! queue: one request arriving mid-cycle runs right after it, further requests
//! while the slot is full are dropped.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::config::Preferences;
use crate::location::LocationSource;
use crate::model::{RefreshError, RefreshState, WeatherModel};
use crate::provider::WeatherProvider;

/// What the presentation layer sees: the latest complete model (if any cycle
/// has ever succeeded) and the status of the most recent cycle. A failed cycle
/// keeps the previous model in place.
#[derive(Debug, Clone, Default)]
pub struct Published {
    pub model: Option<Arc<WeatherModel>>,
    pub state: RefreshState,
}

/// Cheap-to-clone handle given to the presentation layer.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    refresh_tx: mpsc::Sender<()>,
    published: watch::Receiver<Published>,
}

impl SchedulerHandle {
    /// Request an out-of-band refresh. A request arriving while a cycle is in
    /// flight is queued in the single slot; if the slot is already taken the
    /// request is dropped.
    pub fn request_refresh(&self) {
        let _ = self.refresh_tx.try_send(());
    }

    pub fn subscribe(&self) -> watch::Receiver<Published> {
        self.published.clone()
    }

    /// Latest snapshot without subscribing.
    pub fn current(&self) -> Published {
        self.published.borrow().clone()
    }
}

pub struct RefreshScheduler {
    location: Arc<dyn LocationSource>,
    provider: Arc<dyn WeatherProvider>,
    prefs: watch::Receiver<Preferences>,
    publish_tx: watch::Sender<Published>,
    refresh_rx: mpsc::Receiver<()>,
}

impl RefreshScheduler {
    pub fn new(
        location: Arc<dyn LocationSource>,
        provider: Arc<dyn WeatherProvider>,
        prefs: watch::Receiver<Preferences>,
    ) -> (Self, SchedulerHandle) {
        let (publish_tx, published) = watch::channel(Published::default());
        let (refresh_tx, refresh_rx) = mpsc::channel(1);

        (
            Self {
                location,
                provider,
                prefs,
                publish_tx,
                refresh_rx,
            },
            SchedulerHandle {
                refresh_tx,
                published,
            },
        )
    }

    /// Drive the pipeline until every [`SchedulerHandle`] is dropped. Runs one
    /// cycle immediately, then waits for the timer or a manual request.
    /// Preference changes take effect at the next cycle boundary, never
    /// mid-flight.
    pub async fn run(mut self) {
        self.run_cycle().await;

        loop {
            let interval = self.prefs.borrow().interval.duration();

            tokio::select! {
                () = tokio::time::sleep(interval) => {
                    tracing::debug!("refresh timer fired");
                }
                request = self.refresh_rx.recv() => {
                    if request.is_none() {
                        tracing::debug!("all scheduler handles dropped, stopping");
                        break;
                    }
                    tracing::debug!("manual refresh requested");
                }
            }

            self.run_cycle().await;
        }
    }

    async fn run_cycle(&mut self) {
        let prefs = *self.prefs.borrow();

        self.publish_tx
            .send_modify(|p| p.state = RefreshState::Fetching);

        match self.execute(prefs).await {
            Ok(model) => {
                tracing::info!(
                    location = %model.location_label,
                    days = model.forecast.len(),
                    "weather refreshed"
                );
                let model = Arc::new(model);
                self.publish_tx.send_modify(|p| {
                    p.model = Some(model);
                    p.state = RefreshState::Succeeded;
                });
            }
            Err(err) => {
                // Keep whatever was published before: stale beats blank.
                tracing::warn!("refresh cycle failed: {err}");
                self.publish_tx
                    .send_modify(|p| p.state = RefreshState::Failed(err.to_string()));
            }
        }
    }

    async fn execute(&self, prefs: Preferences) -> Result<WeatherModel, RefreshError> {
        let location = self.location.resolve().await?;
        let raw = self.provider.fetch(location.coordinates, prefs.unit).await?;
        Ok(WeatherModel::normalize(
            location.label,
            &raw.current,
            &raw.forecast,
            prefs.unit,
        ))
    }
}
