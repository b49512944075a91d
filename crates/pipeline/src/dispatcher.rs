//! Transition fan-out.
//!
//! Polls the transition feed and routes each claimed change to the
//! components whose guards fire, running the independent drive-side
//! components concurrently. A transition is acked only once every fired
//! component has either succeeded or parked its failure on the record it
//! owns; anything else leaves the claim to expire and redeliver.

use std::future::Future;
use std::time::Duration;

use driveline_db::repositories::{DriveRepo, VehicleRepo};
use driveline_db::DbPool;
use driveline_events::{guards, DriveChange, TransitionEvent, TransitionFeed, VehicleChange};
use tokio_util::sync::CancellationToken;

use crate::analyzer::DriveAnalyzer;
use crate::converter::ColumnarConverter;
use crate::error::PipelineError;
use crate::route_matcher::RouteMatcher;
use crate::vin::VinDecoder;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Routes claimed transitions to the pipeline components.
pub struct TransitionDispatcher {
    pool: DbPool,
    feed: TransitionFeed,
    analyzer: DriveAnalyzer,
    route_matcher: RouteMatcher,
    converter: ColumnarConverter,
    vin_decoder: VinDecoder,
    poll_interval: Duration,
}

impl TransitionDispatcher {
    pub fn new(
        pool: DbPool,
        feed: TransitionFeed,
        analyzer: DriveAnalyzer,
        route_matcher: RouteMatcher,
        converter: ColumnarConverter,
        vin_decoder: VinDecoder,
    ) -> Self {
        Self {
            pool,
            feed,
            analyzer,
            route_matcher,
            converter,
            vin_decoder,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Poll the feed until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Transition dispatcher started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Transition dispatcher shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.try_dispatch().await {
                        tracing::error!(error = %e, "Dispatch cycle failed");
                    }
                }
            }
        }
    }

    /// Claim one batch and handle every transition in it. A transition
    /// whose handling fails stays claimed and is logged; the rest of the
    /// batch still runs.
    pub async fn try_dispatch(&self) -> Result<(), sqlx::Error> {
        let batch = self.feed.poll(&self.pool).await?;
        for event in batch {
            match self.handle(&event).await {
                Ok(true) => self.feed.ack(&self.pool, event.id).await?,
                Ok(false) => {}
                Err(err) => {
                    tracing::error!(
                        transition_id = event.id,
                        doc_id = %event.doc_id,
                        attempts = event.attempts,
                        error = %err,
                        "Transition handling failed"
                    );
                }
            }
        }
        Ok(())
    }

    /// Handle one transition. Returns whether it may be acked.
    async fn handle(&self, event: &TransitionEvent) -> Result<bool, PipelineError> {
        if let Some(change) = event.drive_change() {
            return self.handle_drive(event, change).await;
        }
        if let Some(change) = event.vehicle_change() {
            return self.handle_vehicle(event, change).await;
        }
        // Deletions and undecodable payloads have nothing to dispatch.
        Ok(true)
    }

    async fn handle_drive(
        &self,
        event: &TransitionEvent,
        change: DriveChange,
    ) -> Result<bool, PipelineError> {
        // Guards read the current row where one exists: a redelivered
        // transition carries a stale snapshot from before the components
        // wrote their markers.
        let after = DriveRepo::find(&self.pool, &event.user_id, &event.vehicle_id, &event.doc_id)
            .await?
            .map(|row| row.to_doc())
            .unwrap_or(change.after);
        let before = change.before.as_ref();

        let analyze = guards::needs_analysis(before, &after);
        let match_route = guards::needs_route_match(before, &after);
        let convert = guards::needs_columnar(before, &after);
        if !analyze && !match_route && !convert {
            return Ok(true);
        }
        tracing::debug!(
            transition_id = event.id,
            doc_id = %event.doc_id,
            analyze,
            match_route,
            convert,
            "Dispatching drive transition"
        );

        let (analyzed, matched, converted) = tokio::join!(
            run_if(
                analyze,
                self.analyzer
                    .analyze(&event.user_id, &event.vehicle_id, &event.doc_id, &after),
            ),
            run_if(
                match_route,
                self.route_matcher
                    .match_drive(&event.user_id, &event.vehicle_id, &event.doc_id, &after),
            ),
            run_if(
                convert,
                self.converter
                    .convert(&event.user_id, &event.vehicle_id, &event.doc_id, &after),
            ),
        );

        let mut acked = true;
        if let Err(err) = analyzed {
            tracing::error!(transition_id = event.id, error = %err, "Drive analysis did not settle");
            acked = false;
        }
        if let Err(err) = matched {
            tracing::error!(transition_id = event.id, error = %err, "Route matching did not settle");
            acked = false;
        }
        if let Err(err) = converted {
            tracing::error!(transition_id = event.id, error = %err, "Parquet conversion did not settle");
            acked = false;
        }
        Ok(acked)
    }

    async fn handle_vehicle(
        &self,
        event: &TransitionEvent,
        change: VehicleChange,
    ) -> Result<bool, PipelineError> {
        let after = VehicleRepo::find(&self.pool, &event.user_id, &event.doc_id)
            .await?
            .map(|row| row.to_doc())
            .unwrap_or(change.after);

        if !guards::needs_vin_decode(change.before.as_ref(), &after) {
            return Ok(true);
        }
        tracing::debug!(
            transition_id = event.id,
            doc_id = %event.doc_id,
            "Dispatching vehicle transition"
        );

        self.vin_decoder
            .decode(&event.user_id, &event.doc_id, &after)
            .await?;
        Ok(true)
    }
}

async fn run_if(
    fire: bool,
    task: impl Future<Output = Result<(), PipelineError>>,
) -> Result<(), PipelineError> {
    if fire {
        task.await
    } else {
        Ok(())
    }
}
