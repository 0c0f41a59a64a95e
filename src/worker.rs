//! Orchestrator worker.
//!
//! Drives one full pass over the class catalog, dispatching each descriptor
//! through the pipeline with per-descriptor failure isolation, then idles
//! until shut down. There is never more than one descriptor in flight.

use std::time::Duration;

use futures::{pin_mut, StreamExt};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::catalog::CatalogBuilder;
use crate::error::Result;
use crate::pipeline::DispatchPipeline;

/// Interval between idle-loop shutdown checks.
const IDLE_PERIOD: Duration = Duration::from_secs(1);

/// Outcome of one catalog pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub processed: usize,
    pub failed: usize,
}

pub struct Worker {
    catalog: CatalogBuilder,
    pipeline: DispatchPipeline,
}

impl Worker {
    pub fn new(catalog: CatalogBuilder, pipeline: DispatchPipeline) -> Self {
        Self { catalog, pipeline }
    }

    /// Runs one full catalog pass, then idles until `shutdown` flips.
    ///
    /// A failure while dispatching one descriptor is logged once and the
    /// pass continues with the next; one bad type never aborts the run.
    /// Shutdown is cooperative and only checked between idle iterations;
    /// an in-flight dispatch is never interrupted.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<PassSummary> {
        let summary = self.run_pass().await?;
        self.idle(shutdown).await;
        info!("worker shut down");
        Ok(summary)
    }

    /// One pass over the catalog, strictly in enumeration order.
    pub async fn run_pass(&self) -> Result<PassSummary> {
        let descriptors = self.catalog.class_descriptors()?;
        pin_mut!(descriptors);

        let mut summary = PassSummary {
            processed: 0,
            failed: 0,
        };
        while let Some(descriptor) = descriptors.next().await {
            let class_name = descriptor.class_name.clone();
            match self.pipeline.dispatch(descriptor).await {
                Ok(()) => summary.processed += 1,
                Err(err) => {
                    summary.failed += 1;
                    error!(class = %class_name, %err, "error processing class descriptor");
                }
            }
        }

        info!(
            processed = summary.processed,
            failed = summary.failed,
            "catalog pass complete"
        );
        Ok(summary)
    }

    async fn idle(&self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = tokio::time::sleep(IDLE_PERIOD) => {
                    debug!("worker idle");
                }
            }
        }
    }
}
