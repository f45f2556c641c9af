//! Periodic eviction of participants that stopped sending heartbeats.

use std::time::Duration;

use time::OffsetDateTime;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{clock, AppResult};

use super::Participants;

/// Outcome of a single sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub evicted: Vec<String>,
    /// Stale in the snapshot, but gone or refreshed by the time of the delete.
    pub raced: Vec<String>,
    pub failed: Vec<String>,
}

impl SweepReport {
    pub fn is_quiet(&self) -> bool {
        self.evicted.is_empty() && self.raced.is_empty() && self.failed.is_empty()
    }
}

pub struct Sweeper {
    participants: Participants,
    stale_after: Duration,
    every: Duration,
}

impl Sweeper {
    pub fn new(participants: Participants, stale_after: Duration, every: Duration) -> Self {
        Sweeper {
            participants,
            stale_after,
            every,
        }
    }

    /// Snapshots the registry, then evicts each stale participant on its own.
    /// One participant failing does not stop the others.
    pub async fn sweep(&self, now: OffsetDateTime) -> AppResult<SweepReport> {
        let cutoff = now - self.stale_after;
        let cutoff_millis = clock::unix_millis(cutoff);
        let snapshot = self.participants.list().await?;

        let mut report = SweepReport::default();
        for participant in snapshot {
            if participant.last_seen > cutoff_millis {
                continue;
            }

            match self.participants.evict(&participant.name, cutoff).await {
                Ok(true) => {
                    info!(participant = %participant.name, "left the room");
                    report.evicted.push(participant.name);
                }
                Ok(false) => {
                    debug!(participant = %participant.name, "eviction lost to a concurrent change");
                    report.raced.push(participant.name);
                }
                Err(err) => {
                    warn!(participant = %participant.name, error = %err, "eviction failed");
                    report.failed.push(participant.name);
                }
            }
        }
        Ok(report)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                match self.sweep(clock::now()).await {
                    Ok(report) if report.is_quiet() => {}
                    Ok(report) => debug!(?report, "sweep finished"),
                    Err(err) => warn!(error = %err, "sweep skipped, could not read participants"),
                }
            }
        })
    }
}
