use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use tally_journal::PendingSerialLog;
use tally_types::{CommissionEntry, CommissionOptions};

use crate::client::LedgerClient;
use crate::error::{CoordinatorError, CoordinatorResult};

/// Tuning for resolve retries and recovery.
#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// Retries after a transient ledger failure before giving up.
    pub retry_attempts: u32,
    /// Initial backoff between retries, doubled each attempt.
    pub retry_backoff: Duration,
    /// Journaled serials still pending remotely beyond this age are rejected
    /// during recovery. Fail-safe: favor under- over over-allocation.
    pub max_pending_age: chrono::Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_backoff: Duration::from_millis(50),
            max_pending_age: chrono::Duration::minutes(15),
        }
    }
}

/// What a recovery pass did with each journaled serial.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Already terminal remotely; purged from the journal.
    pub cleared: Vec<u64>,
    /// Orphaned past the age bound; rejected and purged.
    pub rejected: Vec<u64>,
    /// Still legitimately pending on both sides.
    pub still_pending: Vec<u64>,
}

/// Client-side driver of the two-phase commission protocol.
///
/// `reserve` opens a commission and journals the serial before the caller
/// sees it; after the local side effect, `commit_local` resolves the serial
/// accept or reject. `recover` reconciles the journal against the ledger
/// after a crash or a timed-out call.
pub struct CommissionCoordinator<C: LedgerClient> {
    client: C,
    journal: PendingSerialLog,
    config: CoordinatorConfig,
}

impl<C: LedgerClient> CommissionCoordinator<C> {
    pub fn new(client: C, journal: PendingSerialLog, config: CoordinatorConfig) -> Self {
        Self {
            client,
            journal,
            config,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn journal(&self) -> &PendingSerialLog {
        &self.journal
    }

    /// Open a commission. On success the serial is journaled before this
    /// returns, so a crash between here and `commit_local` is recoverable.
    ///
    /// Each call allocates a fresh serial; a retried reserve is a new
    /// commission, reconciled like any other through the journal.
    pub fn reserve(
        &self,
        sub: &[CommissionEntry],
        add: &[CommissionEntry],
        opts: &CommissionOptions,
    ) -> CoordinatorResult<u64> {
        let serial = self.client.issue_commission(sub, add, opts)?;
        if opts.auto_accept {
            debug!(serial, "commission auto-accepted at issue");
            return Ok(serial);
        }

        if let Err(e) = self.journal.record(serial, Utc::now()) {
            // The serial exists remotely but cannot be anchored locally.
            // Release it rather than leak a provisional reservation.
            warn!(serial, error = %e, "journal append failed; releasing serial");
            let _ = self.client.resolve(&[], &[serial]);
            return Err(e.into());
        }
        debug!(serial, "commission reserved");
        Ok(serial)
    }

    /// Report the outcome of the caller's local side effect: success accepts
    /// the serial, failure rejects it. No-op for serials not journaled
    /// (auto-accepted or already resolved).
    pub fn commit_local(&self, serial: u64, succeeded: bool) -> CoordinatorResult<()> {
        if !self.journal.contains(serial) {
            return Ok(());
        }

        let (accept, reject): (&[u64], &[u64]) = if succeeded {
            (&[serial], &[])
        } else {
            (&[], &[serial])
        };
        let resolution = self.resolve_with_retry(accept, reject)?;

        if resolution.accepted.contains(&serial) || resolution.rejected.contains(&serial) {
            self.journal.clear(serial)?;
            debug!(serial, succeeded, "commission resolved");
            Ok(())
        } else {
            // Keep the serial journaled; recovery owns the ambiguity.
            Err(CoordinatorError::Conflict(serial))
        }
    }

    /// Reconcile the journal against the ledger.
    ///
    /// Serials the ledger already resolved are purged locally. Serials still
    /// pending past `max_pending_age` are rejected, then purged. Younger
    /// pending serials are left for their in-flight operation.
    pub fn recover(&self) -> CoordinatorResult<RecoveryReport> {
        let records = self.journal.list();
        let mut report = RecoveryReport::default();
        if records.is_empty() {
            return Ok(report);
        }

        let serials: Vec<u64> = records.iter().map(|r| r.serial).collect();
        let remote_pending: HashSet<u64> =
            self.client.query_serials(&serials)?.into_iter().collect();
        let now = Utc::now();

        for record in records {
            if !remote_pending.contains(&record.serial) {
                self.journal.clear(record.serial)?;
                report.cleared.push(record.serial);
            } else if now - record.issued_at > self.config.max_pending_age {
                let resolution = self.resolve_with_retry(&[], &[record.serial])?;
                if resolution.rejected.contains(&record.serial) {
                    self.journal.clear(record.serial)?;
                    report.rejected.push(record.serial);
                } else {
                    report.still_pending.push(record.serial);
                }
            } else {
                report.still_pending.push(record.serial);
            }
        }

        self.journal.compact()?;
        info!(
            cleared = report.cleared.len(),
            rejected = report.rejected.len(),
            still_pending = report.still_pending.len(),
            "recovery pass complete"
        );
        Ok(report)
    }

    fn resolve_with_retry(
        &self,
        accept: &[u64],
        reject: &[u64],
    ) -> CoordinatorResult<tally_types::Resolution> {
        let mut delay = self.config.retry_backoff;
        let mut attempt = 0;
        loop {
            match self.client.resolve(accept, reject) {
                Err(CoordinatorError::Unavailable(reason))
                    if attempt < self.config.retry_attempts =>
                {
                    attempt += 1;
                    warn!(attempt, %reason, "ledger unavailable; retrying resolve");
                    std::thread::sleep(delay);
                    delay = delay.saturating_mul(2);
                }
                other => return other,
            }
        }
    }
}
