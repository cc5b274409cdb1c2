use std::sync::Arc;

use tally_ledger::{
    InMemoryQuotaLedger, LedgerError, QuotaReader, QuotaWriter, SerialAllocator,
};
use tally_types::{CommissionEntry, CommissionOptions, Resolution};

use crate::error::{CoordinatorError, CoordinatorResult};

/// Transport boundary to the quota ledger.
///
/// Always an explicitly constructed, injected value — never a module-level
/// singleton. Implementations exist in-process (below) and over HTTP (the
/// server side of `tally-server`).
pub trait LedgerClient: Send + Sync {
    /// Allocate a serial and apply the commission provisionally. Returns the
    /// serial on success; `Rejected` carries the offending provisions.
    fn issue_commission(
        &self,
        sub: &[CommissionEntry],
        add: &[CommissionEntry],
        opts: &CommissionOptions,
    ) -> CoordinatorResult<u64>;

    /// Resolve serials terminally.
    fn resolve(&self, accept: &[u64], reject: &[u64]) -> CoordinatorResult<Resolution>;

    /// The subset of `serials` the ledger still holds provisional.
    fn query_serials(&self, serials: &[u64]) -> CoordinatorResult<Vec<u64>>;
}

/// Ledger client backed by an in-process [`InMemoryQuotaLedger`].
pub struct InProcessClient {
    ledger: Arc<InMemoryQuotaLedger>,
    serials: Arc<SerialAllocator>,
}

impl InProcessClient {
    pub fn new(ledger: Arc<InMemoryQuotaLedger>, serials: Arc<SerialAllocator>) -> Self {
        Self { ledger, serials }
    }

    pub fn ledger(&self) -> &Arc<InMemoryQuotaLedger> {
        &self.ledger
    }
}

impl LedgerClient for InProcessClient {
    fn issue_commission(
        &self,
        sub: &[CommissionEntry],
        add: &[CommissionEntry],
        opts: &CommissionOptions,
    ) -> CoordinatorResult<u64> {
        let serial = self.serials.next();
        match self.ledger.apply(serial, sub, add, opts) {
            Ok(()) => Ok(serial),
            Err(LedgerError::Rejected(entries)) => Err(CoordinatorError::Rejected(entries)),
            Err(e) => Err(e.into()),
        }
    }

    fn resolve(&self, accept: &[u64], reject: &[u64]) -> CoordinatorResult<Resolution> {
        Ok(self.ledger.resolve_serials(accept, reject)?)
    }

    fn query_serials(&self, serials: &[u64]) -> CoordinatorResult<Vec<u64>> {
        Ok(self.ledger.query_serials(serials)?)
    }
}
