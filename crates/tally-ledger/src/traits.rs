use std::collections::BTreeMap;

use tally_types::{Commission, CommissionEntry, CommissionOptions, Holder, Holding, Resolution};

use crate::error::LedgerResult;
use crate::usage::ResourceUsage;

/// Write boundary for quota ledger mutations.
pub trait QuotaWriter: Send + Sync {
    /// Register an accountable entity. Idempotent at-least-once: re-creating
    /// an existing entity with the same owner and key succeeds without
    /// effect; any other registration conflicts.
    fn create_entity(&self, entity: &str, owner: &str, key: &str) -> LedgerResult<()>;

    /// Set declared limits for a holder. Never touches `quantity`. Capacity
    /// must not exceed either transfer limit.
    fn set_quota(
        &self,
        holder: &Holder,
        capacity: i64,
        import_limit: i64,
        export_limit: i64,
    ) -> LedgerResult<()>;

    /// Atomically apply a commission under `serial`: `sub` entries decrement
    /// quantity, `add` entries increment it. All-or-nothing: any bound
    /// violation without force rejects the whole commission with the
    /// offending entries. On success the commission is provisional under
    /// `serial` (or terminal at once when `auto_accept` is set).
    fn apply(
        &self,
        serial: u64,
        sub: &[CommissionEntry],
        add: &[CommissionEntry],
        opts: &CommissionOptions,
    ) -> LedgerResult<()>;

    /// Resolve serials: accept commits provisional deltas, reject undoes
    /// them. Terminal serials re-resolved with the same outcome are
    /// idempotent; conflicts and unknowns land in `failed`.
    fn resolve_serials(&self, accept: &[u64], reject: &[u64]) -> LedgerResult<Resolution>;
}

/// Read boundary for quota ledger queries.
pub trait QuotaReader: Send + Sync {
    /// Declared limits for each known holder in `holders`.
    fn get_quota(&self, holders: &[Holder]) -> LedgerResult<BTreeMap<Holder, Holding>>;

    /// Holdings with live quantity for each known holder in `holders`.
    fn get_holding(&self, holders: &[Holder]) -> LedgerResult<BTreeMap<Holder, Holding>>;

    /// The subset of `serials` still provisional, for crash recovery.
    fn query_serials(&self, serials: &[u64]) -> LedgerResult<Vec<u64>>;

    /// All provisional serials, ascending.
    fn pending_serials(&self) -> LedgerResult<Vec<u64>>;

    /// Detail of one provisional commission; `None` once terminal or unknown.
    fn pending_commission(&self, serial: u64) -> LedgerResult<Option<Commission>>;

    /// Per-resource committed usage and in-flight pending delta for `entity`.
    fn usage_of(&self, entity: &str) -> LedgerResult<BTreeMap<String, ResourceUsage>>;

    /// All registered entities, ascending.
    fn entities(&self) -> LedgerResult<Vec<String>>;
}
