use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

use chrono::Utc;
use tracing::debug;

use tally_types::{
    AdjustError, Commission, CommissionEntry, CommissionOptions, CommissionStatus, Holder, Holding,
    Resolution,
};

use crate::error::{LedgerError, LedgerResult};
use crate::traits::{QuotaReader, QuotaWriter};
use crate::usage::ResourceUsage;

/// In-memory quota ledger for tests, local demos, and embedding.
///
/// All writer operations take the single state lock for their full duration,
/// so the capacity check and the mutation of any holding are atomic with
/// respect to every other commission.
pub struct InMemoryQuotaLedger {
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    entities: HashMap<String, EntityRecord>,
    holdings: BTreeMap<Holder, Holding>,
    pending: BTreeMap<u64, Commission>,
    terminal: HashMap<u64, CommissionStatus>,
}

struct EntityRecord {
    owner: String,
    key: String,
}

impl InMemoryQuotaLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
        }
    }

    fn read(&self) -> LedgerResult<std::sync::RwLockReadGuard<'_, LedgerState>> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write(&self) -> LedgerResult<std::sync::RwLockWriteGuard<'_, LedgerState>> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }
}

impl Default for InMemoryQuotaLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerState {
    /// Resolve a holder to its current holding, checking that the entity is
    /// registered and the key matches its partition.
    fn holding_of(&self, holder: &Holder) -> LedgerResult<Holding> {
        let entity = self
            .entities
            .get(&holder.entity)
            .ok_or_else(|| LedgerError::UnknownHolder(holder.to_string()))?;
        if entity.key != holder.key {
            return Err(LedgerError::UnknownHolder(holder.to_string()));
        }
        Ok(self.holdings.get(holder).copied().unwrap_or_default())
    }

    /// Net provisional delta per holder, from all pending commissions.
    fn pending_deltas(&self) -> BTreeMap<Holder, i64> {
        let mut deltas: BTreeMap<Holder, i64> = BTreeMap::new();
        for commission in self.pending.values() {
            for entry in &commission.add {
                *deltas.entry(entry.holder.clone()).or_default() += entry.quantity;
            }
            for entry in &commission.sub {
                *deltas.entry(entry.holder.clone()).or_default() -= entry.quantity;
            }
        }
        deltas
    }

    /// Undo a commission's deltas, restoring every holding to its
    /// pre-commission quantity. Stages the full inverse first so a failure
    /// leaves state untouched.
    fn revert(&mut self, commission: &Commission) -> Result<(), AdjustError> {
        let mut staged: BTreeMap<Holder, i64> = BTreeMap::new();
        for (entries, sign) in [(&commission.sub, 1i64), (&commission.add, -1i64)] {
            for entry in entries {
                let current = match staged.get(&entry.holder) {
                    Some(q) => *q,
                    None => self
                        .holdings
                        .get(&entry.holder)
                        .copied()
                        .unwrap_or_default()
                        .quantity,
                };
                let delta = sign
                    .checked_mul(entry.quantity)
                    .ok_or(AdjustError::Overflow)?;
                let next = current.checked_add(delta).ok_or(AdjustError::Overflow)?;
                staged.insert(entry.holder.clone(), next);
            }
        }
        for (holder, quantity) in staged {
            self.holdings.entry(holder).or_default().quantity = quantity;
        }
        Ok(())
    }
}

impl QuotaWriter for InMemoryQuotaLedger {
    fn create_entity(&self, entity: &str, owner: &str, key: &str) -> LedgerResult<()> {
        let mut state = self.write()?;
        match state.entities.get(entity) {
            Some(existing) if existing.owner == owner && existing.key == key => Ok(()),
            Some(_) => Err(LedgerError::EntityExists(entity.to_string())),
            None => {
                state.entities.insert(
                    entity.to_string(),
                    EntityRecord {
                        owner: owner.to_string(),
                        key: key.to_string(),
                    },
                );
                debug!(entity, owner, "entity registered");
                Ok(())
            }
        }
    }

    fn set_quota(
        &self,
        holder: &Holder,
        capacity: i64,
        import_limit: i64,
        export_limit: i64,
    ) -> LedgerResult<()> {
        // Capacity is bounded by what can flow in and out.
        if capacity < 0
            || import_limit < 0
            || export_limit < 0
            || capacity > import_limit
            || capacity > export_limit
        {
            return Err(LedgerError::InvalidLimits {
                capacity,
                import_limit,
                export_limit,
            });
        }

        let mut state = self.write()?;
        if !state.entities.contains_key(&holder.entity) {
            return Err(LedgerError::UnknownEntity(holder.entity.clone()));
        }

        let holding = state.holdings.entry(holder.clone()).or_default();
        holding.capacity = capacity;
        holding.import_limit = import_limit;
        holding.export_limit = export_limit;
        debug!(%holder, capacity, "quota set");
        Ok(())
    }

    fn apply(
        &self,
        serial: u64,
        sub: &[CommissionEntry],
        add: &[CommissionEntry],
        opts: &CommissionOptions,
    ) -> LedgerResult<()> {
        let mut state = self.write()?;
        if state.pending.contains_key(&serial) || state.terminal.contains_key(&serial) {
            return Err(LedgerError::SerialInUse(serial));
        }

        // Stage every delta against a scratch copy; nothing is mutated until
        // the whole commission is known to pass.
        let mut staged: BTreeMap<Holder, Holding> = BTreeMap::new();
        let mut rejected: Vec<CommissionEntry> = Vec::new();

        for (entries, sign) in [(sub, -1i64), (add, 1i64)] {
            for entry in entries {
                let mut holding = match staged.get(&entry.holder) {
                    Some(h) => *h,
                    None => state.holding_of(&entry.holder)?,
                };
                let delta = match sign.checked_mul(entry.quantity) {
                    Some(d) => d,
                    None => {
                        rejected.push(entry.clone());
                        continue;
                    }
                };
                match holding.adjusted(delta, opts.force) {
                    Ok(next) => {
                        holding.quantity = next;
                        staged.insert(entry.holder.clone(), holding);
                    }
                    Err(_) => rejected.push(entry.clone()),
                }
            }
        }

        if !rejected.is_empty() {
            debug!(serial, violations = rejected.len(), "commission rejected");
            return Err(LedgerError::Rejected(rejected));
        }

        for (holder, holding) in staged {
            state.holdings.insert(holder, holding);
        }

        let status = if opts.auto_accept {
            CommissionStatus::Accepted
        } else {
            CommissionStatus::Provisional
        };
        let commission = Commission {
            serial,
            name: opts.name.clone(),
            force: opts.force,
            auto_accept: opts.auto_accept,
            sub: sub.to_vec(),
            add: add.to_vec(),
            issued_at: Utc::now(),
            status,
        };

        if opts.auto_accept {
            state.terminal.insert(serial, CommissionStatus::Accepted);
        } else {
            state.pending.insert(serial, commission);
        }
        debug!(serial, auto_accept = opts.auto_accept, "commission applied");
        Ok(())
    }

    fn resolve_serials(&self, accept: &[u64], reject: &[u64]) -> LedgerResult<Resolution> {
        let mut state = self.write()?;

        let accept_set: HashSet<u64> = accept.iter().copied().collect();
        let reject_set: HashSet<u64> = reject.iter().copied().collect();
        let conflicting: HashSet<u64> = accept_set.intersection(&reject_set).copied().collect();

        let mut resolution = Resolution::default();

        for &serial in &accept_set {
            if conflicting.contains(&serial) {
                continue;
            }
            match (state.pending.remove(&serial), state.terminal.get(&serial)) {
                (Some(_), _) => {
                    state.terminal.insert(serial, CommissionStatus::Accepted);
                    resolution.accepted.push(serial);
                }
                (None, Some(CommissionStatus::Accepted)) => resolution.accepted.push(serial),
                _ => resolution.failed.push(serial),
            }
        }

        for &serial in &reject_set {
            if conflicting.contains(&serial) {
                continue;
            }
            match state.pending.remove(&serial) {
                Some(commission) => {
                    if state.revert(&commission).is_err() {
                        // Inverse delta of a checked apply cannot overflow;
                        // if state was forced out of range, surface the
                        // serial as failed and keep the commission pending.
                        state.pending.insert(serial, commission);
                        resolution.failed.push(serial);
                        continue;
                    }
                    state.terminal.insert(serial, CommissionStatus::Rejected);
                    resolution.rejected.push(serial);
                }
                None => match state.terminal.get(&serial) {
                    Some(CommissionStatus::Rejected) => resolution.rejected.push(serial),
                    _ => resolution.failed.push(serial),
                },
            }
        }

        resolution.failed.extend(conflicting);

        resolution.accepted.sort_unstable();
        resolution.rejected.sort_unstable();
        resolution.failed.sort_unstable();
        resolution.failed.dedup();
        debug!(
            accepted = resolution.accepted.len(),
            rejected = resolution.rejected.len(),
            failed = resolution.failed.len(),
            "serials resolved"
        );
        Ok(resolution)
    }
}

impl QuotaReader for InMemoryQuotaLedger {
    fn get_quota(&self, holders: &[Holder]) -> LedgerResult<BTreeMap<Holder, Holding>> {
        let state = self.read()?;
        let mut out = BTreeMap::new();
        for holder in holders {
            if let Some(holding) = state.holdings.get(holder) {
                let mut declared = *holding;
                declared.quantity = 0;
                out.insert(holder.clone(), declared);
            }
        }
        Ok(out)
    }

    fn get_holding(&self, holders: &[Holder]) -> LedgerResult<BTreeMap<Holder, Holding>> {
        let state = self.read()?;
        let mut out = BTreeMap::new();
        for holder in holders {
            if let Some(holding) = state.holdings.get(holder) {
                out.insert(holder.clone(), *holding);
            }
        }
        Ok(out)
    }

    fn query_serials(&self, serials: &[u64]) -> LedgerResult<Vec<u64>> {
        let state = self.read()?;
        let mut pending: Vec<u64> = serials
            .iter()
            .copied()
            .filter(|s| state.pending.contains_key(s))
            .collect();
        pending.sort_unstable();
        pending.dedup();
        Ok(pending)
    }

    fn pending_serials(&self) -> LedgerResult<Vec<u64>> {
        let state = self.read()?;
        Ok(state.pending.keys().copied().collect())
    }

    fn pending_commission(&self, serial: u64) -> LedgerResult<Option<Commission>> {
        let state = self.read()?;
        Ok(state.pending.get(&serial).cloned())
    }

    fn entities(&self) -> LedgerResult<Vec<String>> {
        let state = self.read()?;
        let mut names: Vec<String> = state.entities.keys().cloned().collect();
        names.sort_unstable();
        Ok(names)
    }

    fn usage_of(&self, entity: &str) -> LedgerResult<BTreeMap<String, ResourceUsage>> {
        let state = self.read()?;
        let deltas = state.pending_deltas();

        let mut out: BTreeMap<String, ResourceUsage> = BTreeMap::new();
        for (holder, holding) in &state.holdings {
            if holder.entity != entity {
                continue;
            }
            let pending = deltas.get(holder).copied().unwrap_or(0);
            let usage = out.entry(holder.resource.clone()).or_default();
            usage.usage += holding.quantity - pending;
            usage.pending += pending;
        }
        Ok(out)
    }
}
