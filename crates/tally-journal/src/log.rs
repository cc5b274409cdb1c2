use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tally_types::PendingSerialRecord;

use crate::error::{JournalError, JournalResult};

/// A single journal event.
///
/// On-disk format, per entry:
/// ```text
/// [4 bytes: entry length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized JournalEvent)]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum JournalEvent {
    Issued(PendingSerialRecord),
    Cleared { serial: u64 },
}

/// Flush/sync strategy for journal appends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// `fsync` after every append. The journal is the recovery anchor, so
    /// this is the default.
    #[default]
    EveryWrite,
    /// Rely on OS page-cache buffering (faster, less durable).
    OsDefault,
}

/// Configuration for the pending-serial journal.
#[derive(Clone, Copy, Debug, Default)]
pub struct JournalConfig {
    pub sync_mode: SyncMode,
}

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

struct LogState {
    writer: BufWriter<File>,
    live: BTreeMap<u64, PendingSerialRecord>,
}

/// Crash-durable log of issued-but-unresolved commission serials.
///
/// Appends are CRC-framed; recovery reads the segment front-to-back, folds
/// issue and clear events, and skips entries that fail the CRC check (torn
/// writes from a crash).
pub struct PendingSerialLog {
    path: PathBuf,
    config: JournalConfig,
    inner: Mutex<LogState>,
}

impl PendingSerialLog {
    /// Open (or create) a journal segment at the given path, replaying any
    /// existing events to rebuild the live set.
    pub fn open(path: &Path, config: JournalConfig) -> JournalResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // A crash mid-compaction can leave a scratch file behind; the
        // segment itself is still authoritative.
        let scratch = scratch_path(path);
        if scratch.exists() {
            warn!(path = %scratch.display(), "removing abandoned compaction scratch");
            fs::remove_file(&scratch)?;
        }

        let live = if path.exists() {
            replay(path)?
        } else {
            BTreeMap::new()
        };

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        debug!(path = %path.display(), live = live.len(), "journal opened");

        Ok(Self {
            path: path.to_path_buf(),
            config,
            inner: Mutex::new(LogState {
                writer: BufWriter::new(file),
                live,
            }),
        })
    }

    /// Record a freshly issued serial. Must complete before the serial is
    /// returned to the caller.
    pub fn record(&self, serial: u64, issued_at: DateTime<Utc>) -> JournalResult<()> {
        let mut state = self.inner.lock().expect("journal mutex poisoned");
        let record = PendingSerialRecord { serial, issued_at };
        self.append_event(&mut state.writer, &JournalEvent::Issued(record.clone()))?;
        state.live.insert(serial, record);
        Ok(())
    }

    /// Mark a serial as confirmed terminal. No-op for serials not in the
    /// live set.
    pub fn clear(&self, serial: u64) -> JournalResult<()> {
        let mut state = self.inner.lock().expect("journal mutex poisoned");
        if !state.live.contains_key(&serial) {
            return Ok(());
        }
        self.append_event(&mut state.writer, &JournalEvent::Cleared { serial })?;
        state.live.remove(&serial);
        Ok(())
    }

    /// All live records, ordered by serial.
    pub fn list(&self) -> Vec<PendingSerialRecord> {
        let state = self.inner.lock().expect("journal mutex poisoned");
        state.live.values().cloned().collect()
    }

    pub fn contains(&self, serial: u64) -> bool {
        let state = self.inner.lock().expect("journal mutex poisoned");
        state.live.contains_key(&serial)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("journal mutex poisoned").live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the segment with only live records, dropping cleared history.
    ///
    /// The rewrite goes to a scratch file that is synced and then renamed
    /// over the segment, so live records survive a crash at any point.
    pub fn compact(&self) -> JournalResult<()> {
        let mut state = self.inner.lock().expect("journal mutex poisoned");

        let scratch = scratch_path(&self.path);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&scratch)?;
        let mut writer = BufWriter::new(file);
        let records: Vec<PendingSerialRecord> = state.live.values().cloned().collect();
        for record in records {
            self.append_event(&mut writer, &JournalEvent::Issued(record))?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);

        fs::rename(&scratch, &self.path)?;
        if let Some(parent) = self.path.parent() {
            // Make the rename itself durable.
            File::open(parent)?.sync_all()?;
        }

        let file = OpenOptions::new().read(true).append(true).open(&self.path)?;
        state.writer = BufWriter::new(file);
        debug!(live = state.live.len(), "journal compacted");
        Ok(())
    }

    fn append_event(
        &self,
        writer: &mut BufWriter<File>,
        event: &JournalEvent,
    ) -> JournalResult<()> {
        let payload =
            bincode::serialize(event).map_err(|e| JournalError::Serialization(e.to_string()))?;
        let length = payload.len() as u32;
        let crc = crc32fast::hash(&payload);

        writer.write_all(&length.to_le_bytes())?;
        writer.write_all(&crc.to_le_bytes())?;
        writer.write_all(&payload)?;
        writer.flush()?;
        if matches!(self.config.sync_mode, SyncMode::EveryWrite) {
            writer.get_ref().sync_all()?;
        }
        Ok(())
    }
}

fn scratch_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".compact");
    PathBuf::from(name)
}

/// Read the segment front-to-back and fold events into the live set.
fn replay(path: &Path) -> JournalResult<BTreeMap<u64, PendingSerialRecord>> {
    let mut file = BufReader::new(File::open(path)?);
    let file_len = file.get_ref().metadata()?.len();
    let mut live = BTreeMap::new();
    let mut offset: u64 = 0;

    while offset + HEADER_SIZE as u64 <= file_len {
        file.seek(SeekFrom::Start(offset))?;

        let mut header = [0u8; HEADER_SIZE];
        match file.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }

        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        if length == 0 || (offset + HEADER_SIZE as u64 + length as u64) > file_len {
            warn!(offset, length, file_len, "invalid journal entry length; stopping replay");
            break;
        }

        let mut payload = vec![0u8; length as usize];
        match file.read_exact(&mut payload) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                warn!(offset, "truncated journal entry; stopping replay");
                break;
            }
            Err(e) => return Err(e.into()),
        }

        if crc32fast::hash(&payload) != expected_crc {
            warn!(offset, "CRC mismatch; skipping journal entry");
            offset += HEADER_SIZE as u64 + length as u64;
            continue;
        }

        match bincode::deserialize::<JournalEvent>(&payload) {
            Ok(JournalEvent::Issued(record)) => {
                live.insert(record.serial, record);
            }
            Ok(JournalEvent::Cleared { serial }) => {
                live.remove(&serial);
            }
            Err(e) => {
                warn!(offset, error = %e, "failed to deserialize journal entry; skipping");
            }
        }

        offset += HEADER_SIZE as u64 + length as u64;
    }

    debug!(live = live.len(), "journal replay complete");
    Ok(live)
}
