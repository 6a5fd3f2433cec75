use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use punch_types::ClockEvent;
use tracing::{debug, error, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::{newest, EventStore};

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Writer state guarded by the journal mutex.
struct JournalState {
    file: File,
    /// End of the last complete frame.
    offset: u64,
    /// A failed append left bytes past `offset` that could not be cut off yet.
    rollback_pending: bool,
    latest: Option<ClockEvent>,
    count: u64,
}

struct JournalInner {
    path: PathBuf,
    sync_every_write: bool,
    state: Mutex<JournalState>,
}

/// Append-only clock event journal on local disk.
///
/// On-disk format, one frame per event:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (JSON-serialized ClockEvent)]
/// ```
///
/// Opening the journal scans it front to back. Complete frames that fail
/// their checksum or do not decode are skipped and left in place. Only an
/// incomplete tail, left by a crash mid-append, is truncated. Appends run on
/// the blocking thread pool.
#[derive(Clone)]
pub struct JournalEventStore {
    inner: Arc<JournalInner>,
}

impl JournalEventStore {
    /// Open (or create) the journal at `path` for appending.
    ///
    /// With `sync_every_write` each append is `fsync`ed before it returns.
    /// Only one process may hold a journal open this way; readers use
    /// [`JournalEventStore::read_path`].
    pub fn open(path: &Path, sync_every_write: bool) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                    StoreError::JournalUnavailable(path.to_path_buf())
                }
                _ => StoreError::Io(e),
            })?;

        let scan = scan_frames(path)?;
        let file_len = file.metadata()?.len();
        if scan.valid_len < file_len {
            warn!(
                path = %path.display(),
                valid_len = scan.valid_len,
                file_len,
                "truncating incomplete journal tail"
            );
            file.set_len(scan.valid_len)?;
        }

        let count = scan.events.len() as u64;
        let latest = newest(&scan.events).cloned();
        info!(path = %path.display(), count, skipped = scan.skipped, "journal opened");

        Ok(Self {
            inner: Arc::new(JournalInner {
                path: path.to_path_buf(),
                sync_every_write,
                state: Mutex::new(JournalState {
                    file,
                    offset: scan.valid_len,
                    rollback_pending: false,
                    latest,
                    count,
                }),
            }),
        })
    }

    /// Read every intact event from the journal at `path`, oldest first,
    /// without opening it for writing.
    ///
    /// The file is never created or truncated, so this is safe to call while
    /// another process is appending. A frame still being written shows up as
    /// an incomplete tail and is left out.
    pub fn read_path(path: &Path) -> StoreResult<Vec<ClockEvent>> {
        Ok(scan_frames(path)?.events)
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Read every intact event from disk, oldest first.
    pub fn read_all(&self) -> StoreResult<Vec<ClockEvent>> {
        // Hold the lock so a concurrent append cannot be observed half-written.
        let _state = self.inner.state.lock().expect("journal mutex poisoned");
        Self::read_path(&self.inner.path)
    }
}

impl JournalInner {
    fn append_blocking(&self, event: &ClockEvent) -> StoreResult<()> {
        let frame = encode_frame(event)?;

        let mut state = self.state.lock().expect("journal mutex poisoned");
        if state.rollback_pending {
            let offset = state.offset;
            state.file.set_len(offset)?;
            state.rollback_pending = false;
        }

        let frame_offset = state.offset;
        if let Err(e) = self.write_frame(&mut state.file, &frame) {
            if let Err(rollback) = state.file.set_len(frame_offset) {
                error!(offset = frame_offset, error = %rollback, "journal rollback failed");
                state.rollback_pending = true;
            }
            return Err(e.into());
        }

        state.offset += frame.len() as u64;
        state.count += 1;
        if state
            .latest
            .as_ref()
            .map_or(true, |latest| event.timestamp >= latest.timestamp)
        {
            state.latest = Some(event.clone());
        }

        debug!(offset = frame_offset, len = frame.len(), id = %event.id, "journal append");
        Ok(())
    }

    fn write_frame(&self, file: &mut File, frame: &[u8]) -> io::Result<()> {
        file.write_all(frame)?;
        if self.sync_every_write {
            file.sync_data()?;
        }
        Ok(())
    }
}

fn encode_frame(event: &ClockEvent) -> StoreResult<Vec<u8>> {
    let payload = serde_json::to_vec(event)?;
    let length = u32::try_from(payload.len())
        .map_err(|_| StoreError::Serialization("event too large".into()))?;
    let crc = crc32fast::hash(&payload);

    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(&length.to_le_bytes());
    frame.extend_from_slice(&crc.to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

#[async_trait]
impl EventStore for JournalEventStore {
    async fn append(&self, event: &ClockEvent) -> StoreResult<()> {
        let inner = Arc::clone(&self.inner);
        let event = event.clone();
        tokio::task::spawn_blocking(move || inner.append_blocking(&event))
            .await
            .map_err(|e| StoreError::Unavailable(format!("journal writer task failed: {e}")))?
    }

    async fn latest(&self) -> StoreResult<Option<ClockEvent>> {
        let state = self.inner.state.lock().expect("journal mutex poisoned");
        Ok(state.latest.clone())
    }

    async fn count(&self) -> StoreResult<u64> {
        let state = self.inner.state.lock().expect("journal mutex poisoned");
        Ok(state.count)
    }
}

impl std::fmt::Debug for JournalEventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalEventStore")
            .field("path", &self.inner.path)
            .finish()
    }
}

struct Scan {
    events: Vec<ClockEvent>,
    /// End of the last complete frame, whether or not it was readable.
    valid_len: u64,
    skipped: usize,
}

/// Read frames until end of file or the first incomplete frame.
///
/// Complete frames with a bad checksum or payload are skipped.
fn scan_frames(path: &Path) -> StoreResult<Scan> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut events = Vec::new();
    let mut offset: u64 = 0;
    let mut skipped = 0;

    loop {
        let mut header = [0u8; HEADER_SIZE];
        match reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }

        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        let mut payload = vec![0u8; length as usize];
        match reader.read_exact(&mut payload) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                warn!(offset, length, "incomplete journal frame; stopping scan");
                break;
            }
            Err(e) => return Err(e.into()),
        }
        let frame_end = offset + (HEADER_SIZE + payload.len()) as u64;

        let actual = crc32fast::hash(&payload);
        if actual != expected {
            warn!(
                "{}; skipping frame",
                StoreError::CrcMismatch {
                    offset,
                    expected,
                    actual
                }
            );
            skipped += 1;
            offset = frame_end;
            continue;
        }

        match serde_json::from_slice::<ClockEvent>(&payload) {
            Ok(event) => events.push(event),
            Err(e) => {
                warn!(offset, error = %e, "undecodable journal frame; skipping");
                skipped += 1;
            }
        }
        offset = frame_end;
    }

    Ok(Scan {
        events,
        valid_len: offset,
        skipped,
    })
}
