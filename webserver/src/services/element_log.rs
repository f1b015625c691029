//! Durable element log backed by redb
//!
//! Three tables:
//! - `elements`: entry id -> JSON-encoded element, ordered by id
//! - `sentinel`: `update` -> id of the latest append
//! - `meta`: `schema_version` -> persisted layout version
//!
//! An append writes the entry and the sentinel in one write transaction, so a
//! committed entry always comes with its sentinel bump. redb allows a single
//! writer at a time, which makes `last id + 1` a collision-free counter.
//! Change notification is an in-process `watch` channel fired after commit.

use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::backends::InMemoryBackend;
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use tokio::sync::watch;

use shared::{Element, ProcessRole, process_debug, process_info};
use crate::error::{WebServerError, WebServerResult};
use crate::traits::ElementLog;
use crate::types::{EMPTY_WATERMARK, EntryId, LogEntry, SchemaStatus};

const ELEMENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("elements");
const SENTINEL: TableDefinition<&str, u64> = TableDefinition::new("sentinel");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const SENTINEL_KEY: &str = "update";
const SCHEMA_KEY: &str = "schema_version";

/// redb-backed implementation of [`ElementLog`]
#[derive(Clone)]
pub struct RedbElementLog {
    db: Arc<Database>,
    changes: Arc<watch::Sender<EntryId>>,
}

impl RedbElementLog {
    /// Open or create the store at `path`
    pub fn open(path: impl AsRef<Path>) -> WebServerResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(path).map_err(WebServerError::storage)?;
        process_info!(ProcessRole::current(), "🗄️ Opened element store at {}", path.display());
        Self::from_database(db)
    }

    /// Store that lives only as long as this value (tests, throwaway servers)
    pub fn in_memory() -> WebServerResult<Self> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .map_err(WebServerError::storage)?;
        Self::from_database(db)
    }

    fn from_database(db: Database) -> WebServerResult<Self> {
        init_tables(&db)?;
        let latest = latest_id(&db)?;
        let (changes, _) = watch::channel(latest);

        Ok(Self {
            db: Arc::new(db),
            changes: Arc::new(changes),
        })
    }

    /// Run a blocking store operation off the async workers
    async fn blocking<T, F>(&self, op: F) -> WebServerResult<T>
    where
        F: FnOnce(&Database) -> WebServerResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(|e| WebServerError::storage(format!("store task failed: {e}")))?
    }

    /// Compare the persisted schema marker with `expected`
    pub async fn schema_status(&self, expected: u64) -> WebServerResult<SchemaStatus> {
        self.blocking(move |db| {
            let txn = db.begin_read().map_err(WebServerError::storage)?;
            let meta = txn.open_table(META).map_err(WebServerError::storage)?;
            let found = meta
                .get(SCHEMA_KEY)
                .map_err(WebServerError::storage)?
                .map(|v| v.value());

            Ok(match found {
                None => SchemaStatus::Missing,
                Some(found) if found == expected => SchemaStatus::Current,
                Some(found) => SchemaStatus::Mismatch { found, expected },
            })
        })
        .await
    }

    /// Persist the schema marker
    pub async fn write_schema_version(&self, version: u64) -> WebServerResult<()> {
        self.blocking(move |db| {
            let txn = db.begin_write().map_err(WebServerError::storage)?;
            {
                let mut meta = txn.open_table(META).map_err(WebServerError::storage)?;
                meta.insert(SCHEMA_KEY, version).map_err(WebServerError::storage)?;
            }
            txn.commit().map_err(WebServerError::storage)
        })
        .await
    }

    /// Drop every table and start over with an empty store
    pub async fn wipe(&self) -> WebServerResult<()> {
        self.blocking(|db| {
            let txn = db.begin_write().map_err(WebServerError::storage)?;
            txn.delete_table(ELEMENTS).map_err(WebServerError::storage)?;
            txn.delete_table(SENTINEL).map_err(WebServerError::storage)?;
            txn.delete_table(META).map_err(WebServerError::storage)?;
            txn.commit().map_err(WebServerError::storage)?;
            init_tables(db)
        })
        .await?;

        self.changes.send_replace(EMPTY_WATERMARK);
        process_info!(ProcessRole::current(), "🧹 Element store wiped");
        Ok(())
    }

    fn notify(&self, id: EntryId) {
        // Ids are allocated in commit order; a larger value already published
        // was sent after this commit, so its wake-up covers this entry too.
        self.changes.send_if_modified(|latest| {
            if id > *latest {
                *latest = id;
                true
            } else {
                false
            }
        });
    }
}

#[async_trait]
impl ElementLog for RedbElementLog {
    async fn append(&self, element: Element) -> WebServerResult<LogEntry> {
        let entry = self.blocking(move |db| append_entry(db, element)).await?;
        self.notify(entry.id);
        process_debug!(ProcessRole::current(), "📝 Appended entry {} ({})", entry.id, entry.element.name);
        Ok(entry)
    }

    async fn read_since(&self, watermark: EntryId) -> WebServerResult<Vec<LogEntry>> {
        self.blocking(move |db| {
            let txn = db.begin_read().map_err(WebServerError::storage)?;
            let elements = txn.open_table(ELEMENTS).map_err(WebServerError::storage)?;
            let range = elements
                .range((Bound::Excluded(watermark), Bound::Unbounded))
                .map_err(WebServerError::storage)?;

            let mut entries = Vec::new();
            for item in range {
                let (key, value) = item.map_err(WebServerError::storage)?;
                entries.push(decode_entry(key.value(), value.value())?);
            }
            Ok(entries)
        })
        .await
    }

    async fn read_all(&self) -> WebServerResult<Vec<LogEntry>> {
        self.blocking(|db| {
            let txn = db.begin_read().map_err(WebServerError::storage)?;
            let elements = txn.open_table(ELEMENTS).map_err(WebServerError::storage)?;

            let mut entries = Vec::new();
            for item in elements.iter().map_err(WebServerError::storage)? {
                let (key, value) = item.map_err(WebServerError::storage)?;
                entries.push(decode_entry(key.value(), value.value())?);
            }
            Ok(entries)
        })
        .await
    }

    async fn current_watermark(&self) -> WebServerResult<EntryId> {
        self.blocking(|db| latest_id(db)).await
    }

    async fn len(&self) -> WebServerResult<usize> {
        self.blocking(|db| {
            let txn = db.begin_read().map_err(WebServerError::storage)?;
            let elements = txn.open_table(ELEMENTS).map_err(WebServerError::storage)?;
            let count = elements.len().map_err(WebServerError::storage)?;
            Ok(count as usize)
        })
        .await
    }

    fn subscribe(&self) -> watch::Receiver<EntryId> {
        self.changes.subscribe()
    }
}

/// Create every table so read transactions never see a missing one
fn init_tables(db: &Database) -> WebServerResult<()> {
    let txn = db.begin_write().map_err(WebServerError::storage)?;
    txn.open_table(ELEMENTS).map_err(WebServerError::storage)?;
    txn.open_table(SENTINEL).map_err(WebServerError::storage)?;
    txn.open_table(META).map_err(WebServerError::storage)?;
    txn.commit().map_err(WebServerError::storage)
}

fn append_entry(db: &Database, element: Element) -> WebServerResult<LogEntry> {
    let payload = serde_json::to_vec(&element)?;

    let txn = db.begin_write().map_err(WebServerError::storage)?;
    let id = {
        let mut elements = txn.open_table(ELEMENTS).map_err(WebServerError::storage)?;
        let id = elements
            .last()
            .map_err(WebServerError::storage)?
            .map(|(key, _)| key.value() + 1)
            .unwrap_or(1);
        elements.insert(id, payload.as_slice()).map_err(WebServerError::storage)?;

        let mut sentinel = txn.open_table(SENTINEL).map_err(WebServerError::storage)?;
        sentinel.insert(SENTINEL_KEY, id).map_err(WebServerError::storage)?;
        id
    };
    txn.commit().map_err(WebServerError::storage)?;

    Ok(LogEntry { id, element })
}

/// Highest id in the store, or the sentinel if that is somehow ahead
fn latest_id(db: &Database) -> WebServerResult<EntryId> {
    let txn = db.begin_read().map_err(WebServerError::storage)?;

    let elements = txn.open_table(ELEMENTS).map_err(WebServerError::storage)?;
    let last = elements
        .last()
        .map_err(WebServerError::storage)?
        .map(|(key, _)| key.value())
        .unwrap_or(EMPTY_WATERMARK);

    let sentinel = txn.open_table(SENTINEL).map_err(WebServerError::storage)?;
    let bumped = sentinel
        .get(SENTINEL_KEY)
        .map_err(WebServerError::storage)?
        .map(|v| v.value())
        .unwrap_or(EMPTY_WATERMARK);

    Ok(last.max(bumped))
}

fn decode_entry(id: EntryId, bytes: &[u8]) -> WebServerResult<LogEntry> {
    let element: Element = serde_json::from_slice(bytes)
        .map_err(|e| WebServerError::storage(format!("corrupt entry {id}: {e}")))?;
    Ok(LogEntry { id, element })
}
