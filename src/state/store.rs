use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::data::{Artwork, ArtworkCollection};
use crate::error::StoreError;

/// Fixed key of the collection entry in the cache database
pub const COLLECTION_KEY: &str = "artworks";

/// The CollectionStore owns the local cache tier and the notification channel.
///
/// The cache is a single SQLite key/value entry holding the whole collection
/// as JSON. Writes replace the entry wholesale; there is no merge.
/// Subscribers receive the full collection every time [`publish`] is called.
///
/// [`publish`]: CollectionStore::publish
#[derive(Clone)]
pub struct CollectionStore {
    db_path: PathBuf,
    subscribers: Arc<Mutex<Vec<UnboundedSender<Vec<Artwork>>>>>,
}

impl CollectionStore {
    /// Open (or create) the cache database at `db_path`.
    pub fn open(db_path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        Self::init_schema(&conn)?;

        tracing::info!(path = %db_path.display(), "local cache initialized");

        Ok(Self {
            db_path,
            subscribers: Arc::new(Mutex::new(Vec::new())),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                updated_at      INTEGER NOT NULL,
                revision        INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Read the cached collection.
    ///
    /// A missing entry or an entry that does not parse is an empty
    /// collection. Only database failures are errors.
    pub async fn load(&self) -> Result<Vec<Artwork>, StoreError> {
        self.with_connection(|conn| read_collection(conn)).await
    }

    /// Append one artwork and write the whole collection back.
    /// Returns the collection as written.
    ///
    /// The read and the write share one immediate transaction, so appends
    /// from separate processes queue on the database lock instead of
    /// overwriting each other.
    pub async fn append(&self, artwork: Artwork) -> Result<Vec<Artwork>, StoreError> {
        self.with_connection(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let mut artworks = read_collection(&tx)?;
            artworks.push(artwork);
            write_collection(&tx, &artworks)?;
            tx.commit()?;
            Ok(artworks)
        })
        .await
    }

    /// Replace the cached collection with a fetched whole
    pub async fn replace(&self, artworks: Vec<Artwork>) -> Result<(), StoreError> {
        self.with_connection(move |conn| write_collection(conn, &artworks))
            .await
    }

    /// Current revision of the collection entry. Every write bumps it;
    /// a missing entry is revision 0.
    pub async fn revision(&self) -> Result<i64, StoreError> {
        self.with_connection(|conn| read_revision(conn)).await
    }

    /// Replace the collection only if nothing was written since `expected`
    /// was read. Returns whether the replace happened.
    pub async fn replace_if_unchanged(
        &self,
        artworks: Vec<Artwork>,
        expected: i64,
    ) -> Result<bool, StoreError> {
        self.with_connection(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            if read_revision(&tx)? != expected {
                return Ok(false);
            }
            write_collection(&tx, &artworks)?;
            tx.commit()?;
            Ok(true)
        })
        .await
    }

    /// Register a new subscriber for collection updates
    pub fn subscribe(&self) -> UnboundedReceiver<Vec<Artwork>> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.lock_subscribers().push(sender);
        receiver
    }

    /// Send the full collection to every live subscriber.
    ///
    /// Subscribers whose receiver was dropped are removed. Returns the number
    /// of subscribers that received the update.
    pub fn publish(&self, artworks: &[Artwork]) -> usize {
        let mut subscribers = self.lock_subscribers();
        subscribers.retain(|sender| sender.send(artworks.to_vec()).is_ok());
        subscribers.len()
    }

    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Vec<UnboundedSender<Vec<Artwork>>>> {
        // A panic while holding the lock cannot leave the Vec half-updated
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` against a fresh connection on the blocking pool.
    /// rusqlite::Connection is not Sync, so each call opens its own.
    async fn with_connection<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = Connection::open(&db_path)?;
            Self::init_schema(&conn)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn read_collection(conn: &Connection) -> Result<Vec<Artwork>, StoreError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM entries WHERE key = ?1",
            params![COLLECTION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    match ArtworkCollection::from_slice(raw.as_bytes()) {
        Ok(collection) => Ok(collection.artworks),
        Err(e) => {
            tracing::warn!(error = %e, "cached collection is corrupt, treating as empty");
            Ok(Vec::new())
        }
    }
}

fn read_revision(conn: &Connection) -> Result<i64, StoreError> {
    let revision = conn
        .query_row(
            "SELECT revision FROM entries WHERE key = ?1",
            params![COLLECTION_KEY],
            |row| row.get(0),
        )
        .optional()?;
    Ok(revision.unwrap_or(0))
}

fn write_collection(conn: &Connection, artworks: &[Artwork]) -> Result<(), StoreError> {
    let json = ArtworkCollection::new(artworks.to_vec()).to_json()?;
    conn.execute(
        "INSERT INTO entries (key, value, updated_at, revision) VALUES (?1, ?2, ?3, 1)
         ON CONFLICT(key) DO UPDATE SET
             value = excluded.value,
             updated_at = excluded.updated_at,
             revision = entries.revision + 1",
        params![COLLECTION_KEY, json, chrono::Utc::now().timestamp()],
    )?;
    tracing::debug!(count = artworks.len(), "local cache written");
    Ok(())
}

// Implement Debug for better error messages
impl std::fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}
