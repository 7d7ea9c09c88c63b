//! Error types shared by the MongoDB storage implementation.

use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

/// Convenient result alias returning [`MongoDaoError`] failures.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// Offending URI.
        uri: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Building the driver client failed.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The deployment never answered the initial ping.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Number of pings attempted before giving up.
        attempts: u32,
        /// Driver error from the last attempt.
        #[source]
        source: MongoError,
    },
    /// A health-check ping failed on an established connection.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Index creation failed at connect time.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection the index targets.
        collection: &'static str,
        /// Index key description.
        index: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Persisting a game document failed.
    #[error("failed to save game `{id}`")]
    SaveGame {
        /// Game id.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Reading a game document failed.
    #[error("failed to load game `{id}`")]
    LoadGame {
        /// Game id.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Persisting an organiser document failed.
    #[error("failed to save organiser `{email}`")]
    SaveOrganiser {
        /// Organiser email.
        email: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Reading an organiser document failed.
    #[error("failed to load organiser `{email}`")]
    LoadOrganiser {
        /// Organiser email.
        email: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The merge-upsert of a roster entry failed.
    #[error("failed to upsert roster entry for session `{session_id}`")]
    UpsertEntry {
        /// Checkout session id keying the entry.
        session_id: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Listing the roster of a game failed.
    #[error("failed to list roster entries for game `{game_id}`")]
    ListEntries {
        /// Game id.
        game_id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
}
