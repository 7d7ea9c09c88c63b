use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{DateTime, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoGameDocument, MongoOrganiserDocument, MongoRosterDocument, doc_id, uuid_as_binary,
    },
};
use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, OrganiserEntity, RosterEntryEntity},
    storage::StorageResult,
};

const GAME_COLLECTION_NAME: &str = "games";
const ROSTER_COLLECTION_NAME: &str = "roster";
const ORGANISER_COLLECTION_NAME: &str = "organisers";

/// MongoDB-backed implementation of [`GameStore`].
#[derive(Clone)]
pub struct MongoGameStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoGameStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let games = database.collection::<mongodb::bson::Document>(GAME_COLLECTION_NAME);
        let by_organiser = mongodb::IndexModel::builder()
            .keys(doc! {"organiser_email": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("game_organiser_idx".to_owned()))
                    .build(),
            )
            .build();
        games
            .create_index(by_organiser)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GAME_COLLECTION_NAME,
                index: "organiser_email",
                source,
            })?;

        // Roster reads are always game-scoped and ordered by join time.
        let roster = database.collection::<mongodb::bson::Document>(ROSTER_COLLECTION_NAME);
        let by_game = mongodb::IndexModel::builder()
            .keys(doc! {"game_id": 1, "joined_at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("roster_game_idx".to_owned()))
                    .build(),
            )
            .build();
        roster
            .create_index(by_game)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: ROSTER_COLLECTION_NAME,
                index: "game_id,joined_at",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn game_collection(&self) -> Collection<MongoGameDocument> {
        self.database()
            .await
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn roster_collection(&self) -> Collection<MongoRosterDocument> {
        self.database()
            .await
            .collection::<MongoRosterDocument>(ROSTER_COLLECTION_NAME)
    }

    async fn organiser_collection(&self) -> Collection<MongoOrganiserDocument> {
        self.database()
            .await
            .collection::<MongoOrganiserDocument>(ORGANISER_COLLECTION_NAME)
    }

    async fn save_game(&self, game: GameEntity) -> MongoResult<()> {
        let id = game.id;
        let document: MongoGameDocument = game.into();
        let collection = self.game_collection().await;
        collection
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveGame { id, source })?;

        Ok(())
    }

    async fn find_game(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        let collection = self.game_collection().await;

        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;

        Ok(document.map(Into::into))
    }

    async fn save_organiser(&self, organiser: OrganiserEntity) -> MongoResult<()> {
        let email = organiser.email.clone();
        let document: MongoOrganiserDocument = organiser.into();
        let collection = self.organiser_collection().await;
        collection
            .replace_one(doc! {"_id": &email}, &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveOrganiser { email, source })?;

        Ok(())
    }

    async fn find_organiser(&self, email: String) -> MongoResult<Option<OrganiserEntity>> {
        let collection = self.organiser_collection().await;

        let document = collection
            .find_one(doc! {"_id": &email})
            .await
            .map_err(|source| MongoDaoError::LoadOrganiser { email, source })?;

        Ok(document.map(Into::into))
    }

    /// Insert-if-absent keyed by session id.
    ///
    /// `$setOnInsert` leaves an existing document untouched, so a redelivered
    /// confirmation neither duplicates the entry nor moves its timestamps.
    /// The per-document write is atomic on the server, which makes concurrent
    /// deliveries of the same session safe without any locking here.
    async fn upsert_roster_entry(&self, entry: RosterEntryEntity) -> MongoResult<bool> {
        let session_id = entry.session_id.clone();
        let collection = self.roster_collection().await;

        let update = doc! {"$setOnInsert": {
            "game_id": uuid_as_binary(entry.game_id),
            "name": &entry.name,
            "spots": entry.spots,
            "joined_at": DateTime::from_system_time(entry.joined_at),
            "paid_at": DateTime::from_system_time(entry.paid_at),
        }};

        let outcome = collection
            .update_one(doc! {"_id": &session_id}, update)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::UpsertEntry { session_id, source })?;

        Ok(outcome.upserted_id.is_some())
    }

    async fn list_roster_entries(&self, game_id: Uuid) -> MongoResult<Vec<RosterEntryEntity>> {
        let collection = self.roster_collection().await;

        let documents: Vec<MongoRosterDocument> = collection
            .find(doc! {"game_id": uuid_as_binary(game_id)})
            .sort(doc! {"joined_at": 1})
            .await
            .map_err(|source| MongoDaoError::ListEntries { game_id, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListEntries { game_id, source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }
}

impl GameStore for MongoGameStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn save_organiser(&self, organiser: OrganiserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_organiser(organiser).await.map_err(Into::into) })
    }

    fn find_organiser(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<OrganiserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_organiser(email).await.map_err(Into::into) })
    }

    fn upsert_roster_entry(
        &self,
        entry: RosterEntryEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_roster_entry(entry).await.map_err(Into::into) })
    }

    fn list_roster_entries(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<RosterEntryEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_roster_entries(game_id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
