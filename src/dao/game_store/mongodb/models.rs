use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    dao::models::{GameEntity, OrganiserEntity, RosterEntryEntity},
    money::Price,
};

/// Persistent shape of a game in the `games` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    title: String,
    scheduled_at: Option<DateTime>,
    location: Option<String>,
    price_minor: i64,
    currency: String,
    capacity: u32,
    organiser_email: String,
    payout_account_id: String,
    created_at: DateTime,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            title: value.title,
            scheduled_at: value.scheduled_at.map(DateTime::from_system_time),
            location: value.location,
            price_minor: value.price.minor_units(),
            currency: value.currency,
            capacity: value.capacity,
            organiser_email: value.organiser_email,
            payout_account_id: value.payout_account_id,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: value.id,
            title: value.title,
            scheduled_at: value.scheduled_at.map(DateTime::to_system_time),
            location: value.location,
            price: Price::from_minor_units(value.price_minor),
            currency: value.currency,
            capacity: value.capacity,
            organiser_email: value.organiser_email,
            payout_account_id: value.payout_account_id,
            created_at: value.created_at.to_system_time(),
        }
    }
}

/// Persistent shape of a roster entry in the `roster` collection.
///
/// The checkout session id is the document id, so redelivered confirmations
/// address the same document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRosterDocument {
    #[serde(rename = "_id")]
    session_id: String,
    game_id: Uuid,
    name: String,
    spots: u32,
    joined_at: DateTime,
    paid_at: DateTime,
}

impl From<RosterEntryEntity> for MongoRosterDocument {
    fn from(value: RosterEntryEntity) -> Self {
        Self {
            session_id: value.session_id,
            game_id: value.game_id,
            name: value.name,
            spots: value.spots,
            joined_at: DateTime::from_system_time(value.joined_at),
            paid_at: DateTime::from_system_time(value.paid_at),
        }
    }
}

impl From<MongoRosterDocument> for RosterEntryEntity {
    fn from(value: MongoRosterDocument) -> Self {
        Self {
            session_id: value.session_id,
            game_id: value.game_id,
            name: value.name,
            spots: value.spots,
            joined_at: value.joined_at.to_system_time(),
            paid_at: value.paid_at.to_system_time(),
        }
    }
}

/// Persistent shape of an organiser in the `organisers` collection, keyed by
/// lowercased email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoOrganiserDocument {
    #[serde(rename = "_id")]
    email: String,
    payout_account_id: Option<String>,
    created_at: DateTime,
}

impl From<OrganiserEntity> for MongoOrganiserDocument {
    fn from(value: OrganiserEntity) -> Self {
        Self {
            email: value.email,
            payout_account_id: value.payout_account_id,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl From<MongoOrganiserDocument> for OrganiserEntity {
    fn from(value: MongoOrganiserDocument) -> Self {
        Self {
            email: value.email,
            payout_account_id: value.payout_account_id,
            created_at: value.created_at.to_system_time(),
        }
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}
