//! Read-only projection of reserved spots vs. capacity.

use uuid::Uuid;

use crate::{
    dto::occupancy::{OccupancyResponse, RosterResponse},
    error::ServiceError,
    state::SharedState,
};

/// Live occupancy of a game.
///
/// `reserved` is always recomputed as the sum of spots over the current
/// roster rows, never read from an incremented counter, so there is no
/// read-modify-write cycle to lose updates under concurrent commits and a
/// read reflects every committed entry including just-reconciled ones.
pub async fn live_occupancy(
    state: &SharedState,
    game_id: Uuid,
) -> Result<OccupancyResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let game = store
        .find_game(game_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{game_id}` not found")))?;

    let entries = store.list_roster_entries(game_id).await?;
    let reserved = entries.iter().map(|entry| entry.spots).sum();

    Ok(OccupancyResponse {
        reserved,
        capacity: game.capacity,
    })
}

/// The committed roster of a game, ordered by join time.
pub async fn roster(state: &SharedState, game_id: Uuid) -> Result<RosterResponse, ServiceError> {
    let store = state.require_game_store().await?;
    if store.find_game(game_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("game `{game_id}` not found")));
    }

    let entries = store.list_roster_entries(game_id).await?;
    Ok(RosterResponse {
        entries: entries.into_iter().map(Into::into).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::game_store::GameStore;
    use crate::{
        dao::models::RosterEntryEntity,
        services::test_support::{harness, sample_game},
    };
    use std::time::SystemTime;

    fn entry(game_id: Uuid, session_id: &str, spots: u32) -> RosterEntryEntity {
        RosterEntryEntity {
            session_id: session_id.to_owned(),
            game_id,
            name: format!("player-{session_id}"),
            spots,
            joined_at: SystemTime::now(),
            paid_at: SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn reserved_matches_the_sum_of_spots_after_every_insert() {
        let h = harness().await;
        let game = sample_game(500, 12);
        h.store.save_game(game.clone()).await.unwrap();

        let mut expected = 0;
        for (index, spots) in [1u32, 2, 1, 3].into_iter().enumerate() {
            h.store
                .upsert_roster_entry(entry(game.id, &format!("cs_{index}"), spots))
                .await
                .unwrap();
            expected += spots;

            let occupancy = live_occupancy(&h.state, game.id).await.unwrap();
            assert_eq!(occupancy.reserved, expected);
            assert_eq!(occupancy.capacity, 12);
        }
    }

    #[tokio::test]
    async fn empty_roster_reads_as_zero_reserved() {
        let h = harness().await;
        let game = sample_game(500, 8);
        h.store.save_game(game.clone()).await.unwrap();

        let occupancy = live_occupancy(&h.state, game.id).await.unwrap();
        assert_eq!(occupancy.reserved, 0);
        assert_eq!(occupancy.capacity, 8);
    }

    #[tokio::test]
    async fn roster_lists_entries_for_the_requested_game_only() {
        let h = harness().await;
        let game = sample_game(500, 8);
        let other = sample_game(500, 8);
        h.store.save_game(game.clone()).await.unwrap();
        h.store.save_game(other.clone()).await.unwrap();

        h.store
            .upsert_roster_entry(entry(game.id, "cs_mine", 1))
            .await
            .unwrap();
        h.store
            .upsert_roster_entry(entry(other.id, "cs_theirs", 1))
            .await
            .unwrap();

        let roster = roster(&h.state, game.id).await.unwrap();
        assert_eq!(roster.entries.len(), 1);
        assert_eq!(roster.entries[0].name, "player-cs_mine");
    }

    #[tokio::test]
    async fn unknown_games_are_reported() {
        let h = harness().await;
        let err = live_occupancy(&h.state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
