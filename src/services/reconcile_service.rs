//! Payment-to-roster reconciliation.
//!
//! Two entry points (the processor's webhook push and the player's
//! post-redirect confirmation) converge on one code path that commits a
//! verified paid session onto the roster exactly once. Neither path trusts
//! anything the triggering request claims about the payment: the webhook
//! payload is authenticated by signature, and the redirect's success flag
//! only prompts a server-side re-check of the session's paid status.

use std::time::SystemTime;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::models::{GameEntity, RosterEntryEntity},
    dto::join::{ConfirmRequest, ConfirmResponse},
    error::ServiceError,
    payments::{
        types::{CheckoutSession, PaymentStatus},
        webhook::{self, CHECKOUT_SESSION_COMPLETED, WebhookEvent},
    },
    services::{occupancy_service, sse_service},
    state::SharedState,
};

/// Handle the player's browser returning from checkout.
///
/// Safe to call any number of times for the same session: replays are
/// idempotent no-ops with respect to roster-count effects.
pub async fn confirm_return(
    state: &SharedState,
    request: ConfirmRequest,
) -> Result<ConfirmResponse, ServiceError> {
    let session = state
        .payments()
        .retrieve_session(request.session_id.clone())
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "checkout session `{}` not found",
                request.session_id
            ))
        })?;

    if session.payment_status != PaymentStatus::Paid {
        // Abandoned or still-pending checkout. Not an error; nothing to do.
        info!(
            session_id = %session.id,
            status = ?session.payment_status,
            "session not paid; confirmation is a no-op"
        );
        return Ok(ConfirmResponse {
            ok: true,
            reconciled: false,
        });
    }

    if let Some(claimed) = session
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.game_id.as_deref())
        && claimed != request.game_id.to_string()
    {
        warn!(
            session_id = %session.id,
            request_game = %request.game_id,
            session_game = %claimed,
            "confirmation names a different game than the session; using session metadata"
        );
    }

    reconcile_paid_session(state, session).await?;
    Ok(ConfirmResponse {
        ok: true,
        reconciled: true,
    })
}

/// Handle an asynchronous webhook delivery.
///
/// The raw body must authenticate against the shared secret before anything
/// else happens; on failure no state changes anywhere.
pub async fn process_webhook(
    state: &SharedState,
    payload: &[u8],
    signature_header: Option<&str>,
) -> Result<(), ServiceError> {
    let header = signature_header
        .ok_or_else(|| ServiceError::InvalidSignature("missing signature header".into()))?;
    webhook::verify_signature(
        payload,
        header,
        &state.config().stripe_webhook_secret,
        SystemTime::now(),
    )
    .map_err(|err| ServiceError::InvalidSignature(err.to_string()))?;

    let event: WebhookEvent = serde_json::from_slice(payload)
        .map_err(|err| ServiceError::InvalidInput(format!("malformed webhook payload: {err}")))?;

    if event.event_type != CHECKOUT_SESSION_COMPLETED {
        debug!(event_id = %event.id, event_type = %event.event_type, "ignoring webhook event type");
        return Ok(());
    }

    let session: CheckoutSession = serde_json::from_value(event.data.object).map_err(|err| {
        ServiceError::InvalidInput(format!("malformed checkout session payload: {err}"))
    })?;

    if session.payment_status != PaymentStatus::Paid {
        info!(
            session_id = %session.id,
            status = ?session.payment_status,
            "completed session not paid; taking no roster action"
        );
        return Ok(());
    }

    reconcile_paid_session(state, session).await
}

/// Commit a verified paid session onto the roster exactly once.
///
/// Identity, display name, and spot count come from the session itself,
/// never from the triggering request: request parameters are
/// attacker-controllable and may not match what was actually paid for. The
/// write is a single atomic insert-if-absent keyed by session id, so
/// webhook redelivery, refresh loops, and out-of-order arrival of the two
/// confirmation paths all collapse onto the same entry.
async fn reconcile_paid_session(
    state: &SharedState,
    session: CheckoutSession,
) -> Result<(), ServiceError> {
    let CheckoutSession {
        id: session_id,
        metadata,
        customer_details,
        ..
    } = session;

    let metadata = metadata.ok_or_else(|| {
        ServiceError::InvalidInput(format!("session `{session_id}` carries no join metadata"))
    })?;

    let game_id: Uuid = metadata
        .game_id
        .as_deref()
        .ok_or_else(|| {
            ServiceError::InvalidInput(format!("session `{session_id}` metadata has no game id"))
        })?
        .parse()
        .map_err(|_| {
            ServiceError::InvalidInput(format!(
                "session `{session_id}` metadata has a malformed game id"
            ))
        })?;

    // The name the player typed at join time, falling back to what the
    // hosted checkout page collected. Both come from the session, which is
    // the source of truth.
    let name = metadata
        .name
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .or_else(|| {
            customer_details
                .and_then(|details| details.name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        })
        .ok_or_else(|| {
            ServiceError::InvalidInput(format!("session `{session_id}` has no display name"))
        })?;

    let spots = match metadata.spots.as_deref() {
        None => 1,
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| {
                ServiceError::InvalidInput(format!(
                    "session `{session_id}` metadata has a malformed spot count"
                ))
            })?
            .max(1),
    };

    let store = state.require_game_store().await?;
    let game = store.find_game(game_id).await?.ok_or_else(|| {
        ServiceError::NotFound(format!(
            "game `{game_id}` referenced by session `{session_id}` not found"
        ))
    })?;

    let now = SystemTime::now();
    let entry = RosterEntryEntity {
        session_id,
        game_id,
        name,
        spots,
        joined_at: now,
        paid_at: now,
    };

    let inserted = store.upsert_roster_entry(entry.clone()).await?;
    if inserted {
        info!(
            %game_id,
            session_id = %entry.session_id,
            spots = entry.spots,
            "roster entry committed"
        );
        publish_roster_update(state, &game, &entry).await;
    } else {
        info!(
            %game_id,
            session_id = %entry.session_id,
            "roster entry already committed; replay ignored"
        );
    }

    Ok(())
}

async fn publish_roster_update(state: &SharedState, game: &GameEntity, entry: &RosterEntryEntity) {
    let hub = state.game_events(game.id);
    sse_service::broadcast_entry_committed(&hub, game.id, entry);
    match occupancy_service::live_occupancy(state, game.id).await {
        Ok(occupancy) => sse_service::broadcast_occupancy(&hub, game.id, occupancy),
        Err(err) => {
            warn!(game_id = %game.id, error = %err, "failed to recompute occupancy for broadcast");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::game_store::GameStore;
    use crate::{
        dao::models::GameEntity,
        payments::{fake::FakePaymentProvider, webhook::sign_for_tests},
        services::test_support::{TestHarness, harness, sample_game},
    };
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &str = "whsec_test_123";

    fn paid_event(session_id: &str, game: &GameEntity, name: &str, spots: u32) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": format!("evt_{session_id}"),
            "type": "checkout.session.completed",
            "data": {"object": {
                "id": session_id,
                "payment_status": "paid",
                "metadata": {
                    "gameId": game.id.to_string(),
                    "name": name,
                    "spots": spots.to_string(),
                },
            }},
        }))
        .unwrap()
    }

    fn signed(payload: &[u8]) -> String {
        let issued = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        sign_for_tests(payload, SECRET, issued)
    }

    async fn deliver(h: &TestHarness, payload: &[u8]) -> Result<(), ServiceError> {
        let header = signed(payload);
        process_webhook(&h.state, payload, Some(&header)).await
    }

    #[tokio::test]
    async fn webhook_redelivery_commits_exactly_one_entry() {
        let h = harness().await;
        let game = sample_game(500, 10);
        h.store.save_game(game.clone()).await.unwrap();

        let mut events = h.state.game_events(game.id).subscribe();

        let payload = paid_event("cs_1", &game, "Dani", 1);
        deliver(&h, &payload).await.unwrap();
        deliver(&h, &payload).await.unwrap();
        deliver(&h, &payload).await.unwrap();

        assert_eq!(h.store.roster_len(), 1);
        let entries = h.store.list_roster_entries(game.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].session_id, "cs_1");
        assert_eq!(entries[0].name, "Dani");

        // Exactly one commit was announced: one entry event, one occupancy
        // snapshot, nothing for the replays.
        let first = events.try_recv().unwrap();
        assert_eq!(first.event.as_deref(), Some("entry_committed"));
        let second = events.try_recv().unwrap();
        assert_eq!(second.event.as_deref(), Some("occupancy"));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn unpaid_sessions_never_reach_the_roster() {
        let h = harness().await;
        let game = sample_game(500, 10);
        h.store.save_game(game.clone()).await.unwrap();

        // The player crafted a success URL; the processor still says unpaid.
        let mut session = FakePaymentProvider::paid_session("cs_free", game.id, "Chancer", 1);
        session.payment_status = crate::payments::types::PaymentStatus::Unpaid;
        h.payments.insert_session(session);

        let response = confirm_return(
            &h.state,
            ConfirmRequest {
                session_id: "cs_free".to_owned(),
                game_id: game.id,
            },
        )
        .await
        .unwrap();

        assert!(response.ok);
        assert!(!response.reconciled);
        assert_eq!(h.store.roster_len(), 0);
    }

    #[tokio::test]
    async fn invalid_signature_changes_nothing() {
        let h = harness().await;
        let game = sample_game(500, 10);
        h.store.save_game(game.clone()).await.unwrap();

        let payload = paid_event("cs_1", &game, "Dani", 1);
        let issued = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let forged = sign_for_tests(&payload, "whsec_wrong", issued);

        let err = process_webhook(&h.state, &payload, Some(&forged))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidSignature(_)));
        assert_eq!(h.store.roster_len(), 0);

        let err = process_webhook(&h.state, &payload, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidSignature(_)));
        assert_eq!(h.store.roster_len(), 0);
    }

    #[tokio::test]
    async fn concurrent_joins_may_overshoot_capacity() {
        let h = harness().await;
        let game = sample_game(500, 1);
        h.store.save_game(game.clone()).await.unwrap();

        // Two sessions were both created while one spot remained; both
        // complete payment. The ledger accepts the overshoot rather than
        // serializing joins.
        deliver(&h, &paid_event("cs_a", &game, "Avery", 1))
            .await
            .unwrap();
        deliver(&h, &paid_event("cs_b", &game, "Blake", 1))
            .await
            .unwrap();

        let occupancy = occupancy_service::live_occupancy(&h.state, game.id)
            .await
            .unwrap();
        assert_eq!(occupancy.reserved, 2);
        assert_eq!(occupancy.capacity, 1);
    }

    #[tokio::test]
    async fn confirm_after_webhook_is_a_no_op() {
        let h = harness().await;
        let game = sample_game(500, 10);
        h.store.save_game(game.clone()).await.unwrap();

        // Webhook wins the race.
        deliver(&h, &paid_event("cs_1", &game, "Dani", 1))
            .await
            .unwrap();
        assert_eq!(h.store.roster_len(), 1);

        // The browser comes back later and re-confirms.
        h.payments
            .insert_session(FakePaymentProvider::paid_session("cs_1", game.id, "Dani", 1));
        let response = confirm_return(
            &h.state,
            ConfirmRequest {
                session_id: "cs_1".to_owned(),
                game_id: game.id,
            },
        )
        .await
        .unwrap();

        assert!(response.ok);
        assert!(response.reconciled);
        assert_eq!(h.store.roster_len(), 1);
    }

    #[tokio::test]
    async fn confirm_before_webhook_converges_on_one_entry() {
        let h = harness().await;
        let game = sample_game(500, 10);
        h.store.save_game(game.clone()).await.unwrap();

        h.payments
            .insert_session(FakePaymentProvider::paid_session("cs_1", game.id, "Dani", 2));
        confirm_return(
            &h.state,
            ConfirmRequest {
                session_id: "cs_1".to_owned(),
                game_id: game.id,
            },
        )
        .await
        .unwrap();

        deliver(&h, &paid_event("cs_1", &game, "Dani", 2))
            .await
            .unwrap();

        let entries = h.store.list_roster_entries(game.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].spots, 2);
    }

    #[tokio::test]
    async fn unrelated_event_types_are_acknowledged_without_action() {
        let h = harness().await;
        let payload = serde_json::to_vec(&json!({
            "id": "evt_refund",
            "type": "charge.refunded",
            "data": {"object": {"id": "ch_1"}},
        }))
        .unwrap();

        deliver(&h, &payload).await.unwrap();
        assert_eq!(h.store.roster_len(), 0);
    }

    #[tokio::test]
    async fn completed_session_without_game_metadata_is_rejected() {
        let h = harness().await;
        let payload = serde_json::to_vec(&json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {"object": {
                "id": "cs_orphan",
                "payment_status": "paid",
                "metadata": {"name": "Dani"},
            }},
        }))
        .unwrap();

        let err = deliver(&h, &payload).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(h.store.roster_len(), 0);
    }

    #[tokio::test]
    async fn confirm_reports_unknown_sessions() {
        let h = harness().await;
        let err = confirm_return(
            &h.state,
            ConfirmRequest {
                session_id: "cs_missing".to_owned(),
                game_id: uuid::Uuid::new_v4(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn paid_timestamp_survives_replays() {
        let h = harness().await;
        let game = sample_game(500, 10);
        h.store.save_game(game.clone()).await.unwrap();

        let payload = paid_event("cs_1", &game, "Dani", 1);
        deliver(&h, &payload).await.unwrap();
        let first = h.store.list_roster_entries(game.id).await.unwrap()[0].clone();

        deliver(&h, &payload).await.unwrap();
        let second = h.store.list_roster_entries(game.id).await.unwrap()[0].clone();
        assert_eq!(first.paid_at, second.paid_at);
        assert_eq!(first.joined_at, second.joined_at);
    }
}
