use tracing::info;
use validator::Validate;

use crate::{
    dto::join::{JoinRequest, JoinResponse},
    error::ServiceError,
    payments::{PaymentError, types::CreateSessionParams},
    state::SharedState,
};

/// Spots claimed when the caller does not ask for a specific count.
const DEFAULT_SPOTS: u32 = 1;
/// Upper bound on spots per checkout session.
const MAX_SPOTS: u32 = 10;

/// Start the paid-join flow for a game.
///
/// Creates a processor checkout session scoped to this game/player pair and
/// returns its redirect URL. The session's metadata is the only channel
/// through which reconciliation later learns who joined; no roster entry is
/// written here and no money moves until the player completes checkout.
pub async fn initiate_join(
    state: &SharedState,
    request: JoinRequest,
) -> Result<JoinResponse, ServiceError> {
    request.validate()?;

    let store = state.require_game_store().await?;
    let game = store
        .find_game(request.game_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{}` not found", request.game_id)))?;

    if game.price.is_zero() {
        return Err(ServiceError::InvalidInput(
            "game has no positive price; there is nothing to pay for".into(),
        ));
    }

    // The routing target was snapshotted at creation; its enablement is
    // re-checked per join because onboarding can regress processor-side.
    let account = state
        .payments()
        .retrieve_account(game.payout_account_id.clone())
        .await?;
    if !account.payment_enabled() {
        let onboarding_url = state
            .payments()
            .create_onboarding_link(
                account.id.clone(),
                state.config().onboarding_refresh_url(),
                state.config().onboarding_return_url(&account.id),
            )
            .await
            .ok();
        return Err(ServiceError::NotOnboarded { onboarding_url });
    }

    let name = request.name.trim().to_owned();
    let spots = request.spots.unwrap_or(DEFAULT_SPOTS).clamp(1, MAX_SPOTS);
    let params = CreateSessionParams {
        game_id: game.id,
        display_name: name.clone(),
        spots,
        amount: game.price,
        currency: game.currency.clone(),
        product_name: game.title.clone(),
        destination_account: game.payout_account_id.clone(),
        idempotency_key: format!("join:{}:{}:{}", game.id, name, game.price.minor_units()),
        success_url: state.config().join_success_url(game.id),
        cancel_url: state.config().join_cancel_url(game.id),
    };

    let session = state.payments().create_checkout_session(params).await?;
    info!(game_id = %game.id, session_id = %session.id, spots, "checkout session created");

    let redirect_url = session
        .url
        .ok_or(ServiceError::Upstream(PaymentError::MissingRedirectUrl {
            id: session.id,
        }))?;
    Ok(JoinResponse { redirect_url })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::game_store::GameStore;
    use crate::services::test_support::{harness, sample_game};
    use uuid::Uuid;

    fn join(game_id: Uuid, name: &str, spots: Option<u32>) -> JoinRequest {
        JoinRequest {
            game_id,
            name: name.to_owned(),
            spots,
        }
    }

    #[tokio::test]
    async fn returns_a_redirect_and_attaches_join_metadata() {
        let h = harness().await;
        let game = sample_game(500, 10);
        h.store.save_game(game.clone()).await.unwrap();
        h.payments.insert_account("acct_org", true, true);

        let response = initiate_join(&h.state, join(game.id, "  Dani ", None))
            .await
            .unwrap();
        assert!(response.redirect_url.starts_with("https://checkout.test/"));

        let created = h.payments.created_sessions();
        assert_eq!(created.len(), 1);
        let params = &created[0];
        assert_eq!(params.game_id, game.id);
        assert_eq!(params.display_name, "Dani");
        assert_eq!(params.spots, 1);
        assert_eq!(params.amount.minor_units(), 500);
        assert_eq!(params.destination_account, "acct_org");
        assert_eq!(
            params.idempotency_key,
            format!("join:{}:Dani:500", game.id)
        );
        assert!(params.success_url.contains("{CHECKOUT_SESSION_ID}"));
    }

    #[tokio::test]
    async fn clamps_the_spot_count() {
        let h = harness().await;
        let game = sample_game(500, 10);
        h.store.save_game(game.clone()).await.unwrap();
        h.payments.insert_account("acct_org", true, true);

        initiate_join(&h.state, join(game.id, "Dani", Some(99)))
            .await
            .unwrap();
        assert_eq!(h.payments.created_sessions()[0].spots, MAX_SPOTS);
    }

    #[tokio::test]
    async fn refuses_with_an_onboarding_link_when_payouts_are_disabled() {
        let h = harness().await;
        let game = sample_game(500, 10);
        h.store.save_game(game.clone()).await.unwrap();
        h.payments.insert_account("acct_org", true, false);

        let err = initiate_join(&h.state, join(game.id, "Dani", None))
            .await
            .unwrap_err();
        match err {
            ServiceError::NotOnboarded { onboarding_url } => {
                let url = onboarding_url.expect("remediation link present");
                assert!(!url.is_empty());
                assert!(url.contains("acct_org"));
            }
            other => panic!("expected NotOnboarded, got {other:?}"),
        }
        assert!(h.payments.created_sessions().is_empty());
    }

    #[tokio::test]
    async fn still_refuses_when_no_remediation_link_can_be_minted() {
        let h = harness().await;
        let game = sample_game(500, 10);
        h.store.save_game(game.clone()).await.unwrap();
        h.payments.insert_account("acct_org", false, false);
        h.payments.fail_onboarding_links();

        let err = initiate_join(&h.state, join(game.id, "Dani", None))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::NotOnboarded {
                onboarding_url: None
            }
        ));
    }

    #[tokio::test]
    async fn reports_a_missing_game() {
        let h = harness().await;
        let err = initiate_join(&h.state, join(Uuid::new_v4(), "Dani", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn rejects_a_blank_display_name() {
        let h = harness().await;
        let game = sample_game(500, 10);
        h.store.save_game(game.clone()).await.unwrap();

        let err = initiate_join(&h.state, join(game.id, "   ", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
