use std::time::SystemTime;

use tracing::info;
use validator::Validate;

use crate::{
    dao::models::OrganiserEntity,
    dto::organiser::{AccountStatusResponse, ConnectRequest, ConnectResponse},
    error::ServiceError,
    state::SharedState,
};

/// Connect an organiser to a payout account.
///
/// Reuses the stored account when one exists, creates one otherwise, and
/// always hands back a fresh onboarding link so the organiser can complete
/// any remaining requirements.
pub async fn connect_organiser(
    state: &SharedState,
    request: ConnectRequest,
) -> Result<ConnectResponse, ServiceError> {
    request.validate()?;

    let email = request.email.trim().to_lowercase();
    let store = state.require_game_store().await?;
    let existing = store.find_organiser(email.clone()).await?;

    let account_id = match existing.as_ref().and_then(|o| o.payout_account_id.clone()) {
        Some(id) => id,
        None => {
            let account = state.payments().create_account(email.clone()).await?;
            let record = OrganiserEntity {
                email: email.clone(),
                payout_account_id: Some(account.id.clone()),
                created_at: existing
                    .map(|organiser| organiser.created_at)
                    .unwrap_or_else(SystemTime::now),
            };
            store.save_organiser(record).await?;
            info!(%email, account_id = %account.id, "payout account created for organiser");
            account.id
        }
    };

    let url = state
        .payments()
        .create_onboarding_link(
            account_id.clone(),
            state.config().onboarding_refresh_url(),
            state.config().onboarding_return_url(&account_id),
        )
        .await?;
    let account = state.payments().retrieve_account(account_id).await?;

    Ok(ConnectResponse {
        account_id: account.id,
        url,
        charges_enabled: account.charges_enabled,
        payouts_enabled: account.payouts_enabled,
    })
}

/// Report the enablement status of an organiser's payout account.
pub async fn account_status(
    state: &SharedState,
    email: &str,
) -> Result<AccountStatusResponse, ServiceError> {
    let email = email.trim().to_lowercase();
    let store = state.require_game_store().await?;
    let organiser = store
        .find_organiser(email.clone())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("organiser `{email}` not found")))?;
    let account_id = organiser.payout_account_id.ok_or_else(|| {
        ServiceError::NotFound(format!("organiser `{email}` has no payout account"))
    })?;

    let account = state.payments().retrieve_account(account_id).await?;
    Ok(AccountStatusResponse {
        account_id: account.id,
        charges_enabled: account.charges_enabled,
        payouts_enabled: account.payouts_enabled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::game_store::GameStore;
    use crate::services::test_support::{harness, sample_organiser};

    fn connect(email: &str) -> ConnectRequest {
        ConnectRequest {
            email: email.to_owned(),
        }
    }

    #[tokio::test]
    async fn creates_and_stores_an_account_for_a_new_organiser() {
        let h = harness().await;
        let response = connect_organiser(&h.state, connect("Org@Example.com"))
            .await
            .unwrap();

        assert!(response.url.contains(&response.account_id));
        assert!(!response.charges_enabled);

        let stored = h
            .store
            .find_organiser("org@example.com".to_owned())
            .await
            .unwrap()
            .expect("organiser persisted under lowercased email");
        assert_eq!(stored.payout_account_id.as_deref(), Some(response.account_id.as_str()));
    }

    #[tokio::test]
    async fn reuses_the_stored_account_on_reconnect() {
        let h = harness().await;
        h.payments.insert_account("acct_existing", true, true);
        h.store
            .save_organiser(sample_organiser("org@example.com", Some("acct_existing")))
            .await
            .unwrap();

        let response = connect_organiser(&h.state, connect("org@example.com"))
            .await
            .unwrap();
        assert_eq!(response.account_id, "acct_existing");
        assert!(response.charges_enabled);
        assert!(response.payouts_enabled);
    }

    #[tokio::test]
    async fn status_requires_a_known_organiser_with_an_account() {
        let h = harness().await;
        let err = account_status(&h.state, "ghost@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        h.store
            .save_organiser(sample_organiser("org@example.com", None))
            .await
            .unwrap();
        let err = account_status(&h.state, "org@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn rejects_a_malformed_email() {
        let h = harness().await;
        let err = connect_organiser(&h.state, connect("not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
