//! In-memory [`PaymentProvider`] used as a test double for the service layer.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use futures::future::BoxFuture;
use reqwest::StatusCode;
use uuid::Uuid;

use super::{
    PaymentProvider,
    error::{PaymentError, PaymentResult},
    types::{
        CheckoutSession, ConnectedAccount, CreateSessionParams, PaymentStatus, SessionMetadata,
    },
};

/// Fake processor holding sessions and accounts in hash maps.
#[derive(Clone, Default)]
pub struct FakePaymentProvider {
    inner: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    sessions: HashMap<String, CheckoutSession>,
    accounts: HashMap<String, ConnectedAccount>,
    created_sessions: Vec<CreateSessionParams>,
    next_session: u32,
    next_account: u32,
    fail_onboarding_links: bool,
}

impl FakePaymentProvider {
    /// Fresh provider with no sessions or accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account with the given enablement flags.
    pub fn insert_account(&self, id: &str, charges_enabled: bool, payouts_enabled: bool) {
        self.inner.lock().unwrap().accounts.insert(
            id.to_owned(),
            ConnectedAccount {
                id: id.to_owned(),
                charges_enabled,
                payouts_enabled,
            },
        );
    }

    /// Register a session the provider will return from `retrieve_session`.
    pub fn insert_session(&self, session: CheckoutSession) {
        self.inner
            .lock()
            .unwrap()
            .sessions
            .insert(session.id.clone(), session);
    }

    /// Flip a stored session to paid, as the hosted checkout would.
    pub fn mark_paid(&self, session_id: &str) {
        let mut state = self.inner.lock().unwrap();
        if let Some(session) = state.sessions.get_mut(session_id) {
            session.payment_status = PaymentStatus::Paid;
            session.url = None;
        }
    }

    /// All session-creation parameters seen so far, in order.
    pub fn created_sessions(&self) -> Vec<CreateSessionParams> {
        self.inner.lock().unwrap().created_sessions.clone()
    }

    /// Make subsequent onboarding-link requests fail.
    pub fn fail_onboarding_links(&self) {
        self.inner.lock().unwrap().fail_onboarding_links = true;
    }

    /// Build a paid session carrying the metadata a real join would attach.
    pub fn paid_session(session_id: &str, game_id: Uuid, name: &str, spots: u32) -> CheckoutSession {
        CheckoutSession {
            id: session_id.to_owned(),
            url: None,
            payment_status: PaymentStatus::Paid,
            metadata: Some(SessionMetadata {
                game_id: Some(game_id.to_string()),
                name: Some(name.to_owned()),
                spots: Some(spots.to_string()),
            }),
            customer_details: None,
        }
    }
}

impl PaymentProvider for FakePaymentProvider {
    fn create_checkout_session(
        &self,
        params: CreateSessionParams,
    ) -> BoxFuture<'static, PaymentResult<CheckoutSession>> {
        let provider = self.clone();
        Box::pin(async move {
            let mut state = provider.inner.lock().unwrap();
            state.next_session += 1;
            let id = format!("cs_test_{:03}", state.next_session);
            let session = CheckoutSession {
                id: id.clone(),
                url: Some(format!("https://checkout.test/pay/{id}")),
                payment_status: PaymentStatus::Unpaid,
                metadata: Some(SessionMetadata {
                    game_id: Some(params.game_id.to_string()),
                    name: Some(params.display_name.clone()),
                    spots: Some(params.spots.to_string()),
                }),
                customer_details: None,
            };
            state.sessions.insert(id, session.clone());
            state.created_sessions.push(params);
            Ok(session)
        })
    }

    fn retrieve_session(
        &self,
        session_id: String,
    ) -> BoxFuture<'static, PaymentResult<Option<CheckoutSession>>> {
        let provider = self.clone();
        Box::pin(
            async move { Ok(provider.inner.lock().unwrap().sessions.get(&session_id).cloned()) },
        )
    }

    fn retrieve_account(
        &self,
        account_id: String,
    ) -> BoxFuture<'static, PaymentResult<ConnectedAccount>> {
        let provider = self.clone();
        Box::pin(async move {
            provider
                .inner
                .lock()
                .unwrap()
                .accounts
                .get(&account_id)
                .cloned()
                .ok_or(PaymentError::Api {
                    path: format!("accounts/{account_id}"),
                    status: StatusCode::NOT_FOUND,
                    message: "no such account".to_owned(),
                })
        })
    }

    fn create_account(
        &self,
        _email: String,
    ) -> BoxFuture<'static, PaymentResult<ConnectedAccount>> {
        let provider = self.clone();
        Box::pin(async move {
            let mut state = provider.inner.lock().unwrap();
            state.next_account += 1;
            let account = ConnectedAccount {
                id: format!("acct_test_{:03}", state.next_account),
                charges_enabled: false,
                payouts_enabled: false,
            };
            state.accounts.insert(account.id.clone(), account.clone());
            Ok(account)
        })
    }

    fn create_onboarding_link(
        &self,
        account_id: String,
        _refresh_url: String,
        _return_url: String,
    ) -> BoxFuture<'static, PaymentResult<String>> {
        let provider = self.clone();
        Box::pin(async move {
            if provider.inner.lock().unwrap().fail_onboarding_links {
                return Err(PaymentError::Api {
                    path: "account_links".to_owned(),
                    status: StatusCode::BAD_REQUEST,
                    message: "link minting disabled".to_owned(),
                });
            }
            Ok(format!("https://connect.test/onboard/{account_id}"))
        })
    }
}
