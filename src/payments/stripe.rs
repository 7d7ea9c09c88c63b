//! Thin REST client for the hosted payment processor (Stripe-compatible
//! form-encoded API).

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};

use super::{
    PaymentProvider,
    error::{PaymentError, PaymentResult},
    types::{AccountLink, CheckoutSession, ConnectedAccount, CreateSessionParams},
};

const DEFAULT_BASE_URL: &str = "https://api.stripe.com/v1";
/// Upper bound on any single processor call; timeouts surface as retriable
/// [`PaymentError::RequestSend`] failures, never as evidence of a failed
/// payment.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// HTTP client bound to one API key, constructed once per process and
/// injected wherever payments are needed.
#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    base_url: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

impl StripeClient {
    /// Build a client with a bounded per-request timeout.
    pub fn new(secret_key: String) -> PaymentResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| PaymentError::ClientBuilder { source })?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_owned(),
            secret_key,
        })
    }

    /// Point the client at a non-default API base (local mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        self.http
            .request(method, url)
            .bearer_auth(&self.secret_key)
    }

    async fn send<T>(&self, builder: RequestBuilder, path: &str) -> PaymentResult<T>
    where
        T: DeserializeOwned,
    {
        let response = builder
            .send()
            .await
            .map_err(|source| PaymentError::RequestSend {
                path: path.to_owned(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|source| PaymentError::DecodeResponse {
                    path: path.to_owned(),
                    source,
                });
        }

        let message = response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .and_then(|detail| detail.message)
            .unwrap_or_else(|| "no error detail".to_owned());

        Err(PaymentError::Api {
            path: path.to_owned(),
            status,
            message,
        })
    }

    async fn create_checkout_session(
        &self,
        params: CreateSessionParams,
    ) -> PaymentResult<CheckoutSession> {
        let path = "checkout/sessions";
        let game_id = params.game_id.to_string();
        let form: Vec<(&str, String)> = vec![
            ("mode", "payment".to_owned()),
            ("client_reference_id", game_id.clone()),
            ("success_url", params.success_url),
            ("cancel_url", params.cancel_url),
            ("line_items[0][quantity]", params.spots.to_string()),
            (
                "line_items[0][price_data][currency]",
                params.currency.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                params.amount.minor_units().to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                params.product_name,
            ),
            ("metadata[gameId]", game_id),
            ("metadata[name]", params.display_name),
            ("metadata[spots]", params.spots.to_string()),
            (
                "payment_intent_data[transfer_data][destination]",
                params.destination_account,
            ),
        ];

        let builder = self
            .request(reqwest::Method::POST, path)
            .header(IDEMPOTENCY_HEADER, params.idempotency_key)
            .form(&form);

        self.send(builder, path).await
    }

    async fn retrieve_session(&self, session_id: &str) -> PaymentResult<Option<CheckoutSession>> {
        let path = format!("checkout/sessions/{session_id}");
        let builder = self.request(reqwest::Method::GET, &path);

        match self.send::<CheckoutSession>(builder, &path).await {
            Ok(session) => Ok(Some(session)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn retrieve_account(&self, account_id: &str) -> PaymentResult<ConnectedAccount> {
        let path = format!("accounts/{account_id}");
        let builder = self.request(reqwest::Method::GET, &path);
        self.send(builder, &path).await
    }

    async fn create_account(&self, email: &str) -> PaymentResult<ConnectedAccount> {
        let path = "accounts";
        let form: Vec<(&str, String)> = vec![
            ("type", "express".to_owned()),
            ("email", email.to_owned()),
            ("business_type", "individual".to_owned()),
            ("capabilities[card_payments][requested]", "true".to_owned()),
            ("capabilities[transfers][requested]", "true".to_owned()),
        ];
        let builder = self.request(reqwest::Method::POST, path).form(&form);
        self.send(builder, path).await
    }

    async fn create_onboarding_link(
        &self,
        account_id: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> PaymentResult<String> {
        let path = "account_links";
        let form: Vec<(&str, String)> = vec![
            ("account", account_id.to_owned()),
            ("type", "account_onboarding".to_owned()),
            ("refresh_url", refresh_url.to_owned()),
            ("return_url", return_url.to_owned()),
            ("collect", "currently_due".to_owned()),
        ];
        let builder = self.request(reqwest::Method::POST, path).form(&form);
        let link: AccountLink = self.send(builder, path).await?;
        Ok(link.url)
    }
}

impl PaymentProvider for StripeClient {
    fn create_checkout_session(
        &self,
        params: CreateSessionParams,
    ) -> BoxFuture<'static, PaymentResult<CheckoutSession>> {
        let client = self.clone();
        Box::pin(async move { client.create_checkout_session(params).await })
    }

    fn retrieve_session(
        &self,
        session_id: String,
    ) -> BoxFuture<'static, PaymentResult<Option<CheckoutSession>>> {
        let client = self.clone();
        Box::pin(async move { client.retrieve_session(&session_id).await })
    }

    fn retrieve_account(
        &self,
        account_id: String,
    ) -> BoxFuture<'static, PaymentResult<ConnectedAccount>> {
        let client = self.clone();
        Box::pin(async move { client.retrieve_account(&account_id).await })
    }

    fn create_account(
        &self,
        email: String,
    ) -> BoxFuture<'static, PaymentResult<ConnectedAccount>> {
        let client = self.clone();
        Box::pin(async move { client.create_account(&email).await })
    }

    fn create_onboarding_link(
        &self,
        account_id: String,
        refresh_url: String,
        return_url: String,
    ) -> BoxFuture<'static, PaymentResult<String>> {
        let client = self.clone();
        Box::pin(async move {
            client
                .create_onboarding_link(&account_id, &refresh_url, &return_url)
                .await
        })
    }
}
