//! Typed wrappers for the console's REST endpoints.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stockdesk_core::{
    Envelope, PickupCartInput, PickupCartRow, RetrievalPayload, SessionUser, SignInRequest,
    StockInput, StockRow,
};

use crate::client::ApiClient;
use crate::error::ClassifiedError;

pub const LOGIN_PATH: &str = "/login";
pub const LOGOUT_PATH: &str = "/logout";
pub const USERS_PATH: &str = "/users";
pub const STOCK_PATH: &str = "/product_stock";
pub const PICKUP_CART_PATH: &str = "/pick_up_cart";

#[derive(Debug, Deserialize)]
struct SignInResponse {
    data: SessionUser,
}

#[derive(Serialize)]
struct WithId<'a, B> {
    id: u64,
    #[serde(flatten)]
    body: &'a B,
}

impl ApiClient {
    /// `POST {resource}/retrieve` with a list payload.
    ///
    /// # Errors
    /// Returns the classified failure of the call.
    pub async fn retrieve<T: DeserializeOwned>(
        &self,
        resource: &str,
        payload: &RetrievalPayload,
    ) -> Result<Envelope<Vec<T>>, ClassifiedError> {
        self.send(Method::POST, &format!("{resource}/retrieve"), Some(payload)).await
    }

    /// Signs in and stores the returned user as the current session.
    ///
    /// # Errors
    /// Returns the classified failure of the call.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<SessionUser, ClassifiedError> {
        let request = SignInRequest { username: username.to_owned(), password: password.to_owned() };
        self.auth.set_loading(true);
        let result: Result<SignInResponse, _> =
            self.send(Method::POST, LOGIN_PATH, Some(&request)).await;
        self.auth.set_loading(false);

        match result {
            Ok(SignInResponse { data: user }) => {
                if let Err(e) = self.auth.set_user(user.clone()) {
                    tracing::warn!(error = %e, "signed in but could not persist session");
                }
                tracing::info!(user = user.display_name(), "signed in");
                Ok(user)
            },
            Err(e) => {
                self.auth.set_error(Some(e.message.clone()));
                Err(e)
            },
        }
    }

    /// Ends the server session, then clears the local one whatever the
    /// server answered.
    ///
    /// # Errors
    /// Returns the classified failure of the server call; local state is
    /// cleared regardless.
    pub async fn logout(&self) -> Result<(), ClassifiedError> {
        let result: Result<Value, _> = self.send::<Value, _>(Method::POST, LOGOUT_PATH, None).await;
        if let Err(e) = self.auth.clear_auth() {
            tracing::warn!(error = %e, "could not remove persisted session");
        }
        tracing::info!("signed out");
        result.map(|_| ())
    }

    /// # Errors
    /// Returns the classified failure of the call.
    pub async fn create_stock(&self, input: &StockInput) -> Result<Envelope<StockRow>, ClassifiedError> {
        self.send(Method::POST, &format!("{STOCK_PATH}/create"), Some(input)).await
    }

    /// # Errors
    /// Returns the classified failure of the call.
    pub async fn update_stock(
        &self,
        id: u64,
        input: &StockInput,
    ) -> Result<Envelope<StockRow>, ClassifiedError> {
        let body = WithId { id, body: input };
        self.send(Method::POST, &format!("{STOCK_PATH}/update/{id}"), Some(&body)).await
    }

    /// # Errors
    /// Returns the classified failure of the call.
    pub async fn delete_stock(&self, id: u64) -> Result<Envelope<Value>, ClassifiedError> {
        self.send::<Value, _>(Method::DELETE, &format!("{STOCK_PATH}/delete/{id}"), None).await
    }

    /// # Errors
    /// Returns the classified failure of the call.
    pub async fn add_to_pickup_cart(
        &self,
        input: &PickupCartInput,
    ) -> Result<Envelope<PickupCartRow>, ClassifiedError> {
        self.send(Method::POST, &format!("{PICKUP_CART_PATH}/create"), Some(input)).await
    }

    /// # Errors
    /// Returns the classified failure of the call.
    pub async fn remove_from_pickup_cart(&self, id: u64) -> Result<Envelope<Value>, ClassifiedError> {
        self.send::<Value, _>(Method::DELETE, &format!("{PICKUP_CART_PATH}/delete/{id}"), None)
            .await
    }
}
