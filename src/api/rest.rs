//! Implements the `Store` trait against the hosted store's REST endpoints.
//!
//! Every call is a single request/response with no retry, no backoff and no
//! caching; a non-success status surfaces the response body in the error.

use crate::api::{Session, Store};
use crate::model::{Allocation, NewAllocation, NewTransaction, Profile, Transaction};
use crate::{Config, Result};
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

/// Implements the `Store` trait using `reqwest` against the project's
/// `/rest/v1/{resource}` endpoints, authenticated with the API key and the
/// session's bearer token.
pub(super) struct RestStore {
    base_url: String,
    api_key: String,
    session: Session,
    client: reqwest::Client,
}

impl RestStore {
    pub(super) async fn new(config: &Config, session: Session) -> Result<Self> {
        let api_key = config.api_key().await?;
        Ok(Self {
            base_url: config.project_url().to_string(),
            api_key,
            session,
            client: reqwest::Client::new(),
        })
    }

    fn resource_url(&self, resource: &str) -> String {
        format!("{}/rest/v1/{resource}", self.base_url)
    }

    fn headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(self.session.access_token())
    }

    /// Sends a request and checks the status, returning the body text of a
    /// failed response inside the error.
    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<reqwest::Response> {
        let response = self
            .headers(builder)
            .send()
            .await
            .with_context(|| format!("Failed to {action}"))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            bail!("Failed to {action}: the store returned {status}: {body}");
        }
        Ok(response)
    }

    /// Select all rows of `resource` owned by `user_id`.
    async fn select_all<T>(
        &self,
        resource: &str,
        user_id: &str,
        order: Option<&str>,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        trace!("select all from {resource} for user {user_id}");
        let mut query = vec![
            ("select".to_string(), "*".to_string()),
            ("user_id".to_string(), format!("eq.{user_id}")),
        ];
        if let Some(order) = order {
            query.push(("order".to_string(), order.to_string()));
        }
        let builder = self.client.get(self.resource_url(resource)).query(&query);
        let response = self
            .send(builder, &format!("load {resource}"))
            .await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse the {resource} response"))
    }

    /// Insert one row into `resource` and return the stored row.
    async fn insert_one<T, B>(&self, resource: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        trace!("insert one into {resource}");
        let builder = self
            .client
            .post(self.resource_url(resource))
            .header("Prefer", "return=representation")
            .json(body);
        let response = self
            .send(builder, &format!("insert into {resource}"))
            .await?;
        let mut rows: Vec<T> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse the {resource} insert response"))?;
        if rows.is_empty() {
            bail!("The store returned no row for the {resource} insert");
        }
        Ok(rows.remove(0))
    }

    /// Delete one row of `resource` by id, erroring when no row matched.
    async fn delete_by_id(&self, resource: &str, id: &str) -> Result<()> {
        trace!("delete {id} from {resource}");
        let builder = self
            .client
            .delete(self.resource_url(resource))
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{id}"))]);
        let response = self
            .send(builder, &format!("delete from {resource}"))
            .await?;
        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse the {resource} delete response"))?;
        if rows.is_empty() {
            bail!("No row with id '{id}' exists in {resource}");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for RestStore {
    async fn select_transactions(&mut self, user_id: &str) -> Result<Vec<Transaction>> {
        self.select_all("transactions", user_id, Some("transaction_date.desc"))
            .await
    }

    async fn insert_transaction(&mut self, new: &NewTransaction) -> Result<Transaction> {
        self.insert_one("transactions", new).await
    }

    async fn delete_transaction(&mut self, id: &str) -> Result<()> {
        self.delete_by_id("transactions", id).await
    }

    async fn select_allocations(&mut self, user_id: &str) -> Result<Vec<Allocation>> {
        self.select_all("allocations", user_id, None).await
    }

    async fn insert_allocation(&mut self, new: &NewAllocation) -> Result<Allocation> {
        self.insert_one("allocations", new).await
    }

    async fn delete_allocation(&mut self, id: &str) -> Result<()> {
        self.delete_by_id("allocations", id).await
    }

    async fn get_profile(&mut self, user_id: &str) -> Result<Option<Profile>> {
        // Profiles are keyed by the user id itself, not a separate owner
        // column.
        trace!("get profile for user {user_id}");
        let id_filter = format!("eq.{user_id}");
        let builder = self
            .client
            .get(self.resource_url("profiles"))
            .query(&[("select", "*"), ("id", id_filter.as_str())]);
        let response = self.send(builder, "load the profile").await?;
        let rows: Vec<Profile> = response
            .json()
            .await
            .context("Failed to parse the profiles response")?;
        Ok(rows.into_iter().next())
    }
}
