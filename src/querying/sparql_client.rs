//! HTTP client for a public SPARQL endpoint (Virtuoso-style GET protocol).

use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

use crate::config::AcquisitionConfig;
use crate::core::QueryRecord;
use crate::parsing::SparqlResults;
use crate::querying::{history_query, person_name, ClientError, ALL_PERSONS_QUERY};

const RESULTS_MEDIA_TYPE: &str = "application/sparql-results+json";

pub struct SparqlClient {
    endpoint: String,
    client: Client,
}

impl SparqlClient {
    pub fn new(config: &AcquisitionConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self { endpoint: config.endpoint.clone(), client })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs a SELECT query. Non-success statuses become `ClientError::Endpoint`.
    pub async fn select(&self, query: &str) -> Result<SparqlResults, ClientError> {
        debug!("querying {}: {}", self.endpoint, query.trim());
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", query), ("format", "json")])
            .header("Accept", RESULTS_MEDIA_TYPE)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Endpoint { status: status.as_u16(), body });
        }

        let text = response.text().await?;
        Ok(SparqlResults::from_json(&text)?)
    }

    /// Names of every person known to the endpoint.
    pub async fn all_people(&self) -> Result<Vec<String>, ClientError> {
        let results = self.select(ALL_PERSONS_QUERY).await?;
        Ok(results.column("person").map(|iri| person_name(iri).to_string()).collect())
    }

    /// History rows of one person. An endpoint-side failure for this person is
    /// logged and yields `Ok(None)` so a batch can move on; transport errors
    /// are returned.
    pub async fn history_for(&self, person: &str) -> Result<Option<Vec<QueryRecord>>, ClientError> {
        match self.select(&history_query(person)).await {
            Ok(results) => Ok(Some(results.into_records())),
            Err(ClientError::Endpoint { status, body }) => {
                warn!("endpoint error {} for {} ({})", status, person, body.trim());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
