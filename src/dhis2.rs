use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use tracing::warn;

use crate::config::Credentials;
use crate::domain::{OutputFormat, QueryMethod};
use crate::error::Dhis2Error;

/// Selects the fetch strategy for the configured query method.
pub fn client_for(
    method: QueryMethod,
    credentials: Credentials,
    format: OutputFormat,
) -> Result<Dhis2HttpClient, Dhis2Error> {
    match method {
        QueryMethod::Http => Dhis2HttpClient::new(credentials, format),
    }
}

/// One fetched response: the raw body plus whatever diagnostic trace the
/// transport produced. A failed call shows up as a (possibly empty) body
/// with non-empty diagnostics, never as a batch-killing error.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub body: Vec<u8>,
    pub diagnostics: String,
}

impl FetchOutcome {
    pub fn is_failure(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

pub trait AnalyticsClient: Send + Sync {
    fn fetch(&self, query: &str) -> Result<FetchOutcome, Dhis2Error>;
}

#[derive(Clone)]
pub struct Dhis2HttpClient {
    client: Client,
    credentials: Credentials,
}

impl Dhis2HttpClient {
    pub fn new(credentials: Credentials, format: OutputFormat) -> Result<Self, Dhis2Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("dhis2-fetch/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| Dhis2Error::InvalidRequest(err.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static(format.accept_header()));

        // Bounded wait so one stuck unit cannot hang the whole batch.
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| Dhis2Error::InvalidRequest(err.to_string()))?;

        Ok(Self {
            client,
            credentials,
        })
    }
}

impl AnalyticsClient for Dhis2HttpClient {
    fn fetch(&self, query: &str) -> Result<FetchOutcome, Dhis2Error> {
        let response = self
            .client
            .get(query)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send();

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "analytics request failed");
                return Ok(FetchOutcome {
                    body: Vec::new(),
                    diagnostics: format!("GET {query}: {err}"),
                });
            }
        };

        let status = response.status();
        let body = match response.bytes() {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => {
                warn!(error = %err, "failed to read analytics response body");
                return Ok(FetchOutcome {
                    body: Vec::new(),
                    diagnostics: format!("GET {query}: {err}"),
                });
            }
        };

        let diagnostics = if status.is_success() {
            String::new()
        } else {
            warn!(status = status.as_u16(), "analytics returned error status");
            format!("GET {query}: status {status}")
        };

        // The body is kept even on error statuses; the caller persists
        // whatever the server sent back.
        Ok(FetchOutcome { body, diagnostics })
    }
}
