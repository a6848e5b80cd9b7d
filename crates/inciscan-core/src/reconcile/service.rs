use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::limiter::RateGate;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status: {0}")]
    Status(reqwest::StatusCode),
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// One concern row from an ingredient's reference page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concern {
    pub concern: String,
    pub reference: String,
}

/// A canonical ingredient record from the Reference Service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub name: String,
    pub url: Option<String>,
    /// Hazard score as an inclusive (min, max) range.
    pub score_range: Option<(u8, u8)>,
    pub data_level: Option<String>,
    #[serde(default)]
    pub concerns: Vec<Concern>,
}

impl ReferenceRecord {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            score_range: None,
            data_level: None,
            concerns: Vec::new(),
        }
    }
}

/// Outcome of one reference lookup. An empty `records` list and a transport
/// error are identical for control flow; the distinction lives in logs.
#[derive(Debug, Clone, Default)]
pub struct LookupResponse {
    pub found: bool,
    /// Whether the best candidate is an exact match for the query.
    pub exact: bool,
    /// Candidates in rank order; the selected best match comes first.
    pub records: Vec<ReferenceRecord>,
}

/// The single seam to the external ingredient database.
#[async_trait]
pub trait ReferenceService: Send + Sync {
    async fn lookup(&self, query: &str, exact_only: bool) -> ServiceResult<LookupResponse>;
}

/// Pick the best candidate for a query: exact case-insensitive name match
/// first, then (unless `exact_only`) a candidate containing the query, then
/// the first candidate at all. Returns the winning index.
fn select_match(records: &[ReferenceRecord], query: &str, exact_only: bool) -> Option<usize> {
    let query = query.to_lowercase();

    let mut contained = None;
    for (idx, record) in records.iter().enumerate() {
        let name = record.name.to_lowercase();
        if name == query {
            return Some(idx);
        }
        if contained.is_none() && name.contains(&query) {
            contained = Some(idx);
        }
    }

    if exact_only {
        return None;
    }
    contained.or(if records.is_empty() { None } else { Some(0) })
}

/// An accepted match counts as exact when the names agree case-insensitively
/// beyond a 0.9 normalized-Levenshtein ratio, tolerating whitespace variance
/// in scraped names.
fn is_exact_name(query: &str, name: &str) -> bool {
    strsim::normalized_levenshtein(&query.to_lowercase(), &name.to_lowercase()) > 0.9
}

/// Rank the selected candidate first and derive the response flags.
fn build_response(
    mut records: Vec<ReferenceRecord>,
    query: &str,
    exact_only: bool,
) -> LookupResponse {
    let Some(best) = select_match(&records, query, exact_only) else {
        return LookupResponse {
            found: false,
            exact: false,
            records,
        };
    };

    let record = records.remove(best);
    let exact = is_exact_name(query, &record.name);
    records.insert(0, record);

    LookupResponse {
        found: true,
        exact,
        records,
    }
}

/// Configuration for the HTTP reference client.
#[derive(Debug, Clone)]
pub struct HttpServiceConfig {
    /// Search endpoint implementing the JSON lookup contract.
    pub endpoint: String,
    pub connect_timeout_seconds: u32,
    pub request_timeout_seconds: u32,
    /// Minimum spacing between requests to the live service.
    pub rate_limit: Duration,
    /// Fixed user agent; a rotating browser agent is used when unset.
    pub user_agent: Option<String>,
}

impl Default for HttpServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8400/search".to_string(),
            connect_timeout_seconds: 10,
            request_timeout_seconds: 30,
            rate_limit: Duration::from_secs(1),
            user_agent: None,
        }
    }
}

/// Reference Service client over HTTP.
///
/// The endpoint takes `?search=<query>&search_type=ingredients` and returns
/// a JSON candidate list. Every request passes the shared rate gate; clones
/// of this client share the same gate, keeping the politeness interval
/// process-wide when reconciliation runs in parallel.
#[derive(Clone)]
pub struct HttpReferenceService {
    client: Client,
    endpoint: Url,
    gate: Arc<RateGate>,
}

impl HttpReferenceService {
    pub fn new(config: &HttpServiceConfig) -> ServiceResult<Self> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(u64::from(config.connect_timeout_seconds)))
            .timeout(Duration::from_secs(u64::from(config.request_timeout_seconds)));

        if let Some(ref ua) = config.user_agent {
            builder = builder.user_agent(ua.clone());
        } else {
            builder = builder.user_agent(random_user_agent());
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: Url::parse(&config.endpoint)?,
            gate: Arc::new(RateGate::new(config.rate_limit)),
        })
    }

    async fn fetch(&self, query: &str) -> ServiceResult<Vec<ReferenceRecord>> {
        self.gate.wait().await;

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("search", query)
            .append_pair("search_type", "ingredients");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status()));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.results.into_iter().map(WireRecord::into_record).collect())
    }
}

#[async_trait]
impl ReferenceService for HttpReferenceService {
    async fn lookup(&self, query: &str, exact_only: bool) -> ServiceResult<LookupResponse> {
        let records = self.fetch(query).await?;
        tracing::debug!(query, candidates = records.len(), "reference search");
        Ok(build_response(records, query, exact_only))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<WireRecord>,
}

#[derive(Debug, Deserialize)]
struct WireRecord {
    name: String,
    url: Option<String>,
    score: Option<u8>,
    score_min: Option<u8>,
    data_level: Option<String>,
    #[serde(default)]
    concerns: Vec<Concern>,
}

impl WireRecord {
    fn into_record(self) -> ReferenceRecord {
        let score_range = self.score.map(|max| (self.score_min.unwrap_or(max), max));
        ReferenceRecord {
            name: self.name,
            url: self.url,
            score_range,
            data_level: self.data_level,
            concerns: self.concerns,
        }
    }
}

fn random_user_agent() -> String {
    use rand::Rng;

    let agents = [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; rv:128.0) Gecko/20100101 Firefox/128.0",
        "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:128.0) Gecko/20100101 Firefox/128.0",
    ];

    let mut rng = rand::rng();
    agents[rng.random_range(0..agents.len())].to_string()
}

/// In-memory reference table with the same selection semantics as the HTTP
/// client. Used by tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct StaticReferenceService {
    records: Vec<ReferenceRecord>,
}

impl StaticReferenceService {
    #[must_use]
    pub const fn new(records: Vec<ReferenceRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn with_names(names: &[&str]) -> Self {
        Self::new(names.iter().map(|n| ReferenceRecord::named(*n)).collect())
    }
}

#[async_trait]
impl ReferenceService for StaticReferenceService {
    async fn lookup(&self, query: &str, exact_only: bool) -> ServiceResult<LookupResponse> {
        let lowered = query.to_lowercase();
        let candidates: Vec<ReferenceRecord> = self
            .records
            .iter()
            .filter(|r| {
                let name = r.name.to_lowercase();
                name.contains(&lowered) || lowered.contains(&name)
            })
            .cloned()
            .collect();

        Ok(build_response(candidates, query, exact_only))
    }
}
