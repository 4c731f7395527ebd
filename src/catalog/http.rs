// src/catalog/http.rs

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use super::{CourseCatalog, CourseQuery};
use crate::config::ApiConfig;
use crate::types::{Category, Course, RawEnrollment};

/// JSON client for the catalog and enrollment endpoints.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base: Url,
    token: Option<String>,
    max_retries: u32,
    backoff_ms: u64,
}

/// Parse `base_url`, forcing a trailing slash so relative joins keep the path prefix.
fn parse_base(base_url: &str) -> Result<Url> {
    let mut raw = base_url.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).with_context(|| format!("parsing API base URL {}", base_url))
}

/// Upper bound on a single retry delay.
const MAX_BACKOFF_MS: u64 = 60_000;

/// Exponential delay before retry `attempt` (1-based), capped at [`MAX_BACKOFF_MS`].
fn backoff_delay_ms(base_ms: u64, attempt: u32) -> u64 {
    2u64.checked_pow(attempt.saturating_sub(1))
        .map_or(MAX_BACKOFF_MS, |factor| base_ms.saturating_mul(factor))
        .min(MAX_BACKOFF_MS)
}

impl CatalogClient {
    pub fn new(cfg: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            base: parse_base(&cfg.base_url)?,
            token: cfg.token.clone(),
            max_retries: cfg.max_retries,
            backoff_ms: cfg.backoff_ms,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("joining {} onto {}", path, self.base))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn get_json_core<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        debug!("Fetching {}", url);
        self.authorize(self.client.get(url.clone()))
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .json::<T>()
            .await
            .with_context(|| format!("Decoding JSON from {}", url))
    }

    async fn get_json_with_retry<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let mut attempts = 0;
        loop {
            match self.get_json_core(url).await {
                Ok(t) => return Ok(t),
                Err(e) if attempts < self.max_retries => {
                    attempts += 1;
                    let backoff = backoff_delay_ms(self.backoff_ms, attempts);
                    warn!(%url, attempt = attempts, delay_ms = backoff, error = %e, "Retrying");
                    sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => {
                    error!(%url, error = %e, "Exhausted retries");
                    return Err(e);
                }
            }
        }
    }

    /// Replace the stored enrollment set with `enrollments`.
    /// Not retried.
    #[instrument(level = "info", skip(self, enrollments), fields(count = enrollments.len()))]
    pub async fn replace_enrollments(&self, enrollments: &[RawEnrollment]) -> Result<()> {
        let url = self.endpoint("enrollments")?;
        self.authorize(self.client.put(url.clone()))
            .json(enrollments)
            .send()
            .await
            .with_context(|| format!("PUT {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?;
        info!(count = enrollments.len(), "replaced enrollments");
        Ok(())
    }
}

impl CourseCatalog for CatalogClient {
    async fn categories(&self) -> Result<Vec<Category>> {
        let url = self.endpoint("categories")?;
        self.get_json_with_retry(&url)
            .await
            .context("fetching category catalog")
    }

    async fn courses(&self, query: &CourseQuery<'_>) -> Result<Vec<Course>> {
        let mut url = self.endpoint("courses")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("code", query.code);
            if let Some(category) = query.category {
                pairs.append_pair("category", category);
            }
        }
        self.get_json_with_retry(&url)
            .await
            .with_context(|| format!("querying courses for {}", query.code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Grade, Semester};
    use httpmock::prelude::*;

    fn client_for(server: &MockServer, max_retries: u32) -> CatalogClient {
        CatalogClient::new(&ApiConfig {
            base_url: server.url("/api"),
            token: Some("secret".to_string()),
            max_retries,
            backoff_ms: 1,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let base = parse_base("https://x.example/api").unwrap();
        assert_eq!(base.join("courses").unwrap().as_str(), "https://x.example/api/courses");
        assert!(parse_base("not a url").is_err());
    }

    #[test]
    fn backoff_doubles_and_stays_capped() {
        assert_eq!(backoff_delay_ms(500, 1), 500);
        assert_eq!(backoff_delay_ms(500, 3), 2_000);
        assert_eq!(backoff_delay_ms(500, 20), MAX_BACKOFF_MS);
        assert_eq!(backoff_delay_ms(u64::MAX, 2), MAX_BACKOFF_MS);
        assert_eq!(backoff_delay_ms(1, 200), MAX_BACKOFF_MS);
    }

    #[tokio::test]
    async fn fetches_categories_with_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/categories")
                    .header("authorization", "Bearer secret");
                then.status(200)
                    .json_body(serde_json::json!([{"id": "MCR", "name": "전공필수"}]));
            })
            .await;

        let cats = client_for(&server, 0).categories().await.unwrap();
        mock.assert_async().await;
        assert_eq!(
            cats,
            vec![Category {
                id: "MCR".to_string(),
                name: "전공필수".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn course_query_sends_code_and_category() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/courses")
                    .query_param("code", "CS101")
                    .query_param("category", "MCR");
                then.status(200).json_body(serde_json::json!([
                    {"id": 11, "code": "CS101", "category": "MCR", "tags": ["x"], "name": "Intro"}
                ]));
            })
            .await;

        let courses = client_for(&server, 0)
            .courses(&CourseQuery::by_code_and_category("CS101", "MCR"))
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].id, 11);
        assert!(courses[0].tags.contains("x"));
    }

    #[tokio::test]
    async fn server_error_is_retried_then_surfaced() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/categories");
                then.status(503);
            })
            .await;

        let err = client_for(&server, 2).categories().await.unwrap_err();
        mock.assert_calls_async(3).await;
        assert!(format!("{:#}", err).contains("fetching category catalog"));
    }

    #[tokio::test]
    async fn replace_enrollments_puts_json() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/enrollments").json_body(serde_json::json!([
                    {"courseId": 3, "enrolledYear": 2023, "enrolledSemester": "SPRING", "grade": "B+"}
                ]));
                then.status(204);
            })
            .await;

        client_for(&server, 0)
            .replace_enrollments(&[RawEnrollment {
                course_id: 3,
                enrolled_year: 2023,
                enrolled_semester: Semester::Spring,
                grade: Grade::BPlus,
            }])
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
