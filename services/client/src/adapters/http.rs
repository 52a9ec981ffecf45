//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter, which is the concrete implementation
//! of the `RecommendationService` port from the `core` crate. It talks to the
//! paper-recommendation server's REST API using `reqwest`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use paper_feed_core::domain::{DateBucket, Paper, UserProfile, UserRating};
use paper_feed_core::ports::{PortError, PortResult, RecommendationService, TokenStore};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `RecommendationService` port over HTTP.
///
/// The bearer token is read from the `TokenStore` on every request that needs
/// one; a token persisted mid-session is picked up on the next call.
#[derive(Clone)]
pub struct HttpApiAdapter {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl HttpApiAdapter {
    /// Creates a new `HttpApiAdapter`. `base_url` must not end with a slash.
    pub fn new(http: reqwest::Client, base_url: String, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            http,
            base_url,
            tokens,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the stored bearer token, if any, to an outgoing request.
    fn with_bearer(&self, request: RequestBuilder) -> PortResult<RequestBuilder> {
        match self.tokens.load()? {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Ok(request),
        }
    }

    async fn send(&self, request: RequestBuilder) -> PortResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;
        check_status(response).await
    }
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct TokenRecord {
    access_token: String,
}

#[derive(Deserialize)]
struct UserRecord {
    id: i64,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email,
        }
    }
}

#[derive(Deserialize)]
struct DatesRecord {
    dates: Vec<DateBucketRecord>,
}

#[derive(Deserialize)]
struct DateBucketRecord {
    date: String,
    count: u32,
}
impl DateBucketRecord {
    fn to_domain(self) -> PortResult<DateBucket> {
        Ok(DateBucket {
            date: parse_calendar_date(&self.date)?,
            count: self.count,
        })
    }
}

#[derive(Deserialize)]
struct PaperRecord {
    id: i64,
    arxiv_id: String,
    title: String,
    #[serde(rename = "abstract")]
    abstract_text: String,
    authors: String,
    categories: String,
    published_date: String,
    score: f64,
}
impl PaperRecord {
    fn to_domain(self) -> PortResult<Paper> {
        Ok(Paper {
            id: self.id,
            arxiv_id: self.arxiv_id,
            title: self.title,
            abstract_text: self.abstract_text,
            authors: self.authors,
            categories: self.categories,
            published_date: parse_calendar_date(&self.published_date)?,
            score: self.score,
        })
    }
}

#[derive(Deserialize)]
struct RatingRecord {
    paper_id: i64,
    rating: u8,
}
impl RatingRecord {
    fn to_domain(self) -> UserRating {
        UserRating {
            paper_id: self.paper_id,
            rating: self.rating,
        }
    }
}

/// The server emits `published_date` either as a plain `YYYY-MM-DD` date or as
/// a full timestamp; the calendar date is always the first ten characters.
fn parse_calendar_date(raw: &str) -> PortResult<NaiveDate> {
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| PortError::Unexpected(format!("Unparseable date in payload: '{}'", raw)))
}

//=========================================================================================
// Response Handling
//=========================================================================================

/// FastAPI error responses carry a `detail` field with a human-readable message.
#[derive(Deserialize)]
struct ErrorRecord {
    detail: Option<String>,
}

/// Maps a non-success response into the port error taxonomy: 401/403 (and the
/// 400/422 validation rejections) become `Auth`, everything else `Network`.
async fn check_status(response: Response) -> PortResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = response
        .json::<ErrorRecord>()
        .await
        .ok()
        .and_then(|e| e.detail);
    debug!(status = %status, detail = ?detail, "server rejected request");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(PortError::Auth(
            detail.unwrap_or_else(|| "Invalid credentials".to_string()),
        )),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Err(PortError::Auth(
            detail.unwrap_or_else(|| format!("Request rejected with status {}", status)),
        )),
        _ => Err(PortError::Network(
            detail.unwrap_or_else(|| format!("Server responded with status {}", status)),
        )),
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> PortResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| PortError::Unexpected(format!("Undecodable response body: {}", e)))
}

//=========================================================================================
// `RecommendationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecommendationService for HttpApiAdapter {
    async fn login(&self, email: &str, password: &str) -> PortResult<String> {
        // OAuth2 password grant: form-encoded, the `username` field carries
        // the email.
        let form = [("username", email), ("password", password)];
        let request = self.http.post(self.url("/api/users/token")).form(&form);
        let response = self.send(request).await?;
        let record: TokenRecord = decode(response).await?;
        Ok(record.access_token)
    }

    async fn register(&self, email: &str, password: &str) -> PortResult<UserProfile> {
        let body = serde_json::json!({ "email": email, "password": password });
        let request = self.http.post(self.url("/api/users/register")).json(&body);
        let response = self.send(request).await?;
        let record: UserRecord = decode(response).await?;
        Ok(record.to_domain())
    }

    async fn current_user(&self) -> PortResult<UserProfile> {
        let request = self.with_bearer(self.http.get(self.url("/api/users/me")))?;
        let response = self.send(request).await?;
        let record: UserRecord = decode(response).await?;
        Ok(record.to_domain())
    }

    async fn list_dates(&self) -> PortResult<Vec<DateBucket>> {
        let request = self.with_bearer(self.http.get(self.url("/api/papers/dates")))?;
        let response = self.send(request).await?;
        let record: DatesRecord = decode(response).await?;
        record
            .dates
            .into_iter()
            .map(DateBucketRecord::to_domain)
            .collect()
    }

    async fn papers_for_date(&self, date: NaiveDate) -> PortResult<Vec<Paper>> {
        let path = format!("/api/papers/{}", date.format("%Y-%m-%d"));
        let request = self.with_bearer(self.http.get(self.url(&path)))?;
        let response = self.send(request).await?;
        let records: Vec<PaperRecord> = decode(response).await?;
        records.into_iter().map(PaperRecord::to_domain).collect()
    }

    async fn user_ratings(&self) -> PortResult<Vec<UserRating>> {
        let request = self.with_bearer(self.http.get(self.url("/api/users/me/ratings")))?;
        let response = self.send(request).await?;
        let records: Vec<RatingRecord> = decode(response).await?;
        Ok(records.into_iter().map(RatingRecord::to_domain).collect())
    }

    async fn submit_rating(&self, paper_id: i64, rating: u8) -> PortResult<()> {
        let path = format!("/api/papers/{}/rate", paper_id);
        let body = serde_json::json!({ "rating_value": rating });
        let request = self.with_bearer(self.http.post(self.url(&path)).json(&body))?;
        // The success body is just a confirmation message.
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_calendar_dates() {
        let date = parse_calendar_date("2024-01-15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn parses_timestamps_down_to_the_date() {
        let date = parse_calendar_date("2024-01-15T00:00:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn rejects_garbage_dates() {
        assert!(parse_calendar_date("not-a-date").is_err());
    }
}
