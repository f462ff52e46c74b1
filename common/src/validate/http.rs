use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use super::{IBatchValidator, ValidationOutcome};
use crate::{error::ValidationError, models::ProviderRecord};

const MAX_ATTEMPTS: u32 = 5;

#[derive(Serialize)]
struct BatchRequest<'a> {
    records: &'a [ProviderRecord],
}

/// Hands the batch to a remote validation service and returns its JSON answer.
pub struct HttpBatchValidator {
    client: reqwest::Client,
    endpoint: String,
    retry_delay: Duration,
}

impl HttpBatchValidator {
    pub fn new(endpoint: &str) -> Result<Self, ValidationError> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(300)).build()?;
        Ok(HttpBatchValidator {
            client,
            endpoint: endpoint.to_string(),
            retry_delay: Duration::from_millis(500),
        })
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

#[async_trait::async_trait]
impl IBatchValidator for HttpBatchValidator {
    async fn process_batch(&self, records: Vec<ProviderRecord>) -> Result<ValidationOutcome, ValidationError> {
        let request = BatchRequest { records: &records };
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.client.post(&self.endpoint).json(&request).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("Validator '{}' accepted {} records", &self.endpoint, records.len());
                    return Ok(response.json::<ValidationOutcome>().await?);
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    return Err(ValidationError::Rejected { status, body });
                }
                Err(err) => {
                    warn!("Error sending batch {} time to '{}', because of {}", attempts, &self.endpoint, err);
                    if attempts >= MAX_ATTEMPTS {
                        return Err(err.into());
                    }
                    tokio::time::sleep(self.retry_delay * attempts).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::net::{SocketAddr, TcpListener};

    async fn serve(app: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(axum::Server::from_tcp(listener).unwrap().serve(app.into_make_service()));
        addr
    }

    fn batch() -> Vec<ProviderRecord> {
        let mut record = ProviderRecord::new(2);
        record.insert("npi", "1234567893");
        vec![record]
    }

    #[tokio::test]
    async fn returns_the_remote_outcome() {
        let app = Router::new().route(
            "/batch",
            post(|Json(body): Json<Value>| async move { Json(json!({"received": body["records"].as_array().map(Vec::len)})) }),
        );
        let addr = serve(app).await;

        let validator = HttpBatchValidator::new(&format!("http://{}/batch", addr)).unwrap();
        let outcome = validator.process_batch(batch()).await.unwrap();

        assert_eq!(outcome, json!({"received": 1}));
    }

    #[tokio::test]
    async fn non_success_status_is_a_rejection() {
        let app = Router::new().route("/batch", post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "bad batch") }));
        let addr = serve(app).await;

        let validator = HttpBatchValidator::new(&format!("http://{}/batch", addr)).unwrap();
        match validator.process_batch(batch()).await {
            Err(ValidationError::Rejected { status, body }) => {
                assert_eq!(status, 422);
                assert_eq!(body, "bad batch");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_validator_fails_after_retries() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let validator = HttpBatchValidator::new(&format!("http://{}/batch", addr)).unwrap().with_retry_delay(Duration::from_millis(1));
        assert!(matches!(validator.process_batch(batch()).await, Err(ValidationError::Http(_))));
    }
}
