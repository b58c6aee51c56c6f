use crate::config::AgentConfig;
use crate::error::{ErrorKind, GatewayError};
use log::{info, warn};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// Outcome of one query submission. `R` is the raw agent payload straight
/// out of the gateway, and the normalized record list once the session has
/// reshaped it.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult<R> {
    Success { answer: Option<String>, records: R },
    Failure { reason: ErrorKind },
}

impl<R> QueryResult<R> {
    pub fn map_records<T>(self, f: impl FnOnce(R) -> T) -> QueryResult<T> {
        match self {
            QueryResult::Success { answer, records } => QueryResult::Success {
                answer,
                records: f(records),
            },
            QueryResult::Failure { reason } => QueryResult::Failure { reason },
        }
    }
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    consulta: &'a str,
}

/// Forwards free-text questions to the observations agent.
///
/// One outbound request per call: no retry, no caching.
pub struct AgentGateway {
    client: Client,
    endpoint: String,
}

impl AgentGateway {
    pub fn new(config: &AgentConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("urban-sightings/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn submit(&self, query: &str) -> QueryResult<Value> {
        match self.send_query(query).await {
            Ok((answer, records)) => QueryResult::Success { answer, records },
            Err(e) => {
                match e.kind() {
                    ErrorKind::Unreachable => warn!("Agent at {} unreachable: {}", self.endpoint, e),
                    _ => warn!("Query to {} failed: {}", self.endpoint, e),
                }
                QueryResult::Failure { reason: e.kind() }
            }
        }
    }

    async fn send_query(&self, query: &str) -> Result<(Option<String>, Value), GatewayError> {
        info!("Sending query to {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&QueryRequest { consulta: query })
            .send()
            .await
            .map_err(GatewayError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status));
        }

        let body = response
            .text()
            .await
            .map_err(GatewayError::from_transport)?;
        let body: Value =
            serde_json::from_str(&body).map_err(|e| GatewayError::Malformed(e.to_string()))?;

        Ok(split_envelope(body))
    }
}

/// Pull `answer` and `result` out of the `data` envelope, falling back to
/// the top level when the envelope is missing.
fn split_envelope(mut body: Value) -> (Option<String>, Value) {
    let mut take = |key: &str| -> Value {
        let enveloped = body
            .get_mut("data")
            .and_then(|data| data.get_mut(key))
            .map(Value::take);
        match enveloped {
            Some(value) if !value.is_null() => value,
            _ => body.get_mut(key).map(Value::take).unwrap_or(Value::Null),
        }
    };

    let answer = take("answer").as_str().map(str::to_string);
    let records = take("result");
    (answer, records)
}
