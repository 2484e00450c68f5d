use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{ConfirmError, PurchaseConfirmer, PurchaseOutcome, PurchaseRequest};

/// Longest slice of an error body copied into [`ConfirmError::Api`].
const MAX_ERROR_BODY: usize = 256;

/// Remote confirmer reached with a single JSON POST per purchase.
///
/// Reply contract:
///
/// ```json
/// { "status": "confirmed", "confirmationId": "..." }
/// { "status": "declined", "reason": "..." }
/// ```
///
/// Anything else, including the same object wrapped in a JSON string, is a
/// [`ConfirmError::Decode`].
#[derive(Debug, Clone)]
pub struct HttpConfirmer {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpConfirmer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ConfirmError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfirmError::Config(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl PurchaseConfirmer for HttpConfirmer {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn confirm(&self, request: &PurchaseRequest) -> Result<PurchaseOutcome, ConfirmError> {
        let resp = match self.http.post(&self.endpoint).json(request).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(request_id = %request.request_id, "purchase confirmation timed out");
                return Ok(PurchaseOutcome::TimedOut);
            }
            Err(e) => return Err(ConfirmError::Transport(e.to_string())),
        };

        let status = resp.status();
        let body = match resp.bytes().await {
            Ok(b) => b,
            Err(e) if e.is_timeout() => {
                warn!(request_id = %request.request_id, "purchase confirmation body timed out");
                return Ok(PurchaseOutcome::TimedOut);
            }
            Err(e) => return Err(ConfirmError::Transport(e.to_string())),
        };

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            return Err(ConfirmError::Api {
                status: status.as_u16(),
                message: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let reply: ConfirmReply =
            serde_json::from_slice(&body).map_err(|e| ConfirmError::Decode(e.to_string()))?;
        debug!(request_id = %request.request_id, status = ?reply.status, "confirmer replied");
        reply.into_outcome()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ReplyStatus {
    Confirmed,
    Declined,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmReply {
    status: ReplyStatus,
    confirmation_id: Option<String>,
    reason: Option<String>,
}

impl ConfirmReply {
    fn into_outcome(self) -> Result<PurchaseOutcome, ConfirmError> {
        match self.status {
            ReplyStatus::Confirmed => {
                let id = self
                    .confirmation_id
                    .filter(|s| !s.trim().is_empty())
                    .ok_or_else(|| {
                        ConfirmError::Decode("confirmed reply without confirmationId".to_string())
                    })?;
                Ok(PurchaseOutcome::Confirmed {
                    confirmation_id: id,
                })
            }
            ReplyStatus::Declined => Ok(PurchaseOutcome::Declined {
                reason: self.reason.unwrap_or_else(|| "declined".to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(json: &str) -> Result<PurchaseOutcome, ConfirmError> {
        serde_json::from_str::<ConfirmReply>(json)
            .map_err(|e| ConfirmError::Decode(e.to_string()))?
            .into_outcome()
    }

    #[test]
    fn confirmed_reply_maps_to_confirmed() {
        assert_eq!(
            reply(r#"{"status":"confirmed","confirmationId":"abc"}"#).unwrap(),
            PurchaseOutcome::Confirmed {
                confirmation_id: "abc".to_string()
            }
        );
    }

    #[test]
    fn declined_reply_without_reason_gets_default() {
        assert_eq!(
            reply(r#"{"status":"declined"}"#).unwrap(),
            PurchaseOutcome::Declined {
                reason: "declined".to_string()
            }
        );
    }

    #[test]
    fn confirmed_without_id_is_decode_error() {
        assert!(matches!(
            reply(r#"{"status":"confirmed"}"#),
            Err(ConfirmError::Decode(_))
        ));
    }

    #[test]
    fn string_wrapped_reply_is_decode_error() {
        let wrapped = r#""{\"status\":\"confirmed\",\"confirmationId\":\"abc\"}""#;
        assert!(matches!(reply(wrapped), Err(ConfirmError::Decode(_))));
    }
}
