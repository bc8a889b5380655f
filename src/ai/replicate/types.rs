//! Replicate prediction payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct PredictionRequest<I: Serialize> {
    pub input: I,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    /// Statuses added by the API after this client was written.
    #[serde(other)]
    Unknown,
}

impl PredictionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PredictionStatus::Starting => "starting",
            PredictionStatus::Processing => "processing",
            PredictionStatus::Succeeded => "succeeded",
            PredictionStatus::Failed => "failed",
            PredictionStatus::Canceled => "canceled",
            PredictionStatus::Unknown => "unknown",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PredictionStatus::Succeeded | PredictionStatus::Failed | PredictionStatus::Canceled
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub urls: Option<PredictionUrls>,
}

#[derive(Debug, Deserialize)]
pub struct PredictionUrls {
    pub get: Option<String>,
}

impl Prediction {
    /// Human-readable failure reason, whatever shape the API used for it.
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => format!("Prediction {} {}", self.id, self.status.as_str()),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prediction_deserialization() {
        let prediction: Prediction = serde_json::from_value(json!({
            "id": "abc",
            "status": "succeeded",
            "output": "https://replicate.delivery/out.png",
            "error": null,
            "urls": {"get": "https://api.replicate.com/v1/predictions/abc"}
        }))
        .unwrap();

        assert_eq!(prediction.status, PredictionStatus::Succeeded);
        assert_eq!(prediction.output, Some(json!("https://replicate.delivery/out.png")));
        assert_eq!(
            prediction.urls.unwrap().get.as_deref(),
            Some("https://api.replicate.com/v1/predictions/abc")
        );
    }

    #[test]
    fn test_null_output_is_none() {
        let prediction: Prediction =
            serde_json::from_value(json!({"id": "abc", "status": "starting", "output": null}))
                .unwrap();
        assert!(prediction.output.is_none());
        assert!(!prediction.status.is_terminal());
    }

    #[test]
    fn test_unknown_status() {
        let prediction: Prediction =
            serde_json::from_value(json!({"id": "abc", "status": "queued"})).unwrap();
        assert_eq!(prediction.status, PredictionStatus::Unknown);
        assert!(!prediction.status.is_terminal());
    }

    #[test]
    fn test_error_message() {
        let prediction: Prediction = serde_json::from_value(json!({
            "id": "abc",
            "status": "failed",
            "error": "NSFW content detected"
        }))
        .unwrap();
        assert_eq!(prediction.error_message(), "NSFW content detected");

        let prediction: Prediction =
            serde_json::from_value(json!({"id": "abc", "status": "canceled"})).unwrap();
        assert_eq!(prediction.error_message(), "Prediction abc canceled");
    }
}
