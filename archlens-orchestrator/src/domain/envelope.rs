//! Inbound and outbound message envelopes.
//!
//! Envelope validation failures are permanent by definition: a malformed
//! message can never succeed on redelivery, so the consumer acknowledges
//! and drops it instead of requeueing forever.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Inbound job envelope as published by the upload API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub file_content: Option<String>,
}

/// A validated, decoded analysis job
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    pub project_id: String,
    pub archive: Vec<u8>,
}

impl AnalysisRequest {
    /// Parse and validate an inbound payload into a runnable job.
    pub fn decode(payload: &[u8]) -> Result<AnalysisJob, EnvelopeError> {
        let request: AnalysisRequest = serde_json::from_slice(payload)?;

        let project_id = match request.project_id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(EnvelopeError::MissingProjectId),
        };

        let file_content = match request.file_content {
            Some(content) if !content.is_empty() => content,
            _ => return Err(EnvelopeError::MissingFileContent),
        };

        let archive = BASE64.decode(file_content.as_bytes())?;

        Ok(AnalysisJob {
            project_id,
            archive,
        })
    }
}

/// Outbound result envelope
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    pub project_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_processed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultEnvelope {
    /// Success envelope; artifact contents travel base64-encoded.
    pub fn success(
        project_id: impl Into<String>,
        analysis_content: Option<&str>,
        summary_content: Option<&str>,
        files_processed: usize,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            success: true,
            analysis_content: analysis_content.map(|text| BASE64.encode(text.as_bytes())),
            summary_content: summary_content.map(|text| BASE64.encode(text.as_bytes())),
            files_processed: Some(files_processed),
            error: None,
        }
    }

    pub fn failure(project_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            success: false,
            analysis_content: None,
            summary_content: None,
            files_processed: None,
            error: Some(error.into()),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Envelope validation failures; all permanent.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("Malformed JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Envelope is missing the project identifier")]
    MissingProjectId,

    #[error("Envelope is missing the file content")]
    MissingFileContent,

    #[error("File content is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_envelope_decodes_to_job() {
        let payload = serde_json::json!({
            "projectId": "p1",
            "fileContent": BASE64.encode(b"zip-bytes"),
        });
        let job = AnalysisRequest::decode(payload.to_string().as_bytes()).expect("valid");
        assert_eq!(job.project_id, "p1");
        assert_eq!(job.archive, b"zip-bytes");
    }

    #[test]
    fn missing_project_id_is_rejected() {
        let payload = br#"{"fileContent": "aGk="}"#;
        assert!(matches!(
            AnalysisRequest::decode(payload),
            Err(EnvelopeError::MissingProjectId)
        ));
    }

    #[test]
    fn missing_file_content_is_rejected() {
        let payload = br#"{"projectId": "p1"}"#;
        assert!(matches!(
            AnalysisRequest::decode(payload),
            Err(EnvelopeError::MissingFileContent)
        ));
    }

    #[test]
    fn non_json_payload_is_rejected() {
        assert!(matches!(
            AnalysisRequest::decode(b"not json"),
            Err(EnvelopeError::InvalidJson(_))
        ));
    }

    #[test]
    fn bad_base64_is_rejected() {
        let payload = br#"{"projectId": "p1", "fileContent": "%%%"}"#;
        assert!(matches!(
            AnalysisRequest::decode(payload),
            Err(EnvelopeError::InvalidBase64(_))
        ));
    }

    #[test]
    fn success_envelope_round_trips() {
        let envelope = ResultEnvelope::success("p1", Some("analysis"), Some("summary"), 4);
        let bytes = envelope.to_bytes().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["projectId"], "p1");
        assert_eq!(value["success"], true);
        assert_eq!(value["filesProcessed"], 4);
        let decoded = BASE64
            .decode(value["analysisContent"].as_str().unwrap())
            .unwrap();
        assert_eq!(decoded, b"analysis");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn failure_envelope_carries_only_the_error() {
        let envelope = ResultEnvelope::failure("p1", "corrupt archive");
        let value: serde_json::Value =
            serde_json::from_slice(&envelope.to_bytes().unwrap()).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "corrupt archive");
        assert!(value.get("analysisContent").is_none());
        assert!(value.get("filesProcessed").is_none());
    }
}
