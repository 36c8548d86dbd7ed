use super::{encode_payload, PROTOCOL_VERSION};
use looking_glass_domain::{DomainError, QueryResult};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ResponseDocument {
    pub version: f64,
    pub responses: Vec<WireResponse>,
}

/// One entry per query, in request order.
#[derive(Debug, Serialize)]
pub struct WireResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub res: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errno: Option<&'static str>,
    pub src: Option<String>,
    pub sport: Option<u16>,
    pub time_elapsed: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorDocument {
    pub version: f64,
    pub error: String,
}

impl From<&QueryResult> for WireResponse {
    fn from(result: &QueryResult) -> Self {
        let error = result.error();
        Self {
            res: result.response().map(encode_payload),
            err: error.map(|e| e.kind()),
            errno: error.and_then(|e| e.errno()).map(|errno| errno.name()),
            src: result.source.map(|ip| ip.to_string()),
            sport: result.source_port,
            time_elapsed: result.elapsed_ms(),
        }
    }
}

pub fn encode_response(results: &[QueryResult]) -> Result<String, DomainError> {
    let document = ResponseDocument {
        version: PROTOCOL_VERSION,
        responses: results.iter().map(WireResponse::from).collect(),
    };

    serde_json::to_string(&document)
        .map_err(|e| DomainError::EncodingFailure(e.to_string()))
}

/// Batch failure document. Falls back to a fixed document if even that
/// cannot be serialized.
pub fn encode_error(error: &DomainError) -> String {
    let document = ErrorDocument {
        version: PROTOCOL_VERSION,
        error: error.to_string(),
    };

    serde_json::to_string(&document)
        .unwrap_or_else(|_| r#"{"version":1.0,"error":"internal encoding failure"}"#.to_string())
}
