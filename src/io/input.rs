use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::jobs::DiscoveryJobRequest;

/// A requests file holds either one request or a list of them
#[derive(Deserialize)]
#[serde(untagged)]
enum RequestFile {
    Many(Vec<DiscoveryJobRequest>),
    One(DiscoveryJobRequest),
}

/// Load discovery requests from a JSON file
pub fn load_requests_file(path: &Path) -> Result<Vec<DiscoveryJobRequest>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_requests_json(&content)
}

/// Parse discovery requests from a JSON string
pub fn parse_requests_json(json: &str) -> Result<Vec<DiscoveryJobRequest>> {
    let parsed: RequestFile =
        serde_json::from_str(json).context("Failed to parse discovery requests JSON")?;
    Ok(match parsed {
        RequestFile::Many(requests) => requests,
        RequestFile::One(request) => vec![request],
    })
}

/// Read a scraped page for offline inspection
pub fn load_page_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_list() {
        let json = r#"[
            {"service_type": "roofing", "zip_code": "78701", "target_contractor_count": 3},
            {"service_type": "plumbing", "zip_code": "10001", "selected_contractor_index": 2}
        ]"#;

        let requests = parse_requests_json(json).unwrap();

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].target_contractor_count, 3);
        assert_eq!(requests[1].target_contractor_count, 5);
        assert_eq!(requests[1].selected_contractor_index, 2);
    }

    #[test]
    fn test_parse_single_request() {
        let json = r#"{"service_type": "roofing", "zip_code": "78701", "contractor_name": "Acme"}"#;

        let requests = parse_requests_json(json).unwrap();

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].contractor_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_requests_json(r#"{"zip_code": 5}"#).is_err());
    }
}
