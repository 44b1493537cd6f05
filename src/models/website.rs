use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Facts extracted from a contractor's own website
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebsiteInfo {
    /// URL the facts were extracted from
    #[serde(default)]
    pub source_url: Option<String>,
    /// Services the contractor advertises (set-like, first occurrence wins)
    #[serde(default)]
    pub services_offered: Vec<String>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub years_in_business: Option<u32>,
}

impl WebsiteInfo {
    /// Empty record attributed to a URL (used when extraction yields nothing)
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            source_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Neither services nor a license number were found
    pub fn is_sparse(&self) -> bool {
        self.services_offered.is_empty() && self.license_number.is_none()
    }

    /// Clean up an extracted record
    ///
    /// Deduplicates services case-insensitively, drops blank strings, and
    /// fills `source_url` from the requested URL when the extractor left it out.
    pub fn normalized(self, requested_url: &str) -> Self {
        let mut seen = HashSet::new();
        let services_offered = self
            .services_offered
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert(s.to_lowercase()))
            .collect();

        let source_url = self
            .source_url
            .filter(|u| !u.trim().is_empty())
            .or_else(|| {
                let requested = requested_url.trim();
                (!requested.is_empty()).then(|| requested.to_string())
            });

        let license_number = self
            .license_number
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());

        Self {
            source_url,
            services_offered,
            license_number,
            years_in_business: self.years_in_business,
        }
    }
}
