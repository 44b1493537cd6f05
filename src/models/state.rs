use serde::{Deserialize, Serialize};

use super::{Candidate, ConsolidatedReport};

/// The record threaded through every pipeline stage
///
/// Stages take the state by value and return the next value. Raw output
/// fields use `None` for "stage not attempted" and `Some("")` for
/// "attempted, nothing usable".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub service_type: String,
    pub zip_code: String,
    /// Requested number of candidates; `None` means the default
    pub target_contractor_count: Option<i64>,
    /// Contractor being vetted (caller override or resolved from the selection)
    pub contractor_name: Option<String>,
    /// Caller-known website, used when the selected candidate has none
    pub contractor_website: Option<String>,
    pub selected_contractor_index: Option<usize>,
    /// Ranked listing candidates, order preserved from the listing source
    pub candidates: Vec<Candidate>,
    pub listing_source_url: Option<String>,
    pub raw_listing_data: Option<String>,
    pub raw_reviews_data: Option<String>,
    pub raw_registry_data: Option<String>,
    pub raw_website_data: Option<String>,
    pub raw_synthesis_data: Option<String>,
    pub report: Option<ConsolidatedReport>,
    /// Non-fatal warnings, append-only in emission order
    pub flags: Vec<String>,
}

impl PipelineState {
    pub fn new(service_type: impl Into<String>, zip_code: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            zip_code: zip_code.into(),
            ..Default::default()
        }
    }

    pub fn with_target_count(mut self, count: i64) -> Self {
        self.target_contractor_count = Some(count);
        self
    }

    pub fn with_selected_index(mut self, index: usize) -> Self {
        self.selected_contractor_index = Some(index);
        self
    }

    pub fn with_contractor_name(mut self, name: impl Into<String>) -> Self {
        self.contractor_name = Some(name.into());
        self
    }

    pub fn with_contractor_website(mut self, website: impl Into<String>) -> Self {
        self.contractor_website = Some(website.into());
        self
    }

    /// Append a warning flag
    pub fn flag(&mut self, message: impl Into<String>) {
        self.flags.push(message.into());
    }

    /// Trimmed contractor name, if any non-blank name is set
    pub fn contractor_name(&self) -> Option<&str> {
        self.contractor_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    pub fn zip(&self) -> &str {
        self.zip_code.trim()
    }

    /// Trimmed service type, or `None` when blank
    pub fn service(&self) -> Option<&str> {
        let service = self.service_type.trim();
        (!service.is_empty()).then_some(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_is_treated_as_missing() {
        let state = PipelineState::new("roofing", "78701").with_contractor_name("   ");
        assert_eq!(state.contractor_name(), None);
    }

    #[test]
    fn test_flags_keep_emission_order() {
        let mut state = PipelineState::new("roofing", "78701");
        state.flag("first");
        state.flag("second");
        assert_eq!(state.flags, vec!["first", "second"]);
    }

    #[test]
    fn test_accessors_trim_inputs() {
        let state = PipelineState::new("  ", " 78701 ");
        assert_eq!(state.service(), None);
        assert_eq!(state.zip(), "78701");
    }
}
