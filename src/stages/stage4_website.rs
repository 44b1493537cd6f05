use tracing::{error, info, warn};

use super::selection::adopt_selection;
use crate::connectors::WebsiteSource;
use crate::models::PipelineState;

/// Execute Stage 4: Website
///
/// Same selection and guard rules as the reviews stage. Prefers the
/// selected candidate's website and falls back to the caller-provided one.
/// The extracted record is stored as JSON so the synthesizer can recover it.
pub async fn execute_website(state: PipelineState, website: &dyn WebsiteSource) -> PipelineState {
    let (mut state, selected) = adopt_selection(state, "website");

    let name = state.contractor_name().unwrap_or_default().to_string();
    let zip = state.zip().to_string();
    let service = state.service().map(str::to_string);

    if name.is_empty() || zip.is_empty() {
        warn!("Skipping website analysis due to missing contractor_name or zip_code");
        state.flag("Missing contractor_name or zip_code for website analysis.");
        state.raw_website_data = Some(String::new());
        return state;
    }

    let url = selected
        .as_ref()
        .and_then(|c| non_blank(c.website.as_deref()))
        .or_else(|| non_blank(state.contractor_website.as_deref()))
        .map(str::to_string);

    let Some(url) = url else {
        warn!(contractor = %name, "No website URL available");
        state.flag(format!(
            "Missing website URL for contractor='{}'; skipping website analysis.",
            name
        ));
        state.raw_website_data = Some(String::new());
        return state;
    };

    info!(contractor = %name, url = %url, "Starting website analysis");

    let result = website.fetch_website_info(&url, service.as_deref()).await;
    let info = match result {
        Ok(info) => info,
        Err(e) => {
            error!(contractor = %name, url = %url, error = %e, "Website analysis failed");
            state.flag(format!(
                "Website analysis failed for contractor='{}' at url='{}'.",
                name, url
            ));
            state.raw_website_data = Some(String::new());
            return state;
        }
    };

    if info.is_sparse() {
        warn!(contractor = %name, url = %url, "Sparse website data");
        state.flag(format!(
            "Sparse website data for contractor='{}': no services or license number found.",
            name
        ));
    }

    match serde_json::to_string(&info) {
        Ok(json) => {
            info!(
                contractor = %name,
                services = info.services_offered.len(),
                "Website analysis complete"
            );
            state.raw_website_data = Some(json);
        }
        Err(e) => {
            error!(contractor = %name, error = %e, "Failed to serialize website data");
            state.flag(format!(
                "Website analysis failed for contractor='{}' at url='{}'.",
                name, url
            ));
            state.raw_website_data = Some(String::new());
        }
    }

    state
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  https://acme.com ")), Some("https://acme.com"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
