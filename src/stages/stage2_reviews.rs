use tracing::{error, info, warn};

use super::selection::adopt_selection;
use crate::connectors::{ReviewQuery, ReviewSource};
use crate::models::PipelineState;

/// Execute Stage 2: Reviews
///
/// Resolves the selected candidate and fetches maps/reviews text for it. The
/// candidate's phone and address are passed along so the connector can pick
/// the right listing out of a multi-business results page.
pub async fn execute_reviews(state: PipelineState, reviews: &dyn ReviewSource) -> PipelineState {
    let (mut state, selected) = adopt_selection(state, "reviews");

    let name = state.contractor_name().unwrap_or_default().to_string();
    let zip = state.zip().to_string();
    let service = state.service().map(str::to_string);

    info!(contractor = %name, zip = %zip, "Starting review lookup");

    if name.is_empty() || zip.is_empty() {
        warn!("Skipping review lookup due to missing contractor_name or zip_code");
        state.flag("Missing contractor_name or zip_code for review lookup.");
        state.raw_reviews_data = Some(String::new());
        return state;
    }

    let query = ReviewQuery {
        contractor_name: &name,
        zip_code: &zip,
        service_type: service.as_deref(),
        expected_phone: selected.as_ref().and_then(|c| c.phone.as_deref()),
        expected_address: selected.as_ref().and_then(|c| c.address.as_deref()),
    };

    let result = reviews.fetch_reviews_text(query).await;
    match result {
        Ok(content) if content.trim().is_empty() => {
            warn!(contractor = %name, zip = %zip, "No review content found");
            state.flag(format!(
                "No review data found for contractor='{}' in zip='{}'.",
                name, zip
            ));
            state.raw_reviews_data = Some(String::new());
        }
        Ok(content) => {
            info!(contractor = %name, zip = %zip, chars = content.len(), "Review lookup complete");
            state.raw_reviews_data = Some(content);
        }
        Err(e) => {
            error!(contractor = %name, zip = %zip, error = %e, "Review lookup failed");
            state.flag(format!(
                "Review lookup failed for contractor='{}' in zip='{}'.",
                name, zip
            ));
            state.raw_reviews_data = Some(String::new());
        }
    }

    state
}
