use tracing::{error, info, warn};

use super::selection::adopt_selection;
use crate::connectors::RegistrySource;
use crate::models::PipelineState;

/// Execute Stage 3: Registry
///
/// Same selection and guard rules as the reviews stage; fetches the
/// accreditation registry text for the contractor.
pub async fn execute_registry(state: PipelineState, registry: &dyn RegistrySource) -> PipelineState {
    let (mut state, _) = adopt_selection(state, "registry");

    let name = state.contractor_name().unwrap_or_default().to_string();
    let zip = state.zip().to_string();
    let service = state.service().map(str::to_string);

    info!(contractor = %name, zip = %zip, "Starting registry lookup");

    if name.is_empty() || zip.is_empty() {
        warn!("Skipping registry lookup due to missing contractor_name or zip_code");
        state.flag("Missing contractor_name or zip_code for registry lookup.");
        state.raw_registry_data = Some(String::new());
        return state;
    }

    let result = registry
        .fetch_registry_text(&name, &zip, service.as_deref())
        .await;
    match result {
        Ok(content) if content.trim().is_empty() => {
            warn!(contractor = %name, zip = %zip, "No registry content found");
            state.flag(format!(
                "No registry data found for contractor='{}' in zip='{}'.",
                name, zip
            ));
            state.raw_registry_data = Some(String::new());
        }
        Ok(content) => {
            info!(contractor = %name, zip = %zip, "Registry lookup complete");
            state.raw_registry_data = Some(content);
        }
        Err(e) => {
            error!(contractor = %name, zip = %zip, error = %e, "Registry lookup failed");
            state.flag(format!(
                "Registry lookup failed for contractor='{}' in zip='{}'.",
                name, zip
            ));
            state.raw_registry_data = Some(String::new());
        }
    }

    state
}
