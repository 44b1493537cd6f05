pub mod selection;
pub mod stage1_discover;
pub mod stage2_reviews;
pub mod stage3_registry;
pub mod stage4_website;
pub mod stage5_synthesize;

pub use selection::*;
pub use stage1_discover::*;
pub use stage2_reviews::*;
pub use stage3_registry::*;
pub use stage4_website::*;
pub use stage5_synthesize::*;

use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::connectors::Collaborators;
use crate::models::PipelineState;

/// One step of the vetting pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discover,
    Reviews,
    Registry,
    Website,
    Synthesize,
}

/// Execution order of a run
pub const STAGES: [Stage; 5] = [
    Stage::Discover,
    Stage::Reviews,
    Stage::Registry,
    Stage::Website,
    Stage::Synthesize,
];

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Discover => "discover",
            Stage::Reviews => "reviews",
            Stage::Registry => "registry",
            Stage::Website => "website",
            Stage::Synthesize => "synthesize",
        }
    }

    /// Run this stage against the state and return the next state
    pub async fn apply(
        self,
        state: PipelineState,
        collaborators: &Collaborators,
        config: &PipelineConfig,
    ) -> PipelineState {
        match self {
            Stage::Discover => {
                execute_discover(state, collaborators.listings.as_ref(), config).await
            }
            Stage::Reviews => execute_reviews(state, collaborators.reviews.as_ref()).await,
            Stage::Registry => execute_registry(state, collaborators.registry.as_ref()).await,
            Stage::Website => execute_website(state, collaborators.website.as_ref()).await,
            Stage::Synthesize => {
                execute_synthesize(state, collaborators.summarizer.as_ref()).await
            }
        }
    }
}

/// Fold a state through every stage in order
pub async fn run(
    mut state: PipelineState,
    collaborators: &Collaborators,
    config: &PipelineConfig,
) -> PipelineState {
    info!(
        service = %state.service_type,
        zip = %state.zip_code,
        "Starting vetting run"
    );

    for stage in STAGES {
        debug!(stage = stage.name(), "Entering stage");
        state = stage.apply(state, collaborators, config).await;
    }

    info!(
        contractor = ?state.contractor_name(),
        flags = state.flags.len(),
        report = state.report.is_some(),
        "Vetting run complete"
    );
    state
}

/// Collaborators and configuration bundled for repeated runs
#[derive(Clone)]
pub struct VettingPipeline {
    collaborators: Collaborators,
    config: PipelineConfig,
}

impl VettingPipeline {
    pub fn new(collaborators: Collaborators, config: PipelineConfig) -> Self {
        Self {
            collaborators,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(&self, state: PipelineState) -> PipelineState {
        run(state, &self.collaborators, &self.config).await
    }
}
