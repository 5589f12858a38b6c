//! Generation Module
//!
//! Everything between a request and a usable image reference: provider
//! probing with ordered fallback, aesthetic sampling and SVG synthesis.

pub mod fallback;
pub mod orchestrator;
pub mod provider;
pub mod randomizer;
pub mod synthesizer;

pub use fallback::{first_success, Attempt, Success};
pub use orchestrator::{
    PlaceholderOrchestrator, COMMON_PRESETS, EMERGENCY_FALLBACK_SERVICE, SVG_FALLBACK_SERVICE,
};
pub use provider::{HttpProber, Prober};
pub use randomizer::AestheticRandomizer;
pub use synthesizer::{to_data_uri, ProceduralSynthesizer, SVG_DATA_URI_PREFIX};
