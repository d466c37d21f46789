pub mod api;
pub mod assets;
pub mod audio;
pub mod input;
pub mod stage;

// Re-export key types at crate root for convenience
pub use api::experience::{EngineConfig, Experience};
pub use assets::cache::{AssetCache, AudioBuffer};
pub use assets::catalog::{keys, AssetCatalog, AssetClass, AssetDescriptor, CatalogError};
pub use assets::preloader::{LoadProgress, Preloader};
pub use audio::gate::GestureGate;
pub use audio::manager::{PlayOptions, PlaybackManager};
pub use audio::output::{default_output, AudioOutput, NullOutput, PlayRequest, PlaybackError, TrackHandle};
pub use audio::policy::PlaybackPolicy;
pub use audio::throttle::RateLimiter;
pub use input::queue::{InputEvent, InputQueue};
pub use stage::cues::{background_track, transition_sound};
pub use stage::sequencer::{Stage, StageEvent, StageSequencer};

#[cfg(feature = "rodio-output")]
pub use audio::output::RodioOutput;
