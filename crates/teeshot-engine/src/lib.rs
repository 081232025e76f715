pub mod artifacts;
pub mod bulk;
pub mod collage;
pub mod config;
pub mod dryrun;
pub mod error;
pub mod executor;
pub mod export;
pub mod gemini;
pub mod provider;
pub mod session;
pub mod state;

pub use bulk::{generate_bulk, BulkObserver, NoopObserver};
pub use collage::{compose_collage, CollageLayout};
pub use config::GeneratorConfig;
pub use error::{GenerationError, RenderError, RunError};
pub use executor::{BatchExecutor, SerialExecutor};
pub use export::{resize_and_save, DirectorySink, DownloadSink, ExportFormat, ExportOutcome};
pub use provider::{default_generator_registry, GeneratorRegistry, MockupGenerator};
pub use session::Session;
pub use state::{AppState, GeneratedMockups, UploadedImage};
