//! Configuration: one struct per subsystem, defaults in [`defaults`].

pub mod arranger_config;
pub mod defaults;
pub mod observability_config;
pub mod reasoner_config;
pub mod sync_config;
pub mod twin_config;

pub use arranger_config::ArrangerConfig;
pub use observability_config::ObservabilityConfig;
pub use reasoner_config::ReasonerConfig;
pub use sync_config::SyncConfig;
pub use twin_config::TwinConfig;
