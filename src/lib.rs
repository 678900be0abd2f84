//! Cached controller over spike-sorting results for GUI views.
/// Per-user settings and log directories.
pub mod app_dirs;
/// Result bundle boundary traits and the in-memory bundle.
pub mod bundle;
/// Deterministic unit colors.
pub mod colors;
/// The result controller and its notifications.
pub mod controller;
/// Unit and channel identifiers.
pub mod ids;
/// Tracing subscriber setup.
pub mod logging;
/// TOML controller settings.
pub mod settings;
/// Boolean unit-by-channel sparsity mask.
pub mod sparsity;
/// Flat spike vector.
pub mod spikes;
/// egui-facing view helpers.
pub mod view_model;

pub use bundle::{
    BundleError, InMemoryBundle, PeakSign, Recording, ResultBundle, Sorting, TemplateMode,
    TraceRequest, TraceSource,
};
pub use controller::{ControllerError, ControllerEvent, ResultController};
pub use ids::{ChannelId, UnitId};
pub use settings::ControllerSettings;
