//! Controller settings persisted as TOML.
//!
//! Settings live in `config.toml` under the application directory resolved by
//! [`crate::app_dirs`]. Missing files and missing keys fall back to defaults so
//! older files keep loading as fields are added.

mod errors;
mod io;
mod types;

pub use errors::ConfigError;
pub use io::{CONFIG_FILE_NAME, config_path, load_from, load_or_default, save, save_to};
pub use types::{ControllerSettings, DEFAULT_SPARSE_CHANNELS, SparsitySettings};
