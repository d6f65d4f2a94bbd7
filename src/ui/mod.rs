//! Terminal output with a plain fallback for CI and pipes
//!
//! Interactive terminals get `cliclack` spinners and an `indicatif` bar
//! while the manifest is cached; everything else gets line-oriented text.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, outro_error, outro_success, remark, section, step_info,
    step_ok, step_ok_detail, step_warn,
};
pub use progress::{InstallProgress, TaskSpinner};
