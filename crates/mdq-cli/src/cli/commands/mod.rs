mod add;
mod control;
mod folder;
mod run;
mod status;

pub use add::run_add;
pub use control::{run_cancel, run_clear, run_retry};
pub use folder::run_folder;
pub use run::run_queue;
pub use status::run_status;
