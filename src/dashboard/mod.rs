// Gateway module for the stats dashboard - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod render;
mod ui;

// Public re-exports - the ONLY way to access dashboard functionality
pub use render::render_stats;
pub use ui::{is_interactive, run_dashboard};
