//! Dashboard orchestration, UI-agnostic.

mod refresh;
mod state;

pub use refresh::{Dashboard, LoadedData, RefreshOutcome};
pub use state::DashboardState;
