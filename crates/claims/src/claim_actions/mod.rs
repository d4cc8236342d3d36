pub mod actions;
pub mod executor;
pub mod plugin;
pub mod queue;
pub mod result_log;
pub mod results;

pub use actions::*;
pub use executor::execute_claim_actions;
pub use plugin::ClaimsPlugin;
pub use queue::*;
pub use result_log::ClaimResultLog;
pub use results::*;
