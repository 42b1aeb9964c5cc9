pub mod error;
pub mod pipeline;
pub mod present;
pub mod process;
pub mod score;

pub use error::{OpportunityError, Result};
pub use pipeline::{run_pipeline, RunOutput};
