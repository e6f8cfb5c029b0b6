pub mod core;
pub mod error;
pub mod fs_paths;
pub mod models;
pub mod page;
pub mod pipeline;
pub mod platforms;

pub use error::{PipelineError, PipelineResult};
