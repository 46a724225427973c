pub mod csv_output;
pub mod etl;
pub mod gate;
pub mod retry;
pub mod scheduler;

pub use crate::domain::model::{OutputRow, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, ResultSource, Storage};
pub use crate::utils::error::Result;
