pub mod etl;
pub mod pipeline;

pub use crate::domain::model::DelayRecord;
pub use crate::domain::ports::{Pipeline, ReportConfigProvider, Storage};
pub use crate::utils::error::Result;
