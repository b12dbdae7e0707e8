pub mod cli;
pub mod input;
pub mod model;
pub mod network;
pub mod pipeline;
pub mod report;
pub mod stats;

pub mod prelude {
    pub use crate::model::config::AnalysisConfig;
    pub use crate::model::expression::{ExpressionMatrix, Group};
    pub use crate::pipeline::stage1_load::DatasetCtx;
}
