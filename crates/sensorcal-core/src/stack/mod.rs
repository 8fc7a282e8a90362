mod folder;
pub mod mean;

pub use folder::StackJob;
pub use mean::{stack_mean_std, StackStatistics};
