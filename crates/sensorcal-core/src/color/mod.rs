pub mod bayer;

pub use bayer::{pull_apart, put_together, BayerColour, BayerPattern};
