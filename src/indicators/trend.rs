pub mod ma;

pub use ma::{rolling_mean, rolling_mean_values};
