//! Statistics used by the monitoring hooks

mod correlation;
mod summary;

pub use correlation::{pair_key, pearson, pearson_aligned, CorrelationMatrix};
pub use summary::{mean, simple_returns, std_dev};
