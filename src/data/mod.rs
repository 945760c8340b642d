//! Data module - series model and plot_data loading

mod loader;
mod series;

pub use loader::SeriesLoader;
pub use series::{timestamp_label, SeriesError, StatsSeries};
