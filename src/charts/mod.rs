//! Charts module - styling and the two chart renderers

mod canvas;
mod font;
mod style;
mod svg;

pub use canvas::CanvasChart;
pub use style::{crashes_datasets, paths_datasets};
pub use svg::{DualAxisChart, SvgContainer};
