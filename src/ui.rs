//! Display-context model: axes, the scrolling raster and the block views.

pub mod axis;
pub mod raster;
pub mod visualization;
