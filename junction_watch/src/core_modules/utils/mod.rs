pub mod frame_helper;
pub mod glyphs;
pub mod raster;
