pub mod analyzer;
pub mod border;
pub mod config;
pub mod debris;
pub mod flood_fill;
pub mod raster;
pub mod reference;
pub mod statistics;
pub mod sweep;
pub mod tolerance;
