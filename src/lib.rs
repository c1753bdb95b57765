//! Rotation-aware RGB raster canvas plus the weather/clock scene drawn with it.
//!
//! [`raster`] is the self-contained drawing core. The other modules build the
//! LED-matrix weather display on top of it.

pub mod config;
pub mod icons;
pub mod raster;
pub mod scene;
pub mod util;
pub mod weather;
