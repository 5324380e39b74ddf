//! Model parameters
//!
//! Each parameter struct provides defaults matching the standard crop
//! configurations. Canopy and water parameters are shared by all pathways,
//! while [`PathwayParameters`] carries the biochemistry of one pathway.

mod canopy;
mod pathway;
mod settings;
mod water;

pub use canopy::{CanopyParameters, RadiationBand};
pub use pathway::{ArrheniusResponse, PathwayParameters, PeakedResponse};
pub use settings::{LeafTemperatureSeed, ModelSettings};
pub use water::WaterParameters;
