//! Shared fixtures for integration tests.

#![allow(dead_code)]

use dcapst_components::parameters::{ModelSettings, PathwayParameters};
use dcapst_components::DcapstModel;
use dcapst_core::environment::{RadiationModel, SolarGeometryModel, TemperatureModel};
use std::sync::Arc;

/// Weather of a single reference day
#[derive(Debug, Clone, Copy)]
pub struct Day {
    pub day_of_year: u32,
    pub latitude: f64,
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub radiation: f64,
}

impl Default for Day {
    fn default() -> Self {
        Self {
            day_of_year: 144,
            latitude: 18.3,
            max_temperature: 28.0,
            min_temperature: 16.0,
            radiation: 20.0,
        }
    }
}

pub fn build_model(pathway: PathwayParameters, day: Day, settings: ModelSettings) -> DcapstModel {
    let solar = Arc::new(SolarGeometryModel::new(day.day_of_year, day.latitude).unwrap());
    let temperature =
        TemperatureModel::new(solar.clone(), day.max_temperature, day.min_temperature).unwrap();
    let radiation = RadiationModel::new(solar.clone(), day.radiation);

    DcapstModel::builder()
        .with_pathway(pathway)
        .with_settings(settings)
        .with_solar_geometry(solar)
        .with_radiation(Box::new(radiation))
        .with_temperature(Box::new(temperature))
        .build()
        .unwrap()
}

pub fn reference_model(pathway: PathwayParameters) -> DcapstModel {
    build_model(pathway, Day::default(), ModelSettings::default())
}

pub fn all_pathways() -> [PathwayParameters; 3] {
    [
        PathwayParameters::c3(),
        PathwayParameters::c4(),
        PathwayParameters::ccm(),
    ]
}
