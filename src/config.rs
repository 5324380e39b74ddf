//! Scenario configuration
//!
//! A scenario describes one day at one site for one crop. Every section is
//! optional and falls back to its defaults, so the smallest valid scenario is
//! an empty document.
//!
//! ```toml
//! [site]
//! day_of_year = 144
//! latitude = 18.3
//!
//! [weather]
//! max_temperature = 28.0
//! min_temperature = 16.0
//! daily_radiation = 20.0
//!
//! [crop]
//! pathway = "c4"
//!
//! [inputs]
//! lai = 3.0
//! soil_water = 2.0
//! ```

use dcapst_components::parameters::{
    CanopyParameters, ModelSettings, PathwayParameters, WaterParameters,
};
use dcapst_components::photosynthesis::Pathway;
use dcapst_components::{DailyInputs, DailyOutcome, DcapstModel};
use dcapst_core::environment::{RadiationModel, SolarGeometryModel, TemperatureModel};
use dcapst_core::errors::{DcapstError, DcapstResult};
use dcapst_core::FloatValue;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// default: 144
    pub day_of_year: u32,

    /// unit: degrees north
    /// default: 18.3
    pub latitude: FloatValue,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            day_of_year: 144,
            latitude: 18.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// unit: °C
    /// default: 28
    pub max_temperature: FloatValue,

    /// unit: °C
    /// default: 16
    pub min_temperature: FloatValue,

    /// unit: MJ / m^2 / day
    /// default: 20
    pub daily_radiation: FloatValue,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            max_temperature: 28.0,
            min_temperature: 16.0,
            daily_radiation: 20.0,
        }
    }
}

/// Crop pathway, optionally with a full replacement of its parameter set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    pub pathway: Pathway,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<PathwayParameters>,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            pathway: Pathway::C3,
            parameters: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DcapstConfig {
    pub site: SiteConfig,
    pub weather: WeatherConfig,
    pub crop: CropConfig,
    pub canopy: CanopyParameters,
    pub water: WaterParameters,
    pub settings: ModelSettings,
    pub inputs: DailyInputs,
}

impl DcapstConfig {
    pub fn from_toml_str(content: &str) -> DcapstResult<Self> {
        toml::from_str(content).map_err(|e| DcapstError::InvalidConfig(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> DcapstResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        info!("Loading scenario from {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> DcapstResult<String> {
        toml::to_string(self).map_err(|e| DcapstError::InvalidConfig(e.to_string()))
    }

    /// The pathway parameters for the configured crop
    ///
    /// An explicit parameter table must describe the same pathway as `crop.pathway`.
    pub fn pathway_parameters(&self) -> DcapstResult<PathwayParameters> {
        match &self.crop.parameters {
            None => Ok(PathwayParameters::for_pathway(self.crop.pathway)),
            Some(parameters) if parameters.pathway == self.crop.pathway => Ok(parameters.clone()),
            Some(parameters) => Err(DcapstError::InvalidConfig(format!(
                "crop.pathway is {} but crop.parameters describes {}",
                self.crop.pathway, parameters.pathway
            ))),
        }
    }

    /// Assemble a model using the reference solar, temperature and radiation models
    pub fn build_model(&self) -> DcapstResult<DcapstModel> {
        let solar = Arc::new(SolarGeometryModel::new(
            self.site.day_of_year,
            self.site.latitude,
        )?);
        let temperature = TemperatureModel::new(
            solar.clone(),
            self.weather.max_temperature,
            self.weather.min_temperature,
        )?;
        let radiation = RadiationModel::new(solar.clone(), self.weather.daily_radiation);

        DcapstModel::builder()
            .with_canopy(self.canopy.clone())
            .with_pathway(self.pathway_parameters()?)
            .with_water(self.water.clone())
            .with_settings(self.settings.clone())
            .with_solar_geometry(solar)
            .with_radiation(Box::new(radiation))
            .with_temperature(Box::new(temperature))
            .build()
    }

    /// Build the model and run it for the configured day
    pub fn run(&self) -> DcapstResult<DailyOutcome> {
        let mut model = self.build_model()?;
        model.daily_run(&self.inputs)
    }
}
