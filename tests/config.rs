use approx::assert_relative_eq;
use dcapst::dcapst_components::parameters::PathwayParameters;
use dcapst::dcapst_components::photosynthesis::Pathway;
use dcapst::dcapst_components::DailyOutcome;
use dcapst::dcapst_core::errors::DcapstError;
use dcapst::DcapstConfig;

const SCENARIO: &str = r#"
[site]
day_of_year = 144
latitude = 18.3

[weather]
max_temperature = 28.0
min_temperature = 16.0
daily_radiation = 20.0

[crop]
pathway = "c4"

[canopy]
leaf_angle = 60.0

[settings]
max_iterations = 4
leaf_temperature_seed = "air_temperature"

[inputs]
lai = 4.0
soil_water = 2.0
"#;

#[test]
fn test_parse_scenario() {
    let config = DcapstConfig::from_toml_str(SCENARIO).unwrap();

    assert_eq!(config.crop.pathway, Pathway::C4);
    assert_eq!(config.canopy.leaf_angle, 60.0);
    assert_eq!(config.settings.max_iterations, 4);
    assert_eq!(config.inputs.lai, 4.0);
    assert_eq!(config.inputs.soil_water, 2.0);
    // Unspecified fields keep their defaults
    assert_eq!(config.inputs.sln, 1.5);
    assert_eq!(config.settings.time_step, 1.0);
}

#[test]
fn test_unknown_pathway() {
    let result = DcapstConfig::from_toml_str(
        r#"
        [crop]
        pathway = "cam"
        "#,
    );

    assert!(matches!(result, Err(DcapstError::InvalidConfig(_))));
}

#[test]
fn test_run_scenario() {
    let config = DcapstConfig::from_toml_str(SCENARIO).unwrap();
    let outcome = config.run().unwrap();

    assert_eq!(outcome.intervals.len(), 13);
    assert!(outcome.result.potential_biomass > 10.0);
    assert!(outcome.result.actual_biomass > 0.0);
    assert!(outcome.result.actual_biomass <= outcome.result.potential_biomass);
    assert_relative_eq!(outcome.result.water_supplied, 2.0, epsilon = 1e-6);
}

#[test]
fn test_parameter_override_round_trip() {
    let mut parameters = PathwayParameters::c4();
    parameters.vcmax_sln_ratio = 0.5;

    let mut config = DcapstConfig::default();
    config.crop.pathway = Pathway::C4;
    config.crop.parameters = Some(parameters);

    let serialised = config.to_toml_string().unwrap();
    let deserialised = DcapstConfig::from_toml_str(&serialised).unwrap();

    let restored = deserialised.pathway_parameters().unwrap();
    assert_eq!(restored.pathway, Pathway::C4);
    assert_eq!(restored.vcmax_sln_ratio, 0.5);
    assert_eq!(deserialised.to_toml_string().unwrap(), serialised);
}

#[test]
fn test_from_file() {
    let path = std::env::temp_dir().join(format!("dcapst-scenario-{}.toml", std::process::id()));
    std::fs::write(&path, SCENARIO).unwrap();

    let config = DcapstConfig::from_file(&path);
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.unwrap().crop.pathway, Pathway::C4);
}

#[test]
fn test_missing_file() {
    let result = DcapstConfig::from_file("does/not/exist.toml");

    assert!(matches!(result, Err(DcapstError::Io(_))));
}

#[test]
fn test_outcome_serialises_to_json() {
    let config = DcapstConfig::from_toml_str(SCENARIO).unwrap();
    let outcome = config.run().unwrap();

    let serialised = serde_json::to_string(&outcome).unwrap();
    let restored: DailyOutcome = serde_json::from_str(&serialised).unwrap();

    assert_eq!(restored.intervals.len(), outcome.intervals.len());
    assert_relative_eq!(
        restored.result.potential_biomass,
        outcome.result.potential_biomass,
        max_relative = 1e-12
    );
    assert_relative_eq!(
        restored.result.actual_biomass,
        outcome.result.actual_biomass,
        max_relative = 1e-12
    );
    for (restored, original) in restored.intervals.iter().zip(&outcome.intervals) {
        assert_eq!(restored.hour, original.hour);
        assert_eq!(restored.sensible, original.sensible);
        assert_relative_eq!(
            restored.actual.assimilation(),
            original.actual.assimilation(),
            max_relative = 1e-12
        );
    }
}
