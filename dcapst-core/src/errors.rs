use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum DcapstError {
    #[error("Missing required collaborator: {0}")]
    MissingCollaborator(String),
    #[error("Boundary layer heat conductance must be finite and non-zero, got {0}")]
    ZeroBoundaryConductance(f64),
    #[error("Day of year must be within [1, 366], got {0}")]
    InvalidDayOfYear(u32),
    #[error("Latitude must be within [-90, 90] degrees, got {0}")]
    InvalidLatitude(f64),
    #[error("Hour must be within [0, 24], got {0}")]
    HourOutOfRange(f64),
    #[error("Maximum temperature ({max}) is below minimum temperature ({min})")]
    InvalidTemperatureRange { max: f64, min: f64 },
    #[error("The {pathway} pathway has no {process} limiting process")]
    UnsupportedLimitation { pathway: String, process: String },
    #[error("Water supply bisection did not converge after {iterations} iterations (residual={residual})")]
    BisectionNotConverged { iterations: usize, residual: f64 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience type for `Result<T, DcapstError>`.
pub type DcapstResult<T> = Result<T, DcapstError>;
