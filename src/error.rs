use thiserror::Error;

use super::geometry::Typology;
use super::geometry::ZoneGeometry;

/// Errors raised by the corridor model.
///
/// Numerical singularities (no demand, no line, empty logit denominator) are not
/// errors: they resolve to `0` or an infinite sentinel so aggregates keep summing.
#[derive(Debug, Error)]
pub enum CorridorError {
    #[error("line {line:?} does not belong to corridor {corridor:?}")]
    ForeignLine { line: String, corridor: String },

    #[error("zone {zone} is out of range for a corridor with {n_zones} zones")]
    ZoneOutOfRange { zone: usize, n_zones: usize },

    #[error("expected {expected} zones, found {found}")]
    ZoneCountMismatch { expected: usize, found: usize },

    #[error("expected a {expected_typology:?} corridor of {expected_length} km, \
             found a {found_typology:?} one of {found_length} km")]
    GeometryMismatch {
        expected_length: f64,
        expected_typology: Typology,
        found_length: f64,
        found_typology: Typology,
    },

    #[error("corridor length must be positive and finite, got {0}")]
    InvalidLength(f64),

    #[error("demand must be non-negative and finite, got {0}")]
    InvalidDemand(f64),

    #[error("invalid bounds for {variable}: ({min}, {max})")]
    InvalidBounds { variable: String, min: f64, max: f64 },

    #[error("bad configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] yaml_rust::ScanError),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl CorridorError {
    pub(crate) fn geometry_mismatch(expected: &ZoneGeometry, found: &ZoneGeometry)
                                    -> CorridorError {
        return CorridorError::GeometryMismatch {
            expected_length: expected.length(),
            expected_typology: expected.typology(),
            found_length: found.length(),
            found_typology: found.typology(),
        };
    }
}
