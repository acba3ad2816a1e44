use super::geometry::ZoneGeometry;
use super::parameters::{Mode, Parameters};
use super::CorridorError;


pub static DEFAULT_FREQUENCY_BOUNDS: (f64, f64) = (1., 60.);
pub static DEFAULT_SPACING_BOUNDS: (f64, f64) = (0.25, 20.);


/// A line attribute the optimizer may search over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DesignVariable {
    Frequency,
    Spacing(usize),
}

impl DesignVariable {
    pub fn describe(&self) -> String {
        match self {
            DesignVariable::Frequency => String::from("frequency"),
            DesignVariable::Spacing(zone) => format!("spacing in zone {}", zone),
        }
    }
}

/// A design variable released to the optimizer, with its search bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FreeVariable {
    pub variable: DesignVariable,
    pub min: f64,
    pub max: f64,
}

impl FreeVariable {
    pub fn new(variable: DesignVariable, min: f64, max: f64) -> Result<FreeVariable, CorridorError> {
        if !min.is_finite() || !max.is_finite() || min <= 0. || min > max {
            return Err(CorridorError::InvalidBounds{variable: variable.describe(), min, max});
        }
        return Ok(FreeVariable{variable, min, max});
    }

    pub fn with_default_bounds(variable: DesignVariable) -> FreeVariable {
        let (min, max) = match variable {
            DesignVariable::Frequency => DEFAULT_FREQUENCY_BOUNDS,
            DesignVariable::Spacing(_) => DEFAULT_SPACING_BOUNDS,
        };
        return FreeVariable{variable, min, max};
    }

    pub fn clamp(&self, value: f64) -> f64 {
        return value.max(self.min).min(self.max);
    }
}


/// One transport alternative on the corridor: the private car, or a transit line
/// with a frequency and a stop spacing in each zone.
///
/// Per-zone attributes (`spacing`, `max_speed`) are indexed like the zones of the
/// corridor the line runs on.  Stop spacing is ignored for the car.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    mode: Mode,
    // vehicles per hour
    pub frequency: f64,
    // km, per zone
    pub spacing: Vec<f64>,
    // km/h, per zone
    pub max_speed: Vec<f64>,
    // passengers per vehicle
    pub capacity: f64,
    // hours lost at each stop
    pub dwell_time: f64,
    pub price: f64,
    pub name: String,
    // kept sorted by variable, so flattening is deterministic
    free_vars: Vec<FreeVariable>,
}

impl Line {
    pub fn new(mode: Mode, frequency: f64, spacing: Vec<f64>, max_speed: Vec<f64>, capacity: f64,
               dwell_time: f64, price: f64, name: &str) -> Line {
        let name = match name {
            "" => String::from(mode.name()),
            _ => String::from(name),
        };
        return Line {
            mode,
            frequency,
            spacing,
            max_speed,
            capacity,
            dwell_time,
            price,
            name,
            free_vars: vec![],
        };
    }

    pub fn mode(&self) -> Mode {
        return self.mode;
    }

    pub fn n_zones(&self) -> usize {
        return self.spacing.len();
    }

    /// Checks that the per-zone attributes and free variables fit the geometry.
    pub fn check_zones(&self, geometry: &ZoneGeometry) -> Result<(), CorridorError> {
        let expected = geometry.n_zones();
        for found in &[self.spacing.len(), self.max_speed.len()] {
            if *found != expected {
                return Err(CorridorError::ZoneCountMismatch{expected, found: *found});
            }
        }
        for fv in &self.free_vars {
            if let DesignVariable::Spacing(zone) = fv.variable {
                geometry.check_zone(zone)?;
            }
        }
        return Ok(());
    }

    pub fn free_variables(&self) -> &[FreeVariable] {
        return &self.free_vars;
    }

    /// Releases a variable to the optimizer, replacing any earlier bounds for it.
    pub fn set_free(&mut self, free_var: FreeVariable) -> Result<(), CorridorError> {
        if let DesignVariable::Spacing(zone) = free_var.variable {
            if zone >= self.n_zones() {
                return Err(CorridorError::ZoneOutOfRange{zone, n_zones: self.n_zones()});
            }
        }
        self.set_fixed(free_var.variable);
        self.free_vars.push(free_var);
        self.free_vars.sort_by_key(|fv| fv.variable);
        return Ok(());
    }

    pub fn set_fixed(&mut self, variable: DesignVariable) {
        self.free_vars.retain(|fv| fv.variable != variable);
    }

    pub fn clear_free_variables(&mut self) {
        self.free_vars.clear();
    }

    pub fn get(&self, variable: DesignVariable) -> f64 {
        match variable {
            DesignVariable::Frequency => self.frequency,
            DesignVariable::Spacing(zone) => self.spacing[zone],
        }
    }

    pub fn set(&mut self, variable: DesignVariable, value: f64) {
        match variable {
            DesignVariable::Frequency => self.frequency = value,
            DesignVariable::Spacing(zone) => self.spacing[zone] = value,
        }
    }

    /// Speed including the time lost at stops, in the given zone.  When the
    /// spacing exceeds the zone length no stop fits in it, so vehicles cruise.
    pub fn commercial_speed(&self, geometry: &ZoneGeometry, zone: usize) -> f64 {
        let speed = self.max_speed[zone];
        if self.mode.is_car() || self.spacing[zone] > geometry.zone_length(zone) {
            return speed;
        }
        return 1. / (1. / speed + self.dwell_time / self.spacing[zone]);
    }

    /// Commercial speed over the whole corridor.
    pub fn corridor_commercial_speed(&self, geometry: &ZoneGeometry) -> f64 {
        let run_time: f64 = (0..geometry.n_zones())
            .map(|zz| geometry.zone_length(zz) / self.commercial_speed(geometry, zz))
            .sum();
        return geometry.length() / run_time;
    }

    /// Fleet needed to run a full round trip at this line's frequency.
    pub fn vehicles_number(&self, geometry: &ZoneGeometry) -> f64 {
        if self.mode.is_car() {
            return 0.;
        }
        let one_way_time = geometry.length() / self.corridor_commercial_speed(geometry);
        return 2. * self.frequency * one_way_time;
    }

    /// Number of stations in a zone, or 0 if the spacing leaves no room for one.
    pub fn stations_in_zone(&self, geometry: &ZoneGeometry, zone: usize) -> f64 {
        if self.mode.is_car() || self.spacing[zone] >= geometry.zone_length(zone) {
            return 0.;
        }
        return geometry.zone_length(zone) / self.spacing[zone];
    }

    pub fn operating_cost(&self, geometry: &ZoneGeometry, params: &Parameters) -> f64 {
        return params.operating_cost[self.mode.index()] * self.vehicles_number(geometry);
    }

    pub fn infra_cost(&self, geometry: &ZoneGeometry, params: &Parameters) -> f64 {
        let mi = self.mode.index();
        if self.mode.is_car() {
            return params.infra_cost[mi];
        }
        let stations: f64 = (0..geometry.n_zones())
            .map(|zz| self.stations_in_zone(geometry, zz))
            .sum();
        return params.infra_cost[mi] * self.vehicles_number(geometry)
            + params.station_cost[mi] * stations;
    }

    pub fn operator_cost(&self, geometry: &ZoneGeometry, params: &Parameters) -> f64 {
        return self.operating_cost(geometry, params) + self.infra_cost(geometry, params);
    }

    /// Hourly passenger capacity offered by the line.
    pub fn hourly_capacity(&self) -> f64 {
        return self.frequency * self.capacity;
    }
}
