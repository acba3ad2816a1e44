use yaml_rust::Yaml;

use super::config_utils;
use super::geometry::ZoneGeometry;
use super::line::Line;
use super::CorridorError;


pub const NUM_MODES: usize = 6;

/// The travel modes known to the model.  Mode 0 is the private car; all others
/// are scheduled transit modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Car,
    Bus,
    Bhns,
    Tram,
    Metro,
    Train,
}

impl Mode {
    pub const ALL: [Mode; NUM_MODES] =
        [Mode::Car, Mode::Bus, Mode::Bhns, Mode::Tram, Mode::Metro, Mode::Train];

    pub fn from_index(index: usize) -> Option<Mode> {
        return Mode::ALL.get(index).copied();
    }

    pub fn from_name(name: &str) -> Option<Mode> {
        let name = name.to_lowercase();
        return Mode::ALL.iter().find(|mm| mm.name().to_lowercase() == name).copied();
    }

    pub fn index(&self) -> usize {
        return *self as usize;
    }

    pub fn is_car(&self) -> bool {
        return *self == Mode::Car;
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Car => "Car",
            Mode::Bus => "Bus",
            Mode::Bhns => "BHNS",
            Mode::Tram => "Tram",
            Mode::Metro => "Metro",
            Mode::Train => "Train",
        }
    }
}


/// All the constants of the supply and demand models.
///
/// Per-mode arrays are indexed by `Mode::index()`.  Units: km, h, veh/h, pax, €.
/// `Clone` is a deep copy, which is how what-if evaluations isolate their edits
/// from the live instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    // supply side
    pub max_speed: [f64; NUM_MODES],
    pub min_spacing: [f64; NUM_MODES],
    pub frequency: [f64; NUM_MODES],
    pub capacity: [f64; NUM_MODES],
    pub dwell_time: [f64; NUM_MODES],
    // mode-specific constant of the logit model (€)
    pub alpha: [f64; NUM_MODES],
    pub price: [f64; NUM_MODES],
    // hourly cost per vehicle in service
    pub operating_cost: [f64; NUM_MODES],
    // hourly infrastructure cost: per vehicle for transit, flat for the car
    pub infra_cost: [f64; NUM_MODES],
    // hourly cost per station
    pub station_cost: [f64; NUM_MODES],
    // car running cost per km
    pub car_price: f64,

    // demand side
    // value of time (€/h)
    pub ctime: f64,
    pub access_weight: f64,
    pub wait_weight: f64,
    pub in_vehicle_weight: f64,
    pub egress_weight: f64,
    // exponent of the elastic demand response to the cost ratio
    pub gamma: f64,
    // fraction of the demand that does not respond to cost changes
    pub captive: f64,
}

impl Default for Parameters {
    fn default() -> Parameters {
        return Parameters {
            max_speed: [90., 40., 50., 60., 80., 120.],
            min_spacing: [0., 0.3, 0.5, 0.5, 1., 3.],
            frequency: [1800., 10., 12., 15., 20., 10.],
            capacity: [1.1, 70., 90., 150., 600., 700.],
            dwell_time: [0., 34. / 3600., 34. / 3600., 34. / 3600., 45. / 3600., 60. / 3600.],
            alpha: [0.; NUM_MODES],
            price: [0.; NUM_MODES],
            operating_cost: [0., 78., 78., 122., 446., 499.],
            infra_cost: [0., 0., 32., 24., 989., 646.],
            station_cost: [0.; NUM_MODES],
            car_price: 0.34,
            ctime: 12.,
            access_weight: 1.5,
            wait_weight: 1.5,
            in_vehicle_weight: 1.0,
            egress_weight: 1.0,
            gamma: 1.,
            captive: 0.3,
        };
    }
}

impl Parameters {
    /// Builds parameters from the defaults, overridden by whatever keys are present
    /// in the yaml mapping.
    pub fn from_yaml(yaml_cfg: &Yaml) -> Result<Parameters, CorridorError> {
        let mut params = Parameters::default();
        if yaml_cfg.is_badvalue() || yaml_cfg.is_null() {
            return Ok(params);
        }

        let per_mode_fields: [(&str, &mut [f64; NUM_MODES]); 10] = [
            ("max_speed", &mut params.max_speed),
            ("min_spacing", &mut params.min_spacing),
            ("frequency", &mut params.frequency),
            ("capacity", &mut params.capacity),
            ("dwell_time", &mut params.dwell_time),
            ("alpha", &mut params.alpha),
            ("price", &mut params.price),
            ("operating_cost", &mut params.operating_cost),
            ("infra_cost", &mut params.infra_cost),
            ("station_cost", &mut params.station_cost),
        ];
        for (key, field) in per_mode_fields {
            if let Some(values) = config_utils::get_opt_f64_vec(yaml_cfg, key)? {
                if values.len() != NUM_MODES {
                    return Err(CorridorError::Config(
                        format!("{} needs {} values, got {}", key, NUM_MODES, values.len())));
                }
                field.copy_from_slice(&values);
            }
        }

        let scalar_fields: [(&str, &mut f64); 8] = [
            ("car_price", &mut params.car_price),
            ("ctime", &mut params.ctime),
            ("access_weight", &mut params.access_weight),
            ("wait_weight", &mut params.wait_weight),
            ("in_vehicle_weight", &mut params.in_vehicle_weight),
            ("egress_weight", &mut params.egress_weight),
            ("gamma", &mut params.gamma),
            ("captive", &mut params.captive),
        ];
        for (key, field) in scalar_fields {
            if let Some(value) = config_utils::get_opt_f64(yaml_cfg, key)? {
                *field = value;
            }
        }

        if !(0. ..=1.).contains(&params.captive) {
            return Err(CorridorError::Config(
                format!("captive must be in [0, 1], got {}", params.captive)));
        }

        return Ok(params);
    }

    pub fn num_modes(&self) -> usize {
        return NUM_MODES;
    }

    /// Returns a copy of these parameters with the logit mode constants replaced.
    pub fn with_alphas(&self, alpha: [f64; NUM_MODES]) -> Parameters {
        let mut params = self.clone();
        params.alpha = alpha;
        return params;
    }

    /// A line of the given mode with this mode's default attributes in every zone.
    pub fn default_line(&self, geometry: &ZoneGeometry, mode: Mode) -> Line {
        let mi = mode.index();
        let n_zones = geometry.n_zones();
        return Line::new(
            mode,
            self.frequency[mi],
            vec![self.min_spacing[mi]; n_zones],
            vec![self.max_speed[mi]; n_zones],
            self.capacity[mi],
            self.dwell_time[mi],
            self.price[mi],
            "",
        );
    }
}


#[cfg(test)]
mod tests {
    use yaml_rust::YamlLoader;
    use super::*;
    use super::super::geometry::Typology;

    #[test]
    fn test_mode_lookup() {
        for (ii, mode) in Mode::ALL.iter().enumerate() {
            assert_eq!(mode.index(), ii);
            assert_eq!(Mode::from_index(ii), Some(*mode));
            assert_eq!(Mode::from_name(mode.name()), Some(*mode));
        }
        assert_eq!(Mode::from_name("bhns"), Some(Mode::Bhns));
        assert_eq!(Mode::from_index(NUM_MODES), None);
        assert!(Mode::Car.is_car());
        assert!(!Mode::Tram.is_car());
    }

    #[test]
    fn test_from_yaml_overrides() {
        let yaml = YamlLoader::load_from_str(
            "gamma: 2\ncaptive: 0.5\nalpha: [0, 1, 1, 1, 2, 3.5]\n").unwrap();
        let params = Parameters::from_yaml(&yaml[0]).unwrap();
        assert_eq!(params.gamma, 2.);
        assert_eq!(params.captive, 0.5);
        assert_eq!(params.alpha, [0., 1., 1., 1., 2., 3.5]);
        // untouched fields keep their defaults
        assert_eq!(params.max_speed, Parameters::default().max_speed);
        assert_eq!(params.ctime, 12.);
    }

    #[test]
    fn test_from_yaml_rejects_short_array() {
        let yaml = YamlLoader::load_from_str("capacity: [1, 2, 3]\n").unwrap();
        assert!(Parameters::from_yaml(&yaml[0]).is_err());

        let yaml = YamlLoader::load_from_str("captive: 1.5\n").unwrap();
        assert!(Parameters::from_yaml(&yaml[0]).is_err());
    }

    #[test]
    fn test_duplicate_is_independent() {
        let params = Parameters::default();
        let mut copy = params.clone();
        copy.alpha[2] = 4.;
        copy.gamma = 0.5;
        assert_eq!(copy.alpha[2], 4.);
        assert_eq!(copy.gamma, 0.5);
        assert_eq!(params.alpha[2], 0.);
        assert_eq!(params.gamma, 1.);

        let what_if = params.with_alphas([1.; NUM_MODES]);
        assert_eq!(what_if.alpha, [1.; NUM_MODES]);
        assert_eq!(params.alpha, [0.; NUM_MODES]);
    }

    #[test]
    fn test_default_line() {
        let params = Parameters::default();
        let geom = ZoneGeometry::new(30., Typology::Interurban).unwrap();
        let line = params.default_line(&geom, Mode::Tram);
        assert_eq!(line.mode(), Mode::Tram);
        assert_eq!(line.frequency, 15.);
        assert_eq!(line.spacing, vec![0.5; 3]);
        assert_eq!(line.max_speed, vec![60.; 3]);
        assert_eq!(line.capacity, 150.);
        assert_eq!(line.name, "Tram");
        assert!(line.free_variables().is_empty());
    }
}
