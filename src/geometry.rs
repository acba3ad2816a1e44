use ndarray::prelude::*;

use super::CorridorError;


// the outer zones of a city center or interurban corridor never exceed this length (km)
static OUTER_ZONE_CAP_KM: f64 = 3.0;
// otherwise, they take these shares of the corridor length
static CITY_CENTER_SHARE: f64 = 0.25;
static INTERURBAN_END_SHARE: f64 = 0.1;


/// The zoning pattern of a corridor.  It fixes the number of zones and how the
/// corridor length is split between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Typology {
    Homogeneous,
    CityCenter,
    Interurban,
}

impl Typology {
    pub fn n_zones(&self) -> usize {
        match self {
            Typology::Homogeneous => 1,
            Typology::CityCenter => 2,
            Typology::Interurban => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Typology::Homogeneous => "homogeneous",
            Typology::CityCenter => "city_center",
            Typology::Interurban => "interurban",
        }
    }

    pub fn from_name(name: &str) -> Option<Typology> {
        match &name.to_lowercase()[..] {
            "homogeneous" => Some(Typology::Homogeneous),
            "city_center" | "citycenter" => Some(Typology::CityCenter),
            "interurban" => Some(Typology::Interurban),
            _ => None,
        }
    }

    fn zone_lengths(&self, length: f64) -> Array1<f64> {
        match self {
            Typology::Homogeneous => array![length],
            Typology::CityCenter => {
                let center = (CITY_CENTER_SHARE * length).min(OUTER_ZONE_CAP_KM);
                array![length - center, center]
            },
            Typology::Interurban => {
                let end = (INTERURBAN_END_SHARE * length).min(OUTER_ZONE_CAP_KM);
                array![end, length - 2. * end, end]
            },
        }
    }
}


/// The 1-D zone layout of a corridor.
///
/// This is the read-only context that demand cells and lines are evaluated
/// against: they hold zone indices, never a handle to the corridor itself.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoneGeometry {
    length: f64,
    typology: Typology,
    zone_lengths: Array1<f64>,
    landmarks: Array1<f64>,
}

impl ZoneGeometry {
    pub fn new(length: f64, typology: Typology) -> Result<ZoneGeometry, CorridorError> {
        if !(length > 0.) || !length.is_finite() {
            return Err(CorridorError::InvalidLength(length));
        }

        let zone_lengths = typology.zone_lengths(length);
        let mut landmarks = Array1::zeros(zone_lengths.len() + 1);
        let mut cumulative = 0.;
        for (ii, zone_length) in zone_lengths.iter().enumerate() {
            cumulative += zone_length;
            landmarks[ii + 1] = cumulative;
        }
        // pin the last landmark so rounding never leaves a sliver past the end
        landmarks[zone_lengths.len()] = length;

        return Ok(ZoneGeometry {
            length,
            typology,
            zone_lengths,
            landmarks,
        });
    }

    pub fn length(&self) -> f64 {
        return self.length;
    }

    pub fn typology(&self) -> Typology {
        return self.typology;
    }

    pub fn n_zones(&self) -> usize {
        return self.zone_lengths.len();
    }

    pub fn zone_lengths(&self) -> &Array1<f64> {
        return &self.zone_lengths;
    }

    pub fn zone_length(&self, zone: usize) -> f64 {
        return self.zone_lengths[zone];
    }

    /// Zone boundaries, from 0 to the corridor length.
    pub fn landmarks(&self) -> &Array1<f64> {
        return &self.landmarks;
    }

    pub fn landmark(&self, idx: usize) -> f64 {
        return self.landmarks[idx];
    }

    pub fn midpoint(&self, zone: usize) -> f64 {
        return self.landmarks[zone] + 0.5 * self.zone_lengths[zone];
    }

    pub fn check_zone(&self, zone: usize) -> Result<(), CorridorError> {
        if zone < self.n_zones() {
            return Ok(());
        }
        return Err(CorridorError::ZoneOutOfRange{zone, n_zones: self.n_zones()});
    }

    /// Mean trip length between two zones, assuming trip ends are spread uniformly
    /// over each zone.  Intra-zone trips get a quarter of the zone length.
    pub fn trip_length(&self, origin: usize, dest: usize) -> f64 {
        if origin == dest {
            return self.zone_lengths[origin] / 4.;
        }
        return (self.midpoint(origin) - self.midpoint(dest)).abs();
    }
}
