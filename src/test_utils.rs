use super::geometry::Typology;
use super::line::Line;
use super::parameters::Mode;
use super::Corridor;


/// The standard bus used throughout the tests: 10 veh/h, 0.5 km between stops,
/// 40 km/h, 70 seats, 34 s dwell, free fare.
pub fn bus_line(n_zones: usize) -> Line {
    Line::new(Mode::Bus, 10., vec![0.5; n_zones], vec![40.; n_zones], 70., 34. / 3600., 0., "")
}

/// A homogeneous 10 km corridor with 1000 intra-zone trips and the standard bus.
pub fn single_bus_corridor() -> Corridor {
    let mut corridor = Corridor::new("test", 10., Typology::Homogeneous).unwrap();
    corridor.set_od(0, 0, 1000.).unwrap();
    corridor.add_line(bus_line(1)).unwrap();
    corridor
}

/// Demand in every cell of the OD matrix, `base * (1 + origin + dest)`.
pub fn fill_demand(corridor: &mut Corridor, base: f64) {
    let n_zones = corridor.n_zones();
    for oo in 0..n_zones {
        for dd in 0..n_zones {
            corridor.set_od(oo, dd, base * (1 + oo + dd) as f64).unwrap();
        }
    }
}
