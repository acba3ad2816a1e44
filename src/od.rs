use super::geometry::ZoneGeometry;
use super::line::Line;
use super::parameters::Parameters;


/// The demand between one origin zone and one destination zone, with the
/// logit choice model and the spatial load it puts on the corridor.
#[derive(Clone, Debug, PartialEq)]
pub struct Od {
    origin: usize,
    dest: usize,
    // trips per hour
    pub demand: f64,
    // demand distribution factor: 1 if origins are spread uniformly, ~0 if they
    // are concentrated at stations
    pub fd: f64,
    // waiting time factor: 0.5 if passengers turn up at random
    pub fw: f64,
    // egress factor: 1 if destinations are spread uniformly, 0 if they are stations
    pub fe: f64,
    // access and egress speeds (km/h)
    pub va: f64,
    pub ve: f64,
    trip_length: f64,
}

impl Od {
    pub fn new(geometry: &ZoneGeometry, origin: usize, dest: usize, demand: f64) -> Od {
        return Od {
            origin,
            dest,
            demand,
            fd: 1.,
            fw: 0.5,
            fe: 1.,
            va: 5.,
            ve: 5.,
            trip_length: geometry.trip_length(origin, dest),
        };
    }

    /// Re-derives everything that depends on the corridor geometry.
    pub fn update(&mut self, geometry: &ZoneGeometry) {
        self.trip_length = geometry.trip_length(self.origin, self.dest);
    }

    pub fn origin(&self) -> usize {
        return self.origin;
    }

    pub fn dest(&self) -> usize {
        return self.dest;
    }

    pub fn trip_length(&self) -> f64 {
        return self.trip_length;
    }

    pub fn access_time(&self, line: &Line) -> f64 {
        if line.mode().is_car() {
            return 0.;
        }
        return self.fd * line.spacing[self.origin] / (2. * self.va);
    }

    pub fn egress_time(&self, line: &Line) -> f64 {
        if line.mode().is_car() {
            return 0.;
        }
        return self.fe * line.spacing[self.dest] / (2. * self.ve);
    }

    pub fn waiting_time(&self, line: &Line) -> f64 {
        if line.mode().is_car() {
            return 0.;
        }
        return self.fw / line.frequency;
    }

    /// Time on board.  Vehicles cover half of the origin and destination zones on
    /// average, and the whole of every zone in between.
    pub fn in_vehicle_time(&self, geometry: &ZoneGeometry, line: &Line) -> f64 {
        let zone_time = |zone: usize| geometry.zone_length(zone) / line.commercial_speed(geometry, zone);
        let first = self.origin.min(self.dest);
        let last = self.origin.max(self.dest);
        if first == last {
            return zone_time(first) / 4.;
        }

        let mut time = zone_time(first) / 2. + zone_time(last) / 2.;
        for zone in first + 1..last {
            time += zone_time(zone);
        }
        return time;
    }

    pub fn travel_time(&self, geometry: &ZoneGeometry, line: &Line) -> f64 {
        return self.access_time(line) + self.waiting_time(line)
            + self.in_vehicle_time(geometry, line) + self.egress_time(line);
    }

    pub fn line_weighted_travel_time(&self, geometry: &ZoneGeometry, params: &Parameters,
                                     line: &Line) -> f64 {
        return params.access_weight * self.access_time(line)
            + params.wait_weight * self.waiting_time(line)
            + params.in_vehicle_weight * self.in_vehicle_time(geometry, line)
            + params.egress_weight * self.egress_time(line);
    }

    /// Weighted travel time averaged over the lines with the logit shares.
    pub fn weighted_travel_time(&self, geometry: &ZoneGeometry, params: &Parameters,
                                lines: &[Line]) -> f64 {
        if lines.is_empty() {
            return f64::INFINITY;
        }
        let splits = self.modal_splits(geometry, params, lines);
        return lines.iter().zip(splits.iter())
            .map(|(line, split)| split * self.line_weighted_travel_time(geometry, params, line))
            .sum();
    }

    /// Disutility of making this trip on the given line, in €.
    pub fn line_generalized_cost(&self, geometry: &ZoneGeometry, params: &Parameters,
                                 line: &Line) -> f64 {
        let mi = line.mode().index();
        let mut cost = params.ctime * self.line_weighted_travel_time(geometry, params, line)
            + line.price + params.alpha[mi];
        if line.mode().is_car() {
            cost += params.car_price * self.trip_length;
        }
        return cost;
    }

    /// Expected minimum cost over the available lines (the logit log-sum).
    pub fn generalized_cost(&self, geometry: &ZoneGeometry, params: &Parameters,
                            lines: &[Line]) -> f64 {
        if self.demand == 0. {
            return 0.;
        }
        if lines.is_empty() {
            return f64::INFINITY;
        }
        let logsum: f64 = lines.iter()
            .map(|line| (-self.line_generalized_cost(geometry, params, line)).exp())
            .sum();
        if logsum == 0. {
            return f64::INFINITY;
        }
        return -logsum.ln();
    }

    /// Share of this OD's demand that picks `line` among `lines`.
    pub fn modal_split(&self, geometry: &ZoneGeometry, params: &Parameters, lines: &[Line],
                       line: &Line) -> f64 {
        if self.demand == 0. || lines.is_empty() {
            return 0.;
        }
        let denom: f64 = lines.iter()
            .map(|ll| (-self.line_generalized_cost(geometry, params, ll)).exp())
            .sum();
        if denom == 0. {
            return 0.;
        }
        return (-self.line_generalized_cost(geometry, params, line)).exp() / denom;
    }

    /// The shares of every line at once, in the order of `lines`.
    pub fn modal_splits(&self, geometry: &ZoneGeometry, params: &Parameters, lines: &[Line])
                        -> Vec<f64> {
        if self.demand == 0. || lines.is_empty() {
            return vec![0.; lines.len()];
        }
        let utilities: Vec<f64> = lines.iter()
            .map(|line| (-self.line_generalized_cost(geometry, params, line)).exp())
            .collect();
        let denom: f64 = utilities.iter().sum();
        if denom == 0. {
            return vec![0.; lines.len()];
        }
        return utilities.iter().map(|uu| uu / denom).collect();
    }

    /// Passengers of this OD travelling towards the start of the corridor at
    /// abscissa `x`.
    pub fn load_a(&self, geometry: &ZoneGeometry, x: f64) -> f64 {
        if self.origin > self.dest {
            return self.ramp_load(geometry, x, self.dest, self.origin);
        } else if self.origin == self.dest {
            return self.intra_zone_load(geometry, x);
        }
        return 0.;
    }

    /// Passengers of this OD travelling towards the end of the corridor at
    /// abscissa `x`.
    pub fn load_b(&self, geometry: &ZoneGeometry, x: f64) -> f64 {
        if self.origin < self.dest {
            return self.ramp_load(geometry, x, self.origin, self.dest);
        } else if self.origin == self.dest {
            return self.intra_zone_load(geometry, x);
        }
        return 0.;
    }

    // Load of a trip spanning zones `first` to `last`: it ramps up linearly across
    // the first zone as trips start, is flat in between, and ramps down across the
    // last zone as they end.
    fn ramp_load(&self, geometry: &ZoneGeometry, x: f64, first: usize, last: usize) -> f64 {
        let start = geometry.landmark(first);
        let end = geometry.landmark(last + 1);
        if x < start || x > end {
            return 0.;
        }
        if x < geometry.landmark(first + 1) {
            return self.demand * (x - start) / geometry.zone_length(first);
        }
        if x > geometry.landmark(last) {
            return self.demand * (end - x) / geometry.zone_length(last);
        }
        return self.demand;
    }

    // With trip ends spread uniformly over the zone, the share of trips crossing a
    // point at relative position u in a given direction is u * (1 - u).
    fn intra_zone_load(&self, geometry: &ZoneGeometry, x: f64) -> f64 {
        let start = geometry.landmark(self.origin);
        let zone_length = geometry.zone_length(self.origin);
        if x < start || x > start + zone_length {
            return 0.;
        }
        let uu = (x - start) / zone_length;
        return self.demand * uu * (1. - uu);
    }
}


#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use approx::assert_relative_eq;
    use super::*;
    use super::super::geometry::Typology;
    use super::super::parameters::Mode;
    use super::super::test_utils::bus_line;

    fn interurban() -> ZoneGeometry {
        ZoneGeometry::new(30., Typology::Interurban).unwrap()
    }

    #[test]
    fn test_time_components() {
        let geom = ZoneGeometry::new(10., Typology::Homogeneous).unwrap();
        let od = Od::new(&geom, 0, 0, 1000.);
        let bus = bus_line(1);
        assert_abs_diff_eq!(od.trip_length(), 2.5);
        assert_relative_eq!(od.access_time(&bus), 0.5 / 10., max_relative = 1e-12);
        assert_relative_eq!(od.egress_time(&bus), 0.5 / 10., max_relative = 1e-12);
        assert_relative_eq!(od.waiting_time(&bus), 0.05, max_relative = 1e-12);
        let speed = bus.commercial_speed(&geom, 0);
        assert_relative_eq!(od.in_vehicle_time(&geom, &bus), 10. / (4. * speed),
                            max_relative = 1e-12);
        assert_relative_eq!(od.travel_time(&geom, &bus), 0.05 + 0.05 + 0.05 + 2.5 / speed,
                            max_relative = 1e-12);

        let car = Parameters::default().default_line(&geom, Mode::Car);
        assert_eq!(od.access_time(&car), 0.);
        assert_eq!(od.waiting_time(&car), 0.);
        assert_relative_eq!(od.travel_time(&geom, &car), 2.5 / 90., max_relative = 1e-12);
    }

    #[test]
    fn test_in_vehicle_time_across_zones() {
        let geom = interurban();
        let bus = bus_line(3);
        let zone_time = |zz: usize| geom.zone_length(zz) / bus.commercial_speed(&geom, zz);
        let expected = zone_time(0) / 2. + zone_time(1) + zone_time(2) / 2.;
        for (oo, dd) in &[(0, 2), (2, 0)] {
            let od = Od::new(&geom, *oo, *dd, 10.);
            assert_relative_eq!(od.in_vehicle_time(&geom, &bus), expected, max_relative = 1e-12);
        }
        let od = Od::new(&geom, 1, 2, 10.);
        assert_relative_eq!(od.in_vehicle_time(&geom, &bus), zone_time(1) / 2. + zone_time(2) / 2.,
                            max_relative = 1e-12);
    }

    #[test]
    fn test_generalized_cost_of_a_line() {
        let geom = ZoneGeometry::new(10., Typology::Homogeneous).unwrap();
        let mut params = Parameters::default();
        params.alpha[0] = 1.5;
        let od = Od::new(&geom, 0, 0, 1000.);
        let car = params.default_line(&geom, Mode::Car);
        let expected = 12. * (2.5 / 90.) + 1.5 + 0.34 * 2.5;
        assert_relative_eq!(od.line_generalized_cost(&geom, &params, &car), expected,
                            max_relative = 1e-12);

        let mut bus = bus_line(1);
        bus.price = 2.;
        let expected = 12. * od.line_weighted_travel_time(&geom, &params, &bus) + 2.;
        assert_relative_eq!(od.line_generalized_cost(&geom, &params, &bus), expected,
                            max_relative = 1e-12);
    }

    #[test]
    fn test_splits_sum_to_one() {
        let geom = interurban();
        let params = Parameters::default();
        let mut lines = vec![params.default_line(&geom, Mode::Car), bus_line(3)];
        lines.push(params.default_line(&geom, Mode::Train));
        for oo in 0..3 {
            for dd in 0..3 {
                let od = Od::new(&geom, oo, dd, 100.);
                let total: f64 = lines.iter()
                    .map(|line| od.modal_split(&geom, &params, &lines, line))
                    .sum();
                assert_abs_diff_eq!(total, 1., epsilon = 1e-12);
                let splits = od.modal_splits(&geom, &params, &lines);
                for (line, split) in lines.iter().zip(splits.iter()) {
                    assert_relative_eq!(od.modal_split(&geom, &params, &lines, line), *split,
                                        max_relative = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_identical_lines_share_equally() {
        let geom = interurban();
        let params = Parameters::default();
        let lines = vec![bus_line(3), bus_line(3)];
        let od = Od::new(&geom, 0, 1, 50.);
        assert_relative_eq!(od.modal_split(&geom, &params, &lines, &lines[0]), 0.5,
                            max_relative = 1e-12);
        // the log-sum of two equal alternatives is ln 2 below each of them
        let single = od.line_generalized_cost(&geom, &params, &lines[0]);
        assert_relative_eq!(od.generalized_cost(&geom, &params, &lines), single - 2f64.ln(),
                            max_relative = 1e-12);
    }

    #[test]
    fn test_generalized_cost_never_rises_with_more_lines() {
        let geom = interurban();
        let params = Parameters::default();
        let candidates = vec![
            bus_line(3),
            params.default_line(&geom, Mode::Car),
            params.default_line(&geom, Mode::Tram),
            params.default_line(&geom, Mode::Metro),
            params.default_line(&geom, Mode::Train),
        ];
        for (oo, dd) in &[(0, 0), (0, 2), (2, 1)] {
            let od = Od::new(&geom, *oo, *dd, 20.);
            let mut lines = vec![];
            let mut previous = od.generalized_cost(&geom, &params, &lines);
            assert_eq!(previous, f64::INFINITY);
            for line in &candidates {
                lines.push(line.clone());
                let cost = od.generalized_cost(&geom, &params, &lines);
                assert!(cost <= previous);
                previous = cost;
            }
        }
    }

    #[test]
    fn test_singular_costs() {
        let geom = interurban();
        let params = Parameters::default();
        let lines = vec![bus_line(3)];
        let empty = Od::new(&geom, 0, 1, 0.);
        assert_eq!(empty.generalized_cost(&geom, &params, &lines), 0.);
        assert_eq!(empty.modal_split(&geom, &params, &lines, &lines[0]), 0.);

        let od = Od::new(&geom, 0, 1, 10.);
        assert_eq!(od.modal_split(&geom, &params, &[], &lines[0]), 0.);
        assert_eq!(od.weighted_travel_time(&geom, &params, &[]), f64::INFINITY);

        // a line with no service has an infinite cost, so nothing is left to share
        let mut dead = bus_line(3);
        dead.frequency = 0.;
        let dead_lines = vec![dead];
        assert_eq!(od.generalized_cost(&geom, &params, &dead_lines), f64::INFINITY);
        assert_eq!(od.modal_split(&geom, &params, &dead_lines, &dead_lines[0]), 0.);
    }

    #[test]
    fn test_ramp_loads() {
        // zones [3, 24, 3]
        let geom = interurban();
        let od = Od::new(&geom, 0, 2, 100.);
        assert_eq!(od.load_a(&geom, 15.), 0.);
        assert_abs_diff_eq!(od.load_b(&geom, 1.5), 50.);
        assert_eq!(od.load_b(&geom, 15.), 100.);
        assert_abs_diff_eq!(od.load_b(&geom, 28.5), 50.);
        assert_abs_diff_eq!(od.load_b(&geom, 30.), 0.);

        let back = Od::new(&geom, 1, 0, 100.);
        assert_eq!(back.load_b(&geom, 2.), 0.);
        assert_abs_diff_eq!(back.load_a(&geom, 1.), 100. / 3.);
        assert_abs_diff_eq!(back.load_a(&geom, 3.), 100.);
        assert_abs_diff_eq!(back.load_a(&geom, 21.), 25.);
        assert_eq!(back.load_a(&geom, 28.), 0.);
    }

    #[test]
    fn test_intra_zone_load() {
        let geom = interurban();
        let od = Od::new(&geom, 1, 1, 80.);
        // peaks at a quarter of the demand in the middle of the zone, both ways
        assert_abs_diff_eq!(od.load_a(&geom, 15.), 20.);
        assert_abs_diff_eq!(od.load_b(&geom, 15.), 20.);
        assert_abs_diff_eq!(od.load_a(&geom, 3.), 0.);
        assert_eq!(od.load_a(&geom, 2.), 0.);
        assert_eq!(od.load_b(&geom, 29.), 0.);
        assert!(od.load_a(&geom, 9.) < 20.);
        assert_abs_diff_eq!(od.load_a(&geom, 9.), od.load_a(&geom, 21.), epsilon = 1e-12);
    }

    #[test]
    fn test_update_follows_geometry() {
        let geom = interurban();
        let mut od = Od::new(&geom, 0, 2, 10.);
        assert_abs_diff_eq!(od.trip_length(), 27.);
        let longer = ZoneGeometry::new(60., Typology::Interurban).unwrap();
        od.update(&longer);
        assert_abs_diff_eq!(od.trip_length(), 57.);
    }
}
