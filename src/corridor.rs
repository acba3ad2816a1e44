use ndarray::prelude::*;

use super::geometry::{Typology, ZoneGeometry};
use super::line::Line;
use super::od::Od;
use super::parameters::Parameters;
use super::CorridorError;


// number of abscissae at which the load profile is sampled
static LOAD_SAMPLES: usize = 100;


/// A linear corridor: its zones, the full origin-destination matrix and the set of
/// lines competing for the demand.
///
/// `Clone` is a deep copy of the demand and of every line.
#[derive(Clone, Debug, PartialEq)]
pub struct Corridor {
    pub name: String,
    geometry: ZoneGeometry,
    // indexed [origin, dest]
    demand: Array2<Od>,
    lines: Vec<Line>,
}

impl Corridor {
    pub fn new(name: &str, length: f64, typology: Typology) -> Result<Corridor, CorridorError> {
        let geometry = ZoneGeometry::new(length, typology)?;
        let demand = empty_demand(&geometry);
        return Ok(Corridor {
            name: String::from(name),
            geometry,
            demand,
            lines: vec![],
        });
    }

    pub fn geometry(&self) -> &ZoneGeometry {
        return &self.geometry;
    }

    pub fn length(&self) -> f64 {
        return self.geometry.length();
    }

    pub fn typology(&self) -> Typology {
        return self.geometry.typology();
    }

    pub fn n_zones(&self) -> usize {
        return self.geometry.n_zones();
    }

    /// Changes the length, keeping the demand and the lines.  Zone boundaries and
    /// every OD's trip length are re-derived.
    pub fn set_length(&mut self, length: f64) -> Result<(), CorridorError> {
        self.geometry = ZoneGeometry::new(length, self.typology())?;
        let geometry = &self.geometry;
        self.demand.iter_mut().for_each(|od| od.update(geometry));
        return Ok(());
    }

    /// Changes the typology.  This is destructive: when the typology differs from
    /// the current one, the zone count changes, so all demand is reset to zero and
    /// all lines are dropped.  Returns whether that reset happened.
    pub fn reset_typology(&mut self, typology: Typology) -> Result<bool, CorridorError> {
        let changed = typology != self.typology();
        self.geometry = ZoneGeometry::new(self.length(), typology)?;
        if changed {
            self.demand = empty_demand(&self.geometry);
            self.lines.clear();
        } else {
            let geometry = &self.geometry;
            self.demand.iter_mut().for_each(|od| od.update(geometry));
        }
        return Ok(changed);
    }

    pub fn od(&self, origin: usize, dest: usize) -> Result<&Od, CorridorError> {
        self.geometry.check_zone(origin)?;
        self.geometry.check_zone(dest)?;
        return Ok(&self.demand[[origin, dest]]);
    }

    fn od_mut(&mut self, origin: usize, dest: usize) -> Result<&mut Od, CorridorError> {
        self.geometry.check_zone(origin)?;
        self.geometry.check_zone(dest)?;
        return Ok(&mut self.demand[[origin, dest]]);
    }

    pub fn set_od(&mut self, origin: usize, dest: usize, demand: f64)
                  -> Result<(), CorridorError> {
        if !(demand >= 0.) || !demand.is_finite() {
            return Err(CorridorError::InvalidDemand(demand));
        }
        self.od_mut(origin, dest)?.demand = demand;
        return Ok(());
    }

    pub fn demand_matrix(&self) -> &Array2<Od> {
        return &self.demand;
    }

    /// Replaces the OD matrix, eg. with the output of `elastic_demand`.  Each
    /// cell must hold the OD of its own origin and destination.  Trip lengths
    /// are taken from this corridor's geometry, whatever corridor the matrix
    /// came from.
    pub fn set_demand_matrix(&mut self, demand: Array2<Od>) -> Result<(), CorridorError> {
        let n_zones = self.n_zones();
        if demand.dim() != (n_zones, n_zones) {
            return Err(CorridorError::ZoneCountMismatch{expected: n_zones, found: demand.nrows()});
        }
        for ((oo, dd), od) in demand.indexed_iter() {
            if od.origin() != oo || od.dest() != dd {
                return Err(CorridorError::Config(format!(
                    "OD {}->{} found in cell ({}, {})", od.origin(), od.dest(), oo, dd)));
            }
            if !(od.demand >= 0.) || !od.demand.is_finite() {
                return Err(CorridorError::InvalidDemand(od.demand));
            }
        }
        self.replace_demand(demand);
        return Ok(());
    }

    pub(crate) fn replace_demand(&mut self, mut demand: Array2<Od>) {
        let geometry = &self.geometry;
        demand.iter_mut().for_each(|od| od.update(geometry));
        self.demand = demand;
    }

    pub fn ods(&self) -> impl Iterator<Item = &Od> {
        return self.demand.iter();
    }

    pub fn lines(&self) -> &[Line] {
        return &self.lines;
    }

    pub fn lines_mut(&mut self) -> &mut [Line] {
        return &mut self.lines;
    }

    pub fn add_line(&mut self, line: Line) -> Result<(), CorridorError> {
        line.check_zones(&self.geometry)?;
        self.lines.push(line);
        return Ok(());
    }

    // for lines already checked against this geometry
    pub(crate) fn push_line(&mut self, line: Line) {
        self.lines.push(line);
    }

    pub fn remove_line(&mut self, index: usize) -> Option<Line> {
        if index < self.lines.len() {
            return Some(self.lines.remove(index));
        }
        return None;
    }

    pub fn clear_lines(&mut self) {
        self.lines.clear();
    }

    /// A copy with the same geometry and demand, but no lines.
    pub fn duplicate(&self, name: &str) -> Corridor {
        return Corridor {
            name: String::from(name),
            geometry: self.geometry.clone(),
            demand: self.demand.clone(),
            lines: vec![],
        };
    }

    /// Position of `line` in this corridor's line set.  Lines are identified by
    /// address, so a copy of a member line is not a member.
    pub fn line_index(&self, line: &Line) -> Result<usize, CorridorError> {
        return self.lines.iter().position(|ll| std::ptr::eq(ll, line)).ok_or_else(||
            CorridorError::ForeignLine{line: line.name.clone(), corridor: self.name.clone()});
    }

    pub fn total_demand(&self) -> f64 {
        return self.demand.iter().map(|od| od.demand).sum();
    }

    /// Trips per hour carried by each line, in line order.
    pub fn line_demands(&self, params: &Parameters) -> Vec<f64> {
        let mut demands = vec![0.; self.lines.len()];
        for od in self.demand.iter() {
            let splits = od.modal_splits(&self.geometry, params, &self.lines);
            for (total, split) in demands.iter_mut().zip(splits.iter()) {
                *total += od.demand * split;
            }
        }
        return demands;
    }

    /// Trips per hour carried by `line`, which must be one of this corridor's lines.
    pub fn line_demand(&self, params: &Parameters, line: &Line) -> Result<f64, CorridorError> {
        self.line_index(line)?;
        return Ok(self.demand.iter()
            .map(|od| od.demand * od.modal_split(&self.geometry, params, &self.lines, line))
            .sum());
    }

    /// Mean travel time of all trips, in hours.  Infinite if some trips have no
    /// way to travel.
    pub fn avg_travel_time(&self, params: &Parameters) -> f64 {
        let mut time = 0.;
        let mut travellers = 0.;
        for od in self.demand.iter() {
            let splits = od.modal_splits(&self.geometry, params, &self.lines);
            for (line, split) in self.lines.iter().zip(splits.iter()) {
                let flow = od.demand * split;
                if flow == 0. {
                    continue;
                }
                let travel_time = od.travel_time(&self.geometry, line);
                if travel_time == f64::INFINITY {
                    return f64::INFINITY;
                }
                time += flow * travel_time;
                travellers += flow;
            }
        }

        if travellers == 0. {
            return f64::INFINITY;
        }
        return time / travellers;
    }

    fn sample_positions(&self) -> Array1<f64> {
        let step = self.length() / LOAD_SAMPLES as f64;
        return Array1::from_iter((0..LOAD_SAMPLES).map(|ii| ii as f64 * step));
    }

    fn sampled_max_load<F>(&self, load: F) -> f64
        where F: Fn(&Od, &ZoneGeometry, f64) -> f64
    {
        return self.sample_positions().iter()
            .map(|xx| self.demand.iter().map(|od| load(od, &self.geometry, *xx)).sum::<f64>())
            .fold(0., f64::max);
    }

    /// Highest number of passengers at one place travelling towards the start of
    /// the corridor, sampled at regular intervals.
    pub fn max_load_a(&self) -> f64 {
        return self.sampled_max_load(|od, geometry, xx| od.load_a(geometry, xx));
    }

    /// Highest number of passengers at one place travelling towards the end of the
    /// corridor, sampled at regular intervals.
    pub fn max_load_b(&self) -> f64 {
        return self.sampled_max_load(|od, geometry, xx| od.load_b(geometry, xx));
    }

    pub fn max_load(&self) -> f64 {
        return self.max_load_a().max(self.max_load_b());
    }

    pub fn weighted_travel_time(&self, params: &Parameters) -> f64 {
        return self.demand.iter()
            .map(|od| od.demand * od.weighted_travel_time(&self.geometry, params, &self.lines))
            .sum();
    }

    /// Total generalized cost borne by travellers (€/h).
    pub fn generalized_cost(&self, params: &Parameters) -> f64 {
        return self.demand.iter()
            .map(|od| od.demand * od.generalized_cost(&self.geometry, params, &self.lines))
            .sum();
    }

    pub fn operating_cost(&self, params: &Parameters) -> f64 {
        return self.lines.iter().map(|ll| ll.operating_cost(&self.geometry, params)).sum();
    }

    pub fn infra_cost(&self, params: &Parameters) -> f64 {
        return self.lines.iter().map(|ll| ll.infra_cost(&self.geometry, params)).sum();
    }

    pub fn operator_cost(&self, params: &Parameters) -> f64 {
        return self.lines.iter().map(|ll| ll.operator_cost(&self.geometry, params)).sum();
    }

    /// Fares collected by each line, in line order.  Car trips pay no fare.
    pub fn line_revenues(&self, params: &Parameters) -> Vec<f64> {
        return self.lines.iter().zip(self.line_demands(params).iter())
            .map(|(line, demand)| match line.mode().is_car() {
                true => 0.,
                false => demand * line.price,
            })
            .collect();
    }

    pub fn revenues(&self, params: &Parameters, line: &Line) -> Result<f64, CorridorError> {
        let demand = self.line_demand(params, line)?;
        if line.mode().is_car() {
            return Ok(0.);
        }
        return Ok(demand * line.price);
    }

    pub fn total_revenues(&self, params: &Parameters) -> f64 {
        return self.line_revenues(params).iter().sum();
    }

    /// Cost to society: travellers' generalized cost plus the operators' cost, net
    /// of the fares which are a transfer between the two.
    pub fn total_cost(&self, params: &Parameters) -> f64 {
        return self.generalized_cost(params) + self.operator_cost(params)
            - self.total_revenues(params);
    }

    /// The demand that would result from replacing this corridor's lines with
    /// `candidate_lines`, when the non-captive part of the demand responds to the
    /// change in generalized cost.
    pub fn elastic_demand(&self, params: &Parameters, candidate_lines: &[Line]) -> Array2<Od> {
        let captive = params.captive;
        return self.demand.map(|od| {
            let mut new_od = od.clone();
            if od.demand == 0. {
                return new_od;
            }
            let gc0 = od.generalized_cost(&self.geometry, params, &self.lines);
            let gc = od.generalized_cost(&self.geometry, params, candidate_lines);
            new_od.demand = if gc0 == gc {
                od.demand
            } else if gc0 == f64::INFINITY {
                // there was no way to travel before, so all of the demand appears
                od.demand
            } else if gc == f64::INFINITY {
                0.
            } else {
                od.demand * (captive + (1. - captive) * (gc0 / gc).powf(params.gamma))
            };
            new_od
        });
    }

    /// Consumer surplus of `candidate` relative to this corridor, by the rule of
    /// half over the candidate's demand.
    pub fn consumer_surplus(&self, params: &Parameters, candidate: &Corridor) -> f64 {
        let mut surplus = 0.;
        for od in candidate.demand.iter() {
            let gc0 = od.generalized_cost(&self.geometry, params, &self.lines);
            let gc = od.generalized_cost(&candidate.geometry, params, &candidate.lines);
            if gc == f64::INFINITY {
                return f64::NEG_INFINITY;
            } else if gc0 == f64::INFINITY {
                return f64::INFINITY;
            }
            surplus += od.demand * 0.5 * (gc0 - gc);
        }
        return surplus;
    }

    /// Consumer surplus plus the candidate operators' profit.
    pub fn total_surplus(&self, params: &Parameters, candidate: &Corridor) -> f64 {
        return self.consumer_surplus(params, candidate) + candidate.total_revenues(params)
            - candidate.operator_cost(params);
    }
}


fn empty_demand(geometry: &ZoneGeometry) -> Array2<Od> {
    let n_zones = geometry.n_zones();
    return Array2::from_shape_fn((n_zones, n_zones), |(oo, dd)| Od::new(geometry, oo, dd, 0.));
}


#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use approx::assert_relative_eq;
    use super::*;
    use super::super::parameters::Mode;
    use super::super::test_utils::{bus_line, fill_demand, single_bus_corridor};

    #[test]
    fn test_od_grid_layout() {
        let corridor = Corridor::new("grid", 30., Typology::Interurban).unwrap();
        assert_eq!(corridor.demand_matrix().dim(), (3, 3));
        for oo in 0..3 {
            for dd in 0..3 {
                let od = corridor.od(oo, dd).unwrap();
                assert_eq!((od.origin(), od.dest()), (oo, dd));
                assert_eq!(od.demand, 0.);
            }
        }
        assert!(corridor.od(3, 0).is_err());
    }

    #[test]
    fn test_set_od_validates() {
        let mut corridor = Corridor::new("c", 10., Typology::CityCenter).unwrap();
        assert!(corridor.set_od(0, 2, 5.).is_err());
        assert!(corridor.set_od(0, 1, -5.).is_err());
        assert!(corridor.set_od(0, 1, f64::NAN).is_err());
        assert!(corridor.set_od(0, 1, f64::INFINITY).is_err());
        assert_eq!(corridor.od(0, 1).unwrap().demand, 0.);
        corridor.set_od(1, 0, 5.).unwrap();
        assert_eq!(corridor.od(1, 0).unwrap().demand, 5.);
    }

    #[test]
    fn test_single_bus_end_to_end() {
        let params = Parameters::default();
        let corridor = single_bus_corridor();
        let geom = corridor.geometry();
        assert_eq!(corridor.total_demand(), 1000.);

        let bus = &corridor.lines()[0];
        assert_relative_eq!(corridor.line_demand(&params, bus).unwrap(), 1000.,
                            max_relative = 1e-12);

        let avg = corridor.avg_travel_time(&params);
        let od = corridor.od(0, 0).unwrap();
        assert!(avg.is_finite());
        assert!(avg > od.in_vehicle_time(geom, bus));
        assert_relative_eq!(avg, od.travel_time(geom, bus), max_relative = 1e-12);

        let operating = corridor.operating_cost(&params);
        assert!(operating.is_finite() && operating > 0.);
        // buses have no infra cost by default; give them stations
        let mut params = params.clone();
        params.station_cost[Mode::Bus.index()] = 5.;
        let infra = corridor.infra_cost(&params);
        assert!(infra.is_finite() && infra > 0.);
        assert_relative_eq!(corridor.operator_cost(&params), operating + infra,
                            max_relative = 1e-12);
    }

    #[test]
    fn test_total_cost_composition() {
        let mut params = Parameters::default();
        params.infra_cost[1] = 3.;
        let mut corridor = Corridor::new("c", 20., Typology::CityCenter).unwrap();
        fill_demand(&mut corridor, 100.);
        let mut bus = bus_line(2);
        bus.price = 1.5;
        corridor.add_line(bus).unwrap();
        corridor.add_line(params.default_line(corridor.geometry(), Mode::Car)).unwrap();

        let demands = corridor.line_demands(&params);
        assert_relative_eq!(demands.iter().sum::<f64>(), corridor.total_demand(),
                            max_relative = 1e-12);
        let revenues = corridor.total_revenues(&params);
        assert_relative_eq!(revenues, 1.5 * demands[0], max_relative = 1e-12);
        let car = &corridor.lines()[1];
        assert_eq!(corridor.revenues(&params, car).unwrap(), 0.);

        let expected = corridor.generalized_cost(&params) + corridor.operator_cost(&params)
            - revenues;
        assert_relative_eq!(corridor.total_cost(&params), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_foreign_line_is_an_error() {
        let params = Parameters::default();
        let corridor = single_bus_corridor();
        let copy = corridor.clone();
        let foreign = &copy.lines()[0];
        match corridor.line_demand(&params, foreign) {
            Err(CorridorError::ForeignLine{..}) => (),
            other => panic!("expected a foreign line error, got {:?}", other),
        }
        assert!(corridor.revenues(&params, &bus_line(1)).is_err());
        assert_eq!(corridor.line_index(&corridor.lines()[0]).unwrap(), 0);
    }

    #[test]
    fn test_line_must_fit_zones() {
        let mut corridor = Corridor::new("c", 20., Typology::CityCenter).unwrap();
        assert!(corridor.add_line(bus_line(1)).is_err());
        assert!(corridor.add_line(bus_line(2)).is_ok());
        assert_eq!(corridor.lines().len(), 1);
        assert!(corridor.remove_line(0).is_some());
        assert!(corridor.remove_line(0).is_none());
    }

    #[test]
    fn test_duplicate_is_independent() {
        let corridor = single_bus_corridor();
        let mut copy = corridor.duplicate("copy");
        assert_eq!(copy.name, "copy");
        assert!(copy.lines().is_empty());
        assert_eq!(copy.total_demand(), 1000.);
        copy.set_od(0, 0, 10.).unwrap();
        assert_eq!(corridor.od(0, 0).unwrap().demand, 1000.);

        let mut deep = corridor.clone();
        deep.lines_mut()[0].frequency = 99.;
        assert_eq!(corridor.lines()[0].frequency, 10.);
    }

    #[test]
    fn test_set_length_keeps_demand() {
        let mut corridor = Corridor::new("c", 30., Typology::Interurban).unwrap();
        fill_demand(&mut corridor, 10.);
        corridor.add_line(bus_line(3)).unwrap();
        corridor.set_length(60.).unwrap();
        assert_eq!(corridor.length(), 60.);
        assert_eq!(corridor.od(2, 2).unwrap().demand, 50.);
        assert_abs_diff_eq!(corridor.od(0, 2).unwrap().trip_length(), 57.);
        assert_eq!(corridor.lines().len(), 1);
        assert!(corridor.set_length(0.).is_err());
    }

    #[test]
    fn test_reset_typology_is_destructive() {
        let mut corridor = Corridor::new("c", 30., Typology::Interurban).unwrap();
        fill_demand(&mut corridor, 10.);
        corridor.add_line(bus_line(3)).unwrap();

        // same typology: nothing is lost
        assert!(!corridor.reset_typology(Typology::Interurban).unwrap());
        assert_eq!(corridor.lines().len(), 1);

        assert!(corridor.reset_typology(Typology::CityCenter).unwrap());
        assert_eq!(corridor.n_zones(), 2);
        assert_eq!(corridor.demand_matrix().dim(), (2, 2));
        assert_eq!(corridor.total_demand(), 0.);
        assert!(corridor.lines().is_empty());
    }

    #[test]
    fn test_avg_travel_time_without_path() {
        let params = Parameters::default();
        let mut corridor = single_bus_corridor();
        corridor.clear_lines();
        assert_eq!(corridor.avg_travel_time(&params), f64::INFINITY);
        assert_eq!(corridor.generalized_cost(&params), f64::INFINITY);
    }

    #[test]
    fn test_max_loads() {
        // zones [3, 24, 3]
        let mut corridor = Corridor::new("c", 30., Typology::Interurban).unwrap();
        corridor.set_od(0, 2, 100.).unwrap();
        corridor.set_od(2, 1, 40.).unwrap();
        assert_abs_diff_eq!(corridor.max_load_b(), 100., epsilon = 1e-9);
        assert_abs_diff_eq!(corridor.max_load_a(), 40., epsilon = 1e-9);
        assert_abs_diff_eq!(corridor.max_load(), 100., epsilon = 1e-9);

        corridor.set_od(1, 1, 80.).unwrap();
        // the intra-zone peak sits on top of the through traffic at mid-corridor
        assert_abs_diff_eq!(corridor.max_load_b(), 120., epsilon = 1e-9);
        assert!(corridor.max_load_a() > 40.);
    }

    #[test]
    fn test_elastic_demand() {
        let params = Parameters::default();
        let mut reference = Corridor::new("ref", 30., Typology::Interurban).unwrap();
        fill_demand(&mut reference, 10.);
        reference.add_line(bus_line(3)).unwrap();

        // same lines: same demand, exactly
        let same = reference.elastic_demand(&params, reference.lines());
        for (old, new) in reference.ods().zip(same.iter()) {
            assert_eq!(old.demand, new.demand);
        }

        // a better service attracts demand
        let mut better = bus_line(3);
        better.frequency = 30.;
        let more = reference.elastic_demand(&params, &[better]);
        for (old, new) in reference.ods().zip(more.iter()) {
            assert!(new.demand > old.demand);
        }

        // no line at all: every trip disappears
        let none = reference.elastic_demand(&params, &[]);
        assert!(none.iter().all(|od| od.demand == 0.));

        // no line before: the whole demand appears
        let mut empty_ref = reference.duplicate("empty");
        empty_ref.clear_lines();
        let appears = empty_ref.elastic_demand(&params, reference.lines());
        for (old, new) in reference.ods().zip(appears.iter()) {
            assert_eq!(old.demand, new.demand);
        }
    }

    #[test]
    fn test_elastic_demand_formula() {
        let mut params = Parameters::default();
        params.gamma = 2.;
        params.captive = 0.25;
        let reference = single_bus_corridor();
        let mut slower = bus_line(1);
        slower.frequency = 4.;
        let od = reference.od(0, 0).unwrap();
        let gc0 = od.generalized_cost(reference.geometry(), &params, reference.lines());
        let gc = od.generalized_cost(reference.geometry(), &params, &[slower.clone()]);
        let expected = 1000. * (0.25 + 0.75 * (gc0 / gc).powi(2));
        let demand = reference.elastic_demand(&params, &[slower]);
        assert_relative_eq!(demand[[0, 0]].demand, expected, max_relative = 1e-12);
        assert!(expected < 1000.);
    }

    #[test]
    fn test_surplus() {
        let params = Parameters::default();
        let reference = single_bus_corridor();
        assert_eq!(reference.consumer_surplus(&params, &reference), 0.);
        assert_relative_eq!(reference.total_surplus(&params, &reference),
                            -reference.operator_cost(&params), max_relative = 1e-12);

        let mut candidate = reference.clone();
        candidate.lines_mut()[0].frequency = 20.;
        let surplus = reference.consumer_surplus(&params, &candidate);
        let od = candidate.od(0, 0).unwrap();
        let gc0 = od.generalized_cost(reference.geometry(), &params, reference.lines());
        let gc = od.generalized_cost(candidate.geometry(), &params, candidate.lines());
        assert_relative_eq!(surplus, 1000. * 0.5 * (gc0 - gc), max_relative = 1e-12);
        assert!(surplus > 0.);

        let no_lines = reference.duplicate("none");
        assert_eq!(reference.consumer_surplus(&params, &no_lines), f64::NEG_INFINITY);
        assert_eq!(no_lines.consumer_surplus(&params, &reference), f64::INFINITY);
    }

    #[test]
    fn test_set_demand_matrix() {
        let params = Parameters::default();
        let mut corridor = single_bus_corridor();
        let demand = corridor.elastic_demand(&params, &[]);
        corridor.set_demand_matrix(demand).unwrap();
        assert_eq!(corridor.total_demand(), 0.);

        let other = Corridor::new("other", 10., Typology::CityCenter).unwrap();
        assert!(corridor.set_demand_matrix(other.demand_matrix().clone()).is_err());
    }

    #[test]
    fn test_demand_matrix_takes_own_trip_lengths() {
        let mut short = Corridor::new("short", 10., Typology::CityCenter).unwrap();
        let mut long = Corridor::new("long", 40., Typology::CityCenter).unwrap();
        fill_demand(&mut long, 100.);
        short.set_demand_matrix(long.demand_matrix().clone()).unwrap();
        assert_eq!(short.total_demand(), long.total_demand());
        for od in short.ods() {
            let (oo, dd) = (od.origin(), od.dest());
            assert_eq!(od.trip_length(), short.geometry().trip_length(oo, dd));
            assert!(od.trip_length() < long.od(oo, dd).unwrap().trip_length());
        }
    }

    #[test]
    fn test_demand_matrix_checks_cells() {
        let mut corridor = Corridor::new("c", 10., Typology::CityCenter).unwrap();
        let geom = corridor.geometry().clone();
        let swapped = Array2::from_shape_fn((2, 2), |(oo, dd)| Od::new(&geom, dd, oo, 1.));
        assert!(corridor.set_demand_matrix(swapped).is_err());

        let mut negative = corridor.demand_matrix().clone();
        negative[[0, 1]].demand = -1.;
        assert!(corridor.set_demand_matrix(negative).is_err());
        let mut nan = corridor.demand_matrix().clone();
        nan[[1, 1]].demand = f64::NAN;
        assert!(corridor.set_demand_matrix(nan).is_err());
        assert_eq!(corridor.total_demand(), 0.);
    }
}
