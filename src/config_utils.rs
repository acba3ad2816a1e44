use std::fs;
use std::path::Path;
use std::path::PathBuf;

use yaml_rust::Yaml;
use yaml_rust::YamlLoader;

use super::geometry::ZoneGeometry;
use super::line::{DesignVariable, FreeVariable, Line};
use super::parameters::{Mode, Parameters};
use super::CorridorError;


pub fn str_to_absolute_path(path_str: &str, default_base_dir: &Path) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        return path;
    } else {
        return [default_base_dir, Path::new(&path)].iter().collect();
    }
}

/// Reads the first yaml document in the file.
pub fn load_yaml(path: &Path) -> Result<Yaml, CorridorError> {
    let contents = fs::read_to_string(path)?;
    let mut docs = YamlLoader::load_from_str(&contents)?;
    if docs.is_empty() {
        return Err(CorridorError::Config(format!("{} holds no yaml document", path.display())));
    }
    return Ok(docs.swap_remove(0));
}

fn is_missing(value: &Yaml) -> bool {
    return value.is_badvalue() || value.is_null();
}

fn bad_type(key: &str, expected: &str) -> CorridorError {
    return CorridorError::Config(format!("{} should be {}", key, expected));
}

// yaml-rust keeps integers and reals apart; both are fine as a number here.
fn yaml_to_f64(value: &Yaml) -> Option<f64> {
    match value {
        Yaml::Integer(ii) => Some(*ii as f64),
        Yaml::Real(_) => value.as_f64(),
        _ => None,
    }
}

pub fn get_opt_f64(yaml_cfg: &Yaml, key: &str) -> Result<Option<f64>, CorridorError> {
    let value = &yaml_cfg[key];
    if is_missing(value) {
        return Ok(None);
    }
    return yaml_to_f64(value).map(Some).ok_or_else(|| bad_type(key, "a number"));
}

pub fn get_opt_f64_vec(yaml_cfg: &Yaml, key: &str) -> Result<Option<Vec<f64>>, CorridorError> {
    let value = &yaml_cfg[key];
    if is_missing(value) {
        return Ok(None);
    }
    let items = value.as_vec().ok_or_else(|| bad_type(key, "a list of numbers"))?;
    let values = items.iter()
        .map(|item| yaml_to_f64(item).ok_or_else(|| bad_type(key, "a list of numbers")))
        .collect::<Result<Vec<f64>, CorridorError>>()?;
    return Ok(Some(values));
}

/// A per-zone attribute, given either as one number for every zone or as a list
/// with one number per zone.
pub fn get_opt_zone_values(yaml_cfg: &Yaml, key: &str, n_zones: usize)
                           -> Result<Option<Vec<f64>>, CorridorError> {
    if let Some(value) = yaml_to_f64(&yaml_cfg[key]) {
        return Ok(Some(vec![value; n_zones]));
    }
    let values = match get_opt_f64_vec(yaml_cfg, key)? {
        Some(values) => values,
        None => return Ok(None),
    };
    if values.len() != n_zones {
        return Err(CorridorError::ZoneCountMismatch{expected: n_zones, found: values.len()});
    }
    return Ok(Some(values));
}

pub fn get_opt_str<'a>(yaml_cfg: &'a Yaml, key: &str) -> Result<Option<&'a str>, CorridorError> {
    let value = &yaml_cfg[key];
    if is_missing(value) {
        return Ok(None);
    }
    return value.as_str().map(Some).ok_or_else(|| bad_type(key, "a string"));
}

pub fn get_opt_bool(yaml_cfg: &Yaml, key: &str) -> Result<Option<bool>, CorridorError> {
    let value = &yaml_cfg[key];
    if is_missing(value) {
        return Ok(None);
    }
    return value.as_bool().map(Some).ok_or_else(|| bad_type(key, "true or false"));
}

pub fn get_opt_usize(yaml_cfg: &Yaml, key: &str) -> Result<Option<usize>, CorridorError> {
    let value = &yaml_cfg[key];
    if is_missing(value) {
        return Ok(None);
    }
    match value.as_i64() {
        Some(ii) if ii >= 0 => Ok(Some(ii as usize)),
        _ => Err(bad_type(key, "a non-negative integer")),
    }
}

/// The items of a yaml list, or nothing if the key is absent.
pub fn get_list<'a>(yaml_cfg: &'a Yaml, key: &str) -> Result<&'a [Yaml], CorridorError> {
    let value = &yaml_cfg[key];
    if is_missing(value) {
        return Ok(&[]);
    }
    return value.as_vec().map(|items| items.as_slice()).ok_or_else(|| bad_type(key, "a list"));
}

/// Parses the `free` entries of a line.  A `spacing` entry without a `zone`
/// releases the spacing of every zone.
fn free_variables_from_yaml(entry: &Yaml, geometry: &ZoneGeometry)
                            -> Result<Vec<FreeVariable>, CorridorError> {
    let variables = match get_opt_str(entry, "variable")? {
        Some("frequency") => vec![DesignVariable::Frequency],
        Some("spacing") => match get_opt_usize(entry, "zone")? {
            Some(zone) => {
                geometry.check_zone(zone)?;
                vec![DesignVariable::Spacing(zone)]
            },
            None => (0..geometry.n_zones()).map(DesignVariable::Spacing).collect(),
        },
        other => return Err(CorridorError::Config(
            format!("unknown design variable {:?}", other))),
    };

    let mut free_vars = vec![];
    for variable in variables {
        let default = FreeVariable::with_default_bounds(variable);
        let min = get_opt_f64(entry, "min")?.unwrap_or(default.min);
        let max = get_opt_f64(entry, "max")?.unwrap_or(default.max);
        free_vars.push(FreeVariable::new(variable, min, max)?);
    }
    return Ok(free_vars);
}

/// Builds a line from its yaml description.  Only `mode` is required; anything
/// else left out takes the mode's default from `params`.
pub fn line_from_yaml(yaml_cfg: &Yaml, params: &Parameters, geometry: &ZoneGeometry)
                      -> Result<Line, CorridorError> {
    let mode_name = get_opt_str(yaml_cfg, "mode")?
        .ok_or_else(|| CorridorError::Config(String::from("a line needs a mode")))?;
    let mode = Mode::from_name(mode_name)
        .ok_or_else(|| CorridorError::Config(format!("unknown mode {:?}", mode_name)))?;

    let n_zones = geometry.n_zones();
    let mut line = params.default_line(geometry, mode);
    if let Some(name) = get_opt_str(yaml_cfg, "name")? {
        if !name.is_empty() {
            line.name = String::from(name);
        }
    }
    if let Some(frequency) = get_opt_f64(yaml_cfg, "frequency")? {
        line.frequency = frequency;
    }
    if let Some(spacing) = get_opt_zone_values(yaml_cfg, "spacing", n_zones)? {
        line.spacing = spacing;
    }
    if let Some(max_speed) = get_opt_zone_values(yaml_cfg, "max_speed", n_zones)? {
        line.max_speed = max_speed;
    }
    if let Some(capacity) = get_opt_f64(yaml_cfg, "capacity")? {
        line.capacity = capacity;
    }
    if let Some(dwell_time) = get_opt_f64(yaml_cfg, "dwell_time")? {
        line.dwell_time = dwell_time;
    }
    if let Some(price) = get_opt_f64(yaml_cfg, "price")? {
        line.price = price;
    }

    for entry in get_list(yaml_cfg, "free")? {
        for free_var in free_variables_from_yaml(entry, geometry)? {
            line.set_free(free_var)?;
        }
    }

    line.check_zones(geometry)?;
    return Ok(line);
}

pub fn lines_from_yaml(yaml_cfg: &Yaml, key: &str, params: &Parameters, geometry: &ZoneGeometry)
                       -> Result<Vec<Line>, CorridorError> {
    return get_list(yaml_cfg, key)?.iter()
        .map(|line_cfg| line_from_yaml(line_cfg, params, geometry))
        .collect();
}

/// Reads `[origin, dest, demand]` triples.
pub fn demand_from_yaml(yaml_cfg: &Yaml, key: &str)
                        -> Result<Vec<(usize, usize, f64)>, CorridorError> {
    let mut triples = vec![];
    for entry in get_list(yaml_cfg, key)? {
        let bad_entry = || bad_type(key, "a list of [origin, dest, demand] triples");
        let items = entry.as_vec().ok_or_else(bad_entry)?;
        if items.len() != 3 {
            return Err(bad_entry());
        }
        let origin = items[0].as_i64().filter(|ii| *ii >= 0).ok_or_else(bad_entry)?;
        let dest = items[1].as_i64().filter(|ii| *ii >= 0).ok_or_else(bad_entry)?;
        let demand = yaml_to_f64(&items[2]).ok_or_else(bad_entry)?;
        triples.push((origin as usize, dest as usize, demand));
    }
    return Ok(triples);
}
