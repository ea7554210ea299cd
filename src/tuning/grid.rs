//! Hyperparameter grids
//!
//! A grid maps parameter names to ordered candidate values. Names iterate in
//! sorted order and the cross product varies the last name fastest, so
//! enumeration order is stable for a given grid.

use crate::error::{Result, TuneError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single hyperparameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Float(f64),
    Str(String),
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

/// One point of a grid: parameter name → value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSet(BTreeMap<String, ParamValue>);

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Numeric parameter, erroring when absent or not a number
    pub fn get_f64(&self, name: &str) -> Result<f64> {
        match self.0.get(name) {
            Some(ParamValue::Float(v)) => Ok(*v),
            Some(other) => Err(TuneError::InvalidParameter {
                name: name.to_string(),
                value: other.to_string(),
                reason: "expected a number".to_string(),
            }),
            None => Err(TuneError::ConfigError(format!("missing parameter '{}'", name))),
        }
    }

    /// String parameter, erroring when absent or not a string
    pub fn get_str(&self, name: &str) -> Result<&str> {
        match self.0.get(name) {
            Some(ParamValue::Str(s)) => Ok(s.as_str()),
            Some(other) => Err(TuneError::InvalidParameter {
                name: name.to_string(),
                value: other.to_string(),
                reason: "expected a string".to_string(),
            }),
            None => Err(TuneError::ConfigError(format!("missing parameter '{}'", name))),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }
}

impl fmt::Display for ParamSet {
    /// Renders as a JSON object, e.g. `{"C":0.1,"kernel":"rbf"}`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}

/// Discrete hyperparameter grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamGrid(BTreeMap<String, Vec<ParamValue>>);

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the candidates for one parameter
    pub fn add<V: Into<ParamValue>>(mut self, name: impl Into<String>, values: Vec<V>) -> Self {
        self.0
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Number of grid points (product of candidate counts)
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every grid point in enumeration order (last name varies fastest).
    pub fn combinations(&self) -> Vec<ParamSet> {
        let mut points = vec![ParamSet::new()];
        for (name, values) in &self.0 {
            let mut next = Vec::with_capacity(points.len() * values.len());
            for point in &points {
                for value in values {
                    next.push(point.clone().with(name.clone(), value.clone()));
                }
            }
            points = next;
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_parameter_grid() {
        let grid = ParamGrid::new().add("C", vec![0.1, 1.0, 10.0]);
        assert_eq!(grid.len(), 3);
        let points = grid.combinations();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1].get_f64("C").unwrap(), 1.0);
    }

    #[test]
    fn test_enumeration_order_last_key_fastest() {
        let grid = ParamGrid::new()
            .add("tol", vec![1e-4, 1e-3])
            .add("solver", vec!["svd", "lsqr"]);
        let points = grid.combinations();
        assert_eq!(points.len(), 4);

        // "solver" sorts before "tol", so tol varies fastest
        let order: Vec<(String, f64)> = points
            .iter()
            .map(|p| (p.get_str("solver").unwrap().to_string(), p.get_f64("tol").unwrap()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("svd".to_string(), 1e-4),
                ("svd".to_string(), 1e-3),
                ("lsqr".to_string(), 1e-4),
                ("lsqr".to_string(), 1e-3),
            ]
        );
    }

    #[test]
    fn test_empty_candidate_list_yields_no_points() {
        let grid = ParamGrid::new().add("C", Vec::<f64>::new());
        assert!(grid.is_empty());
        assert!(grid.combinations().is_empty());
    }

    #[test]
    fn test_param_set_display() {
        let params = ParamSet::new().with("kernel", "rbf").with("C", 0.5);
        assert_eq!(params.to_string(), r#"{"C":0.5,"kernel":"rbf"}"#);
    }

    #[test]
    fn test_param_set_type_errors() {
        let params = ParamSet::new().with("C", 1.0);
        assert!(params.get_str("C").is_err());
        assert!(params.get_f64("gamma").is_err());
    }

    #[test]
    fn test_param_set_serde() {
        let params = ParamSet::new().with("C", 0.001);
        let json = serde_json::to_string(&params).unwrap();
        let back: ParamSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
