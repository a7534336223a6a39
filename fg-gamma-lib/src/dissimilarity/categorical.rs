use std::collections::HashMap;

use anyhow::{ensure, Result};
use itertools::Itertools;

use super::{Dissimilarity, DEFAULT_DELTA_EMPTY};
use crate::continuum::{Continuum, Unit};

/// Categorical dissimilarity: `delta_empty * matrix[c1][c2]`, where `matrix` holds the distance
/// between each pair of known categories.
///
/// Units whose category is missing or not in the known categories are identical to units with
/// the same (possibly missing) category and fully dissimilar to anything else.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoricalDissimilarity {
    delta_empty: f64,
    categories: Vec<String>,
    index: HashMap<String, usize>,
    matrix: Vec<Vec<f64>>,
}

impl CategoricalDissimilarity {
    /// Builds a dissimilarity where equal categories cost zero and different categories cost
    /// `delta_empty`.
    pub fn new<S: AsRef<str>>(categories: &[S], delta_empty: f64) -> Result<Self> {
        let n = categories.len();
        let matrix = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 0.0 } else { 1.0 }).collect())
            .collect();
        Self::with_matrix(categories, matrix, delta_empty)
    }

    /// Builds a dissimilarity from an explicit category distance matrix.  The matrix must be
    /// square with one row per category, symmetric, zero on the diagonal and valued in `[0, 1]`.
    pub fn with_matrix<S: AsRef<str>>(
        categories: &[S],
        matrix: Vec<Vec<f64>>,
        delta_empty: f64,
    ) -> Result<Self> {
        ensure!(
            delta_empty.is_finite() && delta_empty > 0.0,
            "delta_empty must be positive: {}",
            delta_empty
        );
        let categories = categories
            .iter()
            .map(|c| c.as_ref().to_string())
            .collect_vec();
        let index: HashMap<String, usize> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        ensure!(
            index.len() == categories.len(),
            "Duplicate categories in {:?}",
            categories
        );
        ensure!(
            matrix.len() == categories.len(),
            "Expected {} rows in the category matrix, found {}",
            categories.len(),
            matrix.len()
        );
        for (i, row) in matrix.iter().enumerate() {
            ensure!(
                row.len() == categories.len(),
                "Expected {} columns in row {} of the category matrix, found {}",
                categories.len(),
                i,
                row.len()
            );
        }
        for (i, row) in matrix.iter().enumerate() {
            ensure!(
                row[i] == 0.0,
                "The category matrix must be zero on its diagonal, found {} for '{}'",
                row[i],
                categories[i]
            );
            for (j, value) in row.iter().enumerate() {
                ensure!(
                    (0.0..=1.0).contains(value),
                    "Category matrix values must be within [0, 1], found {} at ({}, {})",
                    value,
                    i,
                    j
                );
                ensure!(
                    *value == matrix[j][i],
                    "The category matrix must be symmetric, found {} at ({}, {}) and {} at ({}, {})",
                    value,
                    i,
                    j,
                    matrix[j][i],
                    j,
                    i
                );
            }
        }
        Ok(Self {
            delta_empty,
            categories,
            index,
            matrix,
        })
    }

    /// Builds a dissimilarity where the distance between two categories is the Levenshtein
    /// distance between their labels, normalized by the length of the longer label.  Lengths and
    /// edits are counted in characters, not bytes.
    pub fn levenshtein<S: AsRef<str>>(categories: &[S], delta_empty: f64) -> Result<Self> {
        let matrix = categories
            .iter()
            .map(|a| {
                categories
                    .iter()
                    .map(|b| normalized_levenshtein(a.as_ref(), b.as_ref()))
                    .collect()
            })
            .collect();
        Self::with_matrix(categories, matrix, delta_empty)
    }

    /// Builds the default dissimilarity over the categories found in the continuum.
    pub fn from_continuum(continuum: &Continuum) -> Result<Self> {
        Self::new(continuum.categories().as_slice(), DEFAULT_DELTA_EMPTY)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// The distance between two categories, before scaling by `delta_empty`.
    pub fn category_distance(&self, a: Option<&str>, b: Option<&str>) -> f64 {
        match (a, b) {
            (Some(a), Some(b)) => match (self.index.get(a), self.index.get(b)) {
                (Some(&i), Some(&j)) => self.matrix[i][j],
                _ if a == b => 0.0,
                _ => 1.0,
            },
            (None, None) => 0.0,
            _ => 1.0,
        }
    }
}

impl Dissimilarity for CategoricalDissimilarity {
    fn delta_empty(&self) -> f64 {
        self.delta_empty
    }

    fn dissimilarity(&self, a: &Unit, b: &Unit) -> f64 {
        let (a, b) = (a.annotation().as_deref(), b.annotation().as_deref());
        self.delta_empty * self.category_distance(a, b)
    }
}

fn normalized_levenshtein(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        0.0
    } else {
        strsim::levenshtein(a, b) as f64 / longest as f64
    }
}
