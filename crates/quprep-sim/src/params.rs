//! Trainable angles of the ansatz.

use ndarray::Array3;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::gate::{GateRole, ParamIndex};

/// Number of angles each qubit carries per layer.
pub const ROLES_PER_LAYER: usize = GateRole::ALL.len();

/// Angles indexed by `(qubit, layer, role)`.
///
/// Role 0 drives the layer's `RY` on the qubit, role 1 its controlled `RX`
/// towards the next qubit on the ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterTensor {
    values: Array3<f64>,
}

impl ParameterTensor {
    /// All-zero angles. With every angle at zero each layer is the identity.
    pub fn zeros(num_qubits: usize, num_layers: usize) -> Self {
        Self {
            values: Array3::zeros((num_qubits, num_layers, ROLES_PER_LAYER)),
        }
    }

    /// Build a tensor by evaluating `f` at every index.
    pub fn from_fn(
        num_qubits: usize,
        num_layers: usize,
        mut f: impl FnMut(ParamIndex) -> f64,
    ) -> Self {
        let values = Array3::from_shape_fn(
            (num_qubits, num_layers, ROLES_PER_LAYER),
            |(qubit, layer, role)| f(ParamIndex::new(qubit, layer, GateRole::ALL[role])),
        );
        Self { values }
    }

    /// Wrap an existing array. The last axis must have length 2.
    pub fn from_array(values: Array3<f64>) -> SimResult<Self> {
        let (q, k, r) = values.dim();
        if r != ROLES_PER_LAYER {
            return Err(SimError::ParameterShape {
                expected: (q, k, ROLES_PER_LAYER),
                got: (q, k, r),
            });
        }
        Ok(Self { values })
    }

    /// Sample every angle independently from `N(0, std_dev²)`.
    ///
    /// Entries are drawn in row-major `(qubit, layer, role)` order, so a
    /// seeded `rng` always yields the same tensor.
    pub fn random_normal<R: Rng + ?Sized>(
        num_qubits: usize,
        num_layers: usize,
        std_dev: f64,
        rng: &mut R,
    ) -> SimResult<Self> {
        if !(std_dev.is_finite() && std_dev >= 0.0) {
            return Err(SimError::InvalidStdDev(std_dev));
        }
        let normal = Normal::new(0.0, std_dev).map_err(|_| SimError::InvalidStdDev(std_dev))?;
        let values = Array3::from_shape_simple_fn(
            (num_qubits, num_layers, ROLES_PER_LAYER),
            || normal.sample(&mut *rng),
        );
        Ok(Self { values })
    }

    /// `(qubits, layers, roles)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        self.values.dim()
    }

    /// Number of qubits covered.
    pub fn num_qubits(&self) -> usize {
        self.values.dim().0
    }

    /// Number of layers covered.
    pub fn num_layers(&self) -> usize {
        self.values.dim().1
    }

    /// Total number of angles.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the tensor holds no angles.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read one angle.
    ///
    /// # Panics
    ///
    /// Panics if `index` lies outside the tensor.
    pub fn get(&self, index: ParamIndex) -> f64 {
        self.values[index.as_tuple()]
    }

    /// Overwrite one angle.
    ///
    /// # Panics
    ///
    /// Panics if `index` lies outside the tensor.
    pub fn set(&mut self, index: ParamIndex, value: f64) {
        self.values[index.as_tuple()] = value;
    }

    /// Angles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }

    /// Mutable angles in row-major order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut f64> {
        self.values.iter_mut()
    }

    /// Borrow the backing array.
    pub fn as_array(&self) -> &Array3<f64> {
        &self.values
    }

    /// Give up the wrapper.
    pub fn into_array(self) -> Array3<f64> {
        self.values
    }

    /// True if no entry is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Replace NaN and infinite entries with zero, returning how many changed.
    pub fn zero_non_finite(&mut self) -> usize {
        let mut replaced = 0;
        for v in self.values.iter_mut() {
            if !v.is_finite() {
                *v = 0.0;
                replaced += 1;
            }
        }
        replaced
    }
}
