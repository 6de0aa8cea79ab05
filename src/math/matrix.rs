use rand::Rng;

use crate::error::{Error, Result};

/// Dense row-major `f64` matrix.
///
/// Kernels are stored as `(input_size, units)`, the same layout TensorFlow.js
/// expects for a Dense kernel, so weights can be written out without
/// transposing.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix { rows, cols, data: vec![0.0; rows * cols] }
    }

    /// Wraps a flat row-major buffer; fails if its length is not `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Matrix> {
        if data.len() != rows * cols {
            return Err(Error::SizeMismatch { expected: rows * cols, actual: data.len() });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Glorot (Xavier) uniform initialization: samples from U(-l, l) with
    /// l = sqrt(6 / (fan_in + fan_out)).
    ///
    /// `rows` is the fan-in and `cols` the fan-out.
    pub fn glorot_uniform<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let limit = (6.0 / (rows + cols) as f64).sqrt();
        let data = (0..rows * cols).map(|_| rng.gen_range(-limit..limit)).collect();
        Matrix { rows, cols, data }
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Row vector times matrix: `x · M`, with `x.len() == rows`.
    pub fn vec_mul(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(x.len(), self.rows, "vector length must equal matrix rows");
        let mut out = vec![0.0; self.cols];
        for (row, &xi) in self.data.chunks_exact(self.cols).zip(x) {
            if xi == 0.0 {
                continue;
            }
            for (o, &w) in out.iter_mut().zip(row) {
                *o += xi * w;
            }
        }
        out
    }

    /// Matrix times column vector: `M · v`, with `v.len() == cols`.
    pub fn mul_vec(&self, v: &[f64]) -> Vec<f64> {
        assert_eq!(v.len(), self.cols, "vector length must equal matrix cols");
        self.data
            .chunks_exact(self.cols)
            .map(|row| row.iter().zip(v).map(|(w, x)| w * x).sum())
            .collect()
    }

    /// Accumulates `scale · aᵀb` in place (`a` indexes rows, `b` columns).
    pub fn add_outer(&mut self, a: &[f64], b: &[f64], scale: f64) {
        assert_eq!(a.len(), self.rows);
        assert_eq!(b.len(), self.cols);
        for (row, &ai) in self.data.chunks_exact_mut(self.cols).zip(a) {
            let s = ai * scale;
            for (cell, &bj) in row.iter_mut().zip(b) {
                *cell += s * bj;
            }
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }
}
