//! # densvd
//!
//! Pure-Rust singular value decomposition for dense real and complex
//! matrices, no-std compatible (with `alloc`).
//!
//! ## Quick start
//!
//! ```
//! use densvd::{DynMatrix, SvdMode};
//!
//! let a = DynMatrix::from_rows(3, 2, &[
//!     3.0_f64, 2.0,
//!     2.0, 3.0,
//!     0.0, 0.0,
//! ]);
//! let svd = a.svd(SvdMode::Economy).unwrap();
//! assert!((svd.singular_values()[0] - 5.0).abs() < 1e-12);
//! assert!((svd.singular_values()[1] - 1.0).abs() < 1e-12);
//! assert!(svd.reconstruct().approx_eq(&a));
//! ```
//!
//! ## Modules
//!
//! - [`dynmatrix`] — Heap-allocated `DynMatrix<T>` with runtime dimensions
//!   (requires `alloc` feature, included with `std`). Column-major `Vec<T>`
//!   storage. Implements [`MatrixRef`] / [`MatrixMut`], so the linalg
//!   kernels work on it directly. Hosts [`DynSvd`], the [`svd`] and
//!   [`singular_values`] entry points, and the helpers the factorization
//!   is checked with (`adjoint`, `approx_eq`, `is_unitary`).
//!
//! - [`linalg`] — The SVD engine: Householder bidiagonalization
//!   ([`linalg::bidiagonalize`]) to a real bidiagonal form, followed by
//!   implicit-shift Golub-Kahan QR ([`linalg::bidiagonal_qr`]). Both operate
//!   in place on `&mut impl MatrixMut<T>`.
//!
//! - [`traits`] — Element trait hierarchy:
//!   - [`Scalar`] — all matrix elements (`Copy + PartialEq + Debug + Zero + One + Num`)
//!   - [`FloatScalar`] — real floats; singular values have this type
//!   - [`LinalgScalar`] — real floats and complex numbers, used by the decomposition and norms
//!   - [`MatrixRef`] / [`MatrixMut`] — generic read/write access for algorithms
//!
//! ## Complex matrices
//!
//! With the `complex` feature, `Complex<f32>` / `Complex<f64>` matrices are
//! decomposed with complex Householder reflections. The phase of each pivot
//! is absorbed into the reflectors, so the QR phase always runs on a real
//! bidiagonal and the singular values come back as real numbers.
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`](https://docs.rs/log) facade: `debug`
//! per decomposition, `trace` per QR sweep, `warn` on a convergence retry or
//! failure. No logger is installed by this crate.
//!
//! ## Cargo features
//!
//! | Feature   | Default  | Description |
//! |-----------|----------|-------------|
//! | `std`     | yes      | Implies `alloc`. Hardware FPU via system libm |
//! | `alloc`   | via std  | `DynMatrix` and the SVD driver (heap-allocated, runtime-sized) |
//! | `libm`    | baseline | Pure-Rust software float fallback |
//! | `complex` | yes      | `Complex<f32>` / `Complex<f64>` support via `num-complex` |
//! | `all`     | no       | All features: `std` + `complex` |

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
pub mod dynmatrix;
pub mod linalg;
pub mod traits;

#[cfg(feature = "alloc")]
pub use dynmatrix::{singular_values, svd, DynMatrix, DynSvd, ParseSvdModeError, SvdMode};
pub use linalg::LinalgError;
pub use traits::{FloatScalar, LinalgScalar, MatrixMut, MatrixRef, Scalar};

#[cfg(feature = "complex")]
pub use num_complex::Complex;
