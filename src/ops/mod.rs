//! # Compute kernels
//!
//! Backend loops used by [`Matrix`](crate::Matrix).
//!
//! ## Submodules
//!
//! - [`cpu`]: multi-threaded CPU kernels (matrix product over `rayon`,
//!   sequential element-wise loops)
//!
//! Kernels never validate shapes. Every public entry point goes through
//! `Matrix`, which checks dims first and only then calls down here.

pub(crate) mod cpu;
