// SPDX-License-Identifier: Apache-2.0

//! Backend API client.
//!
//! Uploads are created with `POST /api/1.0/scans` and polled on
//! `GET /api/1.0/scans/{id}` until the backend answers `200` with the result.
//! A `202` reply carries progress, or the long-queue flag when results will
//! only be available later.

pub mod client;
mod types;

pub use client::{ApiClient, default_sbom_output};
