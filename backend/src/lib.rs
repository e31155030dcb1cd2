//! # Institute Timetable
//!
//! Weekly class timetables for an institute, one per (stream, semester).
//!
//! A timetable is a sparse map from (day, time) cells to a subject and its
//! teacher. Administrators place, edit, move and remove classes; every
//! change is checked against two rules before it is accepted:
//!
//! - a cell holds at most one class;
//! - a teacher teaches at most one class per day.
//!
//! Accepted changes are applied optimistically and the full snapshot is
//! persisted through a per-timetable save queue, so the newest snapshot
//! always wins. A failed save reloads the stored timetable.
//!
//! ## Architecture
//!
//! - [`models`]: grid, coordinates, class assignments and the schedule map
//! - [`scheduler`]: pure conflict checks, mutations and the schedule audit
//! - [`services`]: editor session, save queue and suggestion jobs
//! - [`db`]: repository traits, local and PostgreSQL backends, configuration
//! - [`config`]: `timetable.toml` loading with environment overrides
//! - [`http`]: axum REST API (feature `http-server`)
//! - [`api`]: public types shared by all layers

// RepositoryError carries rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
