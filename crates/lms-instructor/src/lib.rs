//! # lms-instructor
//!
//! Instructor-facing student queries for lms-rs. Instructors describe the
//! students they are after as a list of criteria ("opened section S", "did
//! not complete problem P", ...); this crate evaluates them against the
//! courseware interaction data and serves the result over HTTP.
//!
//! ## Modules
//!
//! - [`criterion`] - Criteria and their wire format
//! - [`results`] - Student references and the inclusion accumulator
//! - [`store`] - Interaction and opt-out stores (in-memory and SQL)
//! - [`data_access`] - Query evaluation (`get_users`)
//! - [`views`] - Axum handlers and request-id middleware
//! - [`server`] - The [`LmsApp`](server::LmsApp) application

pub mod criterion;
pub mod data_access;
pub mod results;
pub mod server;
pub mod store;
pub mod views;

pub use criterion::{Criterion, FilterKind, Inclusion, Scope};
pub use data_access::get_users;
pub use results::{QueryResults, StudentRef};
pub use server::LmsApp;
