//! Client core for a college timetable-management backend.
//!
//! [`grid`] lays a flat list of entries onto the week grid, [`validation`]
//! checks every form before it is sent, and [`client`] talks to the REST
//! backend. [`view::TimetableView`] ties the three together for one
//! semester/section or laboratory.

pub mod auth;
pub mod bulk;
pub mod cache;
pub mod client;
pub mod config;
pub mod grid;
pub mod types;
pub mod validation;
pub mod view;

pub use auth::{AuthContext, Session, SessionStore};
pub use bulk::{BulkOutcome, DayFailure};
pub use cache::SnapshotCache;
pub use client::{ApiClient, ApiError};
pub use config::ClientConfig;
pub use grid::{GridCell, GridLayout, GridResolver};
pub use validation::{validate, SchemaName, ValidationErrors};
pub use view::{SubmitOutcome, TimetableView};
