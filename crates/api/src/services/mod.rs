//! Business services.
//!
//! Services own the flow of each operation - resolve, check, write - and
//! return typed domain errors; repositories own the SQL. Handlers build a
//! service per request over the shared pool.

pub mod auth;
pub mod cart;
pub mod categories;
pub mod featured;
pub mod jwt;
pub mod products;
pub mod reviews;
pub mod upload;
pub mod users;
