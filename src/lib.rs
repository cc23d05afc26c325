//! Interactive cultural storytelling service: generates a story with a text
//! model, lets the reader steer it through up to three decisions, and keeps
//! finished stories in Postgres.

pub mod agent;
pub mod config;
pub mod culture;
pub mod db;
pub mod errors;
pub mod models;
pub mod routes;
pub mod service;
pub mod story;

pub use errors::{AppError, GenerationError};
