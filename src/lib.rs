//! Shadeside: estimates which side of a vehicle the sun will hit on a trip,
//! so riders can pick the shaded seats.
//!
//! The pipeline plans a route (or falls back to a straight line), gates the
//! trip on the origin's daylight window, analyzes every route segment
//! against the sun's position at its allocated pass-time, and aggregates a
//! majority verdict with a confidence score. Route and weather data come
//! from injected providers; sun geometry is computed locally.

pub mod aggregate;
pub mod analyzer;
pub mod config;
pub mod daylight;
pub mod engine;
pub mod geometry;
pub mod providers;
pub mod server;
pub mod solar;
