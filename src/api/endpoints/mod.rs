//! API endpoint handlers.
//!
//! Each module corresponds to one resource of the assistant. Handlers stay
//! thin: decode the request, call into the pipeline/lookup/gateway modules,
//! serialize the result.

pub mod analyses;
pub mod calendar;
pub mod detect;
pub mod health;
pub mod home;
pub mod languages;
pub mod market;
pub mod remedies;
pub mod weather;
pub mod yield_tips;
