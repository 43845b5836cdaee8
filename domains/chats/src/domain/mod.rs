//! Chat entities and lifecycle rules

pub mod entities;
pub mod state;
