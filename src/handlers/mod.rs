//! HTTP handlers

pub mod attack_vectors;
pub mod clustering;
pub mod health;
pub mod sankey;
pub mod scatter;
pub mod visuals;
