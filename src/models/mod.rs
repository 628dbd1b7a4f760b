// src/models/mod.rs

pub mod attempt;
pub mod document;
pub mod quiz;
pub mod user;
