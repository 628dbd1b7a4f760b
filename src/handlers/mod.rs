// src/handlers/mod.rs

pub mod auth;
pub mod document;
pub mod quiz;
