// src/quiz/mod.rs

pub mod assembly;
pub mod scoring;
