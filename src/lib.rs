//! catalog-forge - product document synthesis and classification.
//!
//! Expands terse e-commerce product rows into structured product-design
//! documents with a reasoning model, then assigns each document a category
//! from a fixed taxonomy.

pub mod classify;
pub mod cli;
pub mod config;
pub mod generate;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod storage;
