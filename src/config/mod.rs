//! # Configuration Module
//!
//! This module provides the configuration structure shared by the CLI and library callers.

pub mod config;

pub use config::ClassifyConfig;
