//! Shared type definitions
//!
//! This module contains the data types shared between the loader and the HTTP layer.

pub mod config;
pub mod message;
pub mod model;
