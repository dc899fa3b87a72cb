// src/lib.rs

//! pagewire: behaviours of the Userism site pages, run against a parsed
//! page tree.

pub mod dom;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
