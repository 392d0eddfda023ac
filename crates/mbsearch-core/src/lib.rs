//! mbsearch-core
//!
//! Types, errors, configuration and host traits shared by the MMD codec,
//! the tantivy search core and the response writer.

#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod payload_loader;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
