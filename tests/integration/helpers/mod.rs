#![allow(dead_code, unused_imports)]

pub mod test_config;

pub use test_config::{create_test_config, test_model, FALLBACK_1, FALLBACK_2, PRIMARY};
