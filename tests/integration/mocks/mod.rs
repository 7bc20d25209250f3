#![allow(dead_code, unused_imports)]

pub mod openrouter_mock;

pub use openrouter_mock::{
    mount_error, mount_malformed, mount_slow, mount_success, success_body,
};
