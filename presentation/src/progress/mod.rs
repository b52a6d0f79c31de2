//! Progress display driven by debate events

pub mod reporter;
