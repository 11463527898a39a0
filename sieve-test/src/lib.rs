#![doc = include_str!("../README.md")]

pub mod steps;
pub mod tracing;
pub mod world;
