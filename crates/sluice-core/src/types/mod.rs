//! Runtime type system for sluice

pub mod value;

pub use value::Value;
