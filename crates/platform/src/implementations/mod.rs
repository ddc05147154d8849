//! Concrete host implementations

pub mod linux;
