//! Runtime: boot (logging, config, state) and the stdio serve loop.

pub mod boot;
pub mod serve;
