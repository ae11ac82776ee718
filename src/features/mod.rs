//! Command flows: robot ticket lookup and storage-location decoding.

pub mod location;
pub mod tickets;
