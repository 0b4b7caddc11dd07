//! Support code shared by the crate's unit and integration tests.

pub mod testing;
