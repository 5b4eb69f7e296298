//! Helpers shared by the unit tests; the same file backs the integration tests.

include!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/support.rs"));
