//! Shared test utilities

pub mod fixtures;
pub mod mock_connector;
