//! Test utilities for story stage tests.

pub mod mock_driver;

#[allow(unused_imports)]
pub use mock_driver::{MockDriver, MockResponse, image_output, text_output, zero_delay_policy};
