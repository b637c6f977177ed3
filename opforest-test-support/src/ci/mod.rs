//! Environment-driven configuration for test runs in CI and locally.

pub mod property_test_profile;
