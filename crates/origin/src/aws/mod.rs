//! AWS SDK client initialisation for S3 and Secrets Manager.
//!
//! Credentials and region come from the standard AWS provider chain. An
//! optional endpoint override points both clients at an emulator.

pub mod clients;

pub use clients::AwsClients;
