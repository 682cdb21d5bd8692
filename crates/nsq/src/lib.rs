//! NSQ queue integration.
//!
//! Admitted jobs are published as JSON job descriptors to an nsqd topic via
//! its HTTP API. The worker pool consumes the topic, processes jobs, and
//! reports results back through the API's callback endpoint -- this crate
//! only covers the outbound publish side.

pub mod client;
pub mod descriptor;

pub use client::{NsqClient, NsqConfig, NsqError};
pub use descriptor::JobDescriptor;
