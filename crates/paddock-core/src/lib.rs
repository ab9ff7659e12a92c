//! Ambient HTTP plumbing shared by Paddock services: tracing setup, request ids,
//! health checks, and serializers.

pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
