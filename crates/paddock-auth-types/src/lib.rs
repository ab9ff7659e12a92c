//! Session types shared by the Paddock web service and its tests.
//!
//! Provides the session cookie builders, local session-JWT verification, and the
//! `SessionIdentity` extractor.

pub mod cookie;
pub mod identity;
pub mod token;
