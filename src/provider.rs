//! Platform-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated metadata (`PlatformDescriptor`) covering HTTPS-only
//! OAuth 1.0a and publishing endpoints, the request timeout, and platform quirks (post
//! length limit, callback, profile query). `strategy` defines [`PlatformStrategy`], an
//! HTTP-client-agnostic hook used by flows to classify failed responses into the publisher
//! error taxonomy and to decorate outgoing publish bodies.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
