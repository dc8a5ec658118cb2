//! Error payloads shared by the Zesty HTTP surface.
//!
//! Every failing endpoint answers with an RFC 9457 `application/problem+json`
//! body. Upstream failures are reported with a generic detail; the cause is
//! logged where it happens and never echoed to the caller.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod codes;
pub mod failure;
pub mod problem;

pub use failure::FailureKind;
pub use problem::{APPLICATION_PROBLEM_JSON, Problem, ValidationViolation};

/// Attach the request path and trace id to a problem before it is returned.
pub fn finalize(mut p: Problem, instance: &str, trace_id: Option<String>) -> Problem {
    p = p.with_instance(instance);
    if let Some(tid) = trace_id {
        p = p.with_trace_id(tid);
    }
    p
}
