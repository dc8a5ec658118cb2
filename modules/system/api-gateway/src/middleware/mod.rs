pub mod error_mapping;
pub mod rate_limit;
pub mod request_id;
pub mod sanitize;
