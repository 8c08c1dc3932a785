//! CLI command implementations.

pub(crate) mod base_string;
mod request;
pub(crate) mod sign;

pub(crate) use base_string::BaseStringArgs;
pub(crate) use sign::SignArgs;
