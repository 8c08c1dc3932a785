//! Byte and string codecs used by the signing pipeline.
//!
//! - [`percent`]: RFC 3986 percent-encoding as profiled by RFC 5849 Section 3.6
//! - [`form`]: `application/x-www-form-urlencoded`
//! - [`base64`]: standard padded Base64
//! - [`Charset`]: text to bytes conversion for non-UTF-8 callers

pub mod base64;
mod charset;
pub mod form;
pub mod percent;

pub use charset::Charset;
