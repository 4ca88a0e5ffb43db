//! JSON fallback encoding for tracestore metadata
//!
//! Container attributes cannot hold maps or lists. Those values travel as one
//! JSON object stored under a reserved attribute. Special wrappers keep the
//! encoding lossless for values plain JSON cannot carry:
//!
//! - `{"$f64": "NaN|+Inf|-Inf|-0.0"}` for special floats
//! - `{"$ints": [...]}` / `{"$floats": [...]}` for rank-1 numeric arrays
//! - `{"$unserializable": "<type>"}` sentinel for opaque values

mod decode;
mod encode;

pub use decode::{decode_fallback, decode_value, DecodeError};
pub use encode::{
    encode_fallback, encode_value, FallbackBlob, F64_WRAPPER, FLOATS_WRAPPER, INTS_WRAPPER,
    UNSERIALIZABLE_WRAPPER,
};
