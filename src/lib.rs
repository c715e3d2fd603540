//! Decoder for the FAST (FIX Adapted for STreaming) wire protocol.
//!
//! FAST is a schema-driven, bit-packed encoding: each field's wire
//! representation is derived from its operator, a presence map, and a
//! per-session dictionary of previous values. This crate implements
//! the decode side as a pure in-memory transform over a byte buffer.

/// Stop-bit scalar decoding, presence maps, field operators, and the
/// message walker.
pub mod fast;
