mod bytes;
mod decode;
mod diag;
mod dict;
mod error;
mod instr;
mod op;
mod pmap;
mod scalar;
mod value;

/// Bounded forward-only input cursor.
pub use bytes::Cursor;
/// Message decoding entry points, limits, and stream iteration.
pub use decode::{DecodeLimits, DecodedMessage, Decoder, MessageIter};
/// Reportable-condition sink types.
pub use diag::{CollectSink, DiagnosticSink, LogSink, Reportable};
/// Per-session previous-value table.
pub use dict::{DictEntry, Dictionary};
/// Error and result aliases.
pub use error::{FastError, Result};
/// Schema definitions, compiled instruction tree, and template registry.
pub use instr::{FieldDef, FieldDefKind, FieldInstruction, FieldKind, Operator, Presence, Template, TemplateDef, TemplateRegistry};
/// Presence-map reader.
pub use pmap::PresenceMap;
/// Stop-bit scalar decoding primitives.
pub use scalar::{
	read_ascii, read_byte_vector, read_i32, read_i32_nullable, read_i64, read_i64_nullable, read_u32, read_u32_nullable,
	read_u64, read_u64_nullable,
};
/// Decoded value representations.
pub use value::{ByteView, DecimalValue, FieldValue, Value};
