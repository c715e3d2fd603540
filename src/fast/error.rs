use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, FastError>;

/// Errors produced while compiling templates and decoding FAST streams.
///
/// Static (`S*`) variants fire at template-compile time, dynamic (`D*`)
/// variants while decoding stream content. Reportable conditions never
/// surface here; they flow through [`crate::fast::DiagnosticSink`].
#[derive(Debug, Error)]
pub enum FastError {
	/// Not enough bytes remained for a requested read.
	#[error("buffer underflow at offset {at}, need {need} bytes, remaining {rem}")]
	BufferUnderflow {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Mandatory copy/increment/default field with nothing to fall back on.
	#[error("mandatory field {field} has no initial value and undefined previous value [ERR D5]")]
	MandatoryWithoutInitial {
		/// Field name.
		field: Box<str>,
	},
	/// Mandatory copy/increment field whose previous value is empty.
	#[error("mandatory field {field} has empty previous value [ERR D6]")]
	MandatoryEmptyPrevious {
		/// Field name.
		field: Box<str>,
	},
	/// Mandatory tail field with undefined previous value and no initial value.
	#[error("mandatory tail field {field} has no initial value and undefined previous value [ERR D6]")]
	TailWithoutInitial {
		/// Field name.
		field: Box<str>,
	},
	/// Mandatory tail field whose previous value is empty.
	#[error("mandatory tail field {field} has empty previous value [ERR D7]")]
	TailEmptyPrevious {
		/// Field name.
		field: Box<str>,
	},
	/// Delta subtraction length exceeds the base value length.
	#[error("delta on {field}: subtraction length {subtraction} exceeds base length {base_len} [ERR D7]")]
	DeltaSubtractionTooLarge {
		/// Field name.
		field: Box<str>,
		/// Requested subtraction magnitude.
		subtraction: u64,
		/// Length of the base value.
		base_len: usize,
	},
	/// Delta field whose previous value is empty.
	#[error("delta on {field}: previous value is empty [ERR D6]")]
	DeltaEmptyPrevious {
		/// Field name.
		field: Box<str>,
	},
	/// Malformed ASCII null framing (`0x00` not followed by `0x80`, or
	/// a null sequence in a non-nullable context).
	#[error("malformed ascii null framing at offset {at} [ERR D9]")]
	AsciiNullFraming {
		/// Offset of the first entity byte.
		at: usize,
	},
	/// Malformed hexadecimal initial-value literal in the schema.
	#[error("field {field}: malformed hex literal {literal:?} [ERR D11]")]
	MalformedHexLiteral {
		/// Field name.
		field: Box<str>,
		/// Offending literal text.
		literal: Box<str>,
	},
	/// Previous value in the dictionary has an incompatible type.
	#[error("field {field}: previous value type mismatch, expected {expected}, got {got} [ERR D4]")]
	PreviousValueTypeMismatch {
		/// Field name.
		field: Box<str>,
		/// Expected value kind.
		expected: &'static str,
		/// Actual value kind found in the dictionary.
		got: &'static str,
	},
	/// Message referenced a template id missing from the registry.
	#[error("unknown template id {id}")]
	UnknownTemplateId {
		/// Referenced template id.
		id: u32,
	},
	/// Static template reference named a template missing from the registry.
	#[error("unknown template reference {name}")]
	UnknownTemplateName {
		/// Referenced template name.
		name: Box<str>,
	},
	/// Message omitted the template id with no prior message to inherit from.
	#[error("message carries no template id and no previous template is in effect")]
	NoCurrentTemplate,
	/// Decoded sequence length exceeded the configured limit.
	#[error("sequence too long: len={len}, max={max}")]
	SequenceTooLong {
		/// Decoded sequence length.
		len: u32,
		/// Maximum permitted length.
		max: u32,
	},
	/// Decoded byte-vector length exceeded the configured limit.
	#[error("byte vector too large: len={len}, max={max}")]
	ByteVectorTooLarge {
		/// Decoded length prefix.
		len: usize,
		/// Maximum permitted length.
		max: usize,
	},
	/// Nested template references exceeded the configured depth limit.
	#[error("template reference depth exceeded (max={max})")]
	RefDepthExceeded {
		/// Configured depth ceiling.
		max: u32,
	},
	/// Duplicate template id or name at registration.
	#[error("duplicate template {what} {name} [ERR S1]")]
	DuplicateTemplate {
		/// Which key collided (`"id"` or `"name"`).
		what: &'static str,
		/// Colliding id or name rendered as text.
		name: Box<str>,
	},
	/// Operator is not applicable to the field's type.
	#[error("field {field}: operator {operator} is not applicable to {kind} [ERR S2]")]
	OperatorTypeMismatch {
		/// Field name.
		field: Box<str>,
		/// Operator tag.
		operator: &'static str,
		/// Field type tag.
		kind: &'static str,
	},
	/// Initial-value literal could not be parsed for the field's type.
	#[error("field {field}: initial value {literal:?} is not valid for {kind} [ERR S3]")]
	BadInitialLiteral {
		/// Field name.
		field: Box<str>,
		/// Offending literal text.
		literal: Box<str>,
		/// Field type tag.
		kind: &'static str,
	},
	/// Constant-operator field without an initial value.
	#[error("field {field}: constant operator requires an initial value [ERR S4]")]
	ConstantWithoutInitial {
		/// Field name.
		field: Box<str>,
	},
	/// Mandatory default-operator field without an initial value.
	#[error("field {field}: mandatory default operator requires an initial value [ERR S5]")]
	MandatoryDefaultWithoutInitial {
		/// Field name.
		field: Box<str>,
	},
	/// Instruction tree handed to the decoder is internally inconsistent.
	#[error("field {field}: instruction has no dictionary slot for operator {operator}")]
	MissingDictionarySlot {
		/// Field name.
		field: Box<str>,
		/// Operator tag.
		operator: &'static str,
	},
}

impl FastError {
	/// FAST specification error code for this variant, when one applies.
	pub fn code(&self) -> Option<&'static str> {
		match self {
			Self::MandatoryWithoutInitial { .. } => Some("D5"),
			Self::MandatoryEmptyPrevious { .. } | Self::TailWithoutInitial { .. } | Self::DeltaEmptyPrevious { .. } => Some("D6"),
			Self::TailEmptyPrevious { .. } | Self::DeltaSubtractionTooLarge { .. } => Some("D7"),
			Self::AsciiNullFraming { .. } => Some("D9"),
			Self::MalformedHexLiteral { .. } => Some("D11"),
			Self::PreviousValueTypeMismatch { .. } => Some("D4"),
			Self::DuplicateTemplate { .. } => Some("S1"),
			Self::OperatorTypeMismatch { .. } => Some("S2"),
			Self::BadInitialLiteral { .. } => Some("S3"),
			Self::ConstantWithoutInitial { .. } => Some("S4"),
			Self::MandatoryDefaultWithoutInitial { .. } => Some("S5"),
			_ => None,
		}
	}

	/// Return `true` for schema-time (static) errors.
	pub fn is_static(&self) -> bool {
		matches!(
			self,
			Self::DuplicateTemplate { .. }
				| Self::OperatorTypeMismatch { .. }
				| Self::BadInitialLiteral { .. }
				| Self::ConstantWithoutInitial { .. }
				| Self::MandatoryDefaultWithoutInitial { .. }
				| Self::MalformedHexLiteral { .. }
		)
	}
}
