/// String or byte-vector payload, either aliasing the input buffer or owned.
///
/// Borrowed views stay valid only while the buffer they were decoded
/// from is around; anything stored in a dictionary is converted to the
/// owned form first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteView {
	/// Slice of the input buffer the value was decoded from.
	Borrowed {
		/// Byte offset into the input buffer.
		offset: usize,
		/// Payload length.
		len: usize,
	},
	/// Owned payload, produced by splicing or dictionary storage.
	Owned(Vec<u8>),
}

impl ByteView {
	/// Owned empty payload.
	pub fn empty() -> Self {
		Self::Owned(Vec::new())
	}

	/// Payload length in bytes.
	pub fn len(&self) -> usize {
		match self {
			Self::Borrowed { len, .. } => *len,
			Self::Owned(bytes) => bytes.len(),
		}
	}

	/// Return `true` when the payload is empty.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Resolve the payload against the input buffer it was decoded from.
	pub fn resolve<'a>(&'a self, buf: &'a [u8]) -> &'a [u8] {
		match self {
			Self::Borrowed { offset, len } => &buf[*offset..*offset + *len],
			Self::Owned(bytes) => bytes,
		}
	}

	/// Convert into the owned form, copying out of `buf` when borrowed.
	pub fn into_owned(self, buf: &[u8]) -> Self {
		match self {
			Self::Borrowed { offset, len } => Self::Owned(buf[offset..offset + len].to_vec()),
			owned => owned,
		}
	}
}

/// Scaled decimal: `mantissa * 10^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalValue {
	/// Decimal mantissa.
	pub mantissa: i64,
	/// Power-of-ten exponent.
	pub exponent: i32,
}

impl DecimalValue {
	/// Approximate the decimal as an `f64`.
	pub fn to_f64(self) -> f64 {
		self.mantissa as f64 * 10_f64.powi(self.exponent)
	}
}

/// Decoded value of a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Signed 32-bit integer.
	Int32(i32),
	/// Unsigned 32-bit integer.
	UInt32(u32),
	/// Signed 64-bit integer.
	Int64(i64),
	/// Unsigned 64-bit integer.
	UInt64(u64),
	/// Scaled decimal.
	Decimal(DecimalValue),
	/// ASCII or Unicode text payload.
	Str(ByteView),
	/// Raw byte-vector payload.
	Bytes(ByteView),
	/// Decoded group: child fields in declaration order.
	Group(Vec<FieldValue>),
	/// Decoded sequence: one child-field vector per element.
	Sequence(Vec<Vec<FieldValue>>),
}

impl Value {
	/// Short name of the value kind, for diagnostics.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::Int32(_) => "int32",
			Self::UInt32(_) => "uint32",
			Self::Int64(_) => "int64",
			Self::UInt64(_) => "uint64",
			Self::Decimal(_) => "decimal",
			Self::Str(_) => "string",
			Self::Bytes(_) => "bytes",
			Self::Group(_) => "group",
			Self::Sequence(_) => "sequence",
		}
	}

	/// Convert any borrowed payload into the owned form, recursively.
	pub fn into_owned(self, buf: &[u8]) -> Self {
		match self {
			Self::Str(view) => Self::Str(view.into_owned(buf)),
			Self::Bytes(view) => Self::Bytes(view.into_owned(buf)),
			Self::Group(fields) => Self::Group(fields.into_iter().map(|f| f.into_owned(buf)).collect()),
			Self::Sequence(elems) => Self::Sequence(
				elems
					.into_iter()
					.map(|fields| fields.into_iter().map(|f| f.into_owned(buf)).collect())
					.collect(),
			),
			scalar => scalar,
		}
	}
}

/// One decoded field: identity plus value, `None` when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
	/// Field id from the instruction.
	pub id: u32,
	/// Field name from the instruction.
	pub name: Box<str>,
	/// Decoded value; `None` is the absent state of an optional field.
	pub value: Option<Value>,
}

impl FieldValue {
	fn into_owned(self, buf: &[u8]) -> Self {
		Self {
			value: self.value.map(|v| v.into_owned(buf)),
			..self
		}
	}
}
