//! FAST wire-format encoding helpers shared by workspace tests.
//!
//! The decoder crate never encodes; these writers exist so tests can
//! build bit-exact fixtures without hand-assembling stop-bit bytes.

/// Append a mandatory unsigned stop-bit integer.
pub fn write_u64(buf: &mut Vec<u8>, value: u64) {
	let mut bytes = [0_u8; 10];
	let mut idx = bytes.len();
	let mut cur = value;

	loop {
		idx -= 1;
		bytes[idx] = (cur & 0x7F) as u8;
		cur >>= 7;
		if cur == 0 {
			break;
		}
	}

	bytes[9] |= 0x80;
	buf.extend_from_slice(&bytes[idx..]);
}

/// Append a mandatory unsigned 32-bit stop-bit integer.
pub fn write_u32(buf: &mut Vec<u8>, value: u32) {
	write_u64(buf, u64::from(value));
}

/// Append a mandatory signed stop-bit integer.
pub fn write_i64(buf: &mut Vec<u8>, value: i64) {
	let mut bytes = [0_u8; 10];
	let mut idx = bytes.len();
	let mut cur = value;

	loop {
		idx -= 1;
		let digit = (cur & 0x7F) as u8;
		bytes[idx] = digit;
		cur >>= 7;
		let sign_settled = (cur == 0 && digit & 0x40 == 0) || (cur == -1 && digit & 0x40 != 0);
		if sign_settled {
			break;
		}
	}

	bytes[9] |= 0x80;
	buf.extend_from_slice(&bytes[idx..]);
}

/// Append a mandatory signed 32-bit stop-bit integer.
pub fn write_i32(buf: &mut Vec<u8>, value: i32) {
	write_i64(buf, i64::from(value));
}

/// Append a nullable unsigned stop-bit integer (+1 bias, 0 encodes null).
///
/// `u64::MAX` needs the 65-bit wire value `2^64` and is emitted as the
/// ten-byte sequence the decoder's carry path recognizes.
pub fn write_u64_nullable(buf: &mut Vec<u8>, value: Option<u64>) {
	match value {
		None => write_u64(buf, 0),
		Some(u64::MAX) => {
			buf.push(0x02);
			buf.extend_from_slice(&[0x00; 8]);
			buf.push(0x80);
		}
		Some(v) => write_u64(buf, v + 1),
	}
}

/// Append a nullable unsigned 32-bit stop-bit integer.
pub fn write_u32_nullable(buf: &mut Vec<u8>, value: Option<u32>) {
	write_u64_nullable(buf, value.map(u64::from));
}

/// Append a nullable signed stop-bit integer (+1 bias on non-negatives).
///
/// `i64::MAX` needs the wire value `2^63`, emitted as ten bytes.
pub fn write_i64_nullable(buf: &mut Vec<u8>, value: Option<i64>) {
	match value {
		None => write_i64(buf, 0),
		Some(i64::MAX) => {
			buf.push(0x01);
			buf.extend_from_slice(&[0x00; 8]);
			buf.push(0x80);
		}
		Some(v) if v >= 0 => write_i64(buf, v + 1),
		Some(v) => write_i64(buf, v),
	}
}

/// Append a nullable signed 32-bit stop-bit integer.
pub fn write_i32_nullable(buf: &mut Vec<u8>, value: Option<i32>) {
	write_i64_nullable(buf, value.map(i64::from));
}

/// Append an ASCII run: empty becomes `0x80`, null becomes `0x00 0x80`.
pub fn write_ascii(buf: &mut Vec<u8>, value: Option<&str>) {
	match value {
		None => buf.extend_from_slice(&[0x00, 0x80]),
		Some("") => buf.push(0x80),
		Some(text) => {
			let bytes = text.as_bytes();
			buf.extend_from_slice(&bytes[..bytes.len() - 1]);
			buf.push(bytes[bytes.len() - 1] | 0x80);
		}
	}
}

/// Append a mandatory length-prefixed byte vector.
pub fn write_bytes(buf: &mut Vec<u8>, value: &[u8]) {
	write_u32(buf, value.len() as u32);
	buf.extend_from_slice(value);
}

/// Append a nullable length-prefixed byte vector.
pub fn write_bytes_nullable(buf: &mut Vec<u8>, value: Option<&[u8]>) {
	match value {
		None => write_u32_nullable(buf, None),
		Some(bytes) => {
			write_u32_nullable(buf, Some(bytes.len() as u32));
			buf.extend_from_slice(bytes);
		}
	}
}

/// Encode a presence map: 7 bits per byte, stop bit on the final byte.
///
/// An empty bit list still produces the one-byte map `0x80`.
pub fn pmap(bits: &[bool]) -> Vec<u8> {
	if bits.is_empty() {
		return vec![0x80];
	}

	let mut out = Vec::with_capacity(bits.len() / 7 + 1);
	for chunk in bits.chunks(7) {
		let mut byte = 0_u8;
		for (i, bit) in chunk.iter().enumerate() {
			if *bit {
				byte |= 1 << (6 - i);
			}
		}
		out.push(byte);
	}

	let last = out.len() - 1;
	out[last] |= 0x80;
	out
}

/// Incremental builder for one FAST message: presence map plus body.
///
/// Presence bits and body bytes accumulate separately so the map can be
/// emitted first, sized to what the fields actually consumed.
#[derive(Debug, Default)]
pub struct MessageBuilder {
	bits: Vec<bool>,
	body: Vec<u8>,
}

impl MessageBuilder {
	/// Start a message that carries its template id.
	pub fn new(template_id: u32) -> Self {
		let mut builder = Self {
			bits: vec![true],
			body: Vec::new(),
		};
		write_u32(&mut builder.body, template_id);
		builder
	}

	/// Start a message that inherits the previous template.
	pub fn without_template_id() -> Self {
		Self {
			bits: vec![false],
			body: Vec::new(),
		}
	}

	/// Append one presence bit.
	pub fn bit(&mut self, set: bool) -> &mut Self {
		self.bits.push(set);
		self
	}

	/// Append a mandatory unsigned 32-bit integer to the body.
	pub fn u32(&mut self, value: u32) -> &mut Self {
		write_u32(&mut self.body, value);
		self
	}

	/// Append a nullable unsigned 32-bit integer to the body.
	pub fn u32_nullable(&mut self, value: Option<u32>) -> &mut Self {
		write_u32_nullable(&mut self.body, value);
		self
	}

	/// Append a mandatory unsigned 64-bit integer to the body.
	pub fn u64(&mut self, value: u64) -> &mut Self {
		write_u64(&mut self.body, value);
		self
	}

	/// Append a nullable unsigned 64-bit integer to the body.
	pub fn u64_nullable(&mut self, value: Option<u64>) -> &mut Self {
		write_u64_nullable(&mut self.body, value);
		self
	}

	/// Append a mandatory signed 32-bit integer to the body.
	pub fn i32(&mut self, value: i32) -> &mut Self {
		write_i32(&mut self.body, value);
		self
	}

	/// Append a nullable signed 32-bit integer to the body.
	pub fn i32_nullable(&mut self, value: Option<i32>) -> &mut Self {
		write_i32_nullable(&mut self.body, value);
		self
	}

	/// Append a mandatory signed 64-bit integer to the body.
	pub fn i64(&mut self, value: i64) -> &mut Self {
		write_i64(&mut self.body, value);
		self
	}

	/// Append a nullable signed 64-bit integer to the body.
	pub fn i64_nullable(&mut self, value: Option<i64>) -> &mut Self {
		write_i64_nullable(&mut self.body, value);
		self
	}

	/// Append an ASCII run to the body.
	pub fn ascii(&mut self, value: Option<&str>) -> &mut Self {
		write_ascii(&mut self.body, value);
		self
	}

	/// Append a mandatory byte vector to the body.
	pub fn bytes(&mut self, value: &[u8]) -> &mut Self {
		write_bytes(&mut self.body, value);
		self
	}

	/// Append a nullable byte vector to the body.
	pub fn bytes_nullable(&mut self, value: Option<&[u8]>) -> &mut Self {
		write_bytes_nullable(&mut self.body, value);
		self
	}

	/// Append a nested presence map (group or sequence element) to the body.
	pub fn nested_pmap(&mut self, bits: &[bool]) -> &mut Self {
		let encoded = pmap(bits);
		self.body.extend_from_slice(&encoded);
		self
	}

	/// Append raw bytes to the body.
	pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
		self.body.extend_from_slice(bytes);
		self
	}

	/// Emit the message: encoded presence map followed by the body.
	pub fn build(&self) -> Vec<u8> {
		let mut out = pmap(&self.bits);
		out.extend_from_slice(&self.body);
		out
	}
}
