use crate::fast::bytes::Cursor;
use crate::fast::diag::{DiagnosticSink, Reportable};
use crate::fast::value::ByteView;
use crate::fast::{FastError, Result};

/// Unsigned stop-bit accumulator state.
///
/// `carry` is set when payload bits were shifted out past bit 63. The
/// nullable `u64` path relies on it to tell the 65-bit wire value
/// `2^64` (the encoding of `u64::MAX`) apart from the null sentinel;
/// everywhere else a set carry means the wire value wrapped.
struct RawUnsigned {
	value: u64,
	carry: bool,
}

/// Signed stop-bit accumulator state, same carry convention.
struct RawSigned {
	value: i64,
	carry: bool,
}

fn read_unsigned_raw(cursor: &mut Cursor<'_>) -> Result<RawUnsigned> {
	let mut value = 0_u64;
	let mut carry = false;

	loop {
		let byte = cursor.take()?;
		if value >> 57 != 0 {
			carry = true;
		}
		value = (value << 7) | u64::from(byte & 0x7F);
		if byte & 0x80 != 0 {
			break;
		}
	}

	Ok(RawUnsigned { value, carry })
}

fn read_signed_raw(cursor: &mut Cursor<'_>) -> Result<RawSigned> {
	let first = cursor.take()?;
	// Bit 6 of the leading byte is the sign; extend it across the rest.
	let mut value = if first & 0x40 != 0 {
		i64::from(first & 0x7F) | !0x7F
	} else {
		i64::from(first & 0x7F)
	};
	let mut carry = false;

	if first & 0x80 != 0 {
		return Ok(RawSigned { value, carry });
	}

	loop {
		let byte = cursor.take()?;
		if value > (i64::MAX >> 7) || value < (i64::MIN >> 7) {
			carry = true;
		}
		value = (value << 7) | i64::from(byte & 0x7F);
		if byte & 0x80 != 0 {
			break;
		}
	}

	Ok(RawSigned { value, carry })
}

fn report_wrap(sink: &mut dyn DiagnosticSink, at: usize, target: &'static str) {
	sink.report(Reportable {
		code: "R1",
		field: "".into(),
		detail: format!("stop-bit integer at offset {at} exceeds {target} range, value wrapped"),
	});
}

/// Decode a mandatory unsigned 64-bit stop-bit integer.
pub fn read_u64(cursor: &mut Cursor<'_>, sink: &mut dyn DiagnosticSink) -> Result<u64> {
	let at = cursor.pos();
	let raw = read_unsigned_raw(cursor)?;
	if raw.carry {
		report_wrap(sink, at, "u64");
	}
	Ok(raw.value)
}

/// Decode a nullable unsigned 64-bit stop-bit integer.
///
/// The wire value is biased by +1 and may therefore occupy 65 bits;
/// the carry flag distinguishes `u64::MAX` from genuine overflow.
pub fn read_u64_nullable(cursor: &mut Cursor<'_>, sink: &mut dyn DiagnosticSink) -> Result<Option<u64>> {
	let at = cursor.pos();
	let raw = read_unsigned_raw(cursor)?;

	if raw.carry {
		if raw.value == 0 {
			// Wire value 2^64: the biased encoding of u64::MAX.
			return Ok(Some(u64::MAX));
		}
		report_wrap(sink, at, "u64");
		return Ok(Some(raw.value.wrapping_sub(1)));
	}

	if raw.value == 0 {
		Ok(None)
	} else {
		Ok(Some(raw.value - 1))
	}
}

/// Decode a mandatory unsigned 32-bit stop-bit integer.
pub fn read_u32(cursor: &mut Cursor<'_>, sink: &mut dyn DiagnosticSink) -> Result<u32> {
	let at = cursor.pos();
	let raw = read_unsigned_raw(cursor)?;
	if raw.carry || raw.value > u64::from(u32::MAX) {
		report_wrap(sink, at, "u32");
	}
	Ok(raw.value as u32)
}

/// Decode a nullable unsigned 32-bit stop-bit integer.
pub fn read_u32_nullable(cursor: &mut Cursor<'_>, sink: &mut dyn DiagnosticSink) -> Result<Option<u32>> {
	let at = cursor.pos();
	let raw = read_unsigned_raw(cursor)?;
	if raw.value == 0 && !raw.carry {
		return Ok(None);
	}

	let unbiased = raw.value.wrapping_sub(1);
	if raw.carry || unbiased > u64::from(u32::MAX) {
		report_wrap(sink, at, "u32");
	}
	Ok(Some(unbiased as u32))
}

/// Decode a mandatory signed 64-bit stop-bit integer.
pub fn read_i64(cursor: &mut Cursor<'_>, sink: &mut dyn DiagnosticSink) -> Result<i64> {
	let at = cursor.pos();
	let raw = read_signed_raw(cursor)?;
	if raw.carry {
		report_wrap(sink, at, "i64");
	}
	Ok(raw.value)
}

/// Decode a nullable signed 64-bit stop-bit integer.
///
/// Non-negative wire values carry the +1 bias; `i64::MAX` therefore
/// arrives as the 65-bit wire value `2^63`, recognized via the carry
/// flag.
pub fn read_i64_nullable(cursor: &mut Cursor<'_>, sink: &mut dyn DiagnosticSink) -> Result<Option<i64>> {
	let at = cursor.pos();
	let raw = read_signed_raw(cursor)?;

	if raw.carry {
		if raw.value == i64::MIN {
			// Wire value 2^63: the biased encoding of i64::MAX.
			return Ok(Some(i64::MAX));
		}
		report_wrap(sink, at, "i64");
		return Ok(Some(unbias_signed(raw.value)));
	}

	if raw.value == 0 {
		return Ok(None);
	}
	Ok(Some(unbias_signed(raw.value)))
}

fn unbias_signed(value: i64) -> i64 {
	if value > 0 { value - 1 } else { value }
}

/// Decode a mandatory signed 32-bit stop-bit integer.
pub fn read_i32(cursor: &mut Cursor<'_>, sink: &mut dyn DiagnosticSink) -> Result<i32> {
	let at = cursor.pos();
	let raw = read_signed_raw(cursor)?;
	if raw.carry || i32::try_from(raw.value).is_err() {
		report_wrap(sink, at, "i32");
	}
	Ok(raw.value as i32)
}

/// Decode a nullable signed 32-bit stop-bit integer.
pub fn read_i32_nullable(cursor: &mut Cursor<'_>, sink: &mut dyn DiagnosticSink) -> Result<Option<i32>> {
	let at = cursor.pos();
	let raw = read_signed_raw(cursor)?;
	if raw.value == 0 && !raw.carry {
		return Ok(None);
	}

	let unbiased = unbias_signed(raw.value);
	if raw.carry || i32::try_from(unbiased).is_err() {
		report_wrap(sink, at, "i32");
	}
	Ok(Some(unbiased as i32))
}

/// Decode a stop-bit terminated ASCII run.
///
/// A single `0x80` byte is the empty string; the two-byte sequence
/// `0x00 0x80` is null in a nullable context and a `D9` dynamic error
/// otherwise; any other run whose first byte has zero payload bits is
/// malformed (`D9`).
pub fn read_ascii(cursor: &mut Cursor<'_>, nullable: bool) -> Result<Option<ByteView>> {
	let at = cursor.pos();
	let len = cursor.entity_length()?;
	let first = cursor.peek()?;

	if len == 1 && first == 0x80 {
		cursor.advance(1)?;
		return Ok(Some(ByteView::empty()));
	}

	if first & 0x7F == 0 {
		if len == 2 && cursor.peek_at(1)? == 0x80 {
			cursor.advance(2)?;
			if nullable {
				return Ok(None);
			}
			return Err(FastError::AsciiNullFraming { at });
		}
		return Err(FastError::AsciiNullFraming { at });
	}

	let raw = cursor.take_exact(len)?;
	let mut out = raw.to_vec();
	// The stop bit overlays the final character.
	out[len - 1] &= 0x7F;
	Ok(Some(ByteView::Owned(out)))
}

/// Decode a length-prefixed byte vector (Unicode or raw bytes).
///
/// The unsigned length prefix is nullable in a nullable context; the
/// payload itself carries no in-band terminator.
pub fn read_byte_vector(
	cursor: &mut Cursor<'_>,
	nullable: bool,
	max_len: usize,
	sink: &mut dyn DiagnosticSink,
) -> Result<Option<ByteView>> {
	let len = if nullable {
		match read_u32_nullable(cursor, sink)? {
			Some(len) => len as usize,
			None => return Ok(None),
		}
	} else {
		read_u32(cursor, sink)? as usize
	};

	if len > max_len {
		return Err(FastError::ByteVectorTooLarge { len, max: max_len });
	}

	let offset = cursor.pos();
	cursor.advance(len)?;
	Ok(Some(ByteView::Borrowed { offset, len }))
}
