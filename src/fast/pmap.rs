use crate::fast::Result;
use crate::fast::bytes::Cursor;

/// Pmap bytes one register load can hold (63 logical bits).
const BYTES_PER_LOAD: usize = 9;

/// Reader over a stop-bit terminated presence map.
///
/// [`Self::load`] consumes the entire contiguous pmap run from the
/// cursor and packs the first register's worth of payload bits;
/// [`Self::next_bit`] yields bits oldest-first, refilling the register
/// from the remaining pmap bytes when it drains. Bits past the end of
/// the encoded map read as 0.
pub struct PresenceMap {
	bits: u64,
	mask: u64,
	rest_offset: usize,
	rest_len: usize,
}

impl PresenceMap {
	/// Map for a segment that declares zero pmap bits.
	///
	/// Never touches the cursor; every bit reads as 0.
	pub fn empty() -> Self {
		Self {
			bits: 0,
			mask: 0,
			rest_offset: 0,
			rest_len: 0,
		}
	}

	/// Read the presence map at the cursor.
	///
	/// The cursor advances past the whole stop-bit terminated run; up
	/// to [`BYTES_PER_LOAD`] bytes are packed immediately and the rest
	/// are kept as a byte range for later refills.
	pub fn load(cursor: &mut Cursor<'_>) -> Result<Self> {
		let len = cursor.entity_length()?;
		let start = cursor.pos();
		cursor.advance(len)?;

		let mut map = Self {
			bits: 0,
			mask: 0,
			rest_offset: start,
			rest_len: len,
		};
		map.refill(cursor.buffer());
		Ok(map)
	}

	/// Return `true` once every pmap byte has been packed.
	pub fn is_complete(&self) -> bool {
		self.rest_len == 0
	}

	/// Consume and return the next presence bit.
	pub fn next_bit(&mut self, cursor: &Cursor<'_>) -> Result<bool> {
		if self.mask == 0 {
			if self.rest_len == 0 {
				return Ok(false);
			}
			self.refill(cursor.buffer());
		}

		let set = self.bits & self.mask != 0;
		self.mask >>= 1;
		Ok(set)
	}

	fn refill(&mut self, buf: &[u8]) {
		let take = self.rest_len.min(BYTES_PER_LOAD);
		let mut bits = 0_u64;
		for byte in &buf[self.rest_offset..self.rest_offset + take] {
			bits = (bits << 7) | u64::from(byte & 0x7F);
		}
		self.rest_offset += take;
		self.rest_len -= take;

		self.bits = bits;
		self.mask = 1_u64 << (7 * take - 1);
	}
}
