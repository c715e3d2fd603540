use crate::fast::FastError;
use crate::fast::bytes::Cursor;

#[test]
fn take_and_peek_advance_independently() {
	let mut cursor = Cursor::new(&[0x10, 0x20, 0x30]);
	assert_eq!(cursor.peek().expect("peek"), 0x10);
	assert_eq!(cursor.pos(), 0);
	assert_eq!(cursor.take().expect("take"), 0x10);
	assert_eq!(cursor.pos(), 1);
	assert_eq!(cursor.peek_at(1).expect("peek_at"), 0x30);
	assert_eq!(cursor.remaining(), 2);
}

#[test]
fn take_past_end_underflows() {
	let mut cursor = Cursor::new(&[0x01]);
	cursor.take().expect("first byte");
	let err = cursor.take().expect_err("second byte must fail");
	assert!(matches!(err, FastError::BufferUnderflow { at: 1, need: 1, rem: 0 }));
}

#[test]
fn advance_checks_bounds() {
	let mut cursor = Cursor::new(&[0x01, 0x02, 0x03]);
	cursor.advance(2).expect("in range");
	assert_eq!(cursor.pos(), 2);
	assert!(cursor.advance(2).is_err());
	assert_eq!(cursor.pos(), 2, "failed advance must not move");
}

#[test]
fn take_exact_returns_subslice() {
	let mut cursor = Cursor::new(&[0xAA, 0xBB, 0xCC, 0xDD]);
	assert_eq!(cursor.take_exact(2).expect("two bytes"), &[0xAA, 0xBB]);
	assert_eq!(cursor.take_exact(2).expect("two more"), &[0xCC, 0xDD]);
	assert!(cursor.take_exact(1).is_err());
}

#[test]
fn entity_length_finds_stop_byte_without_consuming() {
	let cursor = Cursor::new(&[0x01, 0x02, 0x83, 0x04]);
	assert_eq!(cursor.entity_length().expect("stop byte present"), 3);
	assert_eq!(cursor.pos(), 0);
}

#[test]
fn entity_length_fails_without_stop_byte() {
	let cursor = Cursor::new(&[0x01, 0x02, 0x03]);
	let err = cursor.entity_length().expect_err("no stop byte");
	assert!(matches!(err, FastError::BufferUnderflow { at: 0, rem: 3, .. }));
}
