use crate::fast::bytes::Cursor;
use crate::fast::decode::DecodeLimits;
use crate::fast::diag::{DiagnosticSink, Reportable};
use crate::fast::dict::{DictEntry, Dictionary};
use crate::fast::instr::{FieldInstruction, FieldKind, Operator};
use crate::fast::pmap::PresenceMap;
use crate::fast::scalar;
use crate::fast::value::{ByteView, DecimalValue, Value};
use crate::fast::{FastError, Result};

/// Native width a leaf integer field decodes at.
#[derive(Debug, Clone, Copy)]
enum IntWidth {
	I32,
	U32,
	I64,
	U64,
}

/// Wire framing of a text-like field.
#[derive(Debug, Clone, Copy)]
enum TextMode {
	/// Stop-bit terminated ASCII run.
	Stop,
	/// Length-prefixed payload (Unicode text or raw bytes).
	Prefixed,
}

/// Decode one leaf field under its operator.
///
/// Reads the field's presence bit (when its operator takes one),
/// consumes stream bytes as the operator dictates, and leaves the
/// dictionary slot in the state the next message must observe.
/// Aggregate kinds are walked by the caller, never passed here.
pub(crate) fn decode_value(
	instr: &FieldInstruction,
	cursor: &mut Cursor<'_>,
	pmap: &mut PresenceMap,
	dict: &mut Dictionary,
	sink: &mut dyn DiagnosticSink,
	limits: &DecodeLimits,
) -> Result<Option<Value>> {
	let value = match &instr.kind {
		FieldKind::Int32 => decode_int_field(instr, IntWidth::I32, cursor, pmap, dict, sink)?,
		FieldKind::UInt32 | FieldKind::Enum { .. } => decode_int_field(instr, IntWidth::U32, cursor, pmap, dict, sink)?,
		FieldKind::Int64 => decode_int_field(instr, IntWidth::I64, cursor, pmap, dict, sink)?,
		FieldKind::UInt64 => decode_int_field(instr, IntWidth::U64, cursor, pmap, dict, sink)?,
		FieldKind::Decimal { mantissa: None } => decode_decimal_field(instr, cursor, pmap, dict, sink)?,
		FieldKind::Decimal { mantissa: Some(mantissa) } => decode_split_decimal(instr, mantissa, cursor, pmap, dict, sink)?,
		FieldKind::Ascii => decode_text_field(instr, TextMode::Stop, cursor, pmap, dict, sink, limits)?,
		FieldKind::Unicode | FieldKind::Bytes => decode_text_field(instr, TextMode::Prefixed, cursor, pmap, dict, sink, limits)?,
		FieldKind::Group { .. } | FieldKind::Sequence { .. } | FieldKind::TemplateRef { .. } => {
			return Err(FastError::OperatorTypeMismatch {
				field: instr.name.clone(),
				operator: instr.operator.name(),
				kind: instr.kind.tag(),
			});
		}
	};

	if let (FieldKind::Enum { labels }, Some(Value::UInt32(index))) = (&instr.kind, &value)
		&& *index as usize >= labels.len()
	{
		sink.report(Reportable {
			code: "R2",
			field: instr.name.clone(),
			detail: format!("enum index {index} outside label table of {}", labels.len()),
		});
	}

	Ok(value)
}

fn decode_int_field(
	instr: &FieldInstruction,
	width: IntWidth,
	cursor: &mut Cursor<'_>,
	pmap: &mut PresenceMap,
	dict: &mut Dictionary,
	sink: &mut dyn DiagnosticSink,
) -> Result<Option<Value>> {
	let nullable = instr.presence.is_optional();

	match instr.operator {
		Operator::None => read_int(width, cursor, nullable, sink),
		Operator::Constant => decode_constant(instr, cursor, pmap, dict),
		Operator::Copy => {
			let slot = instr.slot_index()?;
			if pmap.next_bit(cursor)? {
				match read_int(width, cursor, nullable, sink)? {
					Some(value) => {
						dict.assign(slot, value.clone());
						Ok(Some(value))
					}
					None => {
						dict.set_empty(slot);
						Ok(None)
					}
				}
			} else {
				match dict.get(slot).clone() {
					DictEntry::Undefined => decode_from_initial(instr, slot, dict),
					DictEntry::Empty => {
						if nullable {
							Ok(None)
						} else {
							Err(FastError::MandatoryEmptyPrevious { field: instr.name.clone() })
						}
					}
					DictEntry::Assigned(value) => Ok(Some(value)),
				}
			}
		}
		Operator::Increment => {
			let slot = instr.slot_index()?;
			if pmap.next_bit(cursor)? {
				match read_int(width, cursor, nullable, sink)? {
					Some(value) => {
						dict.assign(slot, value.clone());
						Ok(Some(value))
					}
					None => {
						dict.set_empty(slot);
						Ok(None)
					}
				}
			} else {
				match dict.get(slot).clone() {
					DictEntry::Undefined => decode_from_initial(instr, slot, dict),
					DictEntry::Empty => {
						if nullable {
							Ok(None)
						} else {
							Err(FastError::MandatoryEmptyPrevious { field: instr.name.clone() })
						}
					}
					DictEntry::Assigned(previous) => {
						// The incremented value becomes the new previous
						// value before it is returned.
						let value = increment_value(instr, &previous)?;
						dict.assign(slot, value.clone());
						Ok(Some(value))
					}
				}
			}
		}
		Operator::Default => {
			let slot = instr.slot_index()?;
			if pmap.next_bit(cursor)? {
				match read_int(width, cursor, nullable, sink)? {
					Some(value) => {
						dict.assign(slot, value.clone());
						Ok(Some(value))
					}
					// A stream null leaves the dictionary unchanged.
					None => Ok(None),
				}
			} else {
				match &instr.initial {
					Some(init) => {
						dict.assign(slot, init.clone());
						Ok(Some(init.clone()))
					}
					None => {
						if nullable {
							Ok(None)
						} else {
							Err(FastError::MandatoryWithoutInitial { field: instr.name.clone() })
						}
					}
				}
			}
		}
		Operator::Delta => {
			let slot = instr.slot_index()?;
			let delta = if nullable {
				scalar::read_i64_nullable(cursor, sink)?
			} else {
				Some(scalar::read_i64(cursor, sink)?)
			};
			let Some(delta) = delta else {
				return Ok(None);
			};

			let base = match dict.get(slot).clone() {
				DictEntry::Assigned(value) => value,
				DictEntry::Undefined => instr.initial.clone().unwrap_or_else(|| zero_value(width)),
				DictEntry::Empty => return Err(FastError::DeltaEmptyPrevious { field: instr.name.clone() }),
			};
			let value = apply_int_delta(instr, width, &base, delta, sink)?;
			dict.assign(slot, value.clone());
			Ok(Some(value))
		}
		Operator::Tail => Err(FastError::OperatorTypeMismatch {
			field: instr.name.clone(),
			operator: instr.operator.name(),
			kind: instr.kind.tag(),
		}),
	}
}

fn decode_decimal_field(
	instr: &FieldInstruction,
	cursor: &mut Cursor<'_>,
	pmap: &mut PresenceMap,
	dict: &mut Dictionary,
	sink: &mut dyn DiagnosticSink,
) -> Result<Option<Value>> {
	let nullable = instr.presence.is_optional();

	match instr.operator {
		Operator::None => Ok(read_decimal(cursor, nullable, sink)?.map(Value::Decimal)),
		Operator::Constant => decode_constant(instr, cursor, pmap, dict),
		Operator::Copy | Operator::Default => {
			let slot = instr.slot_index()?;
			if pmap.next_bit(cursor)? {
				match read_decimal(cursor, nullable, sink)? {
					Some(value) => {
						let value = Value::Decimal(value);
						dict.assign(slot, value.clone());
						Ok(Some(value))
					}
					None => {
						if instr.operator == Operator::Copy {
							dict.set_empty(slot);
						}
						Ok(None)
					}
				}
			} else if instr.operator == Operator::Default {
				match &instr.initial {
					Some(init) => {
						dict.assign(slot, init.clone());
						Ok(Some(init.clone()))
					}
					None => {
						if nullable {
							Ok(None)
						} else {
							Err(FastError::MandatoryWithoutInitial { field: instr.name.clone() })
						}
					}
				}
			} else {
				match dict.get(slot).clone() {
					DictEntry::Undefined => decode_from_initial(instr, slot, dict),
					DictEntry::Empty => {
						if nullable {
							Ok(None)
						} else {
							Err(FastError::MandatoryEmptyPrevious { field: instr.name.clone() })
						}
					}
					DictEntry::Assigned(value) => Ok(Some(value)),
				}
			}
		}
		Operator::Delta => {
			let slot = instr.slot_index()?;
			let exponent_delta = if nullable {
				scalar::read_i64_nullable(cursor, sink)?
			} else {
				Some(scalar::read_i64(cursor, sink)?)
			};
			let Some(exponent_delta) = exponent_delta else {
				return Ok(None);
			};
			let mantissa_delta = scalar::read_i64(cursor, sink)?;

			let base = match dict.get(slot).clone() {
				DictEntry::Assigned(Value::Decimal(value)) => value,
				DictEntry::Assigned(other) => {
					return Err(prev_mismatch(instr, "decimal", other.kind_name()));
				}
				DictEntry::Undefined => match &instr.initial {
					Some(Value::Decimal(value)) => *value,
					Some(other) => return Err(prev_mismatch(instr, "decimal", other.kind_name())),
					None => DecimalValue { mantissa: 0, exponent: 0 },
				},
				DictEntry::Empty => return Err(FastError::DeltaEmptyPrevious { field: instr.name.clone() }),
			};

			let exponent = apply_delta_i32(instr, base.exponent, exponent_delta, sink);
			if !(-63..=63).contains(&exponent) {
				sink.report(Reportable {
					code: "R1",
					field: instr.name.clone(),
					detail: format!("decimal exponent {exponent} outside [-63, 63]"),
				});
			}
			let mantissa = apply_delta_i64(instr, base.mantissa, mantissa_delta, sink);

			let value = Value::Decimal(DecimalValue { mantissa, exponent });
			dict.assign(slot, value.clone());
			Ok(Some(value))
		}
		Operator::Increment | Operator::Tail => Err(FastError::OperatorTypeMismatch {
			field: instr.name.clone(),
			operator: instr.operator.name(),
			kind: instr.kind.tag(),
		}),
	}
}

/// Two-step decode of a decimal whose mantissa carries its own operator.
///
/// The outer instruction's operator, slot, and initial value govern the
/// exponent; an absent exponent makes the whole field absent and skips
/// the mantissa entirely.
fn decode_split_decimal(
	instr: &FieldInstruction,
	mantissa: &FieldInstruction,
	cursor: &mut Cursor<'_>,
	pmap: &mut PresenceMap,
	dict: &mut Dictionary,
	sink: &mut dyn DiagnosticSink,
) -> Result<Option<Value>> {
	let Some(exponent) = decode_int_field(instr, IntWidth::I32, cursor, pmap, dict, sink)? else {
		return Ok(None);
	};
	let exponent = match exponent {
		Value::Int32(value) => value,
		other => return Err(prev_mismatch(instr, "int32", other.kind_name())),
	};

	let mantissa_value = decode_int_field(mantissa, IntWidth::I64, cursor, pmap, dict, sink)?;
	let Some(Value::Int64(mantissa)) = mantissa_value else {
		return Err(prev_mismatch(mantissa, "int64", "absent"));
	};

	Ok(Some(Value::Decimal(DecimalValue { mantissa, exponent })))
}

fn decode_text_field(
	instr: &FieldInstruction,
	mode: TextMode,
	cursor: &mut Cursor<'_>,
	pmap: &mut PresenceMap,
	dict: &mut Dictionary,
	sink: &mut dyn DiagnosticSink,
	limits: &DecodeLimits,
) -> Result<Option<Value>> {
	let nullable = instr.presence.is_optional();

	match instr.operator {
		Operator::None => Ok(read_text(mode, cursor, nullable, limits, sink)?.map(|view| wrap_text(instr, view))),
		Operator::Constant => decode_constant(instr, cursor, pmap, dict),
		Operator::Copy | Operator::Default => {
			let slot = instr.slot_index()?;
			if pmap.next_bit(cursor)? {
				match read_text(mode, cursor, nullable, limits, sink)? {
					Some(view) => {
						let value = wrap_text(instr, view);
						dict.assign(slot, value.clone().into_owned(cursor.buffer()));
						Ok(Some(value))
					}
					None => {
						if instr.operator == Operator::Copy {
							dict.set_empty(slot);
						}
						Ok(None)
					}
				}
			} else if instr.operator == Operator::Default {
				match &instr.initial {
					Some(init) => {
						dict.assign(slot, init.clone());
						Ok(Some(init.clone()))
					}
					None => {
						if nullable {
							Ok(None)
						} else {
							Err(FastError::MandatoryWithoutInitial { field: instr.name.clone() })
						}
					}
				}
			} else {
				match dict.get(slot).clone() {
					DictEntry::Undefined => decode_from_initial(instr, slot, dict),
					DictEntry::Empty => {
						if nullable {
							Ok(None)
						} else {
							Err(FastError::MandatoryEmptyPrevious { field: instr.name.clone() })
						}
					}
					DictEntry::Assigned(value) => Ok(Some(value)),
				}
			}
		}
		Operator::Delta => {
			let slot = instr.slot_index()?;
			let subtraction = if nullable {
				scalar::read_i64_nullable(cursor, sink)?
			} else {
				Some(scalar::read_i64(cursor, sink)?)
			};
			let Some(subtraction) = subtraction else {
				return Ok(None);
			};

			let base = match dict.get(slot).clone() {
				DictEntry::Assigned(value) => text_payload(instr, &value, cursor.buffer())?,
				DictEntry::Undefined => match &instr.initial {
					Some(init) => text_payload(instr, init, cursor.buffer())?,
					None => Vec::new(),
				},
				DictEntry::Empty => return Err(FastError::DeltaEmptyPrevious { field: instr.name.clone() }),
			};

			let literal = match read_text(mode, cursor, false, limits, sink)? {
				Some(view) => view.resolve(cursor.buffer()).to_vec(),
				None => Vec::new(),
			};
			let spliced = splice_delta(instr, &base, subtraction, &literal)?;

			let value = wrap_text(instr, ByteView::Owned(spliced));
			dict.assign(slot, value.clone());
			Ok(Some(value))
		}
		Operator::Tail => {
			let slot = instr.slot_index()?;
			if pmap.next_bit(cursor)? {
				match read_text(mode, cursor, nullable, limits, sink)? {
					None => {
						dict.set_empty(slot);
						Ok(None)
					}
					Some(view) => {
						let tail = view.resolve(cursor.buffer()).to_vec();
						let base = match dict.get(slot).clone() {
							DictEntry::Assigned(value) => text_payload(instr, &value, cursor.buffer())?,
							DictEntry::Undefined => match &instr.initial {
								Some(init) => text_payload(instr, init, cursor.buffer())?,
								None => Vec::new(),
							},
							DictEntry::Empty => Vec::new(),
						};

						// The tail replaces the last min(tail_len, base_len)
						// characters of the base.
						let keep = base.len() - base.len().min(tail.len());
						let mut out = Vec::with_capacity(keep + tail.len());
						out.extend_from_slice(&base[..keep]);
						out.extend_from_slice(&tail);

						let value = wrap_text(instr, ByteView::Owned(out));
						dict.assign(slot, value.clone());
						Ok(Some(value))
					}
				}
			} else {
				match dict.get(slot).clone() {
					DictEntry::Undefined => match &instr.initial {
						Some(init) => {
							dict.assign(slot, init.clone());
							Ok(Some(init.clone()))
						}
						None => {
							if nullable {
								Ok(None)
							} else {
								Err(FastError::TailWithoutInitial { field: instr.name.clone() })
							}
						}
					},
					DictEntry::Empty => {
						if nullable {
							Ok(None)
						} else {
							Err(FastError::TailEmptyPrevious { field: instr.name.clone() })
						}
					}
					// Reused previous value: no stream read, no dictionary write.
					DictEntry::Assigned(value) => Ok(Some(value)),
				}
			}
		}
		Operator::Increment => Err(FastError::OperatorTypeMismatch {
			field: instr.name.clone(),
			operator: instr.operator.name(),
			kind: instr.kind.tag(),
		}),
	}
}

/// Shared constant-operator policy: mandatory fields never touch the
/// stream or the presence map; optional fields burn one presence bit.
fn decode_constant(
	instr: &FieldInstruction,
	cursor: &mut Cursor<'_>,
	pmap: &mut PresenceMap,
	dict: &mut Dictionary,
) -> Result<Option<Value>> {
	if !instr.presence.is_optional() {
		return Ok(instr.initial.clone());
	}

	let slot = instr.slot_index()?;
	if pmap.next_bit(cursor)? {
		let value = instr.initial.clone();
		if let Some(value) = &value {
			dict.assign(slot, value.clone());
		}
		Ok(value)
	} else {
		dict.set_empty(slot);
		Ok(None)
	}
}

/// Undefined-dictionary fallback shared by copy and increment: the
/// initial value becomes both the field value and the new previous
/// value, and its absence is `D5` for a mandatory field.
fn decode_from_initial(instr: &FieldInstruction, slot: u32, dict: &mut Dictionary) -> Result<Option<Value>> {
	match &instr.initial {
		Some(init) => {
			dict.assign(slot, init.clone());
			Ok(Some(init.clone()))
		}
		None => {
			if instr.presence.is_optional() {
				dict.set_empty(slot);
				Ok(None)
			} else {
				Err(FastError::MandatoryWithoutInitial { field: instr.name.clone() })
			}
		}
	}
}

fn read_int(width: IntWidth, cursor: &mut Cursor<'_>, nullable: bool, sink: &mut dyn DiagnosticSink) -> Result<Option<Value>> {
	Ok(match width {
		IntWidth::I32 => {
			if nullable {
				scalar::read_i32_nullable(cursor, sink)?.map(Value::Int32)
			} else {
				Some(Value::Int32(scalar::read_i32(cursor, sink)?))
			}
		}
		IntWidth::U32 => {
			if nullable {
				scalar::read_u32_nullable(cursor, sink)?.map(Value::UInt32)
			} else {
				Some(Value::UInt32(scalar::read_u32(cursor, sink)?))
			}
		}
		IntWidth::I64 => {
			if nullable {
				scalar::read_i64_nullable(cursor, sink)?.map(Value::Int64)
			} else {
				Some(Value::Int64(scalar::read_i64(cursor, sink)?))
			}
		}
		IntWidth::U64 => {
			if nullable {
				scalar::read_u64_nullable(cursor, sink)?.map(Value::UInt64)
			} else {
				Some(Value::UInt64(scalar::read_u64(cursor, sink)?))
			}
		}
	})
}

fn read_decimal(cursor: &mut Cursor<'_>, nullable: bool, sink: &mut dyn DiagnosticSink) -> Result<Option<DecimalValue>> {
	let exponent = if nullable {
		scalar::read_i32_nullable(cursor, sink)?
	} else {
		Some(scalar::read_i32(cursor, sink)?)
	};
	let Some(exponent) = exponent else {
		return Ok(None);
	};

	let mantissa = scalar::read_i64(cursor, sink)?;
	Ok(Some(DecimalValue { mantissa, exponent }))
}

fn read_text(
	mode: TextMode,
	cursor: &mut Cursor<'_>,
	nullable: bool,
	limits: &DecodeLimits,
	sink: &mut dyn DiagnosticSink,
) -> Result<Option<ByteView>> {
	match mode {
		TextMode::Stop => scalar::read_ascii(cursor, nullable),
		TextMode::Prefixed => scalar::read_byte_vector(cursor, nullable, limits.max_bytes_len, sink),
	}
}

fn wrap_text(instr: &FieldInstruction, view: ByteView) -> Value {
	match instr.kind {
		FieldKind::Bytes => Value::Bytes(view),
		_ => Value::Str(view),
	}
}

fn text_payload(instr: &FieldInstruction, value: &Value, buf: &[u8]) -> Result<Vec<u8>> {
	match value {
		Value::Str(view) | Value::Bytes(view) => Ok(view.resolve(buf).to_vec()),
		other => Err(prev_mismatch(instr, "string or bytes", other.kind_name())),
	}
}

fn zero_value(width: IntWidth) -> Value {
	match width {
		IntWidth::I32 => Value::Int32(0),
		IntWidth::U32 => Value::UInt32(0),
		IntWidth::I64 => Value::Int64(0),
		IntWidth::U64 => Value::UInt64(0),
	}
}

fn increment_value(instr: &FieldInstruction, value: &Value) -> Result<Value> {
	match value {
		Value::Int32(v) => Ok(Value::Int32(v.wrapping_add(1))),
		Value::UInt32(v) => Ok(Value::UInt32(v.wrapping_add(1))),
		Value::Int64(v) => Ok(Value::Int64(v.wrapping_add(1))),
		Value::UInt64(v) => Ok(Value::UInt64(v.wrapping_add(1))),
		other => Err(prev_mismatch(instr, "integer", other.kind_name())),
	}
}

/// Add a signed delta to the base value at the field's native width.
///
/// Overflow against the native width is reportable, not fatal: the
/// wrapped result is kept and decoding continues.
fn apply_int_delta(
	instr: &FieldInstruction,
	width: IntWidth,
	base: &Value,
	delta: i64,
	sink: &mut dyn DiagnosticSink,
) -> Result<Value> {
	match (width, base) {
		(IntWidth::I32, Value::Int32(base)) => {
			let wide = i64::from(*base).checked_add(delta);
			let value = match wide.map(i32::try_from) {
				Some(Ok(value)) => value,
				_ => {
					report_overflow(instr, sink, "i32");
					i64::from(*base).wrapping_add(delta) as i32
				}
			};
			Ok(Value::Int32(value))
		}
		(IntWidth::U32, Value::UInt32(base)) => {
			let wide = i64::from(*base).checked_add(delta);
			let value = match wide.map(u32::try_from) {
				Some(Ok(value)) => value,
				_ => {
					report_overflow(instr, sink, "u32");
					i64::from(*base).wrapping_add(delta) as u32
				}
			};
			Ok(Value::UInt32(value))
		}
		(IntWidth::I64, Value::Int64(base)) => {
			let value = match base.checked_add(delta) {
				Some(value) => value,
				None => {
					report_overflow(instr, sink, "i64");
					base.wrapping_add(delta)
				}
			};
			Ok(Value::Int64(value))
		}
		(IntWidth::U64, Value::UInt64(base)) => {
			let checked = if delta >= 0 {
				base.checked_add(delta as u64)
			} else {
				base.checked_sub(delta.unsigned_abs())
			};
			let value = match checked {
				Some(value) => value,
				None => {
					report_overflow(instr, sink, "u64");
					base.wrapping_add(delta as u64)
				}
			};
			Ok(Value::UInt64(value))
		}
		(_, other) => Err(prev_mismatch(instr, "matching integer", other.kind_name())),
	}
}

fn apply_delta_i32(instr: &FieldInstruction, base: i32, delta: i64, sink: &mut dyn DiagnosticSink) -> i32 {
	match i64::from(base).checked_add(delta).map(i32::try_from) {
		Some(Ok(value)) => value,
		_ => {
			report_overflow(instr, sink, "i32");
			i64::from(base).wrapping_add(delta) as i32
		}
	}
}

fn apply_delta_i64(instr: &FieldInstruction, base: i64, delta: i64, sink: &mut dyn DiagnosticSink) -> i64 {
	match base.checked_add(delta) {
		Some(value) => value,
		None => {
			report_overflow(instr, sink, "i64");
			base.wrapping_add(delta)
		}
	}
}

fn splice_delta(instr: &FieldInstruction, base: &[u8], subtraction: i64, literal: &[u8]) -> Result<Vec<u8>> {
	if subtraction >= 0 {
		let cut = subtraction as u64;
		if cut > base.len() as u64 {
			return Err(FastError::DeltaSubtractionTooLarge {
				field: instr.name.clone(),
				subtraction: cut,
				base_len: base.len(),
			});
		}

		let keep = base.len() - cut as usize;
		let mut out = Vec::with_capacity(keep + literal.len());
		out.extend_from_slice(&base[..keep]);
		out.extend_from_slice(literal);
		Ok(out)
	} else {
		// A negative length measures from the front, biased by one so
		// that -1 means "remove nothing, prepend".
		let cut = (-(subtraction + 1)) as u64;
		if cut > base.len() as u64 {
			return Err(FastError::DeltaSubtractionTooLarge {
				field: instr.name.clone(),
				subtraction: cut,
				base_len: base.len(),
			});
		}

		let mut out = Vec::with_capacity(literal.len() + base.len() - cut as usize);
		out.extend_from_slice(literal);
		out.extend_from_slice(&base[cut as usize..]);
		Ok(out)
	}
}

fn report_overflow(instr: &FieldInstruction, sink: &mut dyn DiagnosticSink, target: &'static str) {
	sink.report(Reportable {
		code: "R1",
		field: instr.name.clone(),
		detail: format!("delta result exceeds {target} range, value wrapped"),
	});
}

fn prev_mismatch(instr: &FieldInstruction, expected: &'static str, got: &'static str) -> FastError {
	FastError::PreviousValueTypeMismatch {
		field: instr.name.clone(),
		expected,
		got,
	}
}
