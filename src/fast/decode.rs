use crate::fast::bytes::Cursor;
use crate::fast::diag::DiagnosticSink;
use crate::fast::dict::Dictionary;
use crate::fast::instr::{FieldInstruction, FieldKind, TemplateRegistry};
use crate::fast::op;
use crate::fast::pmap::PresenceMap;
use crate::fast::scalar;
use crate::fast::value::{FieldValue, Value};
use crate::fast::{FastError, Result};

/// Runtime limits for one decode session.
#[derive(Debug, Clone)]
pub struct DecodeLimits {
	/// Maximum decoded sequence length.
	pub max_sequence_len: u32,
	/// Maximum byte-vector payload length.
	pub max_bytes_len: usize,
	/// Maximum nested template-reference depth.
	pub max_ref_depth: u32,
}

impl Default for DecodeLimits {
	fn default() -> Self {
		Self {
			max_sequence_len: 4096,
			max_bytes_len: 1 << 20,
			max_ref_depth: 16,
		}
	}
}

/// One fully decoded message.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
	/// Template id the message was decoded under.
	pub template_id: u32,
	/// Template name the message was decoded under.
	pub template_name: Box<str>,
	/// Root fields in declaration order.
	pub fields: Vec<FieldValue>,
	/// Bytes of input the message consumed.
	pub wire_len: usize,
}

impl DecodedMessage {
	/// Find a root field by name.
	pub fn field(&self, name: &str) -> Option<&FieldValue> {
		self.fields.iter().find(|field| field.name.as_ref() == name)
	}
}

/// Message decoder bound to one registry, dictionary, and sink.
///
/// The registry is shared read-only; the dictionary and sink are the
/// per-session mutable state. The decoder also tracks the template in
/// effect, so messages that omit a template id inherit the previous
/// one.
pub struct Decoder<'a> {
	registry: &'a TemplateRegistry,
	dictionary: &'a mut Dictionary,
	sink: &'a mut dyn DiagnosticSink,
	limits: DecodeLimits,
	current: Option<u32>,
}

impl<'a> Decoder<'a> {
	/// Decoder with default limits.
	pub fn new(registry: &'a TemplateRegistry, dictionary: &'a mut Dictionary, sink: &'a mut dyn DiagnosticSink) -> Self {
		Self {
			registry,
			dictionary,
			sink,
			limits: DecodeLimits::default(),
			current: None,
		}
	}

	/// Replace the decode limits.
	pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
		self.limits = limits;
		self
	}

	/// Decode the message at the start of `bytes`.
	///
	/// Borrowed string and byte views in the result index into `bytes`.
	pub fn decode_message(&mut self, bytes: &[u8]) -> Result<DecodedMessage> {
		self.decode_at(bytes, 0)
	}

	/// Iterate every message in `bytes`, front to back.
	pub fn decode_stream<'d, 'buf>(&'d mut self, bytes: &'buf [u8]) -> MessageIter<'d, 'a, 'buf> {
		MessageIter {
			decoder: self,
			bytes,
			offset: 0,
			done: false,
		}
	}

	fn decode_at(&mut self, bytes: &[u8], start: usize) -> Result<DecodedMessage> {
		let mut cursor = Cursor::new(bytes);
		cursor.advance(start)?;
		let begin = cursor.pos();

		let (template_id, template_name, fields) = self.decode_message_at(&mut cursor, 0)?;
		Ok(DecodedMessage {
			template_id,
			template_name,
			fields,
			wire_len: cursor.pos() - begin,
		})
	}

	/// Decode one message segment: stream presence map, template id,
	/// then the template's root fields against the same map.
	fn decode_message_at(&mut self, cursor: &mut Cursor<'_>, depth: u32) -> Result<(u32, Box<str>, Vec<FieldValue>)> {
		if depth > self.limits.max_ref_depth {
			return Err(FastError::RefDepthExceeded {
				max: self.limits.max_ref_depth,
			});
		}

		let mut pmap = PresenceMap::load(cursor)?;
		let template_id = if pmap.next_bit(cursor)? {
			scalar::read_u32(cursor, self.sink)?
		} else {
			self.current.ok_or(FastError::NoCurrentTemplate)?
		};

		let registry = self.registry;
		let template = registry.get(template_id).ok_or(FastError::UnknownTemplateId { id: template_id })?;
		self.current = Some(template_id);
		if template.reset {
			self.dictionary.reset();
		}

		let fields = self.decode_fields(cursor, &template.root, &mut pmap, depth)?;
		Ok((template_id, template.name.clone(), fields))
	}

	fn decode_fields(
		&mut self,
		cursor: &mut Cursor<'_>,
		instrs: &[FieldInstruction],
		pmap: &mut PresenceMap,
		depth: u32,
	) -> Result<Vec<FieldValue>> {
		let mut out = Vec::with_capacity(instrs.len());
		for instr in instrs {
			let value = self.decode_field(cursor, instr, pmap, depth)?;
			out.push(FieldValue {
				id: instr.id,
				name: instr.name.clone(),
				value,
			});
		}
		Ok(out)
	}

	fn decode_field(
		&mut self,
		cursor: &mut Cursor<'_>,
		instr: &FieldInstruction,
		pmap: &mut PresenceMap,
		depth: u32,
	) -> Result<Option<Value>> {
		match &instr.kind {
			FieldKind::Group { children, pmap_bits } => {
				if instr.presence.is_optional() && !pmap.next_bit(cursor)? {
					return Ok(None);
				}
				let fields = self.decode_segment(cursor, children, *pmap_bits, depth)?;
				Ok(Some(Value::Group(fields)))
			}
			FieldKind::Sequence { length, children, pmap_bits } => {
				let length_value = op::decode_value(length, cursor, pmap, self.dictionary, self.sink, &self.limits)?;
				let Some(length_value) = length_value else {
					return Ok(None);
				};
				let len = match length_value {
					Value::UInt32(len) => len,
					other => {
						return Err(FastError::PreviousValueTypeMismatch {
							field: length.name.clone(),
							expected: "uint32",
							got: other.kind_name(),
						});
					}
				};
				if len > self.limits.max_sequence_len {
					return Err(FastError::SequenceTooLong {
						len,
						max: self.limits.max_sequence_len,
					});
				}

				let mut elements = Vec::with_capacity(len as usize);
				for _ in 0..len {
					elements.push(self.decode_segment(cursor, children, *pmap_bits, depth)?);
				}
				Ok(Some(Value::Sequence(elements)))
			}
			FieldKind::TemplateRef { name: Some(name) } => {
				if depth >= self.limits.max_ref_depth {
					return Err(FastError::RefDepthExceeded {
						max: self.limits.max_ref_depth,
					});
				}
				let registry = self.registry;
				let template = registry
					.get_by_name(name)
					.ok_or_else(|| FastError::UnknownTemplateName { name: name.clone() })?;
				let fields = self.decode_segment(cursor, &template.root, template.pmap_bits, depth + 1)?;
				Ok(Some(Value::Group(fields)))
			}
			FieldKind::TemplateRef { name: None } => {
				// Dynamic reference: a nested message with its own
				// presence map and template id.
				let (_, _, fields) = self.decode_message_at(cursor, depth + 1)?;
				Ok(Some(Value::Group(fields)))
			}
			_ => op::decode_value(instr, cursor, pmap, self.dictionary, self.sink, &self.limits),
		}
	}

	/// Decode a pmap-bearing segment: groups, sequence elements, and
	/// statically referenced templates each load their own presence map
	/// when their fields declare bits, and none otherwise.
	fn decode_segment(
		&mut self,
		cursor: &mut Cursor<'_>,
		children: &[FieldInstruction],
		pmap_bits: u32,
		depth: u32,
	) -> Result<Vec<FieldValue>> {
		let mut pmap = if pmap_bits > 0 {
			PresenceMap::load(cursor)?
		} else {
			PresenceMap::empty()
		};
		self.decode_fields(cursor, children, &mut pmap, depth)
	}
}

/// Iterator over the messages of one buffer; fuses after an error.
pub struct MessageIter<'d, 'a, 'buf> {
	decoder: &'d mut Decoder<'a>,
	bytes: &'buf [u8],
	offset: usize,
	done: bool,
}

impl Iterator for MessageIter<'_, '_, '_> {
	type Item = Result<DecodedMessage>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}
		if self.offset >= self.bytes.len() {
			self.done = true;
			return None;
		}

		match self.decoder.decode_at(self.bytes, self.offset) {
			Ok(message) => {
				self.offset += message.wire_len;
				Some(Ok(message))
			}
			Err(err) => {
				self.done = true;
				Some(Err(err))
			}
		}
	}
}

#[cfg(test)]
mod tests;
