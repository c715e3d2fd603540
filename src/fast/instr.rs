use std::collections::HashMap;

use crate::fast::value::{ByteView, DecimalValue, Value};
use crate::fast::{FastError, Result};

/// Field presence attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
	/// Field always carries a value.
	Mandatory,
	/// Field may be absent; stream reads are nullable.
	Optional,
}

impl Presence {
	/// Return `true` for optional presence.
	pub fn is_optional(self) -> bool {
		matches!(self, Self::Optional)
	}
}

/// Field operator attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
	/// Value always appears in the stream.
	None,
	/// Value is the instruction's initial value.
	Constant,
	/// Value repeats the previous value unless the stream overrides it.
	Copy,
	/// Previous value plus one unless the stream overrides it.
	Increment,
	/// Initial value unless the stream overrides it.
	Default,
	/// Stream carries a difference against the previous value.
	Delta,
	/// Stream carries a replacement tail spliced onto the previous value.
	Tail,
}

impl Operator {
	/// Operator tag text, for diagnostics.
	pub fn name(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Constant => "constant",
			Self::Copy => "copy",
			Self::Increment => "increment",
			Self::Default => "default",
			Self::Delta => "delta",
			Self::Tail => "tail",
		}
	}

	/// Presence-map bits this operator consumes for a leaf field.
	pub fn pmap_size(self, presence: Presence) -> u32 {
		match self {
			Self::None | Self::Delta => 0,
			Self::Constant => u32::from(presence.is_optional()),
			Self::Copy | Self::Increment | Self::Default | Self::Tail => 1,
		}
	}

	/// Whether a leaf field under this operator owns a dictionary slot.
	pub fn uses_dictionary(self, presence: Presence) -> bool {
		match self {
			Self::None => false,
			Self::Constant => presence.is_optional(),
			Self::Copy | Self::Increment | Self::Default | Self::Delta | Self::Tail => true,
		}
	}
}

/// Type-and-children half of a compiled field instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
	/// Signed 32-bit integer.
	Int32,
	/// Unsigned 32-bit integer.
	UInt32,
	/// Signed 64-bit integer.
	Int64,
	/// Unsigned 64-bit integer.
	UInt64,
	/// Scaled decimal. The instruction's own operator and slot govern
	/// the exponent; a nested mantissa instruction, when present,
	/// carries its own operator and slot.
	Decimal {
		/// Independently operator-tagged mantissa sub-instruction.
		mantissa: Option<Box<FieldInstruction>>,
	},
	/// Stop-bit terminated ASCII text.
	Ascii,
	/// Length-prefixed UTF-8 text.
	Unicode,
	/// Length-prefixed raw bytes.
	Bytes,
	/// Nested group of fields.
	Group {
		/// Child instructions in declaration order.
		children: Vec<FieldInstruction>,
		/// Presence-map bits the group's own segment declares.
		pmap_bits: u32,
	},
	/// Repeated group of fields.
	Sequence {
		/// Length field: a uint32 instruction with its own operator.
		length: Box<FieldInstruction>,
		/// Child instructions of one element, in declaration order.
		children: Vec<FieldInstruction>,
		/// Presence-map bits one element segment declares.
		pmap_bits: u32,
	},
	/// Reference to another template.
	TemplateRef {
		/// Referenced template name; `None` means a dynamic reference
		/// resolved from the stream.
		name: Option<Box<str>>,
	},
	/// Named enumeration decoded as a uint32 index.
	Enum {
		/// Label table in declaration order.
		labels: Vec<Box<str>>,
	},
}

impl FieldKind {
	/// Type tag text, for diagnostics.
	pub fn tag(&self) -> &'static str {
		match self {
			Self::Int32 => "int32",
			Self::UInt32 => "uint32",
			Self::Int64 => "int64",
			Self::UInt64 => "uint64",
			Self::Decimal { .. } => "decimal",
			Self::Ascii => "ascii",
			Self::Unicode => "unicode",
			Self::Bytes => "bytes",
			Self::Group { .. } => "group",
			Self::Sequence { .. } => "sequence",
			Self::TemplateRef { .. } => "templateRef",
			Self::Enum { .. } => "enum",
		}
	}
}

/// One compiled, immutable schema node.
///
/// Trees are normally produced by [`TemplateRegistry::compile`]; every
/// field is public so an external schema loader can hand trees in
/// directly.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInstruction {
	/// Field id.
	pub id: u32,
	/// Field name, for diagnostics and decoded output.
	pub name: Box<str>,
	/// Schema namespace, diagnostic only.
	pub namespace: Option<Box<str>>,
	/// Presence attribute.
	pub presence: Presence,
	/// Operator attribute. For a decimal with a nested mantissa
	/// instruction this governs the exponent.
	pub operator: Operator,
	/// Parsed initial value, when the schema declared one.
	pub initial: Option<Value>,
	/// Dictionary slot index; `None` when the operator keeps no
	/// previous value.
	pub slot: Option<u32>,
	/// Type tag and children.
	pub kind: FieldKind,
}

impl FieldInstruction {
	/// Presence-map bits this field consumes in its enclosing segment.
	pub fn pmap_size(&self) -> u32 {
		match &self.kind {
			FieldKind::Group { .. } => u32::from(self.presence.is_optional()),
			FieldKind::Sequence { length, .. } => length.pmap_size(),
			FieldKind::TemplateRef { .. } => 0,
			FieldKind::Decimal { mantissa: Some(m) } => self.operator.pmap_size(self.presence) + m.pmap_size(),
			_ => self.operator.pmap_size(self.presence),
		}
	}

	/// Dictionary slot, or a typed failure when the tree is inconsistent.
	pub(crate) fn slot_index(&self) -> Result<u32> {
		self.slot.ok_or_else(|| FastError::MissingDictionarySlot {
			field: self.name.clone(),
			operator: self.operator.name(),
		})
	}

	/// Label text for a decoded enum index.
	pub fn enum_label(&self, index: u32) -> Option<&str> {
		match &self.kind {
			FieldKind::Enum { labels } => labels.get(index as usize).map(|l| l.as_ref()),
			_ => None,
		}
	}
}

/// Schema-supplied field description, before compilation.
#[derive(Debug, Clone)]
pub struct FieldDef {
	/// Field id.
	pub id: u32,
	/// Field name.
	pub name: String,
	/// Schema namespace, diagnostic only.
	pub namespace: Option<String>,
	/// Presence attribute.
	pub presence: Presence,
	/// Operator attribute.
	pub operator: Operator,
	/// Initial value literal, as the schema text supplies it.
	pub initial: Option<String>,
	/// Type tag and children.
	pub kind: FieldDefKind,
}

/// Type-and-children half of a [`FieldDef`].
#[derive(Debug, Clone)]
pub enum FieldDefKind {
	/// Signed 32-bit integer.
	Int32,
	/// Unsigned 32-bit integer.
	UInt32,
	/// Signed 64-bit integer.
	Int64,
	/// Unsigned 64-bit integer.
	UInt64,
	/// Scaled decimal, optionally with an independently tagged mantissa.
	Decimal {
		/// Mantissa sub-definition; must be an `Int64` leaf.
		mantissa: Option<Box<FieldDef>>,
	},
	/// Stop-bit terminated ASCII text.
	Ascii,
	/// Length-prefixed UTF-8 text.
	Unicode,
	/// Length-prefixed raw bytes.
	Bytes,
	/// Nested group.
	Group {
		/// Child definitions.
		children: Vec<FieldDef>,
	},
	/// Repeated group with an optional explicit length field.
	Sequence {
		/// Length definition; synthesized as a plain uint32 when absent.
		length: Option<Box<FieldDef>>,
		/// Child definitions of one element.
		children: Vec<FieldDef>,
	},
	/// Reference to another template; `None` name means dynamic.
	TemplateRef {
		/// Referenced template name.
		name: Option<String>,
	},
	/// Named enumeration.
	Enum {
		/// Label table.
		labels: Vec<String>,
	},
}

impl FieldDef {
	/// Mandatory field with no operator and no initial value.
	pub fn new(id: u32, name: &str, kind: FieldDefKind) -> Self {
		Self {
			id,
			name: name.to_owned(),
			namespace: None,
			presence: Presence::Mandatory,
			operator: Operator::None,
			initial: None,
			kind,
		}
	}

	/// Set the schema namespace.
	pub fn namespace(mut self, namespace: &str) -> Self {
		self.namespace = Some(namespace.to_owned());
		self
	}

	/// Set the operator.
	pub fn operator(mut self, operator: Operator) -> Self {
		self.operator = operator;
		self
	}

	/// Mark the field optional.
	pub fn optional(mut self) -> Self {
		self.presence = Presence::Optional;
		self
	}

	/// Set the initial-value literal.
	pub fn initial(mut self, text: &str) -> Self {
		self.initial = Some(text.to_owned());
		self
	}
}

/// Schema-supplied template description.
#[derive(Debug, Clone)]
pub struct TemplateDef {
	/// Template id.
	pub id: u32,
	/// Template name.
	pub name: String,
	/// Whether decoding a message of this template resets the dictionary.
	pub reset: bool,
	/// Root field definitions.
	pub fields: Vec<FieldDef>,
}

impl TemplateDef {
	/// Template without dictionary reset.
	pub fn new(id: u32, name: &str, fields: Vec<FieldDef>) -> Self {
		Self {
			id,
			name: name.to_owned(),
			reset: false,
			fields,
		}
	}

	/// Enable dictionary reset for this template.
	pub fn reset(mut self) -> Self {
		self.reset = true;
		self
	}
}

/// One compiled template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
	/// Template id.
	pub id: u32,
	/// Template name.
	pub name: Box<str>,
	/// Whether messages of this template reset the dictionary first.
	pub reset: bool,
	/// Root instructions in declaration order.
	pub root: Vec<FieldInstruction>,
	/// Presence-map bits the root fields declare, excluding the
	/// template-id bit every message presence map leads with.
	pub pmap_bits: u32,
}

/// Compiled template set shared read-only across decode sessions.
#[derive(Debug)]
pub struct TemplateRegistry {
	templates: Vec<Template>,
	by_id: HashMap<u32, usize>,
	by_name: HashMap<Box<str>, usize>,
	slot_count: u32,
}

impl TemplateRegistry {
	/// Compile template definitions into an immutable registry.
	///
	/// Performs all schema-time validation: operator/type
	/// compatibility, required initial values, literal parsing, and
	/// duplicate detection. Dictionary slots are assigned depth-first
	/// in declaration order.
	pub fn compile(defs: Vec<TemplateDef>) -> Result<Self> {
		let mut compiler = Compiler { next_slot: 0 };
		let mut templates = Vec::with_capacity(defs.len());
		let mut by_id = HashMap::new();
		let mut by_name = HashMap::new();

		for def in defs {
			let mut root = Vec::with_capacity(def.fields.len());
			for field in def.fields {
				root.push(compiler.compile_field(field)?);
			}
			let pmap_bits = root.iter().map(FieldInstruction::pmap_size).sum();

			let index = templates.len();
			if by_id.insert(def.id, index).is_some() {
				return Err(FastError::DuplicateTemplate {
					what: "id",
					name: def.id.to_string().into_boxed_str(),
				});
			}
			let name: Box<str> = def.name.into_boxed_str();
			if by_name.insert(name.clone(), index).is_some() {
				return Err(FastError::DuplicateTemplate { what: "name", name });
			}

			templates.push(Template {
				id: def.id,
				name,
				reset: def.reset,
				root,
				pmap_bits,
			});
		}

		Ok(Self {
			templates,
			by_id,
			by_name,
			slot_count: compiler.next_slot,
		})
	}

	/// Look up a template by id.
	pub fn get(&self, id: u32) -> Option<&Template> {
		self.by_id.get(&id).map(|index| &self.templates[*index])
	}

	/// Look up a template by name.
	pub fn get_by_name(&self, name: &str) -> Option<&Template> {
		self.by_name.get(name).map(|index| &self.templates[*index])
	}

	/// All templates in registration order.
	pub fn templates(&self) -> &[Template] {
		&self.templates
	}

	/// Number of dictionary slots the compiled templates use.
	pub fn slot_count(&self) -> usize {
		self.slot_count as usize
	}
}

struct Compiler {
	next_slot: u32,
}

impl Compiler {
	fn compile_field(&mut self, def: FieldDef) -> Result<FieldInstruction> {
		let FieldDef {
			id,
			name,
			namespace,
			presence,
			operator,
			initial,
			kind,
		} = def;
		let name: Box<str> = name.into_boxed_str();
		let namespace = namespace.map(String::into_boxed_str);

		// Aggregates carry no operator, no initial value, and no slot.
		let kind = match kind {
			FieldDefKind::Int32 => FieldKind::Int32,
			FieldDefKind::UInt32 => FieldKind::UInt32,
			FieldDefKind::Int64 => FieldKind::Int64,
			FieldDefKind::UInt64 => FieldKind::UInt64,
			FieldDefKind::Ascii => FieldKind::Ascii,
			FieldDefKind::Unicode => FieldKind::Unicode,
			FieldDefKind::Bytes => FieldKind::Bytes,
			FieldDefKind::Enum { labels } => FieldKind::Enum {
				labels: labels.into_iter().map(String::into_boxed_str).collect(),
			},
			FieldDefKind::Decimal { mantissa } => FieldKind::Decimal {
				mantissa: match mantissa {
					Some(inner) => Some(Box::new(self.compile_mantissa(*inner)?)),
					None => None,
				},
			},
			FieldDefKind::Group { children } => {
				check_aggregate(&name, operator, initial.as_deref(), "group")?;
				let children = self.compile_children(children)?;
				let pmap_bits = children.iter().map(FieldInstruction::pmap_size).sum();
				return Ok(FieldInstruction {
					id,
					name,
					namespace,
					presence,
					operator: Operator::None,
					initial: None,
					slot: None,
					kind: FieldKind::Group { children, pmap_bits },
				});
			}
			FieldDefKind::Sequence { length, children } => {
				check_aggregate(&name, operator, initial.as_deref(), "sequence")?;
				let length = Box::new(self.compile_sequence_length(&name, presence, length)?);
				let children = self.compile_children(children)?;
				let pmap_bits = children.iter().map(FieldInstruction::pmap_size).sum();
				return Ok(FieldInstruction {
					id,
					name,
					namespace,
					presence,
					operator: Operator::None,
					initial: None,
					slot: None,
					kind: FieldKind::Sequence { length, children, pmap_bits },
				});
			}
			FieldDefKind::TemplateRef { name: target } => {
				check_aggregate(&name, operator, initial.as_deref(), "templateRef")?;
				return Ok(FieldInstruction {
					id,
					name,
					namespace,
					presence: Presence::Mandatory,
					operator: Operator::None,
					initial: None,
					slot: None,
					kind: FieldKind::TemplateRef {
						name: target.map(String::into_boxed_str),
					},
				});
			}
		};

		check_operator(&name, operator, &kind)?;

		let initial = match initial {
			Some(literal) => Some(parse_initial(&name, &literal, &kind)?),
			None => None,
		};

		if operator == Operator::Constant && initial.is_none() {
			return Err(FastError::ConstantWithoutInitial { field: name });
		}
		if operator == Operator::Default && presence == Presence::Mandatory && initial.is_none() {
			return Err(FastError::MandatoryDefaultWithoutInitial { field: name });
		}

		let slot = if operator.uses_dictionary(presence) {
			let slot = self.next_slot;
			self.next_slot += 1;
			Some(slot)
		} else {
			None
		};

		Ok(FieldInstruction {
			id,
			name,
			namespace,
			presence,
			operator,
			initial,
			slot,
			kind,
		})
	}

	fn compile_mantissa(&mut self, def: FieldDef) -> Result<FieldInstruction> {
		if !matches!(def.kind, FieldDefKind::Int64) {
			return Err(FastError::OperatorTypeMismatch {
				field: def.name.into_boxed_str(),
				operator: "mantissa",
				kind: "non-int64",
			});
		}
		// The mantissa is decoded whenever the exponent is present.
		self.compile_field(FieldDef {
			presence: Presence::Mandatory,
			..def
		})
	}

	fn compile_sequence_length(&mut self, sequence: &str, presence: Presence, def: Option<Box<FieldDef>>) -> Result<FieldInstruction> {
		let def = match def {
			Some(inner) => {
				if !matches!(inner.kind, FieldDefKind::UInt32) {
					return Err(FastError::OperatorTypeMismatch {
						field: inner.name.into_boxed_str(),
						operator: "length",
						kind: "non-uint32",
					});
				}
				// The length field inherits the sequence's presence.
				FieldDef { presence, ..*inner }
			}
			None => FieldDef {
				id: 0,
				name: format!("{sequence}.length"),
				namespace: None,
				presence,
				operator: Operator::None,
				initial: None,
				kind: FieldDefKind::UInt32,
			},
		};
		self.compile_field(def)
	}

	fn compile_children(&mut self, defs: Vec<FieldDef>) -> Result<Vec<FieldInstruction>> {
		let mut out = Vec::with_capacity(defs.len());
		for def in defs {
			out.push(self.compile_field(def)?);
		}
		Ok(out)
	}
}

fn check_aggregate(name: &str, operator: Operator, initial: Option<&str>, kind: &'static str) -> Result<()> {
	if operator != Operator::None {
		return Err(FastError::OperatorTypeMismatch {
			field: name.into(),
			operator: operator.name(),
			kind,
		});
	}
	if let Some(literal) = initial {
		return Err(FastError::BadInitialLiteral {
			field: name.into(),
			literal: literal.into(),
			kind,
		});
	}
	Ok(())
}

fn check_operator(name: &str, operator: Operator, kind: &FieldKind) -> Result<()> {
	let ok = match operator {
		Operator::None | Operator::Constant | Operator::Copy | Operator::Default => true,
		Operator::Increment => matches!(
			kind,
			FieldKind::Int32 | FieldKind::UInt32 | FieldKind::Int64 | FieldKind::UInt64 | FieldKind::Enum { .. }
		),
		Operator::Tail => matches!(kind, FieldKind::Ascii | FieldKind::Unicode | FieldKind::Bytes),
		Operator::Delta => !matches!(kind, FieldKind::Group { .. } | FieldKind::Sequence { .. } | FieldKind::TemplateRef { .. }),
	};

	if ok {
		Ok(())
	} else {
		Err(FastError::OperatorTypeMismatch {
			field: name.into(),
			operator: operator.name(),
			kind: kind.tag(),
		})
	}
}

fn parse_initial(name: &str, literal: &str, kind: &FieldKind) -> Result<Value> {
	let bad = || FastError::BadInitialLiteral {
		field: name.into(),
		literal: literal.into(),
		kind: kind.tag(),
	};

	match kind {
		FieldKind::Int32 => literal.parse::<i32>().map(Value::Int32).map_err(|_| bad()),
		FieldKind::UInt32 => literal.parse::<u32>().map(Value::UInt32).map_err(|_| bad()),
		FieldKind::Int64 => literal.parse::<i64>().map(Value::Int64).map_err(|_| bad()),
		FieldKind::UInt64 => literal.parse::<u64>().map(Value::UInt64).map_err(|_| bad()),
		FieldKind::Ascii | FieldKind::Unicode => Ok(Value::Str(ByteView::Owned(literal.as_bytes().to_vec()))),
		FieldKind::Bytes => parse_hex_literal(name, literal).map(|bytes| Value::Bytes(ByteView::Owned(bytes))),
		FieldKind::Enum { labels } => {
			if let Some(index) = labels.iter().position(|label| label.as_ref() == literal) {
				return Ok(Value::UInt32(index as u32));
			}
			literal.parse::<u32>().map(Value::UInt32).map_err(|_| bad())
		}
		// A decimal with a nested mantissa keeps only the exponent
		// initial on the outer instruction.
		FieldKind::Decimal { mantissa: Some(_) } => literal.parse::<i32>().map(Value::Int32).map_err(|_| bad()),
		FieldKind::Decimal { mantissa: None } => parse_decimal_literal(literal).map(Value::Decimal).ok_or_else(bad),
		FieldKind::Group { .. } | FieldKind::Sequence { .. } | FieldKind::TemplateRef { .. } => Err(bad()),
	}
}

fn parse_decimal_literal(literal: &str) -> Option<DecimalValue> {
	let (sign, digits) = match literal.strip_prefix('-') {
		Some(rest) => (-1_i64, rest),
		None => (1_i64, literal),
	};

	let (int_part, frac_part) = match digits.split_once('.') {
		Some((int_part, frac_part)) => (int_part, frac_part),
		None => (digits, ""),
	};
	if int_part.is_empty() && frac_part.is_empty() {
		return None;
	}

	let mut mantissa = 0_i64;
	for byte in int_part.bytes().chain(frac_part.bytes()) {
		if !byte.is_ascii_digit() {
			return None;
		}
		mantissa = mantissa.checked_mul(10)?.checked_add(i64::from(byte - b'0'))?;
	}

	Some(DecimalValue {
		mantissa: sign * mantissa,
		exponent: -(frac_part.len() as i32),
	})
}

fn parse_hex_literal(name: &str, literal: &str) -> Result<Vec<u8>> {
	let bad = || FastError::MalformedHexLiteral {
		field: name.into(),
		literal: literal.into(),
	};

	let compact: String = literal.chars().filter(|c| !c.is_ascii_whitespace()).collect();
	if compact.len() % 2 != 0 {
		return Err(bad());
	}

	let mut out = Vec::with_capacity(compact.len() / 2);
	let bytes = compact.as_bytes();
	for pair in bytes.chunks(2) {
		let hi = (pair[0] as char).to_digit(16).ok_or_else(bad)?;
		let lo = (pair[1] as char).to_digit(16).ok_or_else(bad)?;
		out.push((hi * 16 + lo) as u8);
	}
	Ok(out)
}

#[cfg(test)]
mod tests;
