use crate::fast::instr::TemplateRegistry;
use crate::fast::value::Value;

/// State of one previous-value slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DictEntry {
	/// Never decoded since the last reset.
	#[default]
	Undefined,
	/// Explicitly nulled by an optional field.
	Empty,
	/// Holds the value the last decode left behind.
	Assigned(Value),
}

/// Per-session previous-value table.
///
/// The instruction tree is immutable and shared; all mutable decode
/// state lives here, indexed by the slot ids assigned at compile time.
/// Two sessions decoding against the same registry each own their own
/// `Dictionary` and never observe each other's previous values.
#[derive(Debug)]
pub struct Dictionary {
	slots: Vec<DictEntry>,
}

impl Dictionary {
	/// Dictionary with `slot_count` undefined slots.
	pub fn new(slot_count: usize) -> Self {
		Self {
			slots: vec![DictEntry::Undefined; slot_count],
		}
	}

	/// Dictionary sized for every slot a registry's templates use.
	pub fn for_registry(registry: &TemplateRegistry) -> Self {
		Self::new(registry.slot_count())
	}

	/// Number of slots.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Return `true` when the dictionary has no slots.
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Current state of a slot.
	pub fn get(&self, slot: u32) -> &DictEntry {
		&self.slots[slot as usize]
	}

	/// Store a value into a slot.
	///
	/// The value must not alias a transient input buffer; callers
	/// convert borrowed views to owned first.
	pub fn assign(&mut self, slot: u32, value: Value) {
		self.slots[slot as usize] = DictEntry::Assigned(value);
	}

	/// Mark a slot explicitly empty.
	pub fn set_empty(&mut self, slot: u32) {
		self.slots[slot as usize] = DictEntry::Empty;
	}

	/// Reset every slot to undefined.
	pub fn reset(&mut self) {
		self.slots.fill(DictEntry::Undefined);
	}
}
