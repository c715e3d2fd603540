use crate::fast::FastError;
use crate::fast::instr::{FieldDef, FieldDefKind, FieldKind, Operator, TemplateDef, TemplateRegistry};
use crate::fast::value::{ByteView, DecimalValue, Value};

fn single_field_registry(field: FieldDef) -> crate::fast::Result<TemplateRegistry> {
	TemplateRegistry::compile(vec![TemplateDef::new(1, "t", vec![field])])
}

#[test]
fn assigns_slots_to_dictionary_operators_only() {
	let registry = TemplateRegistry::compile(vec![TemplateDef::new(
		1,
		"quote",
		vec![
			FieldDef::new(1, "a", FieldDefKind::UInt32).operator(Operator::Copy),
			FieldDef::new(2, "b", FieldDefKind::UInt32),
			FieldDef::new(3, "c", FieldDefKind::Int64).operator(Operator::Delta),
			FieldDef::new(4, "d", FieldDefKind::Ascii).operator(Operator::Constant).initial("X"),
		],
	)])
	.expect("compiles");

	let root = &registry.get(1).expect("template").root;
	assert_eq!(root[0].slot, Some(0));
	assert_eq!(root[1].slot, None, "none operator keeps no previous value");
	assert_eq!(root[2].slot, Some(1));
	assert_eq!(root[3].slot, None, "mandatory constant keeps no previous value");
	assert_eq!(registry.slot_count(), 2);
}

#[test]
fn pmap_bits_follow_the_operator_table() {
	let registry = TemplateRegistry::compile(vec![TemplateDef::new(
		1,
		"t",
		vec![
			FieldDef::new(1, "none", FieldDefKind::UInt32),
			FieldDef::new(2, "copy", FieldDefKind::UInt32).operator(Operator::Copy),
			FieldDef::new(3, "delta", FieldDefKind::Int32).operator(Operator::Delta),
			FieldDef::new(4, "const_m", FieldDefKind::UInt32).operator(Operator::Constant).initial("1"),
			FieldDef::new(5, "const_o", FieldDefKind::UInt32).operator(Operator::Constant).initial("1").optional(),
			FieldDef::new(6, "tail", FieldDefKind::Ascii).operator(Operator::Tail),
		],
	)])
	.expect("compiles");

	let template = registry.get(1).expect("template");
	let sizes: Vec<u32> = template.root.iter().map(|f| f.pmap_size()).collect();
	assert_eq!(sizes, [0, 1, 0, 0, 1, 1]);
	assert_eq!(template.pmap_bits, 3);
}

#[test]
fn split_decimal_counts_both_halves() {
	let mantissa = FieldDef::new(0, "px.mant", FieldDefKind::Int64).operator(Operator::Delta);
	let field = FieldDef::new(
		7,
		"px",
		FieldDefKind::Decimal {
			mantissa: Some(Box::new(mantissa)),
		},
	)
	.operator(Operator::Copy)
	.initial("-2");

	let registry = single_field_registry(field).expect("compiles");
	let instr = &registry.get(1).expect("template").root[0];
	assert_eq!(instr.pmap_size(), 1, "copy exponent takes a bit, delta mantissa none");
	assert_eq!(instr.initial, Some(Value::Int32(-2)), "exponent initial parses as int32");
	assert_eq!(registry.slot_count(), 2, "exponent and mantissa each own a slot");
}

#[test]
fn decimal_literal_parses_fractional_digits() {
	let field = FieldDef::new(1, "px", FieldDefKind::Decimal { mantissa: None })
		.operator(Operator::Copy)
		.initial("94.27");
	let registry = single_field_registry(field).expect("compiles");
	let instr = &registry.get(1).expect("template").root[0];
	assert_eq!(
		instr.initial,
		Some(Value::Decimal(DecimalValue { mantissa: 9427, exponent: -2 }))
	);
}

#[test]
fn hex_initial_parses_for_bytes() {
	let field = FieldDef::new(1, "blob", FieldDefKind::Bytes)
		.operator(Operator::Copy)
		.initial("7f 00 C3");
	let registry = single_field_registry(field).expect("compiles");
	let instr = &registry.get(1).expect("template").root[0];
	assert_eq!(instr.initial, Some(Value::Bytes(ByteView::Owned(vec![0x7F, 0x00, 0xC3]))));
}

#[test]
fn malformed_hex_literal_is_d11() {
	let field = FieldDef::new(1, "blob", FieldDefKind::Bytes).operator(Operator::Copy).initial("7f 0");
	let err = single_field_registry(field).expect_err("odd digit count");
	assert!(matches!(err, FastError::MalformedHexLiteral { .. }));
	assert_eq!(err.code(), Some("D11"));

	let field = FieldDef::new(1, "blob", FieldDefKind::Bytes).operator(Operator::Copy).initial("zz");
	let err = single_field_registry(field).expect_err("non-hex digit");
	assert!(matches!(err, FastError::MalformedHexLiteral { .. }));
}

#[test]
fn increment_on_string_is_rejected() {
	let field = FieldDef::new(1, "s", FieldDefKind::Ascii).operator(Operator::Increment);
	let err = single_field_registry(field).expect_err("S2");
	assert!(matches!(err, FastError::OperatorTypeMismatch { .. }));
	assert_eq!(err.code(), Some("S2"));
}

#[test]
fn tail_on_integer_is_rejected() {
	let field = FieldDef::new(1, "n", FieldDefKind::UInt64).operator(Operator::Tail);
	assert!(matches!(
		single_field_registry(field).expect_err("S2"),
		FastError::OperatorTypeMismatch { .. }
	));
}

#[test]
fn constant_requires_initial_value() {
	let field = FieldDef::new(1, "c", FieldDefKind::UInt32).operator(Operator::Constant);
	let err = single_field_registry(field).expect_err("S4");
	assert!(matches!(err, FastError::ConstantWithoutInitial { .. }));
	assert_eq!(err.code(), Some("S4"));
}

#[test]
fn mandatory_default_requires_initial_value() {
	let field = FieldDef::new(1, "d", FieldDefKind::UInt32).operator(Operator::Default);
	let err = single_field_registry(field).expect_err("S5");
	assert!(matches!(err, FastError::MandatoryDefaultWithoutInitial { .. }));
}

#[test]
fn bad_integer_literal_is_s3() {
	let field = FieldDef::new(1, "n", FieldDefKind::Int32).operator(Operator::Copy).initial("12x");
	let err = single_field_registry(field).expect_err("S3");
	assert!(matches!(err, FastError::BadInitialLiteral { .. }));
	assert_eq!(err.code(), Some("S3"));
}

#[test]
fn enum_initial_accepts_label_or_index() {
	let labels = vec!["buy".to_owned(), "sell".to_owned()];
	let field = FieldDef::new(1, "side", FieldDefKind::Enum { labels: labels.clone() })
		.operator(Operator::Copy)
		.initial("sell");
	let registry = single_field_registry(field).expect("compiles");
	assert_eq!(registry.get(1).expect("template").root[0].initial, Some(Value::UInt32(1)));

	let field = FieldDef::new(1, "side", FieldDefKind::Enum { labels }).operator(Operator::Copy).initial("0");
	let registry = single_field_registry(field).expect("compiles");
	let instr = &registry.get(1).expect("template").root[0];
	assert_eq!(instr.initial, Some(Value::UInt32(0)));
	assert_eq!(instr.enum_label(0), Some("buy"));
	assert_eq!(instr.enum_label(9), None);
}

#[test]
fn duplicate_template_id_is_rejected() {
	let err = TemplateRegistry::compile(vec![
		TemplateDef::new(1, "a", Vec::new()),
		TemplateDef::new(1, "b", Vec::new()),
	])
	.expect_err("S1");
	assert!(matches!(err, FastError::DuplicateTemplate { what: "id", .. }));
	assert_eq!(err.code(), Some("S1"));
}

#[test]
fn sequence_gets_implicit_length_instruction() {
	let field = FieldDef::new(
		1,
		"legs",
		FieldDefKind::Sequence {
			length: None,
			children: vec![FieldDef::new(2, "qty", FieldDefKind::UInt32).operator(Operator::Copy)],
		},
	)
	.optional();

	let registry = single_field_registry(field).expect("compiles");
	let instr = &registry.get(1).expect("template").root[0];
	let FieldKind::Sequence { length, pmap_bits, .. } = &instr.kind else {
		panic!("sequence expected");
	};
	assert_eq!(length.name.as_ref(), "legs.length");
	assert!(length.presence.is_optional(), "length inherits sequence presence");
	assert_eq!(*pmap_bits, 1, "copy child needs one element pmap bit");
	assert_eq!(instr.pmap_size(), 0, "plain optional length takes no parent pmap bit");
}

#[test]
fn operator_on_group_is_rejected() {
	let field = FieldDef::new(1, "g", FieldDefKind::Group { children: Vec::new() }).operator(Operator::Copy);
	assert!(matches!(
		single_field_registry(field).expect_err("S2"),
		FastError::OperatorTypeMismatch { .. }
	));
}
