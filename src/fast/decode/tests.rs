use fastwire_testkit::MessageBuilder;

use crate::fast::FastError;
use crate::fast::decode::Decoder;
use crate::fast::diag::CollectSink;
use crate::fast::dict::Dictionary;
use crate::fast::instr::{FieldDef, FieldDefKind, Operator, TemplateDef, TemplateRegistry};
use crate::fast::value::{ByteView, Value};

fn owned_str(text: &str) -> Value {
	Value::Str(ByteView::Owned(text.as_bytes().to_vec()))
}

fn order_registry() -> TemplateRegistry {
	TemplateRegistry::compile(vec![TemplateDef::new(
		10,
		"order",
		vec![
			FieldDef::new(1, "price", FieldDefKind::UInt32).operator(Operator::Copy),
			FieldDef::new(2, "qty", FieldDefKind::Int32).operator(Operator::Delta),
			FieldDef::new(3, "sym", FieldDefKind::Ascii).operator(Operator::Default).initial("IBM"),
		],
	)])
	.expect("compiles")
}

fn field_value(message: &crate::fast::decode::DecodedMessage, name: &str) -> Option<Value> {
	message.field(name).expect("field present").value.clone()
}

#[test]
fn decodes_a_full_message() {
	let registry = order_registry();
	let mut dict = Dictionary::for_registry(&registry);
	let mut sink = CollectSink::default();
	let mut decoder = Decoder::new(&registry, &mut dict, &mut sink);

	let mut builder = MessageBuilder::new(10);
	builder.bit(true).u32(100); // price in stream
	builder.i64(5); // qty delta
	builder.bit(false); // sym falls back to its default
	let bytes = builder.build();

	let message = decoder.decode_message(&bytes).expect("decodes");
	assert_eq!(message.template_id, 10);
	assert_eq!(message.template_name.as_ref(), "order");
	assert_eq!(message.wire_len, bytes.len());
	assert_eq!(field_value(&message, "price"), Some(Value::UInt32(100)));
	assert_eq!(field_value(&message, "qty"), Some(Value::Int32(5)));
	assert_eq!(field_value(&message, "sym"), Some(owned_str("IBM")));
}

#[test]
fn previous_values_thread_across_messages() {
	let registry = order_registry();
	let mut dict = Dictionary::for_registry(&registry);
	let mut sink = CollectSink::default();
	let mut decoder = Decoder::new(&registry, &mut dict, &mut sink);

	let mut first = MessageBuilder::new(10);
	first.bit(true).u32(100);
	first.i64(5);
	first.bit(false);

	// Second message inherits the template and every previous value.
	let mut second = MessageBuilder::without_template_id();
	second.bit(false); // price copied from the dictionary
	second.i64(-2); // qty delta against 5
	second.bit(false);

	let mut bytes = first.build();
	bytes.extend_from_slice(&second.build());

	let messages: Vec<_> = decoder.decode_stream(&bytes).collect::<crate::fast::Result<_>>().expect("both decode");
	assert_eq!(messages.len(), 2);
	assert_eq!(field_value(&messages[1], "price"), Some(Value::UInt32(100)));
	assert_eq!(field_value(&messages[1], "qty"), Some(Value::Int32(3)));
	assert_eq!(messages[0].wire_len + messages[1].wire_len, bytes.len());
}

#[test]
fn missing_template_id_without_previous_template_fails() {
	let registry = order_registry();
	let mut dict = Dictionary::for_registry(&registry);
	let mut sink = CollectSink::default();
	let mut decoder = Decoder::new(&registry, &mut dict, &mut sink);

	let bytes = MessageBuilder::without_template_id().build();
	let err = decoder.decode_message(&bytes).expect_err("no template in effect");
	assert!(matches!(err, FastError::NoCurrentTemplate));
}

#[test]
fn unknown_template_id_is_rejected() {
	let registry = order_registry();
	let mut dict = Dictionary::for_registry(&registry);
	let mut sink = CollectSink::default();
	let mut decoder = Decoder::new(&registry, &mut dict, &mut sink);

	let bytes = MessageBuilder::new(99).build();
	let err = decoder.decode_message(&bytes).expect_err("unknown id");
	assert!(matches!(err, FastError::UnknownTemplateId { id: 99 }));
}

#[test]
fn reset_template_clears_previous_values() {
	let registry = TemplateRegistry::compile(vec![
		TemplateDef::new(
			1,
			"tick",
			vec![FieldDef::new(1, "px", FieldDefKind::UInt32).operator(Operator::Copy).initial("1")],
		)
		.reset(),
	])
	.expect("compiles");
	let mut dict = Dictionary::for_registry(&registry);
	let mut sink = CollectSink::default();
	let mut decoder = Decoder::new(&registry, &mut dict, &mut sink);

	let mut first = MessageBuilder::new(1);
	first.bit(true).u32(9);
	let message = decoder.decode_message(&first.build()).expect("decodes");
	assert_eq!(field_value(&message, "px"), Some(Value::UInt32(9)));

	// The reset wipes the assigned 9; the copy falls back to the initial.
	let mut second = MessageBuilder::new(1);
	second.bit(false);
	let message = decoder.decode_message(&second.build()).expect("decodes");
	assert_eq!(field_value(&message, "px"), Some(Value::UInt32(1)));
}

#[test]
fn optional_group_follows_its_presence_bit() {
	let registry = TemplateRegistry::compile(vec![TemplateDef::new(
		1,
		"t",
		vec![
			FieldDef::new(
				1,
				"extra",
				FieldDefKind::Group {
					children: vec![FieldDef::new(2, "x", FieldDefKind::UInt32)],
				},
			)
			.optional(),
		],
	)])
	.expect("compiles");
	let mut dict = Dictionary::for_registry(&registry);
	let mut sink = CollectSink::default();
	let mut decoder = Decoder::new(&registry, &mut dict, &mut sink);

	let mut present = MessageBuilder::new(1);
	present.bit(true).u32(9);
	let message = decoder.decode_message(&present.build()).expect("decodes");
	let Some(Value::Group(fields)) = field_value(&message, "extra") else {
		panic!("group expected");
	};
	assert_eq!(fields[0].value, Some(Value::UInt32(9)));

	let mut absent = MessageBuilder::new(1);
	absent.bit(false);
	let message = decoder.decode_message(&absent.build()).expect("decodes");
	assert_eq!(field_value(&message, "extra"), None);
}

#[test]
fn group_with_pmap_children_loads_its_own_map() {
	let registry = TemplateRegistry::compile(vec![TemplateDef::new(
		1,
		"t",
		vec![FieldDef::new(
			1,
			"inner",
			FieldDefKind::Group {
				children: vec![FieldDef::new(2, "x", FieldDefKind::UInt32).operator(Operator::Copy).initial("3")],
			},
		)],
	)])
	.expect("compiles");
	let mut dict = Dictionary::for_registry(&registry);
	let mut sink = CollectSink::default();
	let mut decoder = Decoder::new(&registry, &mut dict, &mut sink);

	let mut builder = MessageBuilder::new(1);
	builder.nested_pmap(&[false]); // group segment map: copy bit unset
	let message = decoder.decode_message(&builder.build()).expect("decodes");
	let Some(Value::Group(fields)) = field_value(&message, "inner") else {
		panic!("group expected");
	};
	assert_eq!(fields[0].value, Some(Value::UInt32(3)));
}

#[test]
fn sequence_threads_dictionary_state_across_elements() {
	let registry = TemplateRegistry::compile(vec![TemplateDef::new(
		2,
		"book",
		vec![FieldDef::new(
			1,
			"levels",
			FieldDefKind::Sequence {
				length: None,
				children: vec![FieldDef::new(2, "px", FieldDefKind::UInt32).operator(Operator::Copy)],
			},
		)],
	)])
	.expect("compiles");
	let mut dict = Dictionary::for_registry(&registry);
	let mut sink = CollectSink::default();
	let mut decoder = Decoder::new(&registry, &mut dict, &mut sink);

	let mut builder = MessageBuilder::new(2);
	builder.u32(3); // sequence length
	builder.nested_pmap(&[true]).u32(50);
	builder.nested_pmap(&[false]); // second level copies the first
	builder.nested_pmap(&[true]).u32(51);

	let message = decoder.decode_message(&builder.build()).expect("decodes");
	let Some(Value::Sequence(elements)) = field_value(&message, "levels") else {
		panic!("sequence expected");
	};
	let prices: Vec<_> = elements.iter().map(|fields| fields[0].value.clone()).collect();
	assert_eq!(
		prices,
		[Some(Value::UInt32(50)), Some(Value::UInt32(50)), Some(Value::UInt32(51))]
	);
}

#[test]
fn optional_sequence_null_length_is_absent() {
	let registry = TemplateRegistry::compile(vec![TemplateDef::new(
		2,
		"book",
		vec![
			FieldDef::new(
				1,
				"levels",
				FieldDefKind::Sequence {
					length: None,
					children: vec![FieldDef::new(2, "px", FieldDefKind::UInt32)],
				},
			)
			.optional(),
		],
	)])
	.expect("compiles");
	let mut dict = Dictionary::for_registry(&registry);
	let mut sink = CollectSink::default();
	let mut decoder = Decoder::new(&registry, &mut dict, &mut sink);

	let mut builder = MessageBuilder::new(2);
	builder.u32_nullable(None);
	let message = decoder.decode_message(&builder.build()).expect("decodes");
	assert_eq!(field_value(&message, "levels"), None);
}

#[test]
fn sequence_over_limit_is_rejected() {
	let registry = TemplateRegistry::compile(vec![TemplateDef::new(
		2,
		"book",
		vec![FieldDef::new(
			1,
			"levels",
			FieldDefKind::Sequence {
				length: None,
				children: vec![FieldDef::new(2, "px", FieldDefKind::UInt32)],
			},
		)],
	)])
	.expect("compiles");
	let mut dict = Dictionary::for_registry(&registry);
	let mut sink = CollectSink::default();
	let mut decoder = Decoder::new(&registry, &mut dict, &mut sink)
		.with_limits(crate::fast::decode::DecodeLimits {
			max_sequence_len: 2,
			..Default::default()
		});

	let mut builder = MessageBuilder::new(2);
	builder.u32(3);
	let err = decoder.decode_message(&builder.build()).expect_err("limit");
	assert!(matches!(err, FastError::SequenceTooLong { len: 3, max: 2 }));
}

#[test]
fn static_template_ref_inlines_the_target() {
	let registry = TemplateRegistry::compile(vec![
		TemplateDef::new(1, "inner", vec![FieldDef::new(1, "a", FieldDefKind::UInt32).operator(Operator::Copy)]),
		TemplateDef::new(
			2,
			"outer",
			vec![FieldDef::new(9, "ref", FieldDefKind::TemplateRef { name: Some("inner".to_owned()) })],
		),
	])
	.expect("compiles");
	let mut dict = Dictionary::for_registry(&registry);
	let mut sink = CollectSink::default();
	let mut decoder = Decoder::new(&registry, &mut dict, &mut sink);

	let mut builder = MessageBuilder::new(2);
	builder.nested_pmap(&[true]).u32(7); // inner segment: copy bit + value
	let message = decoder.decode_message(&builder.build()).expect("decodes");
	let Some(Value::Group(fields)) = field_value(&message, "ref") else {
		panic!("group expected");
	};
	assert_eq!(fields[0].value, Some(Value::UInt32(7)));
}

#[test]
fn dynamic_template_ref_decodes_a_nested_message() {
	let registry = TemplateRegistry::compile(vec![
		TemplateDef::new(1, "inner", vec![FieldDef::new(1, "a", FieldDefKind::UInt32).operator(Operator::Copy)]),
		TemplateDef::new(
			3,
			"outer",
			vec![
				FieldDef::new(1, "pre", FieldDefKind::UInt32),
				FieldDef::new(9, "ref", FieldDefKind::TemplateRef { name: None }),
			],
		),
	])
	.expect("compiles");
	let mut dict = Dictionary::for_registry(&registry);
	let mut sink = CollectSink::default();
	let mut decoder = Decoder::new(&registry, &mut dict, &mut sink);

	let mut nested = MessageBuilder::new(1);
	nested.bit(true).u32(7);

	let mut builder = MessageBuilder::new(3);
	builder.u32(1);
	builder.raw(&nested.build());

	let message = decoder.decode_message(&builder.build()).expect("decodes");
	let Some(Value::Group(fields)) = field_value(&message, "ref") else {
		panic!("group expected");
	};
	assert_eq!(fields[0].value, Some(Value::UInt32(7)));
}

#[test]
fn sessions_sharing_a_registry_do_not_share_state() {
	let registry = order_registry();
	let mut sink_a = CollectSink::default();
	let mut sink_b = CollectSink::default();

	let mut dict_a = Dictionary::for_registry(&registry);
	let mut decoder_a = Decoder::new(&registry, &mut dict_a, &mut sink_a);
	let mut first = MessageBuilder::new(10);
	first.bit(true).u32(100);
	first.i64(5);
	first.bit(false);
	decoder_a.decode_message(&first.build()).expect("session A decodes");

	// Session B never saw A's price; its copy slot is still undefined.
	let mut dict_b = Dictionary::for_registry(&registry);
	let mut decoder_b = Decoder::new(&registry, &mut dict_b, &mut sink_b);
	let mut second = MessageBuilder::new(10);
	second.bit(false);
	second.i64(1);
	second.bit(false);
	let err = decoder_b.decode_message(&second.build()).expect_err("undefined previous value");
	assert!(matches!(err, FastError::MandatoryWithoutInitial { .. }));
}

#[test]
fn stream_iterator_fuses_after_an_error() {
	let registry = order_registry();
	let mut dict = Dictionary::for_registry(&registry);
	let mut sink = CollectSink::default();
	let mut decoder = Decoder::new(&registry, &mut dict, &mut sink);

	let mut good = MessageBuilder::new(10);
	good.bit(true).u32(100);
	good.i64(5);
	good.bit(false);

	let mut bytes = good.build();
	bytes.extend_from_slice(&MessageBuilder::new(99).build()); // unknown template

	let mut iter = decoder.decode_stream(&bytes);
	assert!(iter.next().expect("first message").is_ok());
	assert!(iter.next().expect("second item").is_err());
	assert!(iter.next().is_none(), "iterator fuses after the error");
}

#[test]
fn unicode_field_borrows_from_the_input_buffer() {
	let registry = TemplateRegistry::compile(vec![TemplateDef::new(
		1,
		"t",
		vec![FieldDef::new(1, "note", FieldDefKind::Unicode)],
	)])
	.expect("compiles");
	let mut dict = Dictionary::for_registry(&registry);
	let mut sink = CollectSink::default();
	let mut decoder = Decoder::new(&registry, &mut dict, &mut sink);

	let mut builder = MessageBuilder::new(1);
	builder.bytes("héllo".as_bytes());
	let bytes = builder.build();

	let message = decoder.decode_message(&bytes).expect("decodes");
	let Some(Value::Str(view)) = field_value(&message, "note") else {
		panic!("string expected");
	};
	assert!(matches!(view, ByteView::Borrowed { .. }));
	assert_eq!(view.resolve(&bytes), "héllo".as_bytes());
}
