/// One reportable (non-fatal) condition observed while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reportable {
	/// Reportable code, e.g. `R1` for arithmetic overflow.
	pub code: &'static str,
	/// Name of the field being decoded, empty below field level.
	pub field: Box<str>,
	/// Human-readable detail.
	pub detail: String,
}

/// Sink for reportable conditions; decoding continues after each report.
pub trait DiagnosticSink {
	/// Record one reportable condition.
	fn report(&mut self, event: Reportable);
}

/// Sink forwarding every report to the `log` facade at warn level.
#[derive(Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
	fn report(&mut self, event: Reportable) {
		if event.field.is_empty() {
			log::warn!("fast [{}]: {}", event.code, event.detail);
		} else {
			log::warn!("fast [{}] {}: {}", event.code, event.field, event.detail);
		}
	}
}

/// Sink collecting reports in memory, for tests and batch inspection.
#[derive(Debug, Default)]
pub struct CollectSink {
	/// Reports in arrival order.
	pub events: Vec<Reportable>,
}

impl DiagnosticSink for CollectSink {
	fn report(&mut self, event: Reportable) {
		self.events.push(event);
	}
}
