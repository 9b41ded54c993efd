// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Optional OpenTelemetry instrumentation.
//!
//! Without the `telemetry` feature every hook is an empty function. With it,
//! nothing is recorded until [`enable`] is called.
#![cfg_attr(not(feature = "telemetry"), allow(dead_code))]

/// Engine stage a measurement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// `Template::parse_str`.
    Parse,
    /// `Template::render`.
    Render,
}

impl Phase {
    fn as_str(self) -> &'static str {
        match self {
            Phase::Parse => "parse",
            Phase::Render => "render",
        }
    }
}

#[cfg(feature = "telemetry")]
mod otel {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::OnceLock;
    use std::time::Duration;

    use opentelemetry::global::{self, BoxedTracer};
    use opentelemetry::metrics::{Counter, Histogram};
    use opentelemetry::trace::{Span, SpanKind, Tracer};
    use opentelemetry::KeyValue;

    use super::Phase;

    const SCOPE: &str = "minitmpl_engine";

    static ENABLED: AtomicBool = AtomicBool::new(false);
    static INSTRUMENTS: OnceLock<Instruments> = OnceLock::new();

    struct PhaseInstruments {
        count: Counter<u64>,
        duration_ms: Histogram<f64>,
    }

    struct Instruments {
        tracer: BoxedTracer,
        parse: PhaseInstruments,
        render: PhaseInstruments,
        files: Counter<u64>,
    }

    impl PhaseInstruments {
        fn new(meter: &opentelemetry::metrics::Meter, phase: Phase) -> Self {
            let name = phase.as_str();
            Self {
                count: meter
                    .u64_counter(format!("minitmpl.{name}.count"))
                    .with_description(format!("Number of template {name} calls"))
                    .init(),
                duration_ms: meter
                    .f64_histogram(format!("minitmpl.{name}.duration_ms"))
                    .with_description(format!("Template {name} duration in milliseconds"))
                    .init(),
            }
        }
    }

    impl Instruments {
        fn get() -> &'static Self {
            INSTRUMENTS.get_or_init(|| {
                let meter = global::meter(SCOPE);
                Self {
                    tracer: global::tracer(SCOPE),
                    parse: PhaseInstruments::new(&meter, Phase::Parse),
                    render: PhaseInstruments::new(&meter, Phase::Render),
                    files: meter
                        .u64_counter("minitmpl.file.count")
                        .with_description("Number of template file reads and writes")
                        .init(),
                }
            })
        }

        fn phase(&self, phase: Phase) -> &PhaseInstruments {
            match phase {
                Phase::Parse => &self.parse,
                Phase::Render => &self.render,
            }
        }
    }

    pub fn enable() {
        ENABLED.store(true, Ordering::Relaxed);
    }

    pub fn disable() {
        ENABLED.store(false, Ordering::Relaxed);
    }

    fn enabled() -> bool {
        ENABLED.load(Ordering::Relaxed)
    }

    pub fn record(phase: Phase, template: &str, template_len: usize, duration: Duration, success: bool) {
        if !enabled() {
            return;
        }
        let instruments = Instruments::get();
        let duration_ms = duration.as_secs_f64() * 1_000.0;
        let attrs = [
            KeyValue::new("template.name", template.to_string()),
            KeyValue::new("template.length", i64::try_from(template_len).unwrap_or(i64::MAX)),
            KeyValue::new("success", success),
        ];
        let measured = instruments.phase(phase);
        measured.count.add(1, &attrs);
        measured.duration_ms.record(duration_ms, &attrs);

        let span_name = match phase {
            Phase::Parse => "Template::parse",
            Phase::Render => "Template::render",
        };
        let mut span = instruments
            .tracer
            .span_builder(span_name)
            .with_kind(SpanKind::Internal)
            .with_attributes(attrs.to_vec())
            .start(&instruments.tracer);
        span.set_attribute(KeyValue::new("duration_ms", duration_ms));
        span.end();
    }

    pub fn record_file_access(path: &str, operation: &'static str, success: bool) {
        if !enabled() {
            return;
        }
        let attrs = [
            KeyValue::new("file.path", path.to_string()),
            KeyValue::new("file.operation", operation),
            KeyValue::new("success", success),
        ];
        Instruments::get().files.add(1, &attrs);
    }
}

#[cfg(not(feature = "telemetry"))]
mod otel {
    use std::time::Duration;

    use super::Phase;

    pub fn enable() {}
    pub fn disable() {}
    pub fn record(
        _phase: Phase,
        _template: &str,
        _template_len: usize,
        _duration: Duration,
        _success: bool,
    ) {
    }
    pub fn record_file_access(_path: &str, _operation: &'static str, _success: bool) {}
}

pub use otel::{disable, enable, record, record_file_access};
