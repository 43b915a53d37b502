//! Tracing subscriber setup.
//!
//! Human-readable output always goes to stderr. When a sink is supplied,
//! events are additionally formatted into it, one write per event, so each
//! record lands whole in a single generation of the log.

use rotalog_core::RotatingFileSink;
use std::io;
use std::sync::Arc;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Target prefix of the sink's own diagnostics.
const SINK_TARGET: &str = "rotalog_core";

/// Makes writers for a shared sink.
#[derive(Clone)]
pub struct SinkWriter(Arc<RotatingFileSink>);

impl SinkWriter {
    pub fn new(sink: Arc<RotatingFileSink>) -> Self {
        Self(sink)
    }
}

impl<'a> MakeWriter<'a> for SinkWriter {
    type Writer = &'a RotatingFileSink;

    fn make_writer(&'a self) -> Self::Writer {
        &self.0
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

/// Installs the global subscriber.
pub fn init(verbose: bool, sink: Option<Arc<RotatingFileSink>>) {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(env_filter(verbose));

    // The sink's own events are kept out of the sink.
    let file_layer = sink.map(|sink| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(SinkWriter::new(sink))
            .with_filter(env_filter(verbose))
            .with_filter(filter_fn(|meta| !meta.target().starts_with(SINK_TARGET)))
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
}
