use tracing::{subscriber::set_global_default, Subscriber};
use tracing_log::LogTracer;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    prelude::__tracing_subscriber_SubscriberExt,
    EnvFilter, Registry,
};

/// Builds the subscriber: `RUST_LOG` filtering (falling back to `default_filter`), compact
/// formatting into `sink` and Sentry event forwarding.
pub fn get_subscriber<Sink>(default_filter: &str, sink: Sink) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let formatting_layer = fmt::layer().compact().with_writer(sink);

    Registry::default()
        .with(env_filter)
        .with(formatting_layer)
        .with(sentry_tracing::layer())
}

/// Installs the subscriber globally and routes `log` records into it.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::init().expect("Could not initialize log tracer");

    set_global_default(subscriber).expect("Failed to set subscriber");
}
