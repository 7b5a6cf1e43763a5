//! Logging shims.
//!
//! With the `tracing` feature the macros below forward to [`tracing`];
//! without it they expand to nothing, so call sites stay free of `#[cfg]`.

#![allow(unused_macros)]

#[cfg(feature = "tracing")]
macro_rules! trace {
    ($($tt:tt)*) => { tracing::trace!($($tt)*) }
}

#[cfg(feature = "tracing")]
macro_rules! debug {
    ($($tt:tt)*) => { tracing::debug!($($tt)*) }
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($tt:tt)*) => {};
}

/// Subscriber that enables everything and records nothing, so the field
/// expressions inside `trace!`/`debug!` are evaluated under test.
#[cfg(all(test, feature = "tracing"))]
pub(crate) struct SinkSubscriber;

#[cfg(all(test, feature = "tracing"))]
impl ::tracing::Subscriber for SinkSubscriber {
    fn enabled(&self, _: &::tracing::Metadata<'_>) -> bool {
        true
    }
    fn new_span(&self, _: &::tracing::span::Attributes<'_>) -> ::tracing::span::Id {
        ::tracing::span::Id::from_u64(1)
    }
    fn record(&self, _: &::tracing::span::Id, _: &::tracing::span::Record<'_>) {}
    fn record_follows_from(&self, _: &::tracing::span::Id, _: &::tracing::span::Id) {}
    fn event(&self, _: &::tracing::Event<'_>) {}
    fn enter(&self, _: &::tracing::span::Id) {}
    fn exit(&self, _: &::tracing::span::Id) {}
}

#[cfg(all(test, feature = "tracing"))]
#[test]
fn log_events_evaluate_under_subscriber() {
    let _guard = ::tracing::subscriber::set_default(SinkSubscriber);
    let req = crate::Request::get(|ctx| {
        ctx.url("https://example.com/log?a=1")?;
        Ok(())
    })
    .expect("assemble");
    assert_eq!(req.url().as_str(), "https://example.com/log?a=1");
}
