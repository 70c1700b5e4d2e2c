/// A per-sink transformation with a close hook, for reservation-aware
/// fan-out.
///
/// When an advanced transformer forwards a value to `k` sinks, `transform`
/// runs once per sink and `finish` consumes the original afterwards. For a
/// reservable value whose `transform` takes a fresh reservation, the net
/// effect is `k - 1` additional reservations: each downstream releases its
/// own handle, and `finish` releases the original.
pub trait AdvancedTransformation<A, B>: Send + Sync + 'static {
    /// Produces the value delivered to one sink; `None` skips that sink.
    fn transform(&self, input: &A) -> Option<B>;

    /// Consumes the original after every sink was served.
    fn finish(&self, input: A) {
        drop(input);
    }
}
