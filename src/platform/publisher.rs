use crate::platform::event::Event;

/// Publishes preconsensus events to external observers.
///
/// When nothing is registered to observe, the wiring gives this component a
/// NO_OP scheduler and every publication is dropped before it runs.
pub struct PlatformPublisher;

impl PlatformPublisher {
    pub fn publish_preconsensus_event(&mut self, _event: Event) -> Option<()> {
        None
    }
}
