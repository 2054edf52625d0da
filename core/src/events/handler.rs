use super::NormalizedEvent;

/// Trait for components that consume normalized events during ingestion.
pub trait EventHandler {
    fn handle_event(&mut self, event: &NormalizedEvent);

    fn handle_events(&mut self, events: &[NormalizedEvent]) {
        for event in events {
            self.handle_event(event);
        }
    }
}
