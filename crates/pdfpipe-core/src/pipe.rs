//! The event pipe: an ordered chain of listeners.
//!
//! Each event enters the chain at the first listener. A listener's
//! [`Flow`] decides whether the event continues to the next listener,
//! stops, or is replaced by other events that continue from the next
//! listener onwards.

use crate::error::ExtractWarning;
use crate::event::{Event, FillEvent, ImageEvent, PageInfo, StrokeEvent, TextEvent};

/// What happens to an event after a listener has seen it.
#[derive(Debug, Clone)]
pub enum Flow {
    /// Pass the event on to the next listener.
    Forward,
    /// Stop the event here.
    Suppress,
    /// Pass these events on instead of the original one.
    Replace(Vec<Event>),
}

/// A stage of the event pipe.
pub trait Listener {
    /// Analyze an event and decide how it continues down the chain.
    fn process(&mut self, event: &Event) -> Flow;

    /// Receive a non-fatal interpretation warning. Every listener in the
    /// chain sees every warning.
    fn on_warning(&mut self, _warning: &ExtractWarning) {}
}

impl<F> Listener for F
where
    F: FnMut(&Event) -> Flow,
{
    fn process(&mut self, event: &Event) -> Flow {
        self(event)
    }
}

/// Ordered chain of borrowed listeners.
///
/// The embedder keeps ownership of the listeners and reads their results
/// once the pipe is dropped.
#[derive(Default)]
pub struct EventPipe<'a> {
    listeners: Vec<&'a mut dyn Listener>,
}

impl<'a> EventPipe<'a> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Append a listener to the end of the chain.
    pub fn with(mut self, listener: &'a mut dyn Listener) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Append a listener to the end of the chain.
    pub fn push(&mut self, listener: &'a mut dyn Listener) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver an event to the chain, starting at the first listener.
    pub fn emit(&mut self, event: Event) {
        self.dispatch(0, &event);
    }

    fn dispatch(&mut self, start: usize, event: &Event) {
        for index in start..self.listeners.len() {
            match self.listeners[index].process(event) {
                Flow::Forward => {}
                Flow::Suppress => return,
                Flow::Replace(events) => {
                    for replacement in &events {
                        self.dispatch(index + 1, replacement);
                    }
                    return;
                }
            }
        }
    }

    pub fn begin_page(&mut self, info: PageInfo) {
        self.emit(Event::BeginPage(info));
    }

    pub fn end_page(&mut self, index: usize) {
        self.emit(Event::EndPage { index });
    }

    pub fn text(&mut self, event: TextEvent) {
        self.emit(Event::Text(event));
    }

    pub fn image(&mut self, event: ImageEvent) {
        self.emit(Event::Image(event));
    }

    pub fn stroke(&mut self, event: StrokeEvent) {
        self.emit(Event::ShapeStroke(event));
    }

    pub fn fill(&mut self, event: FillEvent) {
        self.emit(Event::ShapeFill(event));
    }

    /// Broadcast a warning to every listener.
    pub fn warn(&mut self, warning: &ExtractWarning) {
        for listener in self.listeners.iter_mut() {
            listener.on_warning(warning);
        }
    }
}

/// Listener that records every event it sees.
#[derive(Debug, Default)]
pub struct EventRecorder {
    pub events: Vec<Event>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events of one kind (see [`Event::kind`]).
    pub fn of_kind(&self, kind: &str) -> Vec<&Event> {
        self.events.iter().filter(|e| e.kind() == kind).collect()
    }

    /// Recorded text events.
    pub fn texts(&self) -> Vec<&TextEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Text(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}

impl Listener for EventRecorder {
    fn process(&mut self, event: &Event) -> Flow {
        self.events.push(event.clone());
        Flow::Forward
    }
}

/// Listener that collects warnings and forwards every event untouched.
#[derive(Debug, Default)]
pub struct WarningCollector {
    pub warnings: Vec<ExtractWarning>,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Listener for WarningCollector {
    fn process(&mut self, _event: &Event) -> Flow {
        Flow::Forward
    }

    fn on_warning(&mut self, warning: &ExtractWarning) {
        self.warnings.push(warning.clone());
    }
}
