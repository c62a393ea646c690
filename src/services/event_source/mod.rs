//! Event sources: responsibility and boundaries
//!
//! A source ONLY produces events. It keeps the in-memory registry and shell
//! state in step with what it announces (a window is in the registry before
//! its `added` event is sent) and never touches the carousel. Every decision
//! about activities is made by the overview engine.

mod dry_run;
mod replay;
mod scenario;
mod r#trait;

pub use self::r#trait::create_event_source;
