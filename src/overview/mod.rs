//! Overview: the carousel of running activities and the engine that keeps it
//! in sync with open windows and in-flight launches.
//!
//! The carousel owns ordering and focus bookkeeping. The engine owns every
//! decision about creating, upgrading and destroying activities; it never
//! talks to the compositor directly, only through the collaborator traits in
//! `services`.

pub mod activity;
pub mod carousel;
pub mod engine;

pub use activity::{Activity, ActivityId};
pub use carousel::Carousel;
pub use engine::{Collaborators, Overview};
