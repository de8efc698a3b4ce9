//! Host-agnostic widget logic: persisted state, course normalization and the
//! derived list view.

pub mod course;
pub mod outline;
pub mod state;
pub mod tools;
pub mod view;
pub mod watch;
