//! Editable project state: segments, thumbnail overlay, background, and the reducer that is the
//! single mutation surface for all of it.

/// Pointer gesture state machines that translate drags into reducer actions.
pub mod gesture;
/// Project data types.
pub mod model;
/// Script splitting and word counting.
pub mod script;
/// Render and style configuration carried by a project.
pub mod settings;
/// Reducer, actions, and the copy-on-write project store.
pub mod state;
