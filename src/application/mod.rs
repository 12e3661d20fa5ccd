//! Application layer: selection tracking and mutation orchestration
//!
//! This layer drives the domain against the boundary traits in
//! `infrastructure::traits`; it never performs I/O itself.

pub mod dispatcher;
pub mod error;
pub mod selection;
pub mod view;

pub use dispatcher::{MoveOutcome, MutationDispatcher};
pub use error::{ApplicationError, ApplicationResult};
pub use selection::{
    ScrollBehavior, ScrollBlock, ScrollOptions, ScrollOutcome, Selection, SelectionController,
    SelectionPhase, SelectionTicket, DEFAULT_SCROLL_DELAY,
};
pub use view::{render_state, RenderState};
