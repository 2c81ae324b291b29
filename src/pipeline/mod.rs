//! Entry processing pipeline.
//!
//! [`EntryProcessor`] takes one bibliography entry from "needs a PDF" to a
//! [`ResolutionResult`]. [`Dispatcher`] runs it over a whole bibliography with
//! bounded parallelism.

mod dispatcher;
mod processor;
mod result;

pub use dispatcher::{DEFAULT_MAX_PARALLEL, Dispatcher, DispatcherError};
pub use processor::{EntryProcessor, PlannedAction, plan_entry};
pub use result::{DOI_PLACEHOLDER, ResolutionResult, ResolutionSource};
