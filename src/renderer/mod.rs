//! Renderer - Where rendered markup goes.
//!
//! - [`MarkupSink`] / [`OutputBuffer`]: append-only output targets
//! - [`HeaderTokenSet`] / [`HeaderResponse`]: per-pass deduplicated header contributions

mod header;
mod output;

pub use header::{HeaderResponse, HeaderTokenSet, RenderToken};
pub use output::{MarkupSink, OutputBuffer};
pub(crate) use output::HeadSplice;
