//! Design variety for the generated page.
//!
//! Two mechanisms keep consecutive pages from looking alike:
//!
//! 1. **Design memory** - a short rolling history of what recent pages looked
//!    like, fed back to the builder as "don't repeat these"
//! 2. **Creative nudges** - an occasional randomly drawn stylistic directive
//!
//! ```rust,ignore
//! use news_forge::diversity::{DesignMemory, HistoryOrder, NudgeGenerator, format_recent};
//!
//! let memory = DesignMemory::new("design_memory.json");
//! let context = format_recent(&memory.recent(3, HistoryOrder::NewestFirst));
//!
//! let nudge = NudgeGenerator::new().generate();
//! println!("{}\n{}", context, nudge.render());
//! ```

pub mod memory;
pub mod nudge;

pub use memory::{
    extract_summary, format_recent, DesignMemory, DesignSummary, HistoryOrder, DEFAULT_CAPACITY,
    NO_BRIEF_PLACEHOLDER,
};
pub use nudge::{
    kind_for_roll, resolve, total_weight, variant_options, Nudge, NudgeEntry, NudgeGenerator,
    NudgeKind, NUDGE_TABLE,
};
