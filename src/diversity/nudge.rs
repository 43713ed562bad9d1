//! Weighted creative nudges for the builder.
//!
//! Selection happens in two independent steps: a weighted draw over
//! [`NUDGE_TABLE`] picks the kind, then kinds with a variant slot draw one
//! option uniformly from [`variant_options`]. Both steps are plain functions
//! so they can be exercised without randomness.

use rand::seq::IndexedRandom;
use rand::{RngExt, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Placeholder in a nudge template that receives the drawn variant.
const VARIANT_SLOT: &str = "{variant}";

/// Kinds of creative directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NudgeKind {
    /// No directive; the builder designs freely.
    None,
    Counterbalance,
    HighlightTheWeird,
    Retro,
    ColorConstraint,
    TypographyFocus,
    Playful,
    Structural,
}

impl NudgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NudgeKind::None => "none",
            NudgeKind::Counterbalance => "counterbalance",
            NudgeKind::HighlightTheWeird => "highlight_the_weird",
            NudgeKind::Retro => "retro",
            NudgeKind::ColorConstraint => "color_constraint",
            NudgeKind::TypographyFocus => "typography_focus",
            NudgeKind::Playful => "playful",
            NudgeKind::Structural => "structural",
        }
    }
}

impl std::fmt::Display for NudgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the weighted nudge table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NudgeEntry {
    pub kind: NudgeKind,
    /// Relative weight; the table need not sum to 100.
    pub weight: u32,
    /// Directive text, possibly containing a variant slot.
    pub template: Option<&'static str>,
}

/// The nudge table.
pub const NUDGE_TABLE: &[NudgeEntry] = &[
    NudgeEntry {
        kind: NudgeKind::None,
        weight: 30,
        template: None,
    },
    NudgeEntry {
        kind: NudgeKind::Counterbalance,
        weight: 15,
        template: Some(
            "NUDGE: If today's news is heavy, consider responding with lightness, calm, or even quiet optimism. Somber news doesn't require somber design.",
        ),
    },
    NudgeEntry {
        kind: NudgeKind::HighlightTheWeird,
        weight: 15,
        template: Some(
            "NUDGE: Find the strangest or most surprising story. Let it drive the entire design, even if it's not the 'biggest' story.",
        ),
    },
    NudgeEntry {
        kind: NudgeKind::Retro,
        weight: 10,
        template: Some("NUDGE: Commit fully to a retro aesthetic today: {variant}."),
    },
    NudgeEntry {
        kind: NudgeKind::ColorConstraint,
        weight: 10,
        template: Some("NUDGE: Constrain your palette today: {variant}."),
    },
    NudgeEntry {
        kind: NudgeKind::TypographyFocus,
        weight: 8,
        template: Some(
            "NUDGE: Make typography the star today. Minimal decoration: let type hierarchy, spacing, and rhythm do all the work.",
        ),
    },
    NudgeEntry {
        kind: NudgeKind::Playful,
        weight: 7,
        template: Some(
            "NUDGE: Make something genuinely playful today. Whimsy, humor, delight, even if the news is serious. The contrast can be meaningful.",
        ),
    },
    NudgeEntry {
        kind: NudgeKind::Structural,
        weight: 5,
        template: Some("NUDGE: Try an unusual structure: {variant}."),
    },
];

pub const RETRO_STYLES: &[&str] = &[
    "90s web (under construction energy, tiled backgrounds, visitor counters)",
    "Teletext/Ceefax (blocky, broadcast, limited color palette)",
    "Early Mac (1-bit graphics, Chicago font, minimal OS aesthetic)",
    "DOS/terminal (text-mode interfaces, ANSI art, command prompts)",
    "Windows 98 (beveled buttons, system gray, desktop metaphor)",
];

pub const COLOR_CONSTRAINTS: &[&str] = &[
    "pure monochrome (black, white, gray only)",
    "strict duotone (pick two colors, nothing else)",
    "single accent (one bold color against neutrals)",
    "borrowed palette (steal colors from a specific painting or film)",
    "neon on dark (bright electric colors on black background)",
];

pub const STRUCTURAL_APPROACHES: &[&str] = &[
    "radical asymmetry",
    "extreme density (broadsheet-packed)",
    "radical minimalism (how much can you remove?)",
    "non-linear layout (let the eye wander)",
    "single dramatic focal point",
    "broken grid (intentionally violate layout rules)",
];

/// Secondary options for a kind; empty when the kind has no variant slot.
pub fn variant_options(kind: NudgeKind) -> &'static [&'static str] {
    match kind {
        NudgeKind::Retro => RETRO_STYLES,
        NudgeKind::ColorConstraint => COLOR_CONSTRAINTS,
        NudgeKind::Structural => STRUCTURAL_APPROACHES,
        _ => &[],
    }
}

/// Sum of all weights in a table.
pub fn total_weight(table: &[NudgeEntry]) -> u32 {
    table.iter().map(|entry| entry.weight).sum()
}

/// Maps a roll in `0..total_weight(table)` onto the table row it lands in.
///
/// Returns `None` when the roll is out of range.
pub fn kind_for_roll(table: &[NudgeEntry], roll: u32) -> Option<&NudgeEntry> {
    let mut cumulative = 0u32;
    for entry in table {
        cumulative += entry.weight;
        if roll < cumulative {
            return Some(entry);
        }
    }
    None
}

/// Builds the final nudge for a chosen row and optional variant.
pub fn resolve(entry: &NudgeEntry, variant: Option<&str>) -> Nudge {
    let text = entry.template.map(|template| match variant {
        Some(choice) => template.replace(VARIANT_SLOT, choice),
        None => template.to_string(),
    });

    Nudge {
        kind: entry.kind,
        text,
    }
}

/// A resolved creative directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nudge {
    pub kind: NudgeKind,
    pub text: Option<String>,
}

impl Nudge {
    /// The empty directive.
    pub fn none() -> Self {
        Self {
            kind: NudgeKind::None,
            text: None,
        }
    }

    /// Whether this nudge contributes anything to the prompt.
    pub fn is_active(&self) -> bool {
        self.kind != NudgeKind::None && self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Prompt block for this nudge, or an empty string for no directive.
    pub fn render(&self) -> String {
        match &self.text {
            Some(text) if self.is_active() => {
                format!("<creative_nudge>\n{}\n</creative_nudge>", text)
            }
            _ => String::new(),
        }
    }
}

/// Draws nudges from [`NUDGE_TABLE`].
#[derive(Debug, Clone)]
pub struct NudgeGenerator {
    rng: ChaCha8Rng,
}

impl NudgeGenerator {
    /// Creates a generator seeded from system entropy.
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }

    /// Creates a deterministic generator.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draws the next nudge.
    pub fn generate(&mut self) -> Nudge {
        let total = total_weight(NUDGE_TABLE);
        if total == 0 {
            return Nudge::none();
        }

        let roll = self.rng.random_range(0..total);
        let Some(entry) = kind_for_roll(NUDGE_TABLE, roll) else {
            return Nudge::none();
        };

        let variant = variant_options(entry.kind).choose(&mut self.rng).copied();
        resolve(entry, variant)
    }
}

impl Default for NudgeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
