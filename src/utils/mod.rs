//! Shared utility functions for news-forge.
//!
//! This module provides common utilities used across multiple modules,
//! including JSON extraction from LLM responses.

pub mod json_extraction;

pub use json_extraction::{
    analyze_json_structure, clean_response, slice_outer_object, strip_code_fence,
    truncation_hint, JsonStructureAnalysis,
};
