//! Story scoring

pub mod lexical;
pub mod structural;
pub mod tense;

pub use lexical::{check_lexical_adherence, AdherenceReport};
pub use structural::{verify_structural_rules, StructuralReport};
pub use tense::{analyze_tense_resolution, TenseReport, TenseResolution};
