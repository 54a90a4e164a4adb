//! Models used to load and save Pokemon records, and to validate submitted data.

pub mod pokemon;
