//! Brand-safety classification.
//!
//! This module decides which content items are sensitive and which
//! creatives fall into restricted categories, using configurable keyword
//! lists.

mod category;
mod keyword;
mod sensitivity;

pub use category::RestrictedCategoryMatcher;
pub use keyword::KeywordSet;
pub use sensitivity::ContentSafetyClassifier;
