//! Parses CSS-style selector queries into trees of evaluators that can be
//! matched against any document model implementing the [dom::Element]
//! capability trait.
//!
//! ```
//! use cssq::query::parse;
//! use cssq::select::Evaluator;
//!
//! let eval = parse("div.note").unwrap();
//! assert_eq!(
//!     eval,
//!     Evaluator::And(vec![
//!         Evaluator::Tag("div".to_string()),
//!         Evaluator::Class("note".to_string()),
//!     ])
//! );
//! ```

pub mod cli;
pub mod dom;
pub mod query;
pub mod select;
