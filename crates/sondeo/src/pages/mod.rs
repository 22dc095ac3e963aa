//! Concrete pages of the search front end.
//!
//! Control moves Search → Results on submit, Results → Results on pagination
//! or tab switch, and Results → Search through the logo. Neither page verifies
//! the transition; callers assert it.

pub mod results;
pub mod search;

pub use results::ResultsPage;
pub use search::SearchPage;
