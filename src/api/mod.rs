pub mod client;
pub mod feed;
pub mod models;
pub mod typeahead;

pub use client::{ApiClient, ApiError, PostSubmission};
pub use feed::FeedPager;
pub use typeahead::TypeaheadSearcher;
