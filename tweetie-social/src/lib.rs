//! Social network clients and the normalization pipeline behind the Tweetie views.
//!
//! Only the Twitter v1.1 REST surface is implemented: a user's recent original posts and
//! the accounts they follow, one page of at most 100 records each.
pub mod twitter;
