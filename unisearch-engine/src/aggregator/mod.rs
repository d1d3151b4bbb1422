//! Aggregate search: concurrent adapter fan-out and source-aware ranking.
//!
//! [`Aggregator`] runs every configured adapter on its own task under one
//! deadline, concatenates what came back, and orders it with
//! [`ranking::rank`].

pub mod ranking;
pub mod search;

pub use ranking::{rank, RankKey};
pub use search::{Aggregator, AggregatorBuilder};
