pub mod accumulator;
pub mod cache;
pub mod fetcher;
pub mod handlers;
pub mod matcher;
pub mod planner;
pub mod posting;
pub mod provider;
pub mod ranker;
pub mod sanitize;
