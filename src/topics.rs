//! Topic Cache
//!
//! Typed cache of census topics, with a mock update function standing in for
//! a topic API client.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::cache::{Cache, TypedCache};
use crate::config::CacheConfig;
use crate::error::Result;

/// Key the demo server stores its topic under.
pub const MAIN_TOPIC_KEY: &str = "main_topic";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubTopicItem {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicItem {
    pub id: u64,
    pub name: String,
    pub sub_topics: Vec<SubTopicItem>,
}

/// Cache holding `TopicItem`s.
pub type TopicCache = TypedCache<TopicItem>;

/// Creates a topic cache refreshing every `update_interval`, or loading once
/// when `None`.
pub fn new_topic_cache(update_interval: Option<Duration>) -> Result<TopicCache> {
    let cache = Cache::new(CacheConfig { update_interval })?;
    Ok(TypedCache::new(cache))
}

const SUB_TOPICS: [(u64, &str); 3] = [(8341, "age"), (2223, "Migration"), (7845, "Sex")];

/// Returns a mock topic producer.
///
/// Each call yields a "Census" topic with a fresh id, rotating through three
/// sub-topics.
pub fn update_topic() -> impl Fn() -> anyhow::Result<TopicItem> + Send + Sync + 'static {
    let calls = Arc::new(AtomicUsize::new(0));
    let next_id = Arc::new(AtomicU64::new(1));

    move || {
        let (id, name) = SUB_TOPICS[calls.fetch_add(1, Ordering::Relaxed) % SUB_TOPICS.len()];

        Ok(TopicItem {
            id: next_id.fetch_add(1, Ordering::Relaxed) + 1,
            name: "Census".to_string(),
            sub_topics: vec![SubTopicItem {
                id,
                name: name.to_string(),
            }],
        })
    }
}
