//! Demo content served by the dashboard endpoints.
//!
//! The records are fixtures rather than behaviour. They sit behind
//! [`ShowcaseProvider`] so a persistent source can replace [`StaticShowcase`]
//! without touching the HTTP layer; the filtering and paging rules live here.

mod fixtures;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use fixtures::StaticShowcase;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 50;
pub const DEFAULT_FEED_PAGE: usize = 1;
pub const DEFAULT_FEED_LIMIT: usize = 10;

/// Source of leaderboard, feed and profile records.
pub trait ShowcaseProvider: Send + Sync {
    /// Leaderboard entries ordered by rank.
    fn leaderboard(&self) -> Vec<LeaderboardEntry>;
    /// Feed posts, newest first, with timestamps relative to `now`.
    fn feed(&self, now: DateTime<Utc>) -> Vec<FeedPost>;
    /// Profile of the signed-in demo user.
    fn profile(&self) -> UserProfile;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardUser {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub avatar_url: String,
    pub level: u32,
    pub xp: u32,
    pub streak_count: u32,
    pub primary_domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user: LeaderboardUser,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardQuery {
    /// Case-insensitive substring of `primary_domain`; `None` or `all` disables filtering.
    pub domain: Option<String>,
    pub limit: usize,
}

impl Default for LeaderboardQuery {
    fn default() -> Self {
        Self {
            domain: None,
            limit: DEFAULT_LEADERBOARD_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardPage {
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Count after filtering, before the limit is applied.
    pub total: usize,
}

/// Filters entries by domain and truncates them to the requested limit.
pub fn query_leaderboard(
    entries: Vec<LeaderboardEntry>,
    query: &LeaderboardQuery,
) -> LeaderboardPage {
    let needle = query
        .domain
        .as_deref()
        .map(str::trim)
        .filter(|domain| !domain.is_empty() && !domain.eq_ignore_ascii_case("all"))
        .map(str::to_lowercase);

    let filtered: Vec<LeaderboardEntry> = match needle {
        Some(needle) => entries
            .into_iter()
            .filter(|entry| entry.user.primary_domain.to_lowercase().contains(&needle))
            .collect(),
        None => entries,
    };

    let total = filtered.len();
    let leaderboard = filtered.into_iter().take(query.limit).collect();
    LeaderboardPage { leaderboard, total }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedAuthor {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub avatar_url: String,
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCommunity {
    pub id: String,
    pub name: String,
    pub domain: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Text,
    Project,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserInteractions {
    pub liked: bool,
    pub bookmarked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPost {
    pub id: String,
    pub author: FeedAuthor,
    pub community: FeedCommunity,
    pub content: String,
    pub post_type: PostType,
    pub likes_count: u32,
    pub comments_count: u32,
    pub bookmarks_count: u32,
    pub created_at: DateTime<Utc>,
    pub user_interactions: UserInteractions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub page: usize,
    pub limit: usize,
    /// Exact community id filter.
    pub community: Option<String>,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_FEED_PAGE,
            limit: DEFAULT_FEED_LIMIT,
            community: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedPage {
    pub posts: Vec<FeedPost>,
    pub pagination: Pagination,
}

/// Filters posts by community and returns the requested page.
///
/// `page` and `limit` are clamped to at least one.
pub fn query_feed(posts: Vec<FeedPost>, query: &FeedQuery) -> FeedPage {
    let page = query.page.max(1);
    let limit = query.limit.max(1);

    let filtered: Vec<FeedPost> = match query.community.as_deref() {
        Some(community) => posts
            .into_iter()
            .filter(|post| post.community.id == community)
            .collect(),
        None => posts,
    };

    let total = filtered.len();
    let start = (page - 1).saturating_mul(limit);
    let end = start.saturating_add(limit);
    let posts = filtered.into_iter().skip(start).take(limit).collect();

    FeedPage {
        posts,
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
            has_next: end < total,
            has_prev: page > 1,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDomain {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub rarity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialHandle {
    pub platform: String,
    pub handle: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub avatar_url: String,
    pub bio: String,
    pub level: u32,
    pub xp: u32,
    pub streak_count: u32,
    pub global_rank: u32,
    pub domains: Vec<ProfileDomain>,
    pub badges: Vec<Badge>,
    pub social_handles: Vec<SocialHandle>,
}
