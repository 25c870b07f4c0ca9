use chrono::{DateTime, Duration, Utc};

use super::{
    Badge, FeedAuthor, FeedCommunity, FeedPost, LeaderboardEntry, LeaderboardUser, PostType,
    ProfileDomain, ShowcaseProvider, SocialHandle, UserInteractions, UserProfile,
};

const PLACEHOLDER_AVATAR_32: &str = "/placeholder.svg?height=32&width=32";
const PLACEHOLDER_AVATAR_40: &str = "/placeholder.svg?height=40&width=40";

/// Fixed in-memory records used in development and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticShowcase;

fn ranked(
    rank: u32,
    id: &str,
    username: &str,
    full_name: &str,
    (level, xp, streak_count): (u32, u32, u32),
    primary_domain: &str,
) -> LeaderboardEntry {
    LeaderboardEntry {
        rank,
        user: LeaderboardUser {
            id: id.to_string(),
            username: username.to_string(),
            full_name: full_name.to_string(),
            avatar_url: PLACEHOLDER_AVATAR_32.to_string(),
            level,
            xp,
            streak_count,
            primary_domain: primary_domain.to_string(),
        },
    }
}

fn author(id: &str, username: &str, full_name: &str, badges: [&str; 2]) -> FeedAuthor {
    FeedAuthor {
        id: id.to_string(),
        username: username.to_string(),
        full_name: full_name.to_string(),
        avatar_url: PLACEHOLDER_AVATAR_40.to_string(),
        badges: badges.iter().map(|b| b.to_string()).collect(),
    }
}

fn community(id: &str, name: &str, domain: &str) -> FeedCommunity {
    FeedCommunity {
        id: id.to_string(),
        name: name.to_string(),
        domain: domain.to_string(),
    }
}

impl ShowcaseProvider for StaticShowcase {
    fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        vec![
            ranked(
                1,
                "user-1",
                "emma_thompson",
                "Emma Thompson",
                (8, 5420, 45),
                "Artificial Intelligence",
            ),
            ranked(
                2,
                "user-2",
                "david_kim",
                "David Kim",
                (7, 4890, 38),
                "Software Development",
            ),
            ranked(
                3,
                "user-3",
                "lisa_wang",
                "Lisa Wang",
                (7, 4650, 42),
                "Data Science",
            ),
            ranked(
                4,
                "current-user",
                "you",
                "You",
                (3, 1250, 7),
                "Multiple",
            ),
            ranked(
                5,
                "user-5",
                "john_smith",
                "John Smith",
                (2, 1180, 15),
                "Marketing",
            ),
        ]
    }

    fn feed(&self, now: DateTime<Utc>) -> Vec<FeedPost> {
        vec![
            FeedPost {
                id: "1".to_string(),
                author: author(
                    "user-1",
                    "sarah_chen",
                    "Sarah Chen",
                    ["ML Expert", "Top Contributor"],
                ),
                community: community("ai-community", "AI Community", "Artificial Intelligence"),
                content: "Just completed my first machine learning project! Built a recommendation system using collaborative filtering. The results were amazing - 85% accuracy! 🚀".to_string(),
                post_type: PostType::Project,
                likes_count: 24,
                comments_count: 8,
                bookmarks_count: 5,
                created_at: now - Duration::hours(2),
                user_interactions: UserInteractions::default(),
            },
            FeedPost {
                id: "2".to_string(),
                author: author(
                    "user-2",
                    "alex_rodriguez",
                    "Alex Rodriguez",
                    ["Security Guru", "Mentor"],
                ),
                community: community(
                    "cybersecurity-community",
                    "Cybersecurity Community",
                    "Cybersecurity",
                ),
                content: "Sharing my latest penetration testing methodology. Found 3 critical vulnerabilities in a client's system. Always remember: security is not a feature, it's a foundation! 🔒".to_string(),
                post_type: PostType::Text,
                likes_count: 31,
                comments_count: 12,
                bookmarks_count: 8,
                created_at: now - Duration::hours(4),
                user_interactions: UserInteractions {
                    liked: true,
                    bookmarked: false,
                },
            },
            FeedPost {
                id: "3".to_string(),
                author: author(
                    "user-3",
                    "maya_patel",
                    "Maya Patel",
                    ["Design Master", "UX Champion"],
                ),
                community: community("design-community", "Design Community", "Design"),
                content: "New UI design for a fintech app! Focused on accessibility and user experience. The client loved the clean, modern approach. Design is not just how it looks, but how it works! ✨".to_string(),
                post_type: PostType::Project,
                likes_count: 18,
                comments_count: 5,
                bookmarks_count: 12,
                created_at: now - Duration::hours(6),
                user_interactions: UserInteractions {
                    liked: false,
                    bookmarked: true,
                },
            },
        ]
    }

    fn profile(&self) -> UserProfile {
        let badge = |id: &str, name: &str, icon: &str, rarity: &str| Badge {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            rarity: rarity.to_string(),
        };
        let domain = |slug: &str, name: &str| ProfileDomain {
            id: slug.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
        };
        let handle = |platform: &str, handle: &str, url: &str| SocialHandle {
            platform: platform.to_string(),
            handle: handle.to_string(),
            url: url.to_string(),
        };

        UserProfile {
            id: "user-123".to_string(),
            username: "john_doe".to_string(),
            full_name: "John Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            avatar_url: "/placeholder.svg?height=80&width=80".to_string(),
            bio: "Passionate about technology and continuous learning".to_string(),
            level: 5,
            xp: 2750,
            streak_count: 12,
            global_rank: 156,
            domains: vec![
                domain("ai", "Artificial Intelligence"),
                domain("software", "Software Development"),
            ],
            badges: vec![
                badge("early-adopter", "Early Adopter", "🚀", "rare"),
                badge("streak-master", "Streak Master", "🔥", "common"),
                badge("community-helper", "Community Helper", "🤝", "common"),
            ],
            social_handles: vec![
                handle("github", "johndoe", "https://github.com/johndoe"),
                handle("linkedin", "john-doe", "https://linkedin.com/in/john-doe"),
            ],
        }
    }
}
