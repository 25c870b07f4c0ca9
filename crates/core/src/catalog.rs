use serde::Serialize;

/// A career-interest category offered during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CareerDomain {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub subdomains: &'static [&'static str],
}

pub const CAREER_DOMAINS: &[CareerDomain] = &[
    CareerDomain {
        id: "ai-ml",
        name: "AI/Machine Learning",
        icon: "🤖",
        subdomains: &["ML Engineer", "AI Researcher", "Prompt Engineer", "Data Scientist"],
    },
    CareerDomain {
        id: "cybersecurity",
        name: "Cybersecurity",
        icon: "🔒",
        subdomains: &["Security Analyst", "Penetration Tester", "CISO", "Ethical Hacker"],
    },
    CareerDomain {
        id: "ui-ux",
        name: "UI/UX Design",
        icon: "🎨",
        subdomains: &["UI Designer", "UX Researcher", "Product Designer", "Design Systems"],
    },
    CareerDomain {
        id: "development",
        name: "Software Development",
        icon: "💻",
        subdomains: &[
            "Frontend Developer",
            "Backend Developer",
            "Full Stack",
            "DevOps Engineer",
        ],
    },
    CareerDomain {
        id: "marketing",
        name: "Digital Marketing",
        icon: "📈",
        subdomains: &[
            "Growth Marketer",
            "Content Creator",
            "SEO Specialist",
            "Social Media Manager",
        ],
    },
    CareerDomain {
        id: "law",
        name: "Law & Legal",
        icon: "⚖️",
        subdomains: &["Corporate Lawyer", "Legal Tech", "Compliance Officer", "Patent Attorney"],
    },
    CareerDomain {
        id: "medicine",
        name: "Medicine & Healthcare",
        icon: "🏥",
        subdomains: &["Doctor", "Medical Researcher", "Healthcare Tech", "Biotech"],
    },
    CareerDomain {
        id: "politics",
        name: "Politics & Policy",
        icon: "🏛️",
        subdomains: &["Policy Analyst", "Campaign Manager", "Public Affairs", "Diplomat"],
    },
    CareerDomain {
        id: "film",
        name: "Film & Media",
        icon: "🎬",
        subdomains: &["Director", "Producer", "Cinematographer", "Editor"],
    },
    CareerDomain {
        id: "music",
        name: "Music & Audio",
        icon: "🎵",
        subdomains: &["Music Producer", "Sound Engineer", "Composer", "Audio Designer"],
    },
    CareerDomain {
        id: "business",
        name: "Business & Finance",
        icon: "💼",
        subdomains: &[
            "Product Manager",
            "Business Analyst",
            "Investment Banking",
            "Consulting",
        ],
    },
    CareerDomain {
        id: "teaching",
        name: "Education & Teaching",
        icon: "📚",
        subdomains: &[
            "Teacher",
            "Educational Tech",
            "Curriculum Designer",
            "Academic Research",
        ],
    },
    CareerDomain {
        id: "agriculture",
        name: "Agriculture & Sustainability",
        icon: "🌱",
        subdomains: &[
            "Agricultural Engineer",
            "Sustainability Consultant",
            "Food Tech",
            "Environmental Scientist",
        ],
    },
];
