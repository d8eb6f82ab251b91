//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use tracing::instrument;

use crate::filters;

// =============================================================================
// Hero Configuration (static content)
// =============================================================================

/// The banner at the top of the home page.
#[derive(Clone)]
pub struct Hero {
    pub eyebrow: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub button_text: &'static str,
    pub button_url: &'static str,
}

impl Default for Hero {
    fn default() -> Self {
        Self {
            eyebrow: "Learn by building",
            title: "Courses for people who ship",
            subtitle: "Practical programming courses, written and maintained by working engineers.",
            button_text: "Get in touch",
            button_url: "/contact",
        }
    }
}

/// A card linking to another part of the site.
#[derive(Clone)]
pub struct QuickLink {
    pub title: &'static str,
    pub blurb: &'static str,
    pub href: &'static str,
}

/// Cards shown under the hero.
pub const QUICK_LINKS: [QuickLink; 3] = [
    QuickLink {
        title: "Help Center",
        blurb: "Answers about accounts, billing and course access.",
        href: "/help",
    },
    QuickLink {
        title: "Contact us",
        blurb: "Questions the help center doesn't cover? Write to the team.",
        href: "/contact",
    },
    QuickLink {
        title: "Privacy",
        blurb: "What we collect and how we use it.",
        href: "/privacy",
    },
];

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub hero: Hero,
    pub links: [QuickLink; 3],
}

/// Display the home page.
#[instrument]
pub async fn home() -> HomeTemplate {
    HomeTemplate {
        hero: Hero::default(),
        links: QUICK_LINKS,
    }
}
