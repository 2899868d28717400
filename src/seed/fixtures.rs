//! Embedded demo data.
//!
//! The demo dataset is a small `posts` collection. Each fixture is identified
//! by its slug, which the seeder uses as the natural key for idempotent
//! upserts.

use serde::Deserialize;

/// Name of the demo collection.
pub const DEMO_COLLECTION: &str = "posts";

/// One demo record to seed.
#[derive(Debug, Clone, Copy)]
pub struct Fixture {
    /// Natural key; unique across the demo dataset.
    pub slug: &'static str,
    /// Post title.
    pub title: &'static str,
    /// Post body.
    pub body: &'static str,
    /// Whether the post is published.
    pub published: bool,
}

impl Fixture {
    /// Filter expression selecting this fixture by its natural key.
    #[must_use]
    pub fn filter(&self) -> String {
        format!("slug = '{}'", self.slug)
    }

    /// The record body sent to the create route.
    #[must_use]
    pub fn to_record(&self) -> serde_json::Value {
        serde_json::json!({
            "slug": self.slug,
            "title": self.title,
            "body": self.body,
            "published": self.published,
        })
    }
}

/// The demo records.
pub const FIXTURES: &[Fixture] = &[
    Fixture {
        slug: "welcome",
        title: "Welcome to the demo",
        body: "This instance was seeded automatically. Log into the admin UI to poke around.",
        published: true,
    },
    Fixture {
        slug: "getting-started",
        title: "Getting started",
        body: "Records in this collection are plain posts with a slug, a title and a body.",
        published: true,
    },
    Fixture {
        slug: "rest-api",
        title: "Using the REST API",
        body: "Every record here is reachable under /api/collections/posts/records.",
        published: true,
    },
    Fixture {
        slug: "drafts-example",
        title: "An unpublished draft",
        body: "Unpublished posts demonstrate boolean fields in list filters.",
        published: false,
    },
];

/// Collection definition sent when the demo collection does not exist yet.
#[must_use]
pub fn collection_schema() -> serde_json::Value {
    serde_json::json!({
        "name": DEMO_COLLECTION,
        "type": "base",
        "fields": [
            { "name": "slug", "type": "text", "required": true },
            { "name": "title", "type": "text", "required": true },
            { "name": "body", "type": "text", "required": false },
            { "name": "published", "type": "bool", "required": false },
        ],
    })
}

/// A seeded record as read back from the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct DemoPost {
    /// Record id assigned by the backend.
    pub id: String,
    /// Natural key.
    pub slug: String,
    /// Post title.
    pub title: String,
    /// Post body.
    #[serde(default)]
    pub body: String,
    /// Whether the post is published.
    #[serde(default)]
    pub published: bool,
}
