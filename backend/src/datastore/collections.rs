//! Collection names in the hosted data store.

pub const BLOG_POSTS: &str = "blog_posts";
pub const COMMENTS: &str = "comments";
pub const EVENTS: &str = "events";
pub const RSVPS: &str = "rsvps";
pub const PROFILES: &str = "profiles";

/// Embedded-resource selector for the event title on an RSVP row.
pub const RSVP_EVENT_TITLE: &str = "events(title)";
