//! Syndication rendering: RSS 2.0, Atom, and hand-built
//! JSON Feed 1.1, all from the same `Vec<FeedEntry>`.

use atom_syndication::{
    Content as AtomContent, Entry as AtomEntry, Feed as AtomFeed, FixedDateTime, Link as AtomLink,
    Person as AtomPerson, Text as AtomText,
};
use courier_types::FeedEntry;
use rss::{CategoryBuilder, ChannelBuilder, ItemBuilder};
use serde_json::{json, Value};

pub fn render_rss(name: &str, home_url: &str, entries: &[FeedEntry]) -> String {
    let items: Vec<rss::Item> = entries
        .iter()
        .map(|e| {
            ItemBuilder::default()
                .title(Some(e.title.clone()))
                .link(Some(e.link.clone()))
                .description(Some(e.description.clone()))
                .author(e.author.clone())
                .pub_date(Some(e.published_at.to_rfc2822()))
                .categories(vec![CategoryBuilder::default().name(e.source.clone()).build()])
                .guid(Some(rss::GuidBuilder::default().value(e.id.clone()).permalink(false).build()))
                .build()
        })
        .collect();

    let channel = ChannelBuilder::default()
        .title(name.to_string())
        .link(home_url.to_string())
        .description(format!("{name} feed"))
        .items(items)
        .build();

    channel.to_string()
}

pub fn render_atom(name: &str, home_url: &str, entries: &[FeedEntry]) -> String {
    let atom_entries: Vec<AtomEntry> = entries
        .iter()
        .map(|e| {
            let mut entry = AtomEntry::default();
            entry.set_title(AtomText::plain(e.title.clone()));
            entry.set_id(e.id.clone());
            entry.set_updated(FixedDateTime::from(e.published_at));
            entry.set_links(vec![AtomLink {
                href: e.link.clone(),
                ..Default::default()
            }]);
            entry.set_summary(Some(AtomText::plain(e.description.clone())));
            entry.set_content(Some(AtomContent {
                value: Some(e.content.clone()),
                content_type: Some("html".to_string()),
                ..Default::default()
            }));
            if let Some(author) = &e.author {
                entry.set_authors(vec![AtomPerson {
                    name: author.clone(),
                    ..Default::default()
                }]);
            }
            entry
        })
        .collect();

    let mut feed = AtomFeed::default();
    feed.set_title(AtomText::plain(name.to_string()));
    feed.set_id(home_url.to_string());
    feed.set_links(vec![AtomLink {
        href: home_url.to_string(),
        ..Default::default()
    }]);
    feed.set_updated(
        entries
            .first()
            .map(|e| FixedDateTime::from(e.published_at))
            .unwrap_or_else(|| FixedDateTime::from(chrono::Utc::now())),
    );
    feed.set_entries(atom_entries);

    feed.to_string()
}

pub fn render_json_feed(name: &str, home_url: &str, entries: &[FeedEntry]) -> Value {
    let items: Vec<Value> = entries
        .iter()
        .map(|e| {
            json!({
                "id": e.id,
                "url": e.link,
                "title": e.title,
                "content_html": e.content,
                "summary": e.description,
                "image": e.image_url,
                "date_published": e.published_at.to_rfc3339(),
                "author": e.author.as_ref().map(|a| json!({"name": a})),
            })
        })
        .collect();

    json!({
        "version": "https://jsonfeed.org/version/1.1",
        "title": name,
        "home_page_url": home_url,
        "feed_url": format!("{home_url}/feed.json"),
        "items": items,
    })
}
