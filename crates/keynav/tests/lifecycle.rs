//! Listener lifecycle across client-side navigation, and config files

use std::io::Write;

use keynav::{
    Config, ConfigError, Direction, DocumentSession, KeyOutcome, KeyboardEvent, PatternTable,
    ResolvedConfig, SitePattern,
};
use keynav_dom::{DOMRect, Document, EventTarget, EventType, NodeId};

fn keydown_listeners(doc: &Document) -> usize {
    doc.listener_count(EventTarget::Document, EventType::KeyDown)
}

fn two_site_session() -> DocumentSession {
    let patterns = PatternTable::new(vec![
        SitePattern::new("^https://shop\\.test/search\\?", ".result", "h2 a").unwrap(),
        SitePattern::new("^https://shop\\.test/", ".banner", "a").unwrap(),
        SitePattern::new("^https://news\\.test/", "tr.story", ".title > a").unwrap(),
    ]);
    DocumentSession::new(ResolvedConfig { patterns, ..ResolvedConfig::default() })
}

#[test]
fn test_one_listener_per_matched_pattern() {
    let mut doc = Document::new("https://shop.test/search?q=rust");
    let mut session = two_site_session();

    assert_eq!(session.start(&mut doc), 2);
    assert_eq!(keydown_listeners(&doc), 2);
    let patterns: Vec<usize> = session.installed().iter().map(|(p, _)| *p).collect();
    assert_eq!(patterns, vec![0, 1]);

    let sequence = [
        ("https://shop.test/", 1),
        ("https://news.test/item?id=1", 1),
        ("https://elsewhere.test/", 0),
        ("https://shop.test/search?q=books", 2),
        ("https://shop.test/search?q=books", 2),
    ];
    for (url, expected) in sequence {
        assert_eq!(session.navigate(&mut doc, url), expected, "{url}");
        assert_eq!(keydown_listeners(&doc), expected, "{url}");
        assert_eq!(session.installed().len(), expected, "{url}");
    }

    session.stop(&mut doc);
    assert_eq!(keydown_listeners(&doc), 0);
    assert!(session.installed().is_empty());
}

#[test]
fn test_stale_listener_ids_are_not_reused() {
    let mut doc = Document::new("https://news.test/");
    let mut session = two_site_session();
    session.start(&mut doc);
    let before = session.installed();

    session.navigate(&mut doc, "https://news.test/newest");
    let after = session.installed();
    assert_eq!(before.len(), after.len());
    assert_ne!(before[0].1, after[0].1);
    assert!(doc.listeners().get(before[0].1).is_none());
}

#[test]
fn test_navigation_after_route_change() {
    let mut doc = Document::new("https://elsewhere.test/");
    let body = doc.body();
    let table = doc.append_element(body, "table", &[]);
    let mut links = Vec::new();
    for i in 0..2 {
        let row = doc.append_element(table, "tr", &[("class", "story")]);
        doc.set_layout_rect(row, DOMRect::from_xywh(0.0, 30.0 * i as f64, 800.0, 30.0));
        let cell = doc.append_element(row, "td", &[("class", "title")]);
        links.push(doc.append_element(cell, "a", &[("href", "#")]));
    }
    let mut session = two_site_session();
    session.start(&mut doc);

    let outcome = session.dispatch_keydown(&mut doc, &mut KeyboardEvent::new("j"));
    assert!(!outcome.is_consumed());
    assert_eq!(doc.active_element(), None);

    session.navigate(&mut doc, "https://news.test/");
    session.dispatch_keydown(&mut doc, &mut KeyboardEvent::new("j"));
    let outcome = session.dispatch_keydown(&mut doc, &mut KeyboardEvent::new("j"));
    assert!(matches!(outcome, KeyOutcome::Moved { target, .. } if target == links[1]));
}

/// A banner above two search results; `with_links` decides whether the
/// results carry an `h2 a` focus target
fn search_page(with_links: bool) -> (Document, Vec<NodeId>, NodeId, NodeId) {
    let mut doc = Document::new("https://shop.test/search?q=rust");
    let body = doc.body();
    let banner = doc.append_element(body, "div", &[("class", "banner")]);
    doc.set_layout_rect(banner, DOMRect::from_xywh(0.0, 0.0, 800.0, 50.0));
    let banner_link = doc.append_element(banner, "a", &[("href", "/sale")]);

    let mut result_links = Vec::new();
    for i in 0..2 {
        let result = doc.append_element(body, "div", &[("class", "result")]);
        doc.set_layout_rect(result, DOMRect::from_xywh(0.0, 60.0 + 100.0 * i as f64, 800.0, 90.0));
        if with_links {
            let h2 = doc.append_element(result, "h2", &[]);
            result_links.push(doc.append_element(h2, "a", &[("href", "/item")]));
        } else {
            doc.append_element(result, "p", &[]);
        }
    }
    (doc, result_links, banner, banner_link)
}

#[test]
fn test_first_listener_to_move_stops_the_rest() {
    let (mut doc, result_links, banner, banner_link) = search_page(true);
    let mut session = two_site_session();
    assert_eq!(session.start(&mut doc), 2);

    let mut event = KeyboardEvent::new("j");
    let outcome = session.dispatch_keydown(&mut doc, &mut event);
    assert!(matches!(outcome, KeyOutcome::Moved { target, .. } if target == result_links[0]));
    assert!(event.default_prevented());
    assert!(event.propagation_stopped());

    // the banner listener never ran: it would have taken focus and outlined the banner
    assert_eq!(doc.active_element(), Some(result_links[0]));
    assert_eq!(doc.style_property(banner, "outline"), None);
    assert_ne!(doc.active_element(), Some(banner_link));
}

#[test]
fn test_later_listener_moves_when_earlier_has_no_candidate() {
    let (mut doc, result_links, banner, banner_link) = search_page(false);
    assert!(result_links.is_empty());
    let mut session = two_site_session();
    assert_eq!(session.start(&mut doc), 2);

    let mut event = KeyboardEvent::new("j");
    let outcome = session.dispatch_keydown(&mut doc, &mut event);
    assert_eq!(
        outcome,
        KeyOutcome::Moved { direction: Direction::Down, item: banner, target: banner_link }
    );
    assert!(event.default_prevented());
    assert_eq!(doc.active_element(), Some(banner_link));
    assert_eq!(doc.style_property(banner, "outline"), Some("auto"));
}

#[test]
fn test_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "keys": {{ "s": "down", "w": "up" }},
            "replace_builtin_patterns": true,
            "patterns": [{{ "url": "^https://list\\.test/", "container": "li", "link": "a" }}],
            "outline": {{ "item": "3px solid green" }}
        }}"#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    let mut session = DocumentSession::new(config.resolve().unwrap());
    assert_eq!(session.patterns().len(), 1);

    let mut doc = Document::new("https://list.test/");
    let body = doc.body();
    let ul = doc.append_element(body, "ul", &[]);
    let li = doc.append_element(ul, "li", &[]);
    doc.set_layout_rect(li, DOMRect::from_xywh(0.0, 0.0, 100.0, 20.0));
    doc.append_element(li, "a", &[("href", "#")]);

    session.start(&mut doc);
    assert!(session.dispatch_keydown(&mut doc, &mut KeyboardEvent::new("s")).is_consumed());
    assert_eq!(doc.style_property(li, "outline"), Some("3px solid green"));
}

#[test]
fn test_config_file_errors() {
    let missing = tempfile::tempdir().unwrap().path().join("absent.json");
    assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{ "patterns": [{ "url": "(", "container": "li", "link": "a" }] }"#).unwrap();
    let config = Config::load(file.path()).unwrap();
    let err = config.resolve().unwrap_err();
    assert!(matches!(err, ConfigError::Pattern { index: 0, .. }));
    assert!(err.to_string().starts_with("site pattern 0"));
}
