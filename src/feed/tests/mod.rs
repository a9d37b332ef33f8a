use super::*;
use crate::config::HttpConfig;
use crate::utils::http_client;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SINGLE_ITEM_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Test Show</title>
        <link>https://site</link>
        <description>Test podcast</description>
        <item>
            <title>T</title>
            <link>https://site/ep/42</link>
            <pubDate>Mon, 01 Jan 2024</pubDate>
            <description>D</description>
            <enclosure url="https://cdn/42.mp3" length="1234" type="audio/mpeg"/>
        </item>
    </channel>
</rss>"#;

fn feed_with_items(items: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Test Show</title>
        <link>https://site</link>
        <description>Test podcast</description>
        {items}
    </channel>
</rss>"#
    )
}

fn fetcher_for(url: String) -> FeedFetcher {
    FeedFetcher::new(http_client(&HttpConfig::default()).unwrap(), url)
}

#[test]
fn test_parse_single_item() {
    let episodes = parse_feed(SINGLE_ITEM_FEED.as_bytes()).expect("Failed to parse RSS");

    assert_eq!(
        episodes,
        vec![EpisodeRecord {
            link: "https://site/ep/42".to_string(),
            title: "T".to_string(),
            pub_date: "Mon, 01 Jan 2024".to_string(),
            description: "D".to_string(),
            audio_url: "https://cdn/42.mp3".to_string(),
        }]
    );
}

#[test]
fn test_parse_keeps_feed_order_and_raw_text() {
    let content = feed_with_items(
        r#"
        <item>
            <title>Newest</title>
            <link>https://site/ep/3</link>
            <pubDate>Wed, 03 Jan 2024 17:00:00 -0500</pubDate>
            <description><![CDATA[<p>Rich <b>HTML</b></p>]]></description>
            <enclosure url="https://cdn/3.mp3" length="0" type="audio/mpeg"/>
        </item>
        <item>
            <title>Older</title>
            <link>https://site/ep/2</link>
            <pubDate>not a date at all</pubDate>
            <description>plain</description>
            <enclosure url="https://cdn/2.mp3" length="0" type="audio/mpeg"/>
        </item>
        "#,
    );

    let episodes = parse_feed(content.as_bytes()).unwrap();

    assert_eq!(episodes.len(), 2);
    assert_eq!(episodes[0].link, "https://site/ep/3");
    assert_eq!(episodes[1].link, "https://site/ep/2");
    // dates are not reparsed, even when they are not RFC 2822
    assert_eq!(episodes[0].pub_date, "Wed, 03 Jan 2024 17:00:00 -0500");
    assert_eq!(episodes[1].pub_date, "not a date at all");
    assert_eq!(episodes[0].description, "<p>Rich <b>HTML</b></p>");
}

#[test]
fn test_parse_invalid_feed() {
    let result = parse_feed(b"This is not XML at all!");
    assert!(
        matches!(result, Err(FetchError::Parse(_))),
        "got {result:?}"
    );
}

#[test]
fn test_parse_non_rss_root() {
    let atom = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Atom</title>
    <id>urn:x</id>
    <updated>2024-01-01T00:00:00Z</updated>
</feed>"#;

    assert!(matches!(parse_feed(atom.as_bytes()), Err(FetchError::Parse(_))));
}

#[test]
fn test_parse_channel_without_items() {
    let result = parse_feed(feed_with_items("").as_bytes());
    assert!(matches!(result, Err(FetchError::NoEpisodes)), "got {result:?}");
}

#[test]
fn test_parse_missing_fields_fail_fast() {
    let complete = r#"
        <item>
            <title>Fine</title>
            <link>https://site/ep/1</link>
            <pubDate>Mon, 01 Jan 2024</pubDate>
            <description>ok</description>
            <enclosure url="https://cdn/1.mp3" length="0" type="audio/mpeg"/>
        </item>"#;

    let cases = [
        (
            r#"<item><title>x</title><pubDate>d</pubDate><description>x</description>
               <enclosure url="https://cdn/2.mp3" length="0" type="audio/mpeg"/></item>"#,
            "link",
        ),
        (
            r#"<item><link>https://site/ep/2</link><pubDate>d</pubDate><description>x</description>
               <enclosure url="https://cdn/2.mp3" length="0" type="audio/mpeg"/></item>"#,
            "title",
        ),
        (
            r#"<item><title>x</title><link>https://site/ep/2</link><description>x</description>
               <enclosure url="https://cdn/2.mp3" length="0" type="audio/mpeg"/></item>"#,
            "pubDate",
        ),
        (
            r#"<item><title>x</title><link>https://site/ep/2</link><pubDate>d</pubDate>
               <enclosure url="https://cdn/2.mp3" length="0" type="audio/mpeg"/></item>"#,
            "description",
        ),
        (
            r#"<item><title>x</title><link>https://site/ep/2</link><pubDate>d</pubDate>
               <description>x</description></item>"#,
            "enclosure@url",
        ),
        (
            r#"<item><title>x</title><link>   </link><pubDate>d</pubDate>
               <description>x</description>
               <enclosure url="https://cdn/2.mp3" length="0" type="audio/mpeg"/></item>"#,
            "link",
        ),
    ];

    for (broken, expected_field) in cases {
        let content = feed_with_items(&format!("{complete}{broken}"));
        match parse_feed(content.as_bytes()) {
            Err(FetchError::MissingField { index, field }) => {
                assert_eq!(index, 1, "broken item is the second one");
                assert_eq!(field, expected_field);
            }
            other => panic!("expected missing '{expected_field}', got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/rss+xml")
                .set_body_string(SINGLE_ITEM_FEED),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(format!("{}/feed", mock_server.uri()));
    let episodes = fetcher.fetch().await.unwrap();

    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0].audio_url, "https://cdn/42.mp3");
}

#[tokio::test]
async fn test_fetch_http_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let url = format!("{}/feed", mock_server.uri());
    let result = fetcher_for(url.clone()).fetch().await;

    match result {
        Err(FetchError::Status { url: u, status }) => {
            assert_eq!(u, url);
            assert_eq!(status, 503);
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<rss><channel>"))
        .mount(&mock_server)
        .await;

    let result = fetcher_for(format!("{}/feed", mock_server.uri()))
        .fetch()
        .await;
    assert!(matches!(result, Err(FetchError::Parse(_))), "got {result:?}");
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    // Bind then drop a listener to get a port nobody is listening on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let result = fetcher_for(format!("http://127.0.0.1:{port}/feed"))
        .fetch()
        .await;
    assert!(
        matches!(result, Err(FetchError::Request { .. })),
        "got {result:?}"
    );
}

#[tokio::test]
async fn test_fetch_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SINGLE_ITEM_FEED)
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let client = http_client(&HttpConfig {
        timeout: Duration::from_millis(200),
        ..HttpConfig::default()
    })
    .unwrap();
    let fetcher = FeedFetcher::new(client, format!("{}/feed", mock_server.uri()));

    match fetcher.fetch().await {
        Err(FetchError::Request { source, .. }) => assert!(source.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_decodes_latin1_feed_by_prolog() {
    let mock_server = MockServer::start().await;

    let xml = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<rss version="2.0">
<channel>
    <title>Show</title>
    <link>https://site</link>
    <description>Show</description>
    <item>
        <title>Café</title>
        <link>https://site/ep/7</link>
        <pubDate>Mon, 01 Jan 2024</pubDate>
        <description>Crème brûlée</description>
        <enclosure url="https://cdn/7.mp3" length="0" type="audio/mpeg"/>
    </item>
</channel>
</rss>"#;
    // Every char is below U+0100, so this is the Latin-1 encoding
    let latin1: Vec<u8> = xml.chars().map(|c| c as u8).collect();
    assert!(std::str::from_utf8(&latin1).is_err());

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/rss+xml")
                .set_body_bytes(latin1),
        )
        .mount(&mock_server)
        .await;

    let episodes = fetcher_for(format!("{}/feed", mock_server.uri()))
        .fetch()
        .await
        .unwrap();

    assert_eq!(episodes[0].title, "Café");
    assert_eq!(episodes[0].description, "Crème brûlée");
}
