use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use autoindex::Entry;
use autoindex::Error;
use autoindex::Format;
use autoindex::HttpFetcher;
use autoindex::TraverseOptions;
use autoindex::test_utils::ListingFixture;
use autoindex::traverse;
use autoindex::traverse_with;
use chrono::TimeZone;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

async fn serve(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .and(header("x-mirror-token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn unicode_mirror() -> MockServer {
    let server = MockServer::start().await;
    let t = Utc.with_ymd_and_hms(2022, 9, 13, 18, 3, 0).unwrap();

    let root = ListingFixture::new("/")
        .with_file("ReadMe.txt", t)
        .with_directory("15.0.0", t)
        .with_directory("missing", t);
    let version = ListingFixture::new("/cdn/")
        .with_directory("ucd", t)
        .with_file("UnicodeData.txt", t);
    let ucd = ListingFixture::new("/cdn/15.0.0/")
        .with_file("Blocks.txt", t)
        .with_file("Scripts.txt", t);

    serve(&server, "/cdn/", root.render(Format::Table)).await;
    serve(&server, "/cdn/15.0.0/", version.render(Format::Preformatted)).await;
    serve(&server, "/cdn/15.0.0/ucd/", ucd.render(Format::List)).await;
    server
}

fn find<'a>(entries: &'a [Entry], name: &str) -> &'a Entry {
    entries
        .iter()
        .find(|e| e.name() == name)
        .unwrap_or_else(|| panic!("{name} not found"))
}

#[tokio::test]
async fn walks_mixed_layouts_over_http() {
    let server = unicode_mirror().await;
    let files = Arc::new(AtomicUsize::new(0));
    let counter = files.clone();
    let options = TraverseOptions::new()
        .with_base_path("cdn")
        .with_header("x-mirror-token", "secret")
        .on_file(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async {}
        });

    let root_url = format!("{}/cdn/", server.uri());
    let entries = traverse(&root_url, &options).await.unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(find(&entries, "ReadMe.txt").path(), "/cdn/ReadMe.txt");
    assert_eq!(
        find(&entries, "missing").children(),
        Some(&[][..]),
        "unserved directory resolves empty"
    );

    let version = find(&entries, "15.0.0");
    assert_eq!(version.path(), "/cdn/15.0.0/");
    let ucd = find(version.children().unwrap(), "ucd");
    assert_eq!(ucd.path(), "/cdn/15.0.0/ucd/");
    let blocks = find(ucd.children().unwrap(), "Blocks.txt");
    assert_eq!(blocks.path(), "/cdn/15.0.0/ucd/Blocks.txt");
    // The list layout has no timestamps.
    assert!(blocks.last_modified().is_none());
    assert!(
        find(version.children().unwrap(), "UnicodeData.txt")
            .last_modified()
            .is_some()
    );

    assert_eq!(files.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn missing_header_degrades_to_empty() {
    let server = unicode_mirror().await;
    let root_url = format!("{}/cdn/", server.uri());
    let entries = traverse_with(&HttpFetcher::new(5_000), &root_url, &TraverseOptions::new())
        .await
        .unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn status_failure_names_the_answering_url() {
    let server = unicode_mirror().await;
    let errors = Arc::new(Mutex::new(vec![]));
    let seen = errors.clone();
    let options = TraverseOptions::new()
        .with_header("x-mirror-token", "secret")
        .on_error(move |url, err| {
            seen.lock().unwrap().push((url, err));
            async {}
        });

    let root_url = format!("{}/cdn/", server.uri());
    traverse(&root_url, &options).await.unwrap();

    let missing = format!("{}/cdn/missing/", server.uri());
    let errors = errors.lock().unwrap();
    assert_eq!(
        *errors,
        [(
            missing.clone(),
            Error::Status {
                url: missing,
                status: 404
            }
        )]
    );
}

#[tokio::test]
async fn cancelling_mid_flight_empties_only_the_pending_branch() {
    let server = MockServer::start().await;
    let t = Utc.with_ymd_and_hms(2022, 9, 13, 18, 3, 0).unwrap();
    let root = ListingFixture::new("/")
        .with_directory("slow", t)
        .with_directory("fast", t);
    let fast = ListingFixture::new("/tree/").with_file("quick.txt", t);
    let slow = ListingFixture::new("/tree/").with_file("never.txt", t);

    Mock::given(method("GET"))
        .and(path("/tree/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(root.render(Format::Table)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tree/fast/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fast.render(Format::List)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tree/slow/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(slow.render(Format::List))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let errors = Arc::new(Mutex::new(vec![]));
    let seen = errors.clone();
    let options = TraverseOptions::new()
        .with_cancellation(cancel.clone())
        .on_error(move |url, err| {
            seen.lock().unwrap().push((url, err));
            async {}
        });

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        cancel.cancel();
    });
    let root_url = format!("{}/tree/", server.uri());
    let entries = tokio::time::timeout(Duration::from_secs(10), traverse(&root_url, &options))
        .await
        .expect("cancellation interrupts the pending request")
        .unwrap();
    trigger.await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(find(&entries, "slow").children(), Some(&[][..]));
    let fast_children = find(&entries, "fast").children().unwrap();
    assert_eq!(fast_children.len(), 1);
    assert_eq!(fast_children[0].path(), "fast/quick.txt");

    let slow_url = format!("{}/tree/slow/", server.uri());
    let errors = errors.lock().unwrap();
    assert_eq!(
        *errors,
        [(
            slow_url.clone(),
            Error::Cancelled { url: slow_url }
        )]
    );
}
