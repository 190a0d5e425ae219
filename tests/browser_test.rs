use inverse_smoke::config::DEFAULT_PORT;
use inverse_smoke::{SmokeConfig, SmokeFixture};
use std::path::PathBuf;

// These launch a real Chromium; run with `cargo test -- --ignored`.

fn site_config() -> SmokeConfig {
    inverse_smoke::logging::init_test_logging();
    SmokeConfig::default().with_root(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("site"))
}

#[tokio::test]
#[ignore = "requires a local Chromium"]
async fn load_inverse() {
    let mut fixture = SmokeFixture::setup(site_config()).await.unwrap();
    assert_eq!(fixture.server_addr().port(), DEFAULT_PORT);

    let title = fixture.load("inverse-dev.html").await.unwrap();
    fixture.teardown().await.unwrap();

    assert!(
        title.contains("inVerse"),
        "expected title containing {:?}, got {:?}",
        "inVerse",
        title
    );
}

#[tokio::test]
#[ignore = "requires a local Chromium"]
async fn load_inverse_twice_on_one_port() {
    // First pass picks a free port, second pass reuses it.
    let mut config = site_config().with_port(0);
    for _ in 0..2 {
        let mut fixture = SmokeFixture::setup(config.clone()).await.unwrap();
        config = config.with_port(fixture.server_addr().port());

        let title = fixture.run_check().await.unwrap();
        assert!(title.contains("inVerse"));
        fixture.teardown().await.unwrap();
    }
}

#[tokio::test]
#[ignore = "requires a local Chromium"]
async fn missing_page_title_lacks_inverse() {
    let mut fixture = SmokeFixture::setup(site_config().with_port(0)).await.unwrap();
    let title = fixture.load("no-such-page.html").await.unwrap();
    fixture.teardown().await.unwrap();
    assert!(!title.contains("inVerse"), "unexpected title {:?}", title);
}
