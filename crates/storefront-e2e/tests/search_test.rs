//! Search scenarios against the live storefront.

use storefront_e2e::{FixtureResult, TestFixture};

const NONSENSE_TERM: &str = "xqzvbnmlkjhgfdsa123456789";

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_basic_search() -> FixtureResult<()> {
    let fixture = TestFixture::from_env()?;
    let outcome = fixture
        .run("basic_search", |page| async move {
            let home = page.home();
            home.open().await?;
            let title = home.get_page_title().await?;
            assert!(
                title.to_lowercase().contains("amazon"),
                "unexpected title: {title}"
            );
            home.search_product(&page.config().test_product).await?;

            let results = page.search_results();
            assert!(results.has_results().await, "search returned no results");
            let count = results.get_results_count().await;
            assert!(count > 0, "results banner reported {count}");
            Ok(())
        })
        .await;
    fixture.shutdown().await?;
    outcome
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_product_details() -> FixtureResult<()> {
    let fixture = TestFixture::from_env()?;
    let outcome = fixture
        .run("product_details", |page| async move {
            let home = page.home();
            home.open().await?;
            home.search_product(&page.config().test_product).await?;

            let products = page.search_results().get_products(5).await;
            assert!(!products.is_empty(), "no products extracted");
            assert!(products.len() <= 5);
            assert!(
                products.iter().any(|p| p.title.is_some()),
                "no product had a title"
            );
            for product in &products {
                if let Some(rating) = product.rating {
                    assert!((0.0..=5.0).contains(&rating));
                }
            }
            Ok(())
        })
        .await;
    fixture.shutdown().await?;
    outcome
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_search_with_no_results() -> FixtureResult<()> {
    let fixture = TestFixture::from_env()?;
    let outcome = fixture
        .run("search_with_no_results", |page| async move {
            let home = page.home();
            home.open().await?;
            home.search_product(NONSENSE_TERM).await?;

            assert!(!page.search_results().has_results().await);
            Ok(())
        })
        .await;
    fixture.shutdown().await?;
    outcome
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_sort_and_next_page() -> FixtureResult<()> {
    let fixture = TestFixture::from_env()?;
    let outcome = fixture
        .run("sort_and_next_page", |page| async move {
            let home = page.home();
            home.open().await?;
            home.search_product(&page.config().test_product).await?;

            let results = page.search_results();
            results.sort_by("price-asc-rank").await?;
            let before = page.driver().current_url().await?;
            if results.go_to_next_page().await? {
                let after = page.driver().current_url().await?;
                assert_ne!(before, after, "next page did not change the URL");
            }
            Ok(())
        })
        .await;
    fixture.shutdown().await?;
    outcome
}
