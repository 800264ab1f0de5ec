//! Integration tests for ingestion into an on-disk catalog.

use std::fs;
use std::path::Path;

use serde_json::{Value, json};
use tempfile::TempDir;

use catalog_core::{
    Catalog, Config, Draft, Error, Extractor, IngestOptions, Registry, ingest, plan_ingest,
};

// =============================================================================
// Test Helpers
// =============================================================================

struct TestCatalog {
    dir: TempDir,
}

impl TestCatalog {
    fn new(periods: &[&str]) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        for period in periods {
            fs::create_dir(dir.path().join(period)).expect("create period dir");
        }
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, relative: &str, value: Value) {
        fs::write(
            self.path().join(relative),
            serde_json::to_string_pretty(&value).expect("serialize fixture"),
        )
        .expect("write fixture");
    }

    fn read(&self, relative: &str) -> Value {
        let content = fs::read_to_string(self.path().join(relative)).expect("read store");
        serde_json::from_str(&content).expect("parse store")
    }

    fn raw(&self, relative: &str) -> Option<String> {
        fs::read_to_string(self.path().join(relative)).ok()
    }

    fn catalog(&self) -> Catalog {
        Catalog::open(self.path(), Config::default()).expect("open catalog")
    }
}

struct StaticExtractor(Draft);

impl Extractor for StaticExtractor {
    fn extract(&self) -> catalog_core::Result<Draft> {
        Ok(self.0.clone())
    }
}

struct FailingExtractor;

impl Extractor for FailingExtractor {
    fn extract(&self) -> catalog_core::Result<Draft> {
        Err(Error::InvalidDraft("page layout changed".into()))
    }
}

fn wolverine() -> Draft {
    let mut draft = Draft::new("ultimate_wolverine_2025_1", "Ultimate Wolverine (2025) #1");
    draft.period_id = Some("ultimate_universe".into());
    draft.writers = vec!["Chris Condon".into()];
    draft.pencillers = vec!["Alessandro Cappuccio".into()];
    draft
}

/// A draft in the scraper's shape, which always carries an `order` key
fn scraped(order: Value) -> Draft {
    serde_json::from_value(json!({
        "id": "ultimate_wolverine_2025_1",
        "order": order,
        "period_id": "ultimate_universe",
        "title": "Ultimate Wolverine (2025) #1",
        "writers": ["Chris Condon"],
        "pencillers": ["Alessandro Cappuccio"],
    }))
    .expect("parse draft")
}

// =============================================================================
// Ingestion
// =============================================================================

#[test]
fn first_issue_in_empty_period_gets_order_one() {
    let fixture = TestCatalog::new(&["ultimate_universe"]);
    let catalog = fixture.catalog();

    let report = ingest(
        &catalog,
        "ultimate_universe",
        &StaticExtractor(wolverine()),
        IngestOptions::default(),
    )
    .expect("ingest");

    assert!(report.issue_added);
    assert_eq!(report.order, Some(1));

    let issues = fixture.read("ultimate_universe/issues.json");
    assert_eq!(
        issues,
        json!([{
            "id": "ultimate_wolverine_2025_1",
            "order": 1,
            "pencillers": ["alessandro_cappuccio"],
            "period_id": "ultimate_universe",
            "title": "Ultimate Wolverine (2025) #1",
            "writers": ["chris_condon"],
        }])
    );
    assert_eq!(
        fixture.read("writers.json"),
        json!([{"id": "chris_condon", "name": "Chris Condon"}])
    );
    assert_eq!(
        fixture.read("pencillers.json"),
        json!([{"id": "alessandro_cappuccio", "name": "Alessandro Cappuccio"}])
    );
}

#[test]
fn reingesting_changes_nothing() {
    let fixture = TestCatalog::new(&["ultimate_universe"]);
    let catalog = fixture.catalog();
    let extractor = StaticExtractor(wolverine());

    ingest(&catalog, "ultimate_universe", &extractor, IngestOptions::default()).expect("first");
    let issues_before = fixture.raw("ultimate_universe/issues.json");
    let writers_before = fixture.raw("writers.json");

    let plan = plan_ingest(&catalog, "ultimate_universe", &wolverine(), IngestOptions::default())
        .expect("plan");
    assert!(plan.is_noop());

    let report = plan.commit(&catalog).expect("second");
    assert!(!report.issue_added);
    assert!(report.written.is_empty());
    assert!(report.writers_added.is_empty());
    assert_eq!(report.order, Some(1));

    assert_eq!(fixture.raw("ultimate_universe/issues.json"), issues_before);
    assert_eq!(fixture.raw("writers.json"), writers_before);
    assert_eq!(
        fixture.read("ultimate_universe/issues.json")
            .as_array()
            .map(Vec::len),
        Some(1)
    );
}

#[test]
fn next_issue_is_appended_after_the_highest_order() {
    let fixture = TestCatalog::new(&["marvel_now"]);
    fixture.write(
        "marvel_now/issues.json",
        json!([
            {"id": "a_2013_1", "order": 1, "period_id": "marvel_now", "title": "A", "writers": [], "pencillers": []},
            {"id": "b_2013_1", "order": 7, "period_id": "marvel_now", "title": "B", "writers": [], "pencillers": []},
            {"id": "tie_in", "title": "Unordered", "writers": [], "pencillers": []}
        ]),
    );
    let catalog = fixture.catalog();

    let draft = Draft::new("c_2013_1", "C");
    let report = ingest(
        &catalog,
        "marvel_now",
        &StaticExtractor(draft),
        IngestOptions::default(),
    )
    .expect("ingest");

    assert_eq!(report.order, Some(8));
    let issues = fixture.read("marvel_now/issues.json");
    assert_eq!(issues[3]["id"], "c_2013_1");
    assert_eq!(issues[3]["period_id"], "marvel_now");
    assert_eq!(issues[2]["id"], "tie_in");
}

#[test]
fn known_creators_keep_their_names() {
    let fixture = TestCatalog::new(&["marvel_now"]);
    fixture.write(
        "writers.json",
        json!([{"id": "chris_condon", "name": "Christopher Condon", "slug": "condon"}]),
    );
    let catalog = fixture.catalog();

    let mut draft = wolverine();
    draft.period_id = None;
    draft.writers = vec!["Chris Condon".into(), "Deniz Camp".into()];
    let report = ingest(
        &catalog,
        "marvel_now",
        &StaticExtractor(draft),
        IngestOptions::default(),
    )
    .expect("ingest");

    assert_eq!(report.writers_added, vec!["deniz_camp"]);
    assert_eq!(
        fixture.read("writers.json"),
        json!([
            {"id": "chris_condon", "name": "Christopher Condon", "slug": "condon"},
            {"id": "deniz_camp", "name": "Deniz Camp"}
        ])
    );
}

#[test]
fn unordered_ingestion_stores_no_order() {
    let fixture = TestCatalog::new(&["marvel_now"]);
    let catalog = fixture.catalog();

    let report = ingest(
        &catalog,
        "marvel_now",
        &StaticExtractor(Draft::new("one_shot_2014_1", "One Shot")),
        IngestOptions { unordered: true },
    )
    .expect("ingest");

    assert_eq!(report.order, None);
    let issues = fixture.read("marvel_now/issues.json");
    assert!(issues[0].get("order").is_none());
    assert!(issues[0].get("period_id").is_none());
}

#[test]
fn failed_extraction_touches_nothing() {
    let fixture = TestCatalog::new(&["marvel_now"]);
    let catalog = fixture.catalog();

    let result = ingest(
        &catalog,
        "marvel_now",
        &FailingExtractor,
        IngestOptions::default(),
    );

    assert!(matches!(result, Err(Error::InvalidDraft(_))));
    assert!(fixture.raw("writers.json").is_none());
    assert!(fixture.raw("pencillers.json").is_none());
    assert!(fixture.raw("marvel_now/issues.json").is_none());
}

#[test]
fn period_must_exist_and_match() {
    let fixture = TestCatalog::new(&["marvel_now"]);
    let catalog = fixture.catalog();

    let missing = plan_ingest(&catalog, "heroic_age", &wolverine(), IngestOptions::default());
    assert!(matches!(missing, Err(Error::PeriodNotFound(p)) if p == "heroic_age"));
    assert!(!fixture.path().join("heroic_age").exists());

    let mismatch = plan_ingest(&catalog, "marvel_now", &wolverine(), IngestOptions::default());
    assert!(matches!(mismatch, Err(Error::PeriodMismatch { .. })));
}

#[test]
fn malformed_issue_store_aborts_before_any_write() {
    let fixture = TestCatalog::new(&["ultimate_universe"]);
    fs::write(fixture.path().join("ultimate_universe/issues.json"), "[{\"id\": ").unwrap();
    let catalog = fixture.catalog();

    let result = ingest(
        &catalog,
        "ultimate_universe",
        &StaticExtractor(wolverine()),
        IngestOptions::default(),
    );

    assert!(matches!(result, Err(Error::Malformed { .. })));
    assert!(fixture.raw("writers.json").is_none());
    assert!(
        catalog
            .load_registry(Registry::Writers)
            .expect("registry")
            .is_empty()
    );
}

// =============================================================================
// Scraped drafts
// =============================================================================

#[test]
fn scraped_order_never_reaches_the_store() {
    for order in [Value::Null, json!(5)] {
        let fixture = TestCatalog::new(&["ultimate_universe"]);
        let catalog = fixture.catalog();
        let extractor = StaticExtractor(scraped(order.clone()));

        let report = ingest(&catalog, "ultimate_universe", &extractor, IngestOptions::default())
            .expect("ingest");
        assert_eq!(report.order, Some(1), "draft order {}", order);

        let raw = fixture.raw("ultimate_universe/issues.json").expect("issue store");
        assert_eq!(raw.matches("\"order\"").count(), 1);
        let stored = catalog.load_issues("ultimate_universe").expect("store readable");
        assert_eq!(stored[0].order, Some(1));
        assert!(stored[0].extra.is_empty());

        let again = ingest(&catalog, "ultimate_universe", &extractor, IngestOptions::default())
            .expect("second ingest");
        assert!(!again.issue_added);
        assert!(again.written.is_empty());
        assert_eq!(fixture.raw("ultimate_universe/issues.json"), Some(raw));
    }
}

#[test]
fn scraped_order_is_dropped_for_unordered_issues() {
    let fixture = TestCatalog::new(&["ultimate_universe"]);
    let catalog = fixture.catalog();

    let report = ingest(
        &catalog,
        "ultimate_universe",
        &StaticExtractor(scraped(json!(5))),
        IngestOptions { unordered: true },
    )
    .expect("ingest");

    assert_eq!(report.order, None);
    let issues = fixture.read("ultimate_universe/issues.json");
    assert!(issues[0].get("order").is_none());
    assert!(issues[0].get("period_id").is_none());
    assert!(catalog.load_issues("ultimate_universe").is_ok());
}

#[test]
fn dot_period_is_not_a_period() {
    let fixture = TestCatalog::new(&["ultimate_universe"]);
    let catalog = fixture.catalog();

    for period in [".", ".."] {
        let result = plan_ingest(&catalog, period, &wolverine(), IngestOptions::default());
        assert!(matches!(result, Err(Error::PeriodNotFound(_))));
    }
    assert!(fixture.raw("issues.json").is_none());
}
