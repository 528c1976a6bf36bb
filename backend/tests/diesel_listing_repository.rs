//! Integration tests for the Diesel listing repository and seller directory.
//!
//! Each test runs against its own database cloned from a migrated template on
//! a shared embedded PostgreSQL cluster. Set `SKIP_TEST_CLUSTER=1` to skip the
//! suite where the cluster cannot start.

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use campus_trade::domain::ports::{ListingRepository, SellerDirectory};
use campus_trade::domain::{
    Condition, ImageSet, Listing, ListingChanges, ListingDraft, ListingFilter, ListingId,
    ListingSort, ListingStatus, Price, SellerId,
};
use campus_trade::outbound::persistence::{
    DbPool, DieselListingRepository, DieselSellerDirectory, PoolConfig,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use embedded_postgres::{
    format_postgres_error, handle_cluster_setup_failure, provision_template_database,
    shared_cluster_handle,
};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use postgres::{Client, NoTls};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use uuid::Uuid;

struct TestContext {
    runtime: Runtime,
    repository: DieselListingRepository,
    directory: DieselSellerDirectory,
    seller: SellerId,
    database_url: String,
    _database: TemporaryDatabase,
}

impl TestContext {
    fn create(&self, listing: &Listing) -> Listing {
        self.runtime
            .block_on(self.repository.create(listing))
            .expect("create listing")
    }

    fn add(&self, title: &str, category: &str, price: f64, at: DateTime<Utc>) -> Listing {
        self.create(&listing(self.seller, title, category, price, at))
    }

    fn list(&self, filter: &ListingFilter) -> (Vec<String>, u64) {
        let page = self
            .runtime
            .block_on(self.repository.list(filter))
            .expect("list listings");
        let titles = page
            .listings
            .into_iter()
            .map(|populated| populated.listing.title)
            .collect();
        (titles, page.total)
    }
}

fn seed_seller(url: &str, seller: &SellerId, name: &str) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let email = format!("{}@campus.test", seller.as_uuid().simple());
    client
        .execute(
            "INSERT INTO sellers (id, name, email, college, rating) VALUES ($1, $2, $3, $4, $5)",
            &[seller.as_uuid(), &name, &email, &"IIT Delhi", &4.5_f64],
        )
        .map_err(|err| format_postgres_error(&err))?;
    Ok(())
}

/// Inserts a listing row whose seller does not exist, bypassing the
/// foreign key the way a half-finished seller purge would leave it.
fn insert_orphan_listing(url: &str, title: &str, created_at: DateTime<Utc>) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let created = created_at.to_rfc3339();
    client
        .batch_execute(&format!(
            concat!(
                "SET session_replication_role = replica;",
                "INSERT INTO listings (id, seller_id, title, description, price, category, ",
                "meetup_location, created_at, updated_at) VALUES ('{id}', '{seller}', '{title}', ",
                "'Left behind by a removed seller', 10, 'books', 'library', ",
                "'{created}', '{created}');",
                "SET session_replication_role = DEFAULT;"
            ),
            id = Uuid::new_v4(),
            seller = Uuid::new_v4(),
            title = title,
            created = created,
        ))
        .map_err(|err| format_postgres_error(&err))
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster_handle().map_err(|err| err.to_string())?;
    let temp_db = provision_template_database(cluster)?;
    let database_url = temp_db.url().to_string();

    let seller = SellerId::random();
    seed_seller(database_url.as_str(), &seller, "Asha")?;

    let config = PoolConfig::new(database_url.as_str())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        repository: DieselListingRepository::new(pool.clone()),
        directory: DieselSellerDirectory::new(pool),
        seller,
        database_url,
        _database: temp_db,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("fixed timestamp")
}

fn listing(
    seller: SellerId,
    title: &str,
    category: &str,
    price: f64,
    created_at: DateTime<Utc>,
) -> Listing {
    let draft = ListingDraft {
        title: title.to_owned(),
        description: format!("{title}, gently used and ready for pickup"),
        price: Price::new(price).expect("price"),
        category: category.to_owned(),
        meetup_location: "library".to_owned(),
        condition: Condition::Good,
    };
    Listing::new(
        ListingId::random(),
        draft,
        ImageSet::new(Vec::new()).expect("images"),
        seller,
        created_at,
    )
}

/// Active catalogue titles in default browse order.
const NEWEST_FIRST: &[&str] = &[
    "Chemistry Textbook",
    "Desk lamp 100% LED",
    "Physics Textbook",
    "Hero Sprint cycle",
    "Calculus Textbook",
];

/// Five active listings and one sold one, created a minute apart.
fn seed_catalogue(context: &TestContext) {
    let at = |minutes| base_time() + Duration::minutes(minutes);
    let seller = context.seller;
    for row in [
        listing(seller, "Calculus Textbook", "books", 25.0, at(0)),
        listing(seller, "Hero Sprint cycle", "cycles", 1500.0, at(1)),
        listing(seller, "Physics Textbook", "books", 40.0, at(2)),
        listing(seller, "Desk lamp 100% LED", "electronics", 12.0, at(3)),
        listing(seller, "Chemistry Textbook", "books", 60.0, at(4)),
    ] {
        context.create(&row);
    }
    let sold = context.create(&listing(seller, "Sold Textbook", "books", 30.0, at(5)));
    context
        .runtime
        .block_on(context.repository.update_status(
            &sold.id(),
            ListingStatus::Active,
            ListingStatus::Sold,
            at(6),
        ))
        .expect("mark sold")
        .expect("sold row");
}

#[rstest]
fn create_find_and_populate(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: create_find_and_populate skipped");
        return;
    };

    let draft = listing(context.seller, "Calculus Textbook", "books", 25.5, base_time());
    let created = context.create(&draft);
    assert_eq!(created, draft);

    let found = context
        .runtime
        .block_on(context.repository.find_by_id(&draft.id()))
        .expect("find listing")
        .expect("listing exists");
    assert_eq!(found.title, "Calculus Textbook");
    assert_eq!(found.status(), ListingStatus::Active);
    assert_eq!(found.views(), 0);

    let populated = context
        .runtime
        .block_on(context.repository.populate(found))
        .expect("populate listing");
    assert_eq!(populated.seller.id, context.seller);
    assert_eq!(populated.seller.name, "Asha");
    assert_eq!(populated.seller.rating, Some(4.5));

    let missing = context
        .runtime
        .block_on(context.repository.find_by_id(&ListingId::random()))
        .expect("find missing listing");
    assert!(missing.is_none());
}

#[rstest]
#[case::sold_again(ListingStatus::Sold)]
#[case::back_to_active(ListingStatus::Active)]
fn sold_listing_rejects_transitions_guarded_on_active(
    repo_context: Option<TestContext>,
    #[case] next: ListingStatus,
) {
    let Some(context) = repo_context else {
        eprintln!(
            "SKIP-TEST-CLUSTER: sold_listing_rejects_transitions_guarded_on_active skipped"
        );
        return;
    };

    let row = context.add("Hero Sprint cycle", "cycles", 1500.0, base_time());
    let sold_at = base_time() + Duration::hours(1);
    let sold = context
        .runtime
        .block_on(context.repository.update_status(
            &row.id(),
            ListingStatus::Active,
            ListingStatus::Sold,
            sold_at,
        ))
        .expect("first transition")
        .expect("active listing transitions");
    assert_eq!(sold.status(), ListingStatus::Sold);
    assert_eq!(sold.updated_at, sold_at);

    let rejected = context
        .runtime
        .block_on(context.repository.update_status(
            &row.id(),
            ListingStatus::Active,
            next,
            sold_at + Duration::hours(1),
        ))
        .expect("guarded transition");
    assert!(rejected.is_none(), "stale expected status must not apply");

    let stored = context
        .runtime
        .block_on(context.repository.find_by_id(&row.id()))
        .expect("find listing")
        .expect("listing exists");
    assert_eq!(stored.status(), ListingStatus::Sold);
    assert_eq!(stored.updated_at, sold_at);
}

#[rstest]
fn views_increment_in_the_database(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: views_increment_in_the_database skipped");
        return;
    };

    let row = context.add("Desk lamp", "electronics", 12.0, base_time());
    let viewed = context.runtime.block_on(async {
        context
            .repository
            .increment_views(&row.id())
            .await
            .expect("first view");
        context.repository.increment_views(&row.id()).await
    });
    let viewed = viewed.expect("second view").expect("listing exists");
    assert_eq!(viewed.views(), 2);

    let missing = context
        .runtime
        .block_on(context.repository.increment_views(&ListingId::random()))
        .expect("view of missing listing");
    assert!(missing.is_none());
}

#[rstest]
#[case::newest_first(
    ListingFilter::new(None, None, None, None, None),
    NEWEST_FIRST,
    5
)]
#[case::by_category(
    ListingFilter::new(Some("books".to_owned()), None, None, None, None),
    &["Chemistry Textbook", "Physics Textbook", "Calculus Textbook"],
    3
)]
#[case::by_price_range(
    ListingFilter::new(None, Some(20.0), Some(50.0), None, None),
    &["Physics Textbook", "Calculus Textbook"],
    2
)]
#[case::by_search(
    ListingFilter::new(None, None, None, None, None).with_search(Some("TEXTBOOK".to_owned())),
    &["Chemistry Textbook", "Physics Textbook", "Calculus Textbook"],
    3
)]
#[case::search_in_description(
    ListingFilter::new(None, None, None, None, None)
        .with_search(Some("ready for pickup".to_owned())),
    NEWEST_FIRST,
    5
)]
#[case::percent_matches_literally(
    ListingFilter::new(None, None, None, None, None).with_search(Some("100%".to_owned())),
    &["Desk lamp 100% LED"],
    1
)]
#[case::underscore_matches_literally(
    ListingFilter::new(None, None, None, None, None).with_search(Some("_".to_owned())),
    &[],
    0
)]
#[case::by_price_descending(
    ListingFilter::new(Some("books".to_owned()), None, None, None, None)
        .with_sort(ListingSort::Price),
    &["Chemistry Textbook", "Physics Textbook", "Calculus Textbook"],
    3
)]
#[case::second_page(
    ListingFilter::new(None, None, None, Some(2), Some(2)),
    &["Physics Textbook", "Hero Sprint cycle"],
    5
)]
#[case::past_the_end(
    ListingFilter::new(None, None, None, Some(4), Some(2)),
    &[],
    5
)]
fn list_filters_sorts_and_pages_active_listings(
    repo_context: Option<TestContext>,
    #[case] filter: ListingFilter,
    #[case] expected: &[&str],
    #[case] total: u64,
) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: list_filters_sorts_and_pages_active_listings skipped");
        return;
    };
    seed_catalogue(&context);

    let (titles, counted) = context.list(&filter);

    assert_eq!(titles, expected);
    assert_eq!(counted, total);
}

#[rstest]
fn list_sorts_by_views_then_newest(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: list_sorts_by_views_then_newest skipped");
        return;
    };
    let older = context.add("Older lamp", "electronics", 12.0, base_time());
    context.add(
        "Newer lamp",
        "electronics",
        12.0,
        base_time() + Duration::minutes(1),
    );
    context
        .runtime
        .block_on(context.repository.increment_views(&older.id()))
        .expect("view");

    let filter = ListingFilter::new(None, None, None, None, None).with_sort(ListingSort::Views);
    let (titles, _) = context.list(&filter);
    assert_eq!(titles, ["Older lamp", "Newer lamp"]);

    let filter =
        ListingFilter::new(None, None, None, None, None).with_sort(ListingSort::CreatedAt);
    let (titles, _) = context.list(&filter);
    assert_eq!(titles, ["Newer lamp", "Older lamp"]);
}

#[rstest]
fn list_skips_listing_whose_seller_is_missing(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: list_skips_listing_whose_seller_is_missing skipped");
        return;
    };
    context.add("Calculus Textbook", "books", 25.0, base_time());
    insert_orphan_listing(
        context.database_url.as_str(),
        "Orphaned Textbook",
        base_time() + Duration::minutes(1),
    )
    .expect("insert orphan");

    let (titles, total) = context.list(&ListingFilter::new(None, None, None, None, None));

    assert_eq!(titles, ["Calculus Textbook"]);
    assert_eq!(total, 2, "the orphan still counts towards the total");
}

#[rstest]
fn update_details_writes_only_descriptive_fields(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: update_details_writes_only_descriptive_fields skipped");
        return;
    };
    let row = context.add("Hero Sprint cycle", "cycles", 1500.0, base_time());
    let mut current = context.runtime.block_on(async {
        context
            .repository
            .increment_views(&row.id())
            .await
            .expect("view");
        context
            .repository
            .update_status(
                &row.id(),
                ListingStatus::Active,
                ListingStatus::Sold,
                base_time() + Duration::minutes(1),
            )
            .await
            .expect("mark sold")
            .expect("sold row")
    });

    let edited_at = base_time() + Duration::minutes(2);
    let changed = current.apply_changes(
        ListingChanges {
            title: Some("Hero Sprint cycle, serviced".to_owned()),
            price: Some(Price::new(1200.0).expect("price")),
            condition: Some(Condition::LikeNew),
            ..ListingChanges::default()
        },
        edited_at,
    );
    assert!(changed);

    let stored = context
        .runtime
        .block_on(context.repository.update_details(&current))
        .expect("update details")
        .expect("listing exists");

    assert_eq!(stored.title, "Hero Sprint cycle, serviced");
    assert_eq!(stored.price.amount(), 1200.0);
    assert_eq!(stored.condition, Condition::LikeNew);
    assert_eq!(stored.description, row.description);
    assert_eq!(stored.updated_at, edited_at);
    assert_eq!(stored.status(), ListingStatus::Sold);
    assert_eq!(stored.views(), 1);
    assert_eq!(stored.seller(), context.seller);
}

#[rstest]
fn update_details_of_missing_listing_is_none(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: update_details_of_missing_listing_is_none skipped");
        return;
    };
    let never_stored = listing(context.seller, "Ghost lamp", "electronics", 5.0, base_time());

    let stored = context
        .runtime
        .block_on(context.repository.update_details(&never_stored))
        .expect("update details");

    assert!(stored.is_none());
}

#[rstest]
fn delete_reports_whether_a_row_was_removed(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: delete_reports_whether_a_row_was_removed skipped");
        return;
    };
    let row = context.add("Desk lamp", "electronics", 12.0, base_time());

    let (first, second) = context.runtime.block_on(async {
        let first = context.repository.delete(&row.id()).await.expect("delete");
        let second = context
            .repository
            .delete(&row.id())
            .await
            .expect("delete again");
        (first, second)
    });

    assert!(first);
    assert!(!second);
}

#[rstest]
fn seller_directory_reads_seeded_sellers(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: seller_directory_reads_seeded_sellers skipped");
        return;
    };

    let (identity, summary, missing) = context.runtime.block_on(async {
        let identity = context
            .directory
            .find_identity(&context.seller)
            .await
            .expect("identity lookup");
        let summary = context
            .directory
            .find_summary(&context.seller)
            .await
            .expect("summary lookup");
        let missing = context
            .directory
            .find_identity(&SellerId::random())
            .await
            .expect("missing lookup");
        (identity, summary, missing)
    });

    let identity = identity.expect("seeded seller");
    assert_eq!(identity.id, context.seller);
    let summary = summary.expect("seeded seller summary");
    assert_eq!(summary.name, "Asha");
    assert_eq!(summary.college, "IIT Delhi");
    assert_eq!(summary.rating, Some(4.5));
    assert!(missing.is_none());
}
