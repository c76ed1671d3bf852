use twinlink_coordinator::{CoordinatorError, DualStore, LinkService, UserLookup};
use twinlink_core::{Alias, ErrorKind, LinkStore, ShortLink, UserAccount, UserId};
use twinlink_storage::{SecondaryBackend, SqliteStore, StoreError, SurrealStore, UserStore};

struct Fixture {
    store: DualStore<SqliteStore, SurrealStore>,
}

impl Fixture {
    async fn start() -> Self {
        let relational = SqliteStore::connect_in_memory()
            .await
            .expect("open in-memory sqlite");
        let document = SurrealStore::connect_in_memory()
            .await
            .expect("start embedded surrealdb");

        Self {
            store: DualStore::new(relational, document),
        }
    }

    async fn user(&self, nickname: &str) -> UserId {
        self.store
            .save_user(nickname, "argon2-hash")
            .await
            .expect("save user")
    }
}

fn code(value: &str) -> Alias {
    Alias::new_unchecked(value)
}

#[tokio::test(flavor = "multi_thread")]
async fn save_then_get_returns_target() {
    let fixture = Fixture::start().await;
    let alice = fixture.user("alice").await;

    fixture
        .store
        .save_url("https://example.com", &code("abc123"), alice)
        .await
        .unwrap();

    let url = fixture.store.get_url(&code("abc123"), alice).await.unwrap();
    assert_eq!(url, "https://example.com");

    let mirrored = fixture
        .store
        .document()
        .get_link(&code("abc123"), alice)
        .await
        .unwrap();
    assert_eq!(mirrored, "https://example.com");
}

#[tokio::test(flavor = "multi_thread")]
async fn relational_conflict_leaves_document_unwritten() {
    let fixture = Fixture::start().await;
    let alice = fixture.user("alice").await;
    let bob = fixture.user("bob").await;
    fixture
        .store
        .relational()
        .save_link(&ShortLink::new(code("taken"), "https://one.example", alice))
        .await
        .unwrap();

    let err = fixture
        .store
        .save_url("https://two.example", &code("taken"), bob)
        .await
        .unwrap_err();

    assert!(matches!(err, CoordinatorError::Relational(_)));
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let err = fixture
        .store
        .document()
        .get_link(&code("taken"), bob)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn get_distinguishes_foreign_and_unknown_aliases() {
    let fixture = Fixture::start().await;
    let alice = fixture.user("alice").await;
    let bob = fixture.user("bob").await;
    fixture
        .store
        .save_url("https://example.com", &code("abc123"), alice)
        .await
        .unwrap();

    let err = fixture.store.get_url(&code("abc123"), bob).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let err = fixture.store.get_url(&code("missing"), alice).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_relational_yields_document_id_without_hash() {
    let fixture = Fixture::start().await;
    fixture
        .store
        .document()
        .insert_user(&UserAccount {
            user_id: UserId::new(42),
            nickname: "alice".to_string(),
            password_hash: "argon2-hash".to_string(),
        })
        .await
        .unwrap();
    fixture.store.relational().close().await;

    let lookup = fixture.store.get_user_by_nickname("alice").await.unwrap();

    assert!(matches!(lookup, UserLookup::RelationalDegraded { .. }));
    assert_eq!(lookup.user_id(), UserId::new(42));
    assert_eq!(lookup.password_hash(), None);
    assert!(lookup.error().is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn lookup_failing_in_both_reports_both_causes() {
    let fixture = Fixture::start().await;
    fixture.store.relational().close().await;

    let err = fixture.store.get_user_by_nickname("ghost").await.unwrap_err();

    let message = err.to_string();
    assert!(matches!(err, CoordinatorError::Both { .. }));
    assert!(message.contains("relational error"), "{message}");
    assert!(message.contains("document error"), "{message}");
}

#[tokio::test(flavor = "multi_thread")]
async fn user_without_links_cannot_be_deleted() {
    let fixture = Fixture::start().await;
    fixture.user("bob").await;

    let err = fixture.store.delete_user_by_nickname("bob").await.unwrap_err();

    assert!(matches!(err, CoordinatorError::Relational(StoreError::Precondition(_))));
    let lookup = fixture.store.get_user_by_nickname("bob").await.unwrap();
    assert!(matches!(lookup, UserLookup::Found(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_user_cascades_in_both_backends() {
    let fixture = Fixture::start().await;
    let carol = fixture.user("carol").await;
    for (alias, url) in [("c-one", "https://one.example"), ("c-two", "https://two.example")] {
        fixture.store.save_url(url, &code(alias), carol).await.unwrap();
    }

    fixture.store.delete_user_by_nickname("carol").await.unwrap();

    let err = fixture.store.get_url(&code("c-one"), carol).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = fixture.store.document().get_user("carol").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}
