#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use discomfort::infra::local_store::LocalChallengeStore;
use discomfort::{CardSession, SessionState, ShareOutcome, StorageNotice, TieredChallengeRepository};
use discomfort_sdk::{
    CardFeed, CardMetadata, CardSource, Challenge, ChallengeStore, Difficulty, DiscomfortCard,
    DiscomfortError, Domain, PreferenceInput, SharePayload, ShareTarget,
};

fn card(id: &str, title: &str, domain: Domain, difficulty: i64) -> DiscomfortCard {
    DiscomfortCard {
        id: id.to_owned(),
        domain,
        title: title.to_owned(),
        description: format!("Try {title}"),
        cultural_context: "context".to_owned(),
        difficulty: Difficulty::saturating(difficulty),
        explanation: None,
        image_url: None,
        growth_benefit: "growth".to_owned(),
        metadata: CardMetadata::new(CardSource::Curated),
        created_at: Utc::now(),
    }
}

fn three_cards() -> Vec<DiscomfortCard> {
    vec![
        card("c1", "Stalker (1979)", Domain::Movie, 5),
        card("c2", "Free Jazz", Domain::Music, 4),
        card("c3", "Durian Fruit", Domain::Food, 3),
    ]
}

struct FixedFeed {
    cards: Vec<DiscomfortCard>,
    calls: AtomicUsize,
}

impl FixedFeed {
    fn new(cards: Vec<DiscomfortCard>) -> Arc<Self> {
        Arc::new(Self {
            cards,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CardFeed for FixedFeed {
    async fn fetch_cards(
        &self,
        _preferences: &[PreferenceInput],
        _domains: &[Domain],
    ) -> Result<Vec<DiscomfortCard>, DiscomfortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.cards.clone())
    }
}

/// Managed-store stand-in: reachable or not, and writes that may fail.
struct FlakyStore {
    available: bool,
    fail_writes: bool,
    write_delay: Duration,
    rows: Mutex<Vec<Challenge>>,
}

impl FlakyStore {
    fn new(available: bool, fail_writes: bool) -> Arc<Self> {
        Self::slow(available, fail_writes, Duration::ZERO)
    }

    fn slow(available: bool, fail_writes: bool, write_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            available,
            fail_writes,
            write_delay,
            rows: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChallengeStore for FlakyStore {
    fn name(&self) -> &'static str {
        "managed"
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn list(&self) -> anyhow::Result<Vec<Challenge>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn insert(&self, challenge: &Challenge) -> anyhow::Result<()> {
        tokio::time::sleep(self.write_delay).await;
        if self.fail_writes {
            anyhow::bail!("503 Service Unavailable");
        }
        self.rows.lock().unwrap().push(challenge.clone());
        Ok(())
    }

    async fn set_completed(
        &self,
        _id: &str,
        _completed_at: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Option<Challenge>> {
        Ok(None)
    }

    async fn remove(&self, _id: &str) -> anyhow::Result<bool> {
        Ok(false)
    }
}

async fn session_with(
    feed: Arc<FixedFeed>,
    primary: Arc<FlakyStore>,
    dir: &tempfile::TempDir,
) -> CardSession {
    let local = Arc::new(LocalChallengeStore::in_dir(dir.path()));
    let repository = TieredChallengeRepository::select(primary, local).await;
    CardSession::new(feed, Arc::new(repository), Vec::new(), Vec::new())
}

#[tokio::test]
async fn accept_skip_accept_exhausts_with_two_challenges_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let primary = FlakyStore::new(true, false);
    let mut session = session_with(FixedFeed::new(three_cards()), primary.clone(), &dir).await;

    assert_eq!(session.load().await.unwrap(), 3);
    let first = session.accept().await.unwrap();
    assert!(first.receipt.notice.is_none());
    session.skip().unwrap();
    session.accept().await.unwrap();

    assert_eq!(session.state(), &SessionState::Exhausted);
    let stored = primary.rows.lock().unwrap().clone();
    let titles: Vec<_> = stored.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["Stalker (1979)", "Durian Fruit"]);
}

#[tokio::test]
async fn accepted_challenge_matches_its_card() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(
        FixedFeed::new(three_cards()),
        FlakyStore::new(true, false),
        &dir,
    )
    .await;
    session.load().await.unwrap();
    let shown = session.current_card().cloned().unwrap();

    let accepted = session.accept().await.unwrap();

    assert_eq!(accepted.challenge.title, shown.title);
    assert_eq!(accepted.challenge.domain, shown.domain);
    assert_eq!(accepted.challenge.difficulty, shown.difficulty);
    assert!(!accepted.challenge.is_completed);
}

#[tokio::test]
async fn failed_primary_write_falls_back_and_keeps_going() {
    let dir = tempfile::tempdir().unwrap();
    let primary = FlakyStore::new(true, true);
    let mut session = session_with(FixedFeed::new(three_cards()), primary.clone(), &dir).await;
    session.load().await.unwrap();
    assert_eq!(session.repository().active_store(), "managed");

    let first = session.accept().await.unwrap();
    let second = session.accept().await.unwrap();

    assert!(matches!(
        first.receipt.notice,
        Some(StorageNotice::FellBack { from: "managed", to: "local", .. })
    ));
    assert_eq!(first.receipt.stored_in, Some("local"));
    // Later saves go straight to the fallback without a new notice.
    assert!(second.receipt.notice.is_none());
    assert_eq!(session.repository().active_store(), "local");
    assert_eq!(session.current_card().unwrap().id, "c3");

    let local = LocalChallengeStore::in_dir(dir.path());
    assert_eq!(local.list().await.unwrap().len(), 2);
    assert!(primary.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_saves_on_a_failing_primary_all_reach_the_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let primary = FlakyStore::slow(true, true, Duration::from_millis(20));
    let local = Arc::new(LocalChallengeStore::in_dir(dir.path()));
    let repo = TieredChallengeRepository::select(primary.clone(), local.clone()).await;
    let cards = three_cards();
    let a = Challenge::from_card(&cards[0], Utc::now());
    let b = Challenge::from_card(&cards[1], Utc::now());

    let (first, second) = tokio::join!(repo.save(&a), repo.save(&b));

    assert_eq!(first.stored_in, Some("local"));
    assert_eq!(second.stored_in, Some("local"));
    for receipt in [&first, &second] {
        assert!(matches!(
            receipt.notice,
            Some(StorageNotice::FellBack { from: "managed", to: "local", .. })
        ));
    }
    assert_eq!(repo.active_store(), "local");
    let mut titles: Vec<_> = local.list().await.unwrap().into_iter().map(|c| c.title).collect();
    titles.sort_unstable();
    assert_eq!(titles, ["Free Jazz", "Stalker (1979)"]);
    assert!(primary.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unavailable_primary_is_never_written() {
    let dir = tempfile::tempdir().unwrap();
    let primary = FlakyStore::new(false, false);
    let mut session = session_with(FixedFeed::new(three_cards()), primary.clone(), &dir).await;
    session.load().await.unwrap();

    let accepted = session.accept().await.unwrap();

    assert_eq!(accepted.receipt.stored_in, Some("local"));
    assert!(accepted.receipt.notice.is_none());
    assert!(primary.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn actions_outside_presenting_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let feed = FixedFeed::new(vec![card("only", "Balut", Domain::Food, 5)]);
    let mut session = session_with(feed.clone(), FlakyStore::new(true, false), &dir).await;

    assert_eq!(session.skip(), Err(DiscomfortError::NotPresenting));
    assert!(matches!(
        session.regenerate(),
        Err(DiscomfortError::InvalidTransition { action: "regenerate", state: "loading" })
    ));

    session.load().await.unwrap();
    session.skip().unwrap();
    assert_eq!(session.state(), &SessionState::Exhausted);
    assert!(matches!(session.accept().await, Err(DiscomfortError::NotPresenting)));

    session.regenerate().unwrap();
    assert_eq!(session.state(), &SessionState::Loading);
    session.load().await.unwrap();
    assert_eq!(feed.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_feed_leaves_session_loading() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(FixedFeed::new(Vec::new()), FlakyStore::new(true, false), &dir).await;

    let err = session.load().await.unwrap_err();

    assert_eq!(err, DiscomfortError::EmptyFeed);
    assert!(err.is_retriable());
    assert_eq!(session.state(), &SessionState::Loading);
}

#[derive(Default)]
struct RecordingShare {
    native: bool,
    shared: Mutex<Vec<SharePayload>>,
    clipboard: Mutex<Vec<String>>,
}

#[async_trait]
impl ShareTarget for RecordingShare {
    fn supports_native_share(&self) -> bool {
        self.native
    }

    async fn native_share(&self, payload: &SharePayload) -> anyhow::Result<()> {
        self.shared.lock().unwrap().push(payload.clone());
        Ok(())
    }

    async fn copy_to_clipboard(&self, text: &str) -> anyhow::Result<()> {
        self.clipboard.lock().unwrap().push(text.to_owned());
        Ok(())
    }
}

#[tokio::test]
async fn share_uses_native_sheet_or_clipboard_without_advancing() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(FixedFeed::new(three_cards()), FlakyStore::new(true, false), &dir).await;
    session.load().await.unwrap();

    let native = RecordingShare {
        native: true,
        ..RecordingShare::default()
    };
    assert_eq!(session.share(&native).await.unwrap(), ShareOutcome::Shared);
    assert_eq!(native.shared.lock().unwrap()[0].title, "Stalker (1979)");

    let clipboard_only = RecordingShare::default();
    assert_eq!(
        session.share(&clipboard_only).await.unwrap(),
        ShareOutcome::CopiedToClipboard
    );
    assert_eq!(
        clipboard_only.clipboard.lock().unwrap()[0],
        "Stalker (1979): Try Stalker (1979)"
    );
    assert_eq!(session.current_card().unwrap().id, "c1");
}
