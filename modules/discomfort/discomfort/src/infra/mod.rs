pub mod local_store;
pub mod managed_store;
pub mod proxy_feed;

use std::sync::Arc;

use discomfort_sdk::{Domain, PreferenceInput};

use crate::config::SessionConfig;
use crate::domain::repository::TieredChallengeRepository;
use crate::domain::session::CardSession;
use local_store::LocalChallengeStore;
use managed_store::ManagedStore;
use proxy_feed::ProxyCardFeed;

/// Card session fed by the proxy, saving to the managed backend when the
/// user is signed in and it answers, to local storage otherwise.
///
/// # Errors
/// Invalid URLs in `config`.
pub async fn open_session(
    config: &SessionConfig,
    preferences: Vec<PreferenceInput>,
    domains: Vec<Domain>,
) -> anyhow::Result<CardSession> {
    let feed = Arc::new(ProxyCardFeed::new(&config.proxy)?);
    let managed = Arc::new(ManagedStore::new(&config.managed)?);
    let local = Arc::new(LocalChallengeStore::new(&config.local));
    let repository = TieredChallengeRepository::select(managed, local).await;
    Ok(CardSession::new(
        feed,
        Arc::new(repository),
        preferences,
        domains,
    ))
}
