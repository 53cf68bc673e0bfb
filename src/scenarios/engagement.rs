use crate::AppState;
use super::common::{at, seeded_store, Fixture, FlakyStore, ALICE, BOB};
use application::error::AppError;
use application::shared::ManualClock;
use chrono::Duration;
use domain::catalog::CatalogStore;
use domain::engagement::LikeState;
use domain::song::Song;
use domain::value::{ArtistId, SongId, UserId, UserRef};
use infra::config::AppConfigImpl;
use std::sync::Arc;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_record_play_k_times_keeps_one_record() {
    let fx = Fixture::new(3);
    let alice = UserRef::from(ALICE);
    for i in 1..=5 {
        fx.clock.set(at(i * 10));
        let record = fx
            .state
            .engagement
            .record_play(&alice, SongId::from(2))
            .await
            .unwrap();
        assert_eq!(record.last_played_at, at(i * 10));
    }

    assert_eq!(fx.play_count(2).await, 5);
    assert_eq!(fx.store.play_record_count(), 1);
    let record = fx
        .store
        .find_play_record(UserId::from(1), SongId::from(2))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.last_played_at, at(50));
}

#[tokio::test]
async fn test_record_play_by_user_id_and_email_share_record() {
    let fx = Fixture::new(1);
    fx.state
        .engagement
        .record_play(&UserRef::Id(UserId::from(1)), SongId::from(1))
        .await
        .unwrap();
    fx.clock.advance(Duration::seconds(1));
    fx.play(ALICE, 1).await;

    assert_eq!(fx.play_count(1).await, 2);
    assert_eq!(fx.store.play_record_count(), 1);
}

#[tokio::test]
async fn test_record_play_unknown_user_or_song_changes_nothing() {
    let fx = Fixture::new(2);
    let err = fx
        .state
        .engagement
        .record_play(&UserRef::from("ghost@example.com"), SongId::from(1))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AppError::NotFound("User".to_string(), "email=ghost@example.com".to_string())
    );

    let err = fx
        .state
        .engagement
        .record_play(&UserRef::from(ALICE), SongId::from(99))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::NotFound("Song".to_string(), "99".to_string()));

    assert_eq!(fx.play_count(1).await, 0);
    assert_eq!(fx.store.play_record_count(), 0);
}

#[tokio::test]
async fn test_record_play_at_max_count_fails_without_effect() {
    let store = seeded_store(0);
    store.insert_song(
        Song::new(SongId::from(1), "Forever", ArtistId::from(1), None).with_play_count(u64::MAX),
    );
    let fx = Fixture::with_store(store);

    let err = fx
        .state
        .engagement
        .record_play(&UserRef::from(ALICE), SongId::from(1))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::PlayCountOverflow("1".to_string()));
    assert_eq!(fx.play_count(1).await, u64::MAX);
    assert_eq!(fx.store.play_record_count(), 0);
}

#[tokio::test]
async fn test_toggle_like_twice_flips_back() {
    let fx = Fixture::new(2);
    let alice = UserRef::from(ALICE);
    let engagement = &fx.state.engagement;

    assert!(!engagement.is_liked(&alice, SongId::from(1)).await.unwrap());
    assert_eq!(
        engagement.toggle_like(&alice, SongId::from(1)).await.unwrap(),
        LikeState::Liked
    );
    assert!(engagement.is_liked(&alice, SongId::from(1)).await.unwrap());
    assert_eq!(
        engagement.toggle_like(&alice, SongId::from(1)).await.unwrap(),
        LikeState::Unliked
    );
    assert!(!engagement.is_liked(&alice, SongId::from(1)).await.unwrap());
    assert_eq!(fx.store.like_record_count(), 0);
}

#[tokio::test]
async fn test_likes_are_per_user() {
    let fx = Fixture::new(1);
    fx.like(ALICE, 1).await;

    let engagement = &fx.state.engagement;
    assert!(engagement
        .is_liked(&UserRef::from(ALICE), SongId::from(1))
        .await
        .unwrap());
    assert!(!engagement
        .is_liked(&UserRef::from(BOB), SongId::from(1))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_toggle_like_unknown_user_or_song_changes_nothing() {
    let fx = Fixture::new(1);
    let engagement = &fx.state.engagement;

    let err = engagement
        .toggle_like(&UserRef::from("ghost@example.com"), SongId::from(1))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    let err = engagement
        .toggle_like(&UserRef::from(ALICE), SongId::from(42))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    let err = engagement
        .is_liked(&UserRef::from(ALICE), SongId::from(42))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    assert_eq!(fx.store.like_record_count(), 0);
}

#[tokio::test]
async fn test_remove_like_requires_existing_like() {
    let fx = Fixture::new(1);
    let alice = UserRef::from(ALICE);

    let err = fx
        .state
        .engagement
        .remove_like(&alice, SongId::from(1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref entity, _) if entity == "LikeRecord"));

    fx.like(ALICE, 1).await;
    fx.state
        .engagement
        .remove_like(&alice, SongId::from(1))
        .await
        .unwrap();
    assert_eq!(fx.store.like_record_count(), 0);
}

#[tokio::test]
async fn test_failed_record_upsert_restores_play_count() {
    let store = seeded_store(1);
    let flaky = Arc::new(FlakyStore::new(store.clone()));
    let state = AppState::with_clock(
        flaky.clone(),
        AppConfigImpl::default(),
        Arc::new(ManualClock::new(at(0))),
    );
    state
        .engagement
        .record_play(&UserRef::from(ALICE), SongId::from(1))
        .await
        .unwrap();

    flaky.fail_upsert.store(true, Ordering::SeqCst);
    let err = state
        .engagement
        .record_play(&UserRef::from(ALICE), SongId::from(1))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::StoreUnavailable("write timeout".to_string()));

    let song = store.find_song(SongId::from(1)).await.unwrap().unwrap();
    assert_eq!(song.play_count, 1);
    let record = store
        .find_play_record(UserId::from(1), SongId::from(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.last_played_at, at(0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_plays_on_one_song_lose_no_updates() {
    let fx = Fixture::new(2);
    let writers = 200;

    let mut handles = Vec::with_capacity(writers);
    for i in 0..writers {
        let engagement = fx.state.engagement.clone();
        let user = if i % 2 == 0 { ALICE } else { BOB };
        handles.push(tokio::spawn(async move {
            engagement
                .record_play(&UserRef::from(user), SongId::from(1))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(fx.play_count(1).await, writers as u64);
    assert_eq!(fx.play_count(2).await, 0);
    assert_eq!(fx.store.play_record_count(), 2);
    assert_eq!(fx.state.engagement.live_lock_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_toggles_flip_exactly_once_each() {
    let fx = Fixture::new(1);
    let toggles = 101;

    let mut handles = Vec::with_capacity(toggles);
    for _ in 0..toggles {
        let engagement = fx.state.engagement.clone();
        handles.push(tokio::spawn(async move {
            engagement
                .toggle_like(&UserRef::from(ALICE), SongId::from(1))
                .await
        }));
    }
    let mut liked = 0;
    let mut unliked = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().is_liked() {
            liked += 1;
        } else {
            unliked += 1;
        }
    }

    // 从未喜欢开始，奇数次翻转之后应当是已喜欢
    assert_eq!(liked, unliked + 1);
    assert_eq!(fx.store.like_record_count(), 1);
    assert_eq!(fx.state.engagement.live_lock_count(), 0);
    assert!(fx
        .state
        .engagement
        .is_liked(&UserRef::from(ALICE), SongId::from(1))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_lock_tables_shrink_after_writes() {
    let fx = Fixture::new(500);
    let engagement = &fx.state.engagement;
    let alice = UserRef::from(ALICE);
    for song in 1..=500 {
        engagement.toggle_like(&alice, SongId::from(song)).await.unwrap();
        engagement.toggle_like(&alice, SongId::from(song)).await.unwrap();
        engagement.record_play(&alice, SongId::from(song)).await.unwrap();
    }
    engagement.toggle_like(&alice, SongId::from(1)).await.unwrap();
    engagement.remove_like(&alice, SongId::from(1)).await.unwrap();

    assert_eq!(fx.store.like_record_count(), 0);
    assert_eq!(engagement.live_lock_count(), 0);
}
