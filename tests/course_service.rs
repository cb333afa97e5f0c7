mod common;

use std::sync::Arc;
use std::time::Duration;

use pywhiz::auth::Session;
use pywhiz::model::entity::{CategoryFilter, ProfilePatch};
use pywhiz::model::{DocumentStore, MemoryStore, StoreError};
use pywhiz::service::{CourseService, ServiceError};
use tokio_util::sync::CancellationToken;

use crate::common::{InstrumentedStore, USER, fast_fetch, seeded_service, seeded_service_with};

fn ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    ids.into_iter().collect()
}

#[tokio::test]
async fn open_module_creates_progress_lazily() {
    let service = seeded_service().await;
    let session = Session::signed_in(USER);
    assert_eq!(service.store().progress_records().await, 0);

    let detail = service.open_module(&session, "1").await.unwrap();
    assert_eq!(detail.module().id(), "1");
    assert!(detail.progress().watched_videos().is_empty());
    assert!(!detail.progress().quiz_completed());
    assert_eq!(detail.view().progress(), 0);
    // 4:06 + 2:12 + 2:47 + 6:56
    assert_eq!(detail.view().duration_minutes(), Some(14));
    assert_eq!(service.store().progress_records().await, 1);

    let last = service.store().get_last_opened_module(USER).await.unwrap();
    assert_eq!(last.map(|l| l.module_id().to_string()), Some("1".to_string()));

    // reopening keeps the record
    service.mark_video_watched(&session, "1", 1).await.unwrap();
    let detail = service.open_module(&session, "1").await.unwrap();
    assert_eq!(detail.progress().watched_videos().len(), 1);
    assert_eq!(service.store().progress_records().await, 1);
}

#[tokio::test]
async fn unauthenticated_session_is_rejected() {
    let service = seeded_service().await;
    let anonymous = Session::anonymous();
    let cancel = CancellationToken::new();

    assert!(matches!(
        service.open_module(&anonymous, "1").await,
        Err(ServiceError::Unauthenticated)
    ));
    assert!(matches!(
        service.mark_video_watched(&anonymous, "1", 1).await,
        Err(ServiceError::Unauthenticated)
    ));
    assert!(matches!(
        service.course_overview(&anonymous, &CategoryFilter::All, &cancel).await,
        Err(ServiceError::Unauthenticated)
    ));
    assert!(matches!(
        service.featured(&anonymous, &CategoryFilter::All).await,
        Err(ServiceError::Unauthenticated)
    ));
    assert_eq!(service.store().progress_records().await, 0);
}

#[tokio::test]
async fn watching_twice_is_idempotent() {
    let service = seeded_service().await;
    let session = Session::signed_in(USER);

    // 1/4 * 90 = 22.5
    assert_eq!(service.mark_video_watched(&session, "1", 1).await.unwrap(), 23);
    assert_eq!(service.mark_video_watched(&session, "1", 1).await.unwrap(), 23);

    let record = service
        .store()
        .get_user_module_progress(USER, "1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.watched_videos().len(), 1);
}

#[tokio::test]
async fn finishing_a_module() {
    let service = seeded_service().await;
    let session = Session::signed_in(USER);

    let mut last = 0;
    for video in 1..=4 {
        let progress = service.mark_video_watched(&session, "1", video).await.unwrap();
        assert!(progress >= last);
        last = progress;
    }
    assert_eq!(last, 90);

    let wrong = service.submit_quiz_answer(&session, "1", 1).await.unwrap();
    assert!(!wrong.correct());
    assert_eq!(wrong.progress(), 90);

    let right = service.submit_quiz_answer(&session, "1", 0).await.unwrap();
    assert!(right.correct());
    assert_eq!(right.progress(), 100);

    // a later wrong answer does not undo the quiz
    let again = service.submit_quiz_answer(&session, "1", 3).await.unwrap();
    assert!(!again.correct());
    assert_eq!(again.progress(), 100);
}

#[tokio::test]
async fn quiz_alone_counts_ten() {
    let service = seeded_service().await;
    let session = Session::signed_in(USER);

    assert_eq!(service.mark_quiz_completed(&session, "7").await.unwrap(), 10);
    assert_eq!(service.mark_quiz_completed(&session, "7").await.unwrap(), 10);
    assert_eq!(service.mark_video_watched(&session, "7", 1).await.unwrap(), 100);
}

#[tokio::test]
async fn invalid_requests_are_reported() {
    let service = seeded_service().await;
    let session = Session::signed_in(USER);

    assert!(matches!(
        service.mark_video_watched(&session, "1", 9).await,
        Err(ServiceError::UnknownVideo { video_id: 9, .. })
    ));
    assert!(matches!(
        service.open_module(&session, "42").await,
        Err(ServiceError::ModuleNotFound(id)) if id == "42"
    ));
    assert!(matches!(
        service.submit_quiz_answer(&session, "7", 3).await,
        Err(ServiceError::InvalidAnswer { answer_index: 3, .. })
    ));
    assert_eq!(service.store().progress_records().await, 0);
}

#[tokio::test]
async fn overview_filters_and_keeps_latest_learned() {
    let service = seeded_service().await;
    let session = Session::signed_in(USER);

    service.mark_video_watched(&session, "2", 2).await.unwrap();
    service.open_module(&session, "5").await.unwrap();
    service.mark_video_watched(&session, "5", 1).await.unwrap();

    let cancel = CancellationToken::new();
    let overview = service
        .course_overview(&session, &"Beginner".into(), &cancel)
        .await
        .unwrap();

    let courses = overview.courses();
    assert_eq!(ids(courses.iter().map(|c| c.id())), vec!["1", "2", "3", "4"]);
    assert_eq!(courses[1].watched_videos(), 1);
    assert_eq!(courses[1].progress(), 45);
    assert_eq!(courses[0].progress(), 0);

    // latest learned ignores the category filter
    let last = overview.last_opened().unwrap();
    assert_eq!(last.id(), "5");
    assert_eq!(last.progress(), 90);

    let all = service
        .course_overview(&session, &CategoryFilter::All, &cancel)
        .await
        .unwrap();
    assert_eq!(all.courses().len(), 7);
}

#[tokio::test]
async fn overview_of_new_user() {
    let service = seeded_service().await;
    let session = Session::signed_in("newcomer");

    let overview = service
        .course_overview(&session, &"Expert".into(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(overview.courses().len(), 1);
    assert_eq!(overview.courses()[0].progress(), 0);
    assert_eq!(overview.courses()[0].duration_minutes(), Some(9));
    assert!(overview.last_opened().is_none());
}

async fn featured_id(
    service: &CourseService<Arc<MemoryStore>>,
    session: &Session,
    category: &str,
) -> Option<String> {
    service
        .featured(session, &category.into())
        .await
        .unwrap()
        .map(|m| m.id().to_string())
}

#[tokio::test]
async fn featured_and_search() {
    let service = seeded_service().await;
    let session = Session::signed_in(USER);

    assert_eq!(featured_id(&service, &session, "Beginner").await.as_deref(), Some("1"));
    assert_eq!(featured_id(&service, &session, "Intermediate").await.as_deref(), Some("5"));
    assert_eq!(featured_id(&service, &session, "Expert").await.as_deref(), Some("7"));
    assert_eq!(featured_id(&service, &session, "Master").await, None);

    let found = service.search(&session, "loops").await.unwrap();
    assert_eq!(ids(found.iter().map(|m| m.id())), vec!["3", "5"]);
}

#[tokio::test]
async fn initialize_progress_only_fills_gaps() {
    let service = seeded_service().await;
    let session = Session::signed_in(USER);

    service.mark_video_watched(&session, "3", 2).await.unwrap();
    assert_eq!(service.initialize_progress(USER).await.unwrap(), 6);
    assert_eq!(service.initialize_progress(USER).await.unwrap(), 0);

    let record = service
        .store()
        .get_user_module_progress(USER, "3")
        .await
        .unwrap()
        .unwrap();
    assert!(record.has_watched(2));
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let store = Arc::new(InstrumentedStore::new(Duration::ZERO, 2));
    let service = seeded_service_with(store.clone(), fast_fetch(4, 3)).await;
    let session = Session::signed_in(USER);

    let overview = service
        .course_overview(&session, &CategoryFilter::All, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(overview.courses().len(), 7);
    assert_eq!(store.progress_reads(), 9);
}

#[tokio::test]
async fn repeated_failure_is_surfaced() {
    let store = Arc::new(InstrumentedStore::new(Duration::ZERO, 1));
    let service = seeded_service_with(store, fast_fetch(1, 1)).await;
    let session = Session::signed_in(USER);

    let result = service
        .course_overview(&session, &CategoryFilter::All, &CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(ServiceError::Store(StoreError::Unavailable(_)))
    ));
}

#[tokio::test]
async fn progress_reads_are_bounded() {
    let store = Arc::new(InstrumentedStore::new(Duration::from_millis(20), 0));
    let service = seeded_service_with(store.clone(), fast_fetch(2, 1)).await;
    let session = Session::signed_in(USER);

    let overview = service
        .course_overview(&session, &CategoryFilter::All, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        ids(overview.courses().iter().map(|c| c.id())),
        vec!["1", "2", "3", "4", "5", "6", "7"]
    );
    assert_eq!(store.progress_reads(), 7);
    assert!(store.max_in_flight() <= 2);
}

#[tokio::test]
async fn overview_can_be_cancelled() {
    let store = Arc::new(InstrumentedStore::new(Duration::from_secs(30), 0));
    let service: CourseService<_> = seeded_service_with(store, fast_fetch(4, 1)).await;
    let session = Session::signed_in(USER);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        service.course_overview(&session, &CategoryFilter::All, &cancel),
    )
    .await
    .expect("cancellation did not stop the fetch");

    assert!(matches!(result, Err(ServiceError::Cancelled)));
}

#[tokio::test]
async fn profile_is_created_then_merged() {
    let service = seeded_service().await;
    let session = Session::signed_in(USER);

    let missing = service.profile(&session).await.unwrap();
    assert_eq!(missing.uid(), USER);
    assert_eq!(missing.display_name(), None);
    assert!(missing.created_at().is_none());

    // sign-up writes name and email
    let created = service
        .update_profile(
            &session,
            ProfilePatch::new().display_name("Ada").email("ada@example.com"),
        )
        .await
        .unwrap();
    assert!(created.created_at().is_some());

    // the profile screen only sends what changed
    service
        .update_profile(&session, ProfilePatch::new().photo_url("aGVsbG8="))
        .await
        .unwrap();
    let profile = service.profile(&session).await.unwrap();
    assert_eq!(profile.display_name(), Some("Ada"));
    assert_eq!(profile.email(), Some("ada@example.com"));
    assert_eq!(profile.photo_url(), Some("aGVsbG8="));
    assert_eq!(profile.created_at(), created.created_at());
    assert_eq!(profile.greeting_name("Learner"), "Ada");

    // other users are untouched
    let other = service.profile(&Session::signed_in("newcomer")).await.unwrap();
    assert_eq!(other.display_name(), None);
}

#[tokio::test]
async fn blank_display_name_is_rejected() {
    let service = seeded_service().await;
    let session = Session::signed_in(USER);
    service
        .update_profile(&session, ProfilePatch::new().display_name("Ada"))
        .await
        .unwrap();

    for name in ["", "   "] {
        assert!(matches!(
            service
                .update_profile(&session, ProfilePatch::new().display_name(name))
                .await,
            Err(ServiceError::EmptyDisplayName)
        ));
    }
    assert_eq!(
        service.profile(&session).await.unwrap().display_name(),
        Some("Ada")
    );
}

#[tokio::test]
async fn profile_requires_sign_in() {
    let service = seeded_service().await;
    let anonymous = Session::anonymous();

    assert!(matches!(
        service.profile(&anonymous).await,
        Err(ServiceError::Unauthenticated)
    ));
    assert!(matches!(
        service
            .update_profile(&anonymous, ProfilePatch::new().display_name("Ada"))
            .await,
        Err(ServiceError::Unauthenticated)
    ));
    assert!(service.store().get_user_profile(USER).await.unwrap().is_none());
}
