mod common;

use common::{new_exercise, setup_gateway, sign_up};
use neofit::models::{ExercisePatch, Weekday};
use neofit::{Error, Gateway, GatewayError, Identity, RoutineCache};

#[tokio::test]
async fn test_fetch_caches_per_day() {
    let gateway = setup_gateway();
    let identity = sign_up(&gateway, "ana@example.com").await;
    let cache = RoutineCache::new(gateway.clone(), identity.clone());

    let owner = identity.authenticated().unwrap();
    gateway
        .insert_exercise(owner, &new_exercise("Supino Reto", Weekday::Monday))
        .await
        .unwrap();

    assert_eq!(cache.fetch(Weekday::Monday).await.unwrap().len(), 1);

    // A row inserted behind the cache's back stays invisible until the day
    // is invalidated.
    gateway
        .insert_exercise(owner, &new_exercise("Crucifixo", Weekday::Monday))
        .await
        .unwrap();
    assert_eq!(cache.fetch(Weekday::Monday).await.unwrap().len(), 1);

    cache.invalidate(Weekday::Monday).await;
    assert_eq!(cache.fetch(Weekday::Monday).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_refreshes_its_day_only() {
    let gateway = setup_gateway();
    let identity = sign_up(&gateway, "ana@example.com").await;
    let cache = RoutineCache::new(gateway.clone(), identity.clone());

    // Warm both days
    assert!(cache.fetch(Weekday::Monday).await.unwrap().is_empty());
    assert!(cache.fetch(Weekday::Tuesday).await.unwrap().is_empty());

    cache
        .create(new_exercise("Supino Reto", Weekday::Monday))
        .await
        .unwrap();

    let monday = cache.fetch(Weekday::Monday).await.unwrap();
    assert_eq!(monday.len(), 1);
    assert_eq!(monday[0].name, "Supino Reto");
    assert!(cache.fetch(Weekday::Tuesday).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_creation_order_is_stable() {
    let gateway = setup_gateway();
    let identity = sign_up(&gateway, "ana@example.com").await;
    let cache = RoutineCache::new(gateway, identity);

    for name in ["Supino Reto", "Crucifixo", "Flexão"] {
        cache
            .create(new_exercise(name, Weekday::Wednesday))
            .await
            .unwrap();
    }

    let names: Vec<_> = cache
        .fetch(Weekday::Wednesday)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["Supino Reto", "Crucifixo", "Flexão"]);
}

#[tokio::test]
async fn test_update_and_delete_round_trip() {
    let gateway = setup_gateway();
    let identity = sign_up(&gateway, "ana@example.com").await;
    let cache = RoutineCache::new(gateway, identity);

    let exercise = cache
        .create(new_exercise("Agachamento", Weekday::Friday))
        .await
        .unwrap();

    let patch = ExercisePatch {
        weight: Some(80.0),
        ..Default::default()
    };
    cache.update(&exercise.id, patch).await.unwrap();
    let rows = cache.fetch(Weekday::Friday).await.unwrap();
    assert_eq!(rows[0].weight, 80.0);
    assert_eq!(rows[0].name, "Agachamento");

    cache.delete(&exercise.id).await.unwrap();
    assert!(cache.fetch(Weekday::Friday).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mutations_require_auth() {
    let gateway = setup_gateway();
    let cache = RoutineCache::new(gateway, Identity::Anonymous);

    let err = cache
        .create(new_exercise("Supino Reto", Weekday::Monday))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AuthRequired));

    let err = cache.delete("some-id").await.unwrap_err();
    assert!(matches!(err, Error::AuthRequired));

    // The failed mutation must leave the cache readable and empty
    assert!(cache.fetch(Weekday::Monday).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_surfaces_gateway_rejection() {
    let gateway = setup_gateway();
    let identity = sign_up(&gateway, "ana@example.com").await;

    let mut user = identity.authenticated().unwrap().clone();
    user.access_token = "forged".to_string();
    let cache = RoutineCache::new(gateway, Identity::Authenticated(user));

    let err = cache.fetch(Weekday::Monday).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Gateway(GatewayError::Rejected { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let gateway = setup_gateway();
    let identity = sign_up(&gateway, "ana@example.com").await;
    let cache = RoutineCache::new(gateway, identity);

    let patch = ExercisePatch {
        sets: Some(5),
        ..Default::default()
    };
    let err = cache.update("no-such-id", patch).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_invalid_payload_rejected_before_gateway() {
    let gateway = setup_gateway();
    let identity = sign_up(&gateway, "ana@example.com").await;
    let cache = RoutineCache::new(gateway, identity);

    let mut invalid = new_exercise("Supino Reto", Weekday::Monday);
    invalid.sets = 0;
    let err = cache.create(invalid).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    assert!(cache.fetch(Weekday::Monday).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_patch_is_a_no_op() {
    let gateway = setup_gateway();
    let identity = sign_up(&gateway, "ana@example.com").await;
    let cache = RoutineCache::new(gateway, identity);

    let exercise = cache
        .create(new_exercise("Supino Reto", Weekday::Monday))
        .await
        .unwrap();

    cache
        .update(&exercise.id, ExercisePatch::default())
        .await
        .unwrap();
    assert_eq!(cache.fetch(Weekday::Monday).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_owners_see_disjoint_routines() {
    let gateway = setup_gateway();
    let ana = sign_up(&gateway, "ana@example.com").await;
    let bia = sign_up(&gateway, "bia@example.com").await;

    let ana_cache = RoutineCache::new(gateway.clone(), ana);
    let bia_cache = RoutineCache::new(gateway, bia);

    ana_cache
        .create(new_exercise("Supino Reto", Weekday::Monday))
        .await
        .unwrap();

    assert_eq!(ana_cache.fetch(Weekday::Monday).await.unwrap().len(), 1);
    assert!(bia_cache.fetch(Weekday::Monday).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_planned_days() {
    let gateway = setup_gateway();
    let identity = sign_up(&gateway, "ana@example.com").await;
    let cache = RoutineCache::new(gateway, identity);

    cache
        .create(new_exercise("Supino Reto", Weekday::Monday))
        .await
        .unwrap();
    cache
        .create(new_exercise("Agachamento", Weekday::Thursday))
        .await
        .unwrap();

    assert_eq!(
        cache.planned_days().await.unwrap(),
        vec![Weekday::Monday, Weekday::Thursday]
    );
}
