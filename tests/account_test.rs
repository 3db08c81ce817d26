mod common;

use common::{seed_workout_logs, setup_gateway, sign_up};
use chrono::NaiveDate;
use neofit::models::ProfileEdit;
use neofit::{AccountService, Error, Gateway, Identity};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_overview_requires_auth() {
    let gateway = setup_gateway();
    let service = AccountService::new(gateway, Identity::Anonymous);

    let err = service.overview().await.unwrap_err();
    assert!(matches!(err, Error::AuthRequired));
}

#[tokio::test]
async fn test_profile_edit_appends_body_stat() {
    let gateway = setup_gateway();
    let identity = sign_up(&gateway, "ana@example.com").await;
    let service = AccountService::new(gateway, identity);

    service
        .update_profile(ProfileEdit {
            name: Some("Ana".to_string()),
            weight_kg: Some(62.5),
            height_cm: Some(168.0),
            ..Default::default()
        })
        .await
        .unwrap();

    let overview = service.overview().await.unwrap();
    assert_eq!(overview.profile.name, "Ana");
    assert_eq!(overview.body_stats.len(), 1);
    assert_eq!(overview.body_stats[0].weight_kg, 62.5);
}

#[tokio::test]
async fn test_body_stat_carries_forward_missing_half() {
    let gateway = setup_gateway();
    let identity = sign_up(&gateway, "ana@example.com").await;
    let service = AccountService::new(gateway, identity);

    service
        .update_profile(ProfileEdit {
            weight_kg: Some(62.5),
            height_cm: Some(168.0),
            ..Default::default()
        })
        .await
        .unwrap();

    // Only the weight changes; height comes from the latest measurement
    service
        .update_profile(ProfileEdit {
            weight_kg: Some(61.0),
            ..Default::default()
        })
        .await
        .unwrap();

    let overview = service.overview().await.unwrap();
    assert_eq!(overview.body_stats.len(), 2);
    let latest = overview.body_stats.last().unwrap();
    assert_eq!(latest.weight_kg, 61.0);
    assert_eq!(latest.height_cm, 168.0);
}

#[tokio::test]
async fn test_first_measurement_needs_both_halves() {
    let gateway = setup_gateway();
    let identity = sign_up(&gateway, "ana@example.com").await;
    let service = AccountService::new(gateway, identity);

    let err = service
        .update_profile(ProfileEdit {
            weight_kg: Some(62.5),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_set_avatar_updates_profile() {
    let gateway = setup_gateway();
    let identity = sign_up(&gateway, "ana@example.com").await;
    let owner_id = identity.owner_id().unwrap().to_string();
    let service = AccountService::new(gateway, identity);

    let url = service
        .set_avatar("png", vec![1, 2, 3], "image/png")
        .await
        .unwrap();
    assert_eq!(url, format!("local://avatars/{owner_id}-avatar.png"));

    let overview = service.overview().await.unwrap();
    assert_eq!(overview.profile.avatar_url.as_deref(), Some(url.as_str()));
}

#[tokio::test]
async fn test_blank_note_rejected() {
    let gateway = setup_gateway();
    let identity = sign_up(&gateway, "ana@example.com").await;
    let service = AccountService::new(gateway, identity);

    let err = service.add_note("   ").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let note = service.add_note(" treino pesado hoje ").await.unwrap();
    assert_eq!(note.content, "treino pesado hoje");
}

#[tokio::test]
async fn test_clear_progress_keeps_notes_and_profile() {
    let gateway = setup_gateway();
    let identity = sign_up(&gateway, "ana@example.com").await;
    seed_workout_logs(&gateway, &identity, &[date(2024, 3, 4), date(2024, 3, 6)]).await;

    let owner = identity.authenticated().unwrap();
    gateway
        .insert_body_stat(owner, 62.5, 168.0)
        .await
        .unwrap();
    gateway
        .insert_personal_record(owner, "Agachamento", 80.0, date(2024, 3, 4))
        .await
        .unwrap();

    let service = AccountService::new(gateway, identity);
    service.add_note("antes do reset").await.unwrap();
    service.clear_progress().await.unwrap();

    let overview = service.overview().await.unwrap();
    assert!(overview.body_stats.is_empty());
    assert!(overview.personal_records.is_empty());
    assert!(overview.workout_logs.is_empty());
    assert_eq!(overview.notes.len(), 1);
    assert_eq!(overview.profile.level, 1);
}

#[tokio::test]
async fn test_workout_logs_newest_first() {
    let gateway = setup_gateway();
    let identity = sign_up(&gateway, "ana@example.com").await;
    seed_workout_logs(
        &gateway,
        &identity,
        &[date(2024, 3, 4), date(2024, 3, 11), date(2024, 3, 6)],
    )
    .await;

    let service = AccountService::new(gateway, identity);
    let overview = service.overview().await.unwrap();
    let dates: Vec<_> = overview
        .workout_logs
        .iter()
        .map(|log| log.workout_date)
        .collect();
    assert_eq!(
        dates,
        vec![date(2024, 3, 11), date(2024, 3, 6), date(2024, 3, 4)]
    );
}
