mod common;

use memberhub::{
    domain::CreateAnnouncementRequest,
    repository::store::Collection,
};

#[tokio::test]
async fn test_fresh_store_seeds_every_collection_once() -> anyhow::Result<()> {
    let context = common::empty_context().await?;

    let seeded = context.store.load_or_seed(common::today()).await?;
    assert_eq!(seeded, Collection::ALL.to_vec());

    let users = context.member_service.get_users().await?;
    assert_eq!(users.len(), 4);
    assert_eq!(context.payment_service.list_all().await?.len(), 1);
    assert_eq!(context.announcement_service.list().await?.len(), 3);

    // Markers are in place, so a restart leaves the data alone
    let seeded_again = context.store.load_or_seed(common::today()).await?;
    assert!(seeded_again.is_empty());
    assert_eq!(context.member_service.get_users().await?.len(), 4);

    Ok(())
}

#[tokio::test]
async fn test_announcements_list_newest_first() -> anyhow::Result<()> {
    let context = common::seeded_context().await?;

    let announcements = context.announcement_service.list().await?;
    let ids: Vec<_> = announcements.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["ANN-003", "ANN-002", "ANN-001"]);
    assert!(announcements[0].is_important);

    let created = context.announcement_service.create(CreateAnnouncementRequest {
        title: "Price review".to_string(),
        content: "Scrap prices are reviewed next week.".to_string(),
        is_important: false,
    }).await?;
    assert_eq!(created.date, common::today());
    assert_eq!(context.announcement_service.list().await?[0].id, created.id);

    Ok(())
}

#[tokio::test]
async fn test_missing_marker_restores_defaults() -> anyhow::Result<()> {
    let context = common::seeded_context().await?;

    context.announcement_service.delete("ANN-001").await?;
    context.announcement_service.delete("ANN-002").await?;
    assert_eq!(context.announcement_service.list().await?.len(), 1);

    sqlx::query("DELETE FROM collection_markers WHERE name = 'announcements'")
        .execute(context.db_pool())
        .await?;

    let seeded = context.store.load_or_seed(common::today()).await?;
    assert_eq!(seeded, vec![Collection::Announcements]);
    assert_eq!(context.announcement_service.list().await?.len(), 3);

    // Other collections were not touched
    assert_eq!(context.member_service.get_users().await?.len(), 4);

    Ok(())
}

#[tokio::test]
async fn test_deleting_unknown_announcement_is_a_no_op() -> anyhow::Result<()> {
    let context = common::seeded_context().await?;

    context.announcement_service.delete("ANN-404").await?;
    assert_eq!(context.announcement_service.list().await?.len(), 3);

    Ok(())
}
