use anyhow::Result;
use chrono::{Duration, Utc};
use sea_orm::EntityTrait;

use super::{make_user, setup_test_db};
use crate::{booking, comment, conversation, listing, message, post, user, user_credentials};

#[tokio::test]
async fn test_user_lifecycle() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let u = make_user(&db, "crud_user").await?;
    assert!(u.is_active());
    assert_eq!(u.status, user::STATUS_ACTIVE);

    let cred = user_credentials::upsert_password(&db, u.id, "hash-1".into(), "argon2").await?;
    let again = user_credentials::upsert_password(&db, u.id, "hash-2".into(), "argon2").await?;
    assert_eq!(cred.id, again.id);
    assert_eq!(user_credentials::find_by_user(&db, u.id).await?.map(|c| c.password_hash), Some("hash-2".into()));

    user::soft_delete(&db, u.id).await?;
    assert!(user::find_active(&db, u.id).await?.is_none());
    let raw = user::Entity::find_by_id(u.id).one(&db).await?.expect("row kept after soft delete");
    assert_eq!(raw.status, user::STATUS_DELETED);

    user::hard_delete(&db, u.id).await?;
    assert!(user::Entity::find_by_id(u.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_post_comment_message_crud() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    let a = make_user(&db, "crud_a").await?;
    let b = make_user(&db, "crud_b").await?;

    let p = post::create(&db, a.id, "  first post ", Some("https://img.example.com/p.png")).await?;
    assert_eq!(p.content, "first post");
    let c = comment::create(&db, p.id, b.id, "nice").await?;
    assert_eq!(c.post_id, p.id);

    let conv = conversation::create(&db, b.id, a.id).await?;
    assert!(conv.user_a_id < conv.user_b_id);
    assert_eq!(conv.other_participant(a.id), Some(b.id));
    let found = conversation::find_by_pair(&db, a.id, b.id).await?.expect("pair lookup is order independent");
    assert_eq!(found.id, conv.id);

    message::create(&db, conv.id, a.id, "hi").await?;
    message::create(&db, conv.id, b.id, "hello").await?;
    assert_eq!(message::mark_read(&db, conv.id, b.id).await?, 1);
    assert_eq!(message::mark_read(&db, conv.id, b.id).await?, 0);

    // cascades remove posts, comments and conversations with their authors
    user::hard_delete(&db, a.id).await?;
    user::hard_delete(&db, b.id).await?;
    assert!(post::Entity::find_by_id(p.id).one(&db).await?.is_none());
    assert!(comment::Entity::find_by_id(c.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_listing_and_booking_snapshot() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };
    let owner = make_user(&db, "crud_owner").await?;
    let customer = make_user(&db, "crud_cust").await?;

    let l = listing::create(&db, owner.id, &listing::NewListing {
        title: "Tutoring".into(),
        description: "Maths".into(),
        category: "Education".into(),
        price_cents: 5000,
        duration_minutes: 60,
        location: None,
    }).await?;
    assert_eq!(l.category, "education");
    assert!(l.active);

    let start = Utc::now() + Duration::days(1);
    let b = booking::create_pending(&db, &l, customer.id, start, Some("bring notes")).await?;
    assert_eq!(b.status, booking::BookingStatus::Pending);
    assert_eq!(b.owner_id, owner.id);
    assert_eq!(b.price_cents, 5000);
    assert_eq!(b.end_time - b.start_time, Duration::minutes(60));

    let stored = booking::Entity::find_by_id(b.id).one(&db).await?.expect("booking stored");
    assert_eq!(stored.status, booking::BookingStatus::Pending);

    user::hard_delete(&db, owner.id).await?;
    user::hard_delete(&db, customer.id).await?;
    Ok(())
}
