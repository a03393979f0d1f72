mod common;

use chrono::Duration;
use memberhub::{
    domain::{
        CreatePaymentRequest, DirectoryFilter, IssuedDocument, MemberStatus, Role,
        UpdateUserRequest,
    },
    error::AppError,
    repository::{SqliteUserRepository, UserRepository},
};

#[tokio::test]
async fn test_bulk_read_expires_and_persists() -> anyhow::Result<()> {
    let context = common::seeded_context().await?;
    let yesterday = common::today() - Duration::days(1);

    // An Active member whose membership ended yesterday
    sqlx::query("UPDATE users SET expiry_date = ? WHERE id = 'MEM-001'")
        .bind(yesterday)
        .execute(context.db_pool())
        .await?;

    let users = context.member_service.get_users().await?;
    let member = users.iter().find(|u| u.id == "MEM-001").unwrap();
    assert_eq!(member.status, MemberStatus::Expired);

    // The store holds the transition too
    let repo = SqliteUserRepository::new(context.db_pool().clone());
    let stored = repo.find_by_id("MEM-001").await?.unwrap();
    assert_eq!(stored.status, MemberStatus::Expired);

    let again = context.member_service.get_users().await?;
    assert_eq!(
        again.iter().find(|u| u.id == "MEM-001").unwrap().status,
        MemberStatus::Expired
    );

    Ok(())
}

#[tokio::test]
async fn test_single_read_evaluates_without_persisting() -> anyhow::Result<()> {
    let context = common::seeded_context().await?;

    // MEM-003 is seeded Active with a lapsed expiry date
    let lapsed = context.member_service.get_user("MEM-003").await?;
    assert_eq!(lapsed.status, MemberStatus::Expired);

    let repo = SqliteUserRepository::new(context.db_pool().clone());
    let stored = repo.find_by_id("MEM-003").await?.unwrap();
    assert_eq!(stored.status, MemberStatus::Active);

    assert!(context.member_service.days_until_expiry("MEM-003").await? < 0);

    Ok(())
}

#[tokio::test]
async fn test_expiry_sweep_reports_transitions_once() -> anyhow::Result<()> {
    let context = common::seeded_context().await?;

    let expired = context.member_service.check_expired().await?;
    let ids: Vec<_> = expired.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["MEM-003"]);

    assert!(context.member_service.check_expired().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_admin_never_expires() -> anyhow::Result<()> {
    let context = common::seeded_context().await?;

    context.member_service.update_user("ADM-001", UpdateUserRequest {
        expiry_date: Some(common::today() - Duration::days(365)),
        ..Default::default()
    }).await?;

    let admin = context.member_service.get_user("ADM-001").await?;
    assert_eq!(admin.role, Role::Admin);
    assert_eq!(admin.status, MemberStatus::Active);
    assert!(context.member_service.check_expired().await?.iter().all(|u| u.id != "ADM-001"));

    Ok(())
}

#[tokio::test]
async fn test_register_creates_pending_member() -> anyhow::Result<()> {
    let context = common::empty_context().await?;

    let user = context.member_service.register(common::registration("ngozi@ezemetals.com")).await?;
    assert_eq!(user.role, Role::Member);
    assert_eq!(user.status, MemberStatus::Pending);
    assert_eq!(user.category, "Corporate");
    assert_eq!(user.date_joined, common::today());
    assert_eq!(user.expiry_date, chrono::NaiveDate::from_ymd_opt(2027, 3, 1).unwrap());
    assert_eq!(user.employees, 12);

    // Correct password, but still awaiting approval
    let err = context.member_service
        .login("ngozi@ezemetals.com", "Recycle#2025")
        .await
        .unwrap_err();
    assert_eq!(err, AppError::AccountPending);

    Ok(())
}

#[tokio::test]
async fn test_invalid_registration_creates_nothing() -> anyhow::Result<()> {
    let context = common::empty_context().await?;

    let mut request = common::registration("ngozi@ezemetals.com");
    request.phone = "0803".to_string();
    request.password = "password".to_string();
    request.business_name = String::new();

    match context.member_service.register(request).await {
        Err(AppError::ValidationFailed(errors)) => {
            let fields: Vec<_> = errors
                .iter()
                .map(|e| e.split_whitespace().next().unwrap_or_default())
                .collect();
            assert_eq!(fields, vec!["phone", "password", "businessName"]);
        }
        other => panic!("expected validation failure, got {:?}", other),
    }

    assert!(context.member_service.get_users().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() -> anyhow::Result<()> {
    let context = common::empty_context().await?;

    context.member_service.register(common::registration("dup@example.com")).await?;
    let err = context.member_service
        .register(common::registration("dup@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::DuplicateEmail);

    let users = context.member_service.get_users().await?;
    assert_eq!(users.iter().filter(|u| u.email == "dup@example.com").count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_login_gates_on_status_before_password() -> anyhow::Result<()> {
    let context = common::seeded_context().await?;
    let members = &context.member_service;

    let admin = members.login(common::ADMIN_EMAIL, common::ADMIN_PASSWORD).await?;
    assert_eq!(admin.id, "ADM-001");

    assert_eq!(
        members.login(common::ADMIN_EMAIL, "wrong").await.unwrap_err(),
        AppError::InvalidCredentials
    );
    assert_eq!(
        members.login("nobody@example.com", "whatever").await.unwrap_err(),
        AppError::InvalidCredentials
    );

    // MEM-003 is stored Active but lapsed: the computed status wins
    assert_eq!(
        members.login("tunde@adeyemifoundry.ng", common::MEMBER_PASSWORD).await.unwrap_err(),
        AppError::AccountExpired
    );

    members.update_status("MEM-001", MemberStatus::Suspended).await?;
    assert_eq!(
        members.login("chinedu@okaformetals.ng", "not-even-close").await.unwrap_err(),
        AppError::AccountSuspended
    );

    Ok(())
}

#[tokio::test]
async fn test_legacy_plain_text_password_still_logs_in() -> anyhow::Result<()> {
    let context = common::seeded_context().await?;

    sqlx::query("UPDATE users SET password_hash = 'Legacy#2020' WHERE id = 'MEM-001'")
        .execute(context.db_pool())
        .await?;

    let user = context.member_service.login("chinedu@okaformetals.ng", "Legacy#2020").await?;
    assert_eq!(user.id, "MEM-001");

    Ok(())
}

#[tokio::test]
async fn test_reassign_moves_every_reference() -> anyhow::Result<()> {
    let context = common::seeded_context().await?;

    context.payment_service.create(CreatePaymentRequest {
        user_id: "MEM-001".to_string(),
        amount: 25_000,
        description: "Levy".to_string(),
        currency: None,
        date: None,
        status: None,
        receipt: None,
    }).await?;
    context.message_service.send("MEM-001", "ADM-001", "Receipt attached").await?;
    context.message_service.send("ADM-001", "MEM-001", "Thanks").await?;

    let renamed = context.member_service.reassign_id("MEM-001", "NAMR-0001").await?;
    assert_eq!(renamed.id, "NAMR-0001");
    assert_eq!(renamed.email, "chinedu@okaformetals.ng");

    assert_eq!(context.payment_service.list_by_user("NAMR-0001").await?.len(), 2);
    assert!(context.payment_service.list_by_user("MEM-001").await?.is_empty());
    assert_eq!(context.message_service.conversation("NAMR-0001", "ADM-001").await?.len(), 2);
    assert!(context.message_service.conversation("MEM-001", "ADM-001").await?.is_empty());

    let old_refs: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM users WHERE id = ?1)
              + (SELECT COUNT(*) FROM payments WHERE user_id = ?1)
              + (SELECT COUNT(*) FROM messages WHERE sender_id = ?1 OR receiver_id = ?1)"
    )
    .bind("MEM-001")
    .fetch_one(context.db_pool())
    .await?;
    assert_eq!(old_refs, 0);

    Ok(())
}

#[tokio::test]
async fn test_reassign_to_taken_id_changes_nothing() -> anyhow::Result<()> {
    let context = common::seeded_context().await?;
    context.message_service.send("MEM-001", "ADM-001", "Hello").await?;

    let err = context.member_service.reassign_id("MEM-001", "MEM-002").await.unwrap_err();
    assert_eq!(err, AppError::IdAlreadyAssigned("MEM-002".to_string()));

    assert!(context.member_service.get_user("MEM-001").await.is_ok());
    assert_eq!(context.payment_service.list_by_user("MEM-001").await?.len(), 1);
    assert_eq!(context.message_service.conversation("MEM-001", "ADM-001").await?.len(), 1);

    assert_eq!(
        context.member_service.reassign_id("MEM-404", "MEM-405").await.unwrap_err(),
        AppError::UserNotFound("MEM-404".to_string())
    );

    Ok(())
}

#[tokio::test]
async fn test_update_rejects_taken_email() -> anyhow::Result<()> {
    let context = common::seeded_context().await?;

    let err = context.member_service.update_user("MEM-001", UpdateUserRequest {
        email: Some(common::ADMIN_EMAIL.to_string()),
        ..Default::default()
    }).await.unwrap_err();
    assert_eq!(err, AppError::DuplicateEmail);

    let updated = context.member_service.update_user("MEM-001", UpdateUserRequest {
        phone: Some("+234 802 555 0101".to_string()),
        employees: Some(40.4),
        ..Default::default()
    }).await?;
    assert_eq!(updated.phone, "+234 802 555 0101");
    assert_eq!(updated.employees, 40);

    Ok(())
}

#[tokio::test]
async fn test_issue_document_and_size_ceiling() -> anyhow::Result<()> {
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    let mut settings = memberhub::config::Settings::default();
    settings.uploads.max_document_bytes = 1024;
    let context = common::context_with(settings).await?;
    context.load_or_seed().await?;

    let card = format!("data:application/pdf;base64,{}", STANDARD.encode(vec![1u8; 512]));
    let user = context.member_service
        .issue_document("MEM-001", IssuedDocument::IdCard, card.clone())
        .await?;
    assert_eq!(user.documents.issued_id_card, Some(card));
    assert!(user.documents.issued_certificate.is_none());

    let oversized = format!("data:application/pdf;base64,{}", STANDARD.encode(vec![1u8; 2048]));
    assert!(matches!(
        context.member_service
            .issue_document("MEM-001", IssuedDocument::Certificate, oversized)
            .await,
        Err(AppError::ValidationFailed(_))
    ));

    Ok(())
}

#[tokio::test]
async fn test_directory_lists_only_active_members() -> anyhow::Result<()> {
    let context = common::seeded_context().await?;

    let everyone = context.member_service.directory(&DirectoryFilter::default()).await?;
    let ids: Vec<_> = everyone.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["MEM-001"]);
    assert_eq!(everyone[0].contact_name, "Chinedu Okafor");

    let by_state = context.member_service.directory(&DirectoryFilter {
        state: Some("Kano".to_string()),
        ..Default::default()
    }).await?;
    assert!(by_state.is_empty());

    let by_text = context.member_service.directory(&DirectoryFilter {
        q: Some("okafor".to_string()),
        ..Default::default()
    }).await?;
    assert_eq!(by_text.len(), 1);

    Ok(())
}
