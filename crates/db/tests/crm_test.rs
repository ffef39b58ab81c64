//! Integration tests for tags, contacts, inquiries and invoices.

#![allow(clippy::uninlined_format_args)]

mod common;

use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use uuid::Uuid;

use dealflow_core::contact::ContactDraft;
use dealflow_core::inquiry::{Inquiry, WEBSITE_INQUIRY_TAG};
use dealflow_core::invoice::{InvoiceItemInput, prepare_invoice};
use dealflow_core::line_items::{LineItemBatch, LineItemInput};
use dealflow_core::pipeline::DealStatus;
use dealflow_core::product::ProductDraft;
use dealflow_core::tags::TaggedEntity;
use dealflow_db::entities::{contacts, deals, invoices, notes, tags};
use dealflow_db::repositories::{ContactError, InquiryError, InvoiceError, TagError};
use dealflow_db::{
    ContactRepository, InquiryRepository, InvoiceRepository, LineItemRepository,
    ProductRepository, TagRepository, UserRepository,
};
use dealflow_shared::auth::IdentityClaims;
use dealflow_shared::types::{ContactId, DealId, InvoiceId, PageRequest, ProductId};

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

#[tokio::test]
async fn test_tag_reconcile_is_idempotent() {
    let db = match common::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {}", e);
            return;
        }
    };
    let owner = common::create_owner(&db).await;
    let deal = common::create_deal(&db, owner.owner, "Lead").await;
    let entity = TaggedEntity::Deal(DealId::from_uuid(deal.id));
    let repo = TagRepository::new(db.clone());
    let unique = Uuid::new_v4().simple().to_string();
    let vip = format!("vip-{unique}");
    let web = format!("web-{unique}");

    let first = repo
        .reconcile(owner.owner, entity, &names(&[&vip.to_uppercase(), &web, &format!(" {vip} ")]))
        .await
        .unwrap();
    assert_eq!(first.len(), 2);

    let second = repo
        .reconcile(owner.owner, entity, &names(&[&vip, &web]))
        .await
        .unwrap();
    assert_eq!(
        first.iter().map(|t| t.id).collect::<Vec<_>>(),
        second.iter().map(|t| t.id).collect::<Vec<_>>()
    );

    let mut expected = vec![vip.clone(), web.clone()];
    expected.sort();
    assert_eq!(repo.names_for(entity).await.unwrap(), expected);

    // Replacing one name removes only that association.
    let other = format!("other-{unique}");
    repo.reconcile(owner.owner, entity, &names(&[&vip, &other]))
        .await
        .unwrap();
    let mut expected = vec![vip.clone(), other];
    expected.sort();
    assert_eq!(repo.names_for(entity).await.unwrap(), expected);

    // Tags outlive their associations.
    let kept = tags::Entity::find()
        .filter(tags::Column::Name.eq(web.as_str()))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(kept, 1);
}

#[tokio::test]
async fn test_racing_creators_of_one_tag_all_succeed() {
    let db = match common::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {}", e);
            return;
        }
    };
    let owner = common::create_owner(&db).await;
    let repo = TagRepository::new(db.clone());
    let tag = format!("race-{}", Uuid::new_v4().simple());

    const CREATORS: usize = 8;
    let mut deal_ids = Vec::with_capacity(CREATORS);
    for _ in 0..CREATORS {
        deal_ids.push(common::create_deal(&db, owner.owner, "Lead").await.id);
    }

    let handles: Vec<_> = deal_ids
        .iter()
        .map(|&deal_id| {
            let repo = repo.clone();
            let owner = owner.owner;
            let desired = names(&[tag.as_str()]);
            tokio::spawn(async move {
                repo.reconcile(
                    owner,
                    TaggedEntity::Deal(DealId::from_uuid(deal_id)),
                    &desired,
                )
                .await
            })
        })
        .collect();

    for joined in join_all(handles).await {
        let resolved = joined.unwrap().unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, tag);
    }

    let stored = tags::Entity::find()
        .filter(tags::Column::Name.eq(tag.as_str()))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(stored, 1);

    for deal_id in deal_ids {
        let attached = repo
            .names_for(TaggedEntity::Deal(DealId::from_uuid(deal_id)))
            .await
            .unwrap();
        assert_eq!(attached, vec![tag.clone()]);
    }
}

#[tokio::test]
async fn test_empty_tag_list_clears_associations() {
    let db = match common::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {}", e);
            return;
        }
    };
    let owner = common::create_owner(&db).await;
    let contact = ContactRepository::new(db.clone())
        .create(
            owner.owner,
            ContactDraft::new("Ada", "ada@example.com", None, None).unwrap(),
        )
        .await
        .unwrap();
    let entity = TaggedEntity::Contact(ContactId::from_uuid(contact.id));
    let repo = TagRepository::new(db.clone());

    repo.reconcile(owner.owner, entity, &names(&["client"]))
        .await
        .unwrap();
    assert_eq!(repo.names_for(entity).await.unwrap(), vec!["client"]);

    let cleared = repo.reconcile(owner.owner, entity, &[]).await.unwrap();
    assert!(cleared.is_empty());
    assert!(repo.names_for(entity).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_tag_foreign_entity_is_not_found() {
    let db = match common::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {}", e);
            return;
        }
    };
    let owner = common::create_owner(&db).await;
    let intruder = common::create_owner(&db).await;
    let deal = common::create_deal(&db, owner.owner, "Lead").await;
    let entity = TaggedEntity::Deal(DealId::from_uuid(deal.id));

    let result = TagRepository::new(db.clone())
        .reconcile(intruder.owner, entity, &names(&["stolen"]))
        .await;
    assert!(matches!(result, Err(TagError::NotFound(_))));
}

#[tokio::test]
async fn test_provision_clips_long_display_name() {
    let db = match common::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {}", e);
            return;
        }
    };
    let claims = IdentityClaims::new(
        &format!("test|{}", Uuid::new_v4()),
        &format!("{}@example.com", Uuid::new_v4().simple()),
        Some(&"Long".repeat(100)),
        chrono::Utc::now() + chrono::Duration::hours(1),
    );

    let user = UserRepository::new(db.clone()).provision(&claims).await.unwrap();

    assert_eq!(user.name.chars().count(), 255);
    assert!(user.name.starts_with("LongLong"));
}

#[tokio::test]
async fn test_duplicate_contact_email_conflicts() {
    let db = match common::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {}", e);
            return;
        }
    };
    let owner = common::create_owner(&db).await;
    let other = common::create_owner(&db).await;
    let repo = ContactRepository::new(db.clone());
    let draft = ContactDraft::new("Ada", "ada@example.com", None, None).unwrap();

    repo.create(owner.owner, draft.clone()).await.unwrap();
    let again = ContactDraft::new("Ada L", "ADA@example.com", None, None).unwrap();
    assert!(matches!(
        repo.create(owner.owner, again).await,
        Err(ContactError::EmailTaken(_))
    ));

    // Emails are unique per owner, not globally.
    repo.create(other.owner, draft).await.unwrap();

    let page = repo.list(owner.owner, PageRequest::default()).await.unwrap();
    assert_eq!(page.meta.total, 1);
}

#[tokio::test]
async fn test_inquiry_creates_contact_deal_and_note() {
    let db = match common::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {}", e);
            return;
        }
    };
    let owner = common::create_owner(&db).await;
    let product = ProductRepository::new(db.clone())
        .create(
            owner.owner,
            ProductDraft::new("Brand Package", None, dec!(1200)).unwrap(),
        )
        .await
        .unwrap();

    let inquiry = Inquiry::new("Grace", "Grace@Example.com", Some("Need a brand")).unwrap();
    let outcome = InquiryRepository::new(db.clone())
        .submit(
            &owner.handle.to_uppercase(),
            inquiry,
            Some(ProductId::from_uuid(product.id)),
        )
        .await
        .unwrap();

    assert!(outcome.contact_created);
    assert_eq!(outcome.contact.email, "grace@example.com");
    assert_eq!(outcome.deal.title, "Brand Package inquiry from Grace");
    assert_eq!(outcome.deal.amount, dec!(1200));
    assert_eq!(outcome.deal.stage, "Lead");
    assert_eq!(DealStatus::from(outcome.deal.status), DealStatus::Pending);
    assert_eq!(outcome.deal.probability, 20);
    assert_eq!(outcome.deal.user_id, owner.user.id);

    let note = outcome.note.unwrap();
    assert_eq!(note.body, "Need a brand");
    assert_eq!(note.deal_id, Some(outcome.deal.id));

    let tags = TagRepository::new(db.clone())
        .names_for(TaggedEntity::Contact(ContactId::from_uuid(outcome.contact.id)))
        .await
        .unwrap();
    assert_eq!(tags, vec![WEBSITE_INQUIRY_TAG]);
}

#[tokio::test]
async fn test_inquiry_with_long_name_and_product_is_accepted() {
    let db = match common::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {}", e);
            return;
        }
    };
    let owner = common::create_owner(&db).await;
    let product_name = "P".repeat(200);
    let product = ProductRepository::new(db.clone())
        .create(
            owner.owner,
            ProductDraft::new(&product_name, None, dec!(50)).unwrap(),
        )
        .await
        .unwrap();

    let inquiry = Inquiry::new(&"N".repeat(200), "long@example.com", None).unwrap();
    let outcome = InquiryRepository::new(db.clone())
        .submit(&owner.handle, inquiry, Some(ProductId::from_uuid(product.id)))
        .await
        .unwrap();

    assert_eq!(outcome.deal.title.chars().count(), 200);
    assert!(outcome.deal.title.starts_with(&product_name));
    assert_eq!(outcome.deal.amount, dec!(50));
    assert_eq!(outcome.contact.name, "N".repeat(200));
}

#[tokio::test]
async fn test_repeat_inquiry_reuses_contact() {
    let db = match common::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {}", e);
            return;
        }
    };
    let owner = common::create_owner(&db).await;
    let repo = InquiryRepository::new(db.clone());

    let first = repo
        .submit(
            &owner.handle,
            Inquiry::new("Grace", "grace@example.com", None).unwrap(),
            None,
        )
        .await
        .unwrap();
    let second = repo
        .submit(
            &owner.handle,
            Inquiry::new("Grace H", " GRACE@example.com", None).unwrap(),
            Some(ProductId::new()),
        )
        .await
        .unwrap();

    assert!(first.contact_created);
    assert!(!second.contact_created);
    assert_eq!(first.contact.id, second.contact.id);
    assert_ne!(first.deal.id, second.deal.id);
    assert_eq!(second.deal.title, "Inquiry from Grace H");
    assert_eq!(second.deal.amount, Decimal::ZERO);
    assert!(second.note.is_none());

    let contact_count = contacts::Entity::find()
        .filter(contacts::Column::UserId.eq(owner.user.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(contact_count, 1);
}

#[tokio::test]
async fn test_unknown_handle_creates_nothing() {
    let db = match common::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {}", e);
            return;
        }
    };
    let email = format!("{}@example.com", Uuid::new_v4().simple());
    let handle = format!("missing-{}", &Uuid::new_v4().simple().to_string()[..12]);

    let result = InquiryRepository::new(db.clone())
        .submit(
            &handle,
            Inquiry::new("Nobody", &email, Some("hello")).unwrap(),
            None,
        )
        .await;
    assert!(matches!(result, Err(InquiryError::OwnerNotFound(_))));

    let stray = contacts::Entity::find()
        .filter(contacts::Column::Email.eq(email.as_str()))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(stray, 0);
    let stray_notes = notes::Entity::find()
        .filter(notes::Column::Body.eq("hello"))
        .filter(notes::Column::ContactId.is_null())
        .count(&db)
        .await
        .unwrap();
    assert_eq!(stray_notes, 0);
}

#[tokio::test]
async fn test_invoice_amount_is_fixed_at_creation() {
    let db = match common::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {}", e);
            return;
        }
    };
    let owner = common::create_owner(&db).await;
    let deal = common::create_deal(&db, owner.owner, "Lead").await;
    let deal_id = DealId::from_uuid(deal.id);
    let today = chrono::Utc::now().date_naive();

    let invoice = InvoiceRepository::new(db.clone())
        .create(
            owner.owner,
            Some(deal_id),
            prepare_invoice(
                &[
                    InvoiceItemInput {
                        description: Some("Design".to_string()),
                        quantity: json!(2),
                        price: json!("100.00"),
                    },
                    InvoiceItemInput {
                        description: Some("Hosting".to_string()),
                        quantity: json!("1"),
                        price: json!(25.5),
                    },
                ],
                today,
                Some(today),
                None,
            )
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(invoice.amount, dec!(225.5));
    assert!(invoice.number.starts_with("INV-"));

    let batch = LineItemBatch::prepare(&[LineItemInput {
        name: "Everything".to_string(),
        description: None,
        quantity: json!(1),
        price: json!(9999),
    }])
    .unwrap();
    LineItemRepository::new(db.clone())
        .replace(owner.owner, deal_id, batch)
        .await
        .unwrap();

    let reloaded = invoices::Entity::find_by_id(invoice.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.amount, dec!(225.5));
    assert_eq!(
        deals::Entity::find_by_id(deal.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap()
            .amount,
        dec!(9999)
    );

    // The stored amount cannot be rewritten either.
    let mut active: invoices::ActiveModel = reloaded.into();
    active.amount = Set(dec!(1));
    assert!(active.update(&db).await.is_err());
}

#[tokio::test]
async fn test_invoice_for_foreign_deal_is_rejected() {
    let db = match common::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {}", e);
            return;
        }
    };
    let owner = common::create_owner(&db).await;
    let intruder = common::create_owner(&db).await;
    let deal = common::create_deal(&db, owner.owner, "Lead").await;
    let today = chrono::Utc::now().date_naive();

    let result = InvoiceRepository::new(db.clone())
        .create(
            intruder.owner,
            Some(DealId::from_uuid(deal.id)),
            prepare_invoice(&[], today, None, None).unwrap(),
        )
        .await;
    assert!(matches!(result, Err(InvoiceError::DealNotFound(_))));

    // Standalone invoices need no deal.
    let standalone = InvoiceRepository::new(db.clone())
        .create(intruder.owner, None, prepare_invoice(&[], today, None, None).unwrap())
        .await
        .unwrap();
    assert_eq!(standalone.amount, Decimal::ZERO);
    assert_eq!(standalone.deal_id, None);

    let repo = InvoiceRepository::new(db.clone());
    let own_id = InvoiceId::from_uuid(standalone.id);
    assert_eq!(
        repo.find(intruder.owner, own_id).await.unwrap().map(|i| i.id),
        Some(standalone.id)
    );
    assert!(repo.find(owner.owner, own_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_invoice_number_collision_is_retried_once() {
    let db = match common::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {}", e);
            return;
        }
    };
    let owner = common::create_owner(&db).await;
    let today = chrono::Utc::now().date_naive();
    let repo = InvoiceRepository::new(db.clone());

    let existing = repo
        .create(owner.owner, None, prepare_invoice(&[], today, None, None).unwrap())
        .await
        .unwrap();
    let fresh = format!("INV-{}", Uuid::new_v4().simple());

    let mut issued = vec![fresh.clone(), existing.number.clone()];
    let created = repo
        .create_with(
            owner.owner,
            None,
            prepare_invoice(&[], today, None, None).unwrap(),
            |_| issued.pop().unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(created.number, fresh);
    assert!(issued.is_empty());
}

#[tokio::test]
async fn test_invoice_number_colliding_twice_is_a_conflict() {
    let db = match common::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {}", e);
            return;
        }
    };
    let owner = common::create_owner(&db).await;
    let today = chrono::Utc::now().date_naive();
    let repo = InvoiceRepository::new(db.clone());

    let existing = repo
        .create(owner.owner, None, prepare_invoice(&[], today, None, None).unwrap())
        .await
        .unwrap();

    let mut attempts = 0;
    let result = repo
        .create_with(
            owner.owner,
            None,
            prepare_invoice(&[], today, None, None).unwrap(),
            |_| {
                attempts += 1;
                existing.number.clone()
            },
        )
        .await;
    assert!(matches!(result, Err(InvoiceError::NumberConflict)));
    assert_eq!(attempts, 2);

    let stored = invoices::Entity::find()
        .filter(invoices::Column::UserId.eq(owner.owner.user_id.into_inner()))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(stored, 1);
}
