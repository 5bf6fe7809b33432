//! Data service behaviour against PostgreSQL
//!
//! These tests start a PostgreSQL container and need a Docker daemon. Run
//! them with `cargo test -p test_utils -- --ignored`.

use std::sync::Arc;

use core_kernel::{
    AdapterHealth, Criteria, DepartmentId, GenericRepository, HealthCheckable, PagingInfo,
    Predicate, Voidable, NAME_FIELD,
};
use rust_decimal_macros::dec;
use domain_cashier::{
    Bill, BillService, BillStatus, Department, DepartmentService, Item, ItemService,
};
use infra_db::PgRepository;
use test_utils::{
    assert_invalid_argument, assert_names, assert_none_voided, assert_null_reference,
    assert_storage_error, create_isolated_test_database, init_tracing, BillFixtures,
    DepartmentFixtures, ItemBuilder, ItemFixtures, TestDatabase,
};

struct Context {
    db: TestDatabase,
    departments: DepartmentService,
    items: ItemService,
    bills: BillService,
    pharmacy: DepartmentId,
}

async fn context() -> Context {
    init_tracing();
    let db = create_isolated_test_database()
        .await
        .expect("Failed to create test database");
    let pool = db.pool().clone();

    let departments = DepartmentService::new(Arc::new(PgRepository::<Department>::new(pool.clone())));
    let items = ItemService::new(Arc::new(PgRepository::<Item>::new(pool.clone())));
    let bills = BillService::new(Arc::new(PgRepository::<Bill>::new(pool)));

    let pharmacy = departments
        .save(Some(DepartmentFixtures::pharmacy()))
        .await
        .unwrap()
        .id
        .unwrap();

    Context {
        db,
        departments,
        items,
        bills,
        pharmacy,
    }
}

async fn with_medications(ctx: &Context) {
    for item in ItemFixtures::medications(ctx.pharmacy) {
        ctx.items.save(Some(item)).await.unwrap();
    }
}

mod repository_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_save_then_select_by_id_round_trips() {
        let ctx = context().await;
        let item = ItemBuilder::new()
            .with_name("Aspirin")
            .with_description("300mg tablets")
            .in_department(ctx.pharmacy)
            .voided("Recalled")
            .build();

        let saved = ctx.items.save(Some(item)).await.unwrap();
        let fetched = ctx.items.get_by_id(saved.id.unwrap()).await.unwrap();

        assert_eq!(fetched, saved);
        assert_eq!(fetched.void_reason(), Some("Recalled"));
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_save_updates_existing_row() {
        let ctx = context().await;
        let mut department = ctx.departments.get_by_id(ctx.pharmacy).await.unwrap();
        department.name = "Dispensary".to_string();

        ctx.departments.save(Some(department)).await.unwrap();

        let all = ctx.departments.get_all(true).await.unwrap();
        assert_names(&all, &["Dispensary"]);
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_select_by_unknown_id_is_not_found() {
        let ctx = context().await;
        let err = ctx.departments.get_by_id(DepartmentId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_select_one_detects_ambiguity() {
        let ctx = context().await;
        let repository = PgRepository::<Department>::new(ctx.db.pool().clone());
        repository.save(Department::new("Lab")).await.unwrap();
        repository.save(Department::new("Lab")).await.unwrap();

        let criteria = Criteria::new().add(Predicate::eq(NAME_FIELD, "Lab"));
        assert!(repository.select_one(&criteria).await.unwrap_err().is_ambiguous());
        assert_eq!(repository.count(&criteria).await.unwrap(), 2);
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_purge_and_delete_missing() {
        let ctx = context().await;
        let saved = ctx
            .items
            .save(Some(ItemFixtures::aspirin(ctx.pharmacy)))
            .await
            .unwrap();

        ctx.items.purge(Some(saved.clone())).await.unwrap();

        assert!(ctx.items.get_by_id(saved.id.unwrap()).await.unwrap_err().is_not_found());
        assert_storage_error(ctx.items.purge(Some(saved)).await);
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_constraint_violation_is_storage_error() {
        let ctx = context().await;
        // No such department
        let orphan = ItemBuilder::new().in_department(DepartmentId::new()).build();
        assert_storage_error(ctx.items.save(Some(orphan)).await);
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_save_all_rolls_back_every_row_on_failure() {
        let ctx = context().await;
        let repository = PgRepository::<Item>::new(ctx.db.pool().clone());
        let valid = ItemFixtures::aspirin(ctx.pharmacy);
        let orphan = ItemBuilder::new().in_department(DepartmentId::new()).build();

        assert_storage_error(repository.save_all(vec![valid.clone(), orphan]).await);
        assert!(ctx.items.get_all(true).await.unwrap().is_empty());

        let saved = repository.save_all(vec![valid, ItemFixtures::tylenol(ctx.pharmacy)]).await.unwrap();
        assert_eq!(saved.len(), 2);
        assert_names(&ctx.items.get_all(true).await.unwrap(), &["Aspirin", "Tylenol"]);
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_price_keeps_exact_value_or_is_rejected() {
        let ctx = context().await;
        let exact = ItemBuilder::new().with_price(dec!(1.2345)).in_department(ctx.pharmacy).build();
        let saved = ctx.items.save(Some(exact.clone())).await.unwrap();
        assert_eq!(saved.price, exact.price);

        let too_precise = ItemBuilder::new().with_price(dec!(1.23456)).in_department(ctx.pharmacy).build();
        assert_invalid_argument(ctx.items.save(Some(too_precise)).await, "amount");
        assert_eq!(ctx.items.get_all(true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_long_name_is_invalid_argument() {
        let ctx = context().await;
        let long = Department::new("a".repeat(256));
        assert_invalid_argument(ctx.departments.save(Some(long)).await, "name");
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_unknown_column_is_invalid_argument() {
        let ctx = context().await;
        let repository = PgRepository::<Department>::new(ctx.db.pool().clone());
        let criteria = Criteria::new().add(Predicate::eq("price", "1"));
        assert_invalid_argument(repository.select_one(&criteria).await, "criteria");
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_sessions_carry_configured_settings() {
        let ctx = context().await;
        let (application, timeout): (String, String) = sqlx::query_as(
            "SELECT current_setting('application_name'), current_setting('statement_timeout')",
        )
        .fetch_one(ctx.db.pool())
        .await
        .unwrap();

        assert_eq!(application, infra_db::APPLICATION_NAME);
        assert_eq!(timeout, "30s");
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_health_check_and_closed_pool() {
        let ctx = context().await;
        let repository = PgRepository::<Item>::new(ctx.db.pool().clone());
        assert_eq!(repository.health_check().await.status, AdapterHealth::Healthy);

        ctx.db.pool().close().await;
        assert_eq!(repository.health_check().await.status, AdapterHealth::Unhealthy);
        assert_storage_error(ctx.items.get_all(true).await);
    }
}

mod data_service_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_void_and_unvoid() {
        let ctx = context().await;
        let saved = ctx
            .items
            .save(Some(ItemFixtures::tylenol(ctx.pharmacy)))
            .await
            .unwrap();

        assert_null_reference(ctx.items.void_entity(None, Some("reason")).await);
        assert_invalid_argument(ctx.items.void_entity(Some(saved.clone()), Some("")).await, "reason");

        let voided = ctx
            .items
            .void_entity(Some(saved), Some("Out of stock"))
            .await
            .unwrap();
        assert!(ctx.items.get_by_id(voided.id.unwrap()).await.unwrap().is_voided());

        let unvoided = ctx.items.unvoid_entity(Some(voided)).await.unwrap();
        let stored = ctx.items.get_by_id(unvoided.id.unwrap()).await.unwrap();
        assert!(!stored.is_voided());
        assert_eq!(stored.void_state.date_voided, None);
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_get_all_and_find_by_name() {
        let ctx = context().await;
        with_medications(&ctx).await;

        let active = ctx.items.get_all(false).await.unwrap();
        assert_none_voided(&active);
        assert_names(&active, &["Aspirin", "Tylenol"]);

        assert_names(&ctx.items.find_by_name(Some("Asp"), false).await.unwrap(), &["Aspirin"]);
        assert_names(
            &ctx.items.find_by_name(Some("asp"), true).await.unwrap(),
            &["Aspartame", "Aspirin"],
        );
        assert_invalid_argument(ctx.items.find_by_name(Some(&"a".repeat(256)), false).await, "name_fragment");
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_like_wildcards_are_literal() {
        let ctx = context().await;
        for name in ["50% Dextrose", "500mg Amoxicillin"] {
            let item = ItemBuilder::new().with_name(name).in_department(ctx.pharmacy).build();
            ctx.items.save(Some(item)).await.unwrap();
        }

        assert_names(&ctx.items.find_by_name(Some("50%"), false).await.unwrap(), &["50% Dextrose"]);
        assert!(ctx.items.find_by_name(Some("5_0"), false).await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_paging_over_five_items() {
        let ctx = context().await;
        for item in ItemFixtures::numbered(ctx.pharmacy, 5) {
            ctx.items.save(Some(item)).await.unwrap();
        }

        let mut paging = PagingInfo::new(1, 2);
        let mut sizes = Vec::new();
        loop {
            let page = ctx.items.get_all_paged(false, &mut paging).await.unwrap();
            sizes.push(page.len());
            if paging.has_more_results() != Some(true) {
                break;
            }
            paging.next_page();
        }

        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(paging.total_record_count, Some(5));
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn test_items_by_department_and_bills() {
        let ctx = context().await;
        with_medications(&ctx).await;

        let items = ctx
            .items
            .get_items_by_department(ctx.pharmacy, true, None)
            .await
            .unwrap();
        assert_eq!(items.len(), 3);

        let bill = ctx.bills.save(Some(BillFixtures::pending("R-1001"))).await.unwrap();
        let replacement = ctx
            .bills
            .adjust_bill(Some(bill.clone()), Some("R-1002"))
            .await
            .unwrap();

        let original = ctx.bills.get_bill_by_receipt_number(Some("R-1001")).await.unwrap();
        assert_eq!(original.status, BillStatus::Adjusted);
        assert_eq!(replacement.bill_adjusted, bill.id);
        assert_eq!(
            ctx.bills.get_bill_by_receipt_number(Some("R-1002")).await.unwrap(),
            replacement
        );
    }
}
