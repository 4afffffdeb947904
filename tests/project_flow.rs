use hoai_cost_rust::config::{PaymentConfig, PricingConfig};
use hoai_cost_rust::models::{Actor, Category, ItemPatch, ItemStatus, Role};
use hoai_cost_rust::service::ServiceError;
use hoai_cost_rust::{EngineError, MemoryRepository, ProjectService};
use std::sync::Arc;

fn service() -> ProjectService {
    ProjectService::new(
        Arc::new(MemoryRepository::new()),
        PricingConfig::default(),
        PaymentConfig::default(),
    )
}

fn priced(quantity: f64, price: f64, category: Category, vendor: Option<&str>) -> ItemPatch {
    ItemPatch {
        description: Some("Sofa".to_string()),
        quantity: Some(quantity),
        purchase_price: Some(price),
        markup_percent: Some(25.0),
        category: Some(category),
        vendor_id: vendor.map(str::to_string),
        ..ItemPatch::default()
    }
}

#[test]
fn offer_selection_and_client_invoice() {
    let svc = service();
    let admin = Actor::new(Role::Admin);
    let partner = Actor::new(Role::Partner);
    let client = Actor::new(Role::Client);
    let vendor = Actor::vendor("v-1");

    let sofa = svc.add_item("villa", &admin, "610").unwrap();
    let lamp = svc.add_item("villa", &partner, "610").unwrap();
    assert_eq!(sofa.cost_group_position, "610.1");
    assert_eq!(lamp.cost_group_position, "610.2");

    svc.update_item("villa", &admin, &sofa.id, &priced(5.0, 800.0, Category::Ffe, Some("v-1")))
        .unwrap();
    svc.update_item("villa", &admin, &lamp.id, &priced(2.0, 100.0, Category::Standard, None))
        .unwrap();

    // 供应商改自己条目的 EK -> SUBMITTED
    let offer = ItemPatch {
        purchase_price: Some(720.0),
        ..ItemPatch::default()
    };
    let submitted = svc.update_item("villa", &vendor, &sofa.id, &offer).unwrap();
    assert_eq!(submitted.status, ItemStatus::Submitted);
    assert_eq!(submitted.total_purchase_price(), 3600.0);
    assert_eq!(submitted.total_selling_price(), 4500.0);

    // 其他供应商不能改
    let err = svc
        .update_item("villa", &Actor::vendor("v-2"), &sofa.id, &offer)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Engine(EngineError::PolicyViolation { .. })));

    let groups = svc.comparison("villa", &partner).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].submitted_item_ids, vec![sofa.id.clone()]);

    // PARTNER 比较报价时只看到 EK
    let offer = &groups[0].offers[0];
    assert_eq!(offer.total_purchase, Some(3600.0));
    assert_eq!(offer.total_selling, None);

    let selected = svc.select_vendor("villa", &admin, &sofa.id, "v-1").unwrap();
    assert_eq!(selected.status, ItemStatus::Approved);
    assert!(!selected.approved_for_client);

    // 客户在放行前看不到任何条目
    assert!(svc.list_items("villa", &client).unwrap().is_empty());
    svc.approve_for_client("villa", &admin, &sofa.id).unwrap();

    let report = svc.report("villa", &client).unwrap();
    assert_eq!(report.summary.total_items, 1);
    assert_eq!(report.client_total, Some(4500.0));
    assert_eq!(report.aggregate.grand_total, 4500.0);
    assert!(report.summary.total_purchase.is_none());
    assert!(report.summary.margin.is_none());

    let partner_report = svc.report("villa", &partner).unwrap();
    assert_eq!(partner_report.client_total, None);
    assert_eq!(partner_report.summary.total_selling, None);
    assert_eq!(partner_report.aggregate.grand_total, 3800.0);

    let admin_report = svc.report("villa", &admin).unwrap();
    assert_eq!(admin_report.summary.total_items, 2);
    assert_eq!(admin_report.aggregate.grand_total, 4750.0);
    let margin = admin_report.summary.margin.unwrap();
    assert!((margin.amount - 950.0).abs() < 1e-9);

    let payment = svc
        .payment_request("villa", &admin, "Villa Süd", Some("kunde@example.com"))
        .unwrap();
    assert_eq!(payment.amount.value, "4500.00");
    assert_eq!(payment.amount.currency, "EUR");
    assert!(payment.redirect_url.ends_with("?project=Villa%20S%C3%BCd"));
    assert_eq!(payment.metadata.items, vec!["Sofa".to_string()]);
}

#[test]
fn ffe_budget_alert_only_above_limit() {
    let svc = service();
    let admin = Actor::new(Role::Admin);

    let first = svc.add_item("loft", &admin, "611").unwrap();
    svc.update_item("loft", &admin, &first.id, &priced(1.0, 16_000.0, Category::Ffe, None))
        .unwrap();

    // 16000 * 1.25 = 20000，等于上限不报警
    let report = svc.report("loft", &admin).unwrap();
    let budget = report.ffe_budget.unwrap();
    assert_eq!(budget.total, 20_000.0);
    assert!(!budget.over_budget);
    assert!(report.ffe_alert.is_none());

    let second = svc.add_item("loft", &admin, "611").unwrap();
    svc.update_item("loft", &admin, &second.id, &priced(1.0, 8.0, Category::Ffe, None))
        .unwrap();
    let report = svc.report("loft", &admin).unwrap();
    assert!(report.ffe_budget.unwrap().over_budget);
    assert!(report.ffe_alert.is_some());

    let partner_report = svc.report("loft", &Actor::new(Role::Partner)).unwrap();
    assert!(partner_report.ffe_budget.is_none());
}

#[test]
fn partner_csv_import_cannot_set_restricted_fields() {
    let svc = service();
    let partner = Actor::new(Role::Partner);
    let data = "costGroup;description;quantity;unit;purchasePrice;markupPercent;category;vendorId\n\
                610;Sofa;1;Stk;100;500;FF&E;vendor-x\n\
                610;;1.500;;2,50;;;\n";
    let report = svc.import_csv("villa", &partner, data).unwrap();

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].row, 1);
    assert_eq!(report.created.len(), 1);

    let items = svc.list_items("villa", &Actor::new(Role::Admin)).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 1500.0);
    assert_eq!(items[0]["markupPercent"], 25.0);
    assert_eq!(items[0]["totalPurchasePrice"], 3750.0);
    assert!(items[0]["vendorId"].is_null());
}
