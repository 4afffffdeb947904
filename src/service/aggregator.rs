use crate::models::{
    Aggregate, CostItem, Field, GroupSummary, ItemStatus, ProjectSummary, Role,
};
use crate::service::{calculator, policy};
use std::collections::BTreeMap;

/// 角色可见的条目：CLIENT 只看到已放行给客户的条目
pub fn visible_items(items: &[CostItem], role: Role) -> impl Iterator<Item = &CostItem> {
    items
        .iter()
        .filter(move |item| role != Role::Client || item.approved_for_client)
}

/// 按完整成本组代码分组，组按字典序升序，不产生空组
pub fn group_by_cost_group<'a, I>(items: I) -> BTreeMap<String, Vec<&'a CostItem>>
where
    I: IntoIterator<Item = &'a CostItem>,
{
    let mut groups: BTreeMap<String, Vec<&'a CostItem>> = BTreeMap::new();
    for item in items {
        groups.entry(item.cost_group.clone()).or_default().push(item);
    }
    groups
}

/// 角色口径的金额：ADMIN/CLIENT 按 VK，PARTNER/VENDOR 按 EK
pub fn priced_total(item: &CostItem, role: Role) -> f64 {
    match role {
        Role::Admin | Role::Client => item.total_selling_price(),
        Role::Partner | Role::Vendor => item.total_purchase_price(),
    }
}

/// 成本组合计与总计；总计恒等于各组合计之和
pub fn aggregate(items: &[CostItem], role: Role) -> Aggregate {
    let per_group_totals: BTreeMap<String, f64> =
        group_by_cost_group(visible_items(items, role))
            .into_iter()
            .map(|(group, members)| {
                let total = members.iter().map(|item| priced_total(item, role)).sum();
                (group, total)
            })
            .collect();
    let grand_total = per_group_totals.values().sum();
    Aggregate {
        per_group_totals,
        grand_total,
    }
}

/// 成本组展示名称 (HOAI / DIN 276)
pub fn cost_group_name(code: &str) -> String {
    match code {
        "610" => "Ausstattung".to_string(),
        "611" => "Allgemeine Einrichtung".to_string(),
        "612" => "Besondere Einrichtung".to_string(),
        "620" => "Sonstige Maßnahmen".to_string(),
        other => format!("Kostengruppe {}", other),
    }
}

/// 各成本组的 EK/VK 汇总，金额按字段可见性屏蔽
pub fn summarize(items: &[CostItem], role: Role) -> Vec<GroupSummary> {
    let show_purchase = policy::can_see_field(role, Field::TotalPurchasePrice);
    let show_selling = policy::can_see_field(role, Field::TotalSellingPrice);

    group_by_cost_group(visible_items(items, role))
        .into_iter()
        .map(|(group, members)| {
            let total_purchase: f64 = members.iter().map(|i| i.total_purchase_price()).sum();
            let total_selling: f64 = members.iter().map(|i| i.total_selling_price()).sum();
            GroupSummary {
                name: cost_group_name(&group),
                cost_group: group,
                count: members.len(),
                total_purchase: show_purchase.then_some(total_purchase),
                total_selling: show_selling.then_some(total_selling),
            }
        })
        .collect()
}

/// 项目概览：EK 给 ADMIN/PARTNER/VENDOR，VK 给 ADMIN/CLIENT，利润只给 ADMIN
pub fn project_summary(items: &[CostItem], role: Role) -> ProjectSummary {
    let visible: Vec<&CostItem> = visible_items(items, role).collect();
    let total_purchase: f64 = visible.iter().map(|i| i.total_purchase_price()).sum();
    let total_selling: f64 = visible.iter().map(|i| i.total_selling_price()).sum();

    ProjectSummary {
        total_items: visible.len(),
        approved_items: visible
            .iter()
            .filter(|i| i.status == ItemStatus::Approved)
            .count(),
        ffe_items: visible.iter().filter(|i| i.is_ffe()).count(),
        total_purchase: policy::can_see_field(role, Field::TotalPurchasePrice)
            .then_some(total_purchase),
        total_selling: policy::can_see_field(role, Field::TotalSellingPrice)
            .then_some(total_selling),
        margin: (role == Role::Admin).then(|| calculator::margin(total_selling, total_purchase)),
    }
}

/// 项目总价 (所有放行给客户的条目 VK 之和)；只给能看到 VK 总价的角色
pub fn client_total(items: &[CostItem], role: Role) -> Option<f64> {
    policy::can_see_field(role, Field::TotalSellingPrice).then(|| approved_selling_total(items))
}

pub fn approved_selling_total(items: &[CostItem]) -> f64 {
    items
        .iter()
        .filter(|item| item.approved_for_client)
        .map(|item| item.total_selling_price())
        .sum()
}
