use crate::models::{CostItem, Field, GroupComparison, ItemStatus, Role, VendorOffer};
use crate::service::aggregator::{group_by_cost_group, visible_items};
use crate::service::policy;
use indexmap::IndexMap;

/// 某成本组内按供应商汇总报价，顺序为供应商首次出现的顺序；无供应商的条目忽略
///
/// EK/VK 合计按角色的字段可见性屏蔽。
pub fn vendor_offers(items: &[CostItem], cost_group: &str, role: Role) -> Vec<VendorOffer> {
    offers_for(
        visible_items(items, role).filter(|item| item.cost_group == cost_group),
        role,
    )
}

fn offers_for<'a, I>(items: I, role: Role) -> Vec<VendorOffer>
where
    I: IntoIterator<Item = &'a CostItem>,
{
    let show_purchase = policy::can_see_field(role, Field::TotalPurchasePrice);
    let show_selling = policy::can_see_field(role, Field::TotalSellingPrice);

    let mut by_vendor: IndexMap<&str, (Vec<String>, f64, f64)> = IndexMap::new();
    for item in items {
        let Some(vendor_id) = item.vendor_id.as_deref() else {
            continue;
        };
        let (ids, purchase, selling) = by_vendor.entry(vendor_id).or_default();
        ids.push(item.id.clone());
        *purchase += item.total_purchase_price();
        *selling += item.total_selling_price();
    }
    by_vendor
        .into_iter()
        .map(|(vendor_id, (item_ids, purchase, selling))| VendorOffer {
            vendor_id: vendor_id.to_string(),
            item_ids,
            total_purchase: show_purchase.then_some(purchase),
            total_selling: show_selling.then_some(selling),
        })
        .collect()
}

/// 全部成本组的报价比较 (升序)，没有任何报价的组省略
pub fn comparison(items: &[CostItem], role: Role) -> Vec<GroupComparison> {
    group_by_cost_group(visible_items(items, role))
        .into_iter()
        .filter_map(|(cost_group, members)| {
            let offers = offers_for(members.iter().copied(), role);
            if offers.is_empty() {
                return None;
            }
            let submitted_item_ids = members
                .iter()
                .filter(|item| item.status == ItemStatus::Submitted)
                .map(|item| item.id.clone())
                .collect();
            Some(GroupComparison {
                cost_group,
                offers,
                submitted_item_ids,
            })
        })
        .collect()
}
