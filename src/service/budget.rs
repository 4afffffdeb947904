use crate::models::{BudgetCheck, Category, CostItem, Role};
use crate::service::aggregator::visible_items;
use crate::service::format::format_eur;

/// FF&E 默认预算上限 (EUR)
pub const FFE_BUDGET_LIMIT: f64 = 20_000.0;

/// 某类别条目 VK 合计与上限比较；严格大于才算超预算
pub fn check_budget<'a, I>(items: I, category: Category, limit: f64) -> BudgetCheck
where
    I: IntoIterator<Item = &'a CostItem>,
{
    let total: f64 = items
        .into_iter()
        .filter(|item| item.category == category)
        .map(|item| item.total_selling_price())
        .sum();
    BudgetCheck {
        total,
        limit,
        remaining: limit - total,
        over_budget: total > limit,
    }
}

/// FF&E 预算检查，先按角色过滤 (CLIENT 只计放行条目)
pub fn check_ffe_budget(items: &[CostItem], role: Role, limit: f64) -> BudgetCheck {
    check_budget(visible_items(items, role), Category::Ffe, limit)
}

/// 超预算提示文本 (展示层横幅)，未超预算返回 None
pub fn alert_message(check: &BudgetCheck) -> Option<String> {
    check.over_budget.then(|| {
        format!(
            "FF&E-Budget überschritten: {} von {} (Überschreitung {})",
            format_eur(check.total),
            format_eur(check.limit),
            format_eur(-check.remaining)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::calculator::recompute;

    fn ffe(id: &str, quantity: f64, price: f64, approved: bool) -> CostItem {
        let mut item = CostItem::new(id, "p1", "610", format!("610.{id}"));
        item.category = Category::Ffe;
        item.quantity = quantity;
        item.purchase_price = price;
        item.approved_for_client = approved;
        recompute(&mut item);
        item
    }

    #[test]
    fn exactly_at_limit_is_not_over_budget() {
        let items = vec![ffe("1", 2.0, 10_000.0, true)];
        let check = check_budget(&items, Category::Ffe, FFE_BUDGET_LIMIT);
        assert_eq!(check.total, 20_000.0);
        assert!(!check.over_budget);
        assert_eq!(check.remaining, 0.0);
        assert_eq!(alert_message(&check), None);
    }

    #[test]
    fn above_limit_raises_signal() {
        let items = vec![ffe("1", 2.0, 10_000.0, true), ffe("2", 1.0, 0.01, true)];
        let check = check_budget(&items, Category::Ffe, FFE_BUDGET_LIMIT);
        assert!(check.over_budget);
        assert!(check.remaining < 0.0);
        let message = alert_message(&check).unwrap();
        assert!(message.contains("20.000,00 €"));
    }

    #[test]
    fn standard_items_are_ignored() {
        let mut standard = ffe("1", 1.0, 50_000.0, true);
        standard.category = Category::Standard;
        let check = check_budget(&[standard], Category::Ffe, FFE_BUDGET_LIMIT);
        assert_eq!(check.total, 0.0);
        assert!(!check.over_budget);
    }

    #[test]
    fn client_budget_counts_only_approved_items() {
        let items = vec![ffe("1", 1.0, 15_000.0, true), ffe("2", 1.0, 10_000.0, false)];
        assert!(check_ffe_budget(&items, Role::Admin, FFE_BUDGET_LIMIT).over_budget);
        let client = check_ffe_budget(&items, Role::Client, FFE_BUDGET_LIMIT);
        assert_eq!(client.total, 15_000.0);
        assert!(!client.over_budget);
    }
}
