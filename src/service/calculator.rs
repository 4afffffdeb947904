use crate::models::{CostItem, Margin};

/// 由 (数量, EK, 加价率) 重新计算派生字段
///
/// 浮点乘法，不做任何舍入；舍入只在展示层进行。幂等、无副作用。
pub fn recompute(item: &mut CostItem) {
    item.total_purchase_price = item.purchase_price * item.quantity;
    item.selling_price_unit = item.purchase_price * (1.0 + item.markup_percent / 100.0);
    item.total_selling_price = item.selling_price_unit * item.quantity;
}

/// 批量重算 (从持久层读入的数据，派生字段可能已过期)
pub fn recompute_all(items: &mut [CostItem]) {
    for item in items.iter_mut() {
        recompute(item);
    }
}

/// 利润额与利润率；EK 为 0 时利润率记为 0
pub fn margin(total_selling: f64, total_purchase: f64) -> Margin {
    let amount = total_selling - total_purchase;
    let percent = if total_purchase > 0.0 {
        amount / total_purchase * 100.0
    } else {
        0.0
    };
    Margin { amount, percent }
}
