use crate::config::PaymentConfig;
use crate::error::EngineError;
use crate::models::{Amount, CostItem, PaymentMetadata, PaymentRequest};
use crate::service::aggregator::approved_selling_total;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// 与浏览器 encodeURIComponent 相同的保留字符集
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// 构造支付请求：金额为所有放行给客户条目的 VK 之和
pub fn payment_request(
    project_id: &str,
    project_name: &str,
    items: &[CostItem],
    client_email: Option<&str>,
    config: &PaymentConfig,
) -> Result<PaymentRequest, EngineError> {
    let approved: Vec<&CostItem> = items.iter().filter(|i| i.approved_for_client).collect();
    if approved.is_empty() {
        return Err(EngineError::invalid(
            "no items approved for client, nothing to invoice",
        ));
    }
    let total = approved_selling_total(items);
    if !total.is_finite() || total <= 0.0 {
        return Err(EngineError::invalid(format!(
            "invoice amount must be positive, got {:.2}",
            total
        )));
    }

    let separator = if config.redirect_url.contains('?') { '&' } else { '?' };
    let redirect_url = format!(
        "{}{}project={}",
        config.redirect_url,
        separator,
        utf8_percent_encode(project_name, URI_COMPONENT)
    );

    Ok(PaymentRequest {
        amount: Amount {
            currency: config.currency.clone(),
            value: format!("{:.2}", total),
        },
        description: format!("Invoice for project {}", project_name),
        redirect_url,
        webhook_url: config.webhook_url.clone(),
        metadata: PaymentMetadata {
            customer_email: client_email.unwrap_or_default().to_string(),
            project_id: project_id.to_string(),
            items: approved.iter().map(|i| i.description.clone()).collect(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::calculator::recompute;

    fn item(description: &str, quantity: f64, price: f64, approved: bool) -> CostItem {
        let mut item = CostItem::new(description, "p1", "610", "610.1");
        item.description = description.to_string();
        item.quantity = quantity;
        item.purchase_price = price;
        item.markup_percent = 25.0;
        item.approved_for_client = approved;
        recompute(&mut item);
        item
    }

    #[test]
    fn amount_covers_only_approved_items() {
        let items = vec![
            item("Schreibtische", 5.0, 800.0, true),
            item("Leuchten", 10.0, 150.0, false),
            item("Stühle", 2.0, 0.5, true),
        ];
        let req = payment_request(
            "p1",
            "Büro Nord & Süd",
            &items,
            Some("kunde@example.com"),
            &PaymentConfig::default(),
        )
        .unwrap();

        assert_eq!(req.amount.currency, "EUR");
        assert_eq!(req.amount.value, "5001.25");
        assert_eq!(req.description, "Invoice for project Büro Nord & Süd");
        assert!(req
            .redirect_url
            .ends_with("?project=B%C3%BCro%20Nord%20%26%20S%C3%BCd"));
        assert_eq!(req.metadata.items, vec!["Schreibtische", "Stühle"]);
        assert_eq!(req.metadata.customer_email, "kunde@example.com");
    }

    #[test]
    fn nothing_approved_is_rejected() {
        let items = vec![item("Leuchten", 10.0, 150.0, false)];
        let err = payment_request("p1", "X", &items, None, &PaymentConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn serializes_gateway_payload() {
        let items = vec![item("Schreibtische", 5.0, 800.0, true)];
        let req = payment_request("p1", "X", &items, None, &PaymentConfig::default()).unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["amount"]["value"], "5000.00");
        assert!(json["redirectUrl"].is_string());
        assert_eq!(json["metadata"]["customerEmail"], "");
        assert_eq!(json["metadata"]["projectId"], "p1");
    }
}
