use serde::{Deserialize, Serialize};

/// 金额 (货币 + 两位小数字符串)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub currency: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMetadata {
    pub customer_email: String,
    pub project_id: String,
    pub items: Vec<String>,
}

/// 发给支付网关的创建请求；网关调用本身不在本 crate 内
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: Amount,
    pub description: String,
    pub redirect_url: String,
    pub webhook_url: String,
    pub metadata: PaymentMetadata,
}
