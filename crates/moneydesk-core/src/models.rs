//! Finance records shown in the data grids

use chrono::NaiveDate;
use moneydesk_grid::value::parse_date;
use moneydesk_grid::{FieldValue, Record};
use moneydesk_utils::round2;
use serde::{Deserialize, Serialize};

use super::types::{AccountStatus, AccountType, TransactionType};

/// A single money movement
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    /// Booking date, usually `YYYY-MM-DD`
    pub occurred_on: String,
    #[serde(rename = "type", default)]
    pub transaction_type: TransactionType,
    /// Missing amounts are kept as `None` so they can be filtered with `is-null`
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub person: Option<String>,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_account: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub shop: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Debt or billing-cycle tag
    #[serde(default)]
    pub debt_tag: Option<String>,
    #[serde(default)]
    pub percent_back: Option<f64>,
    #[serde(default)]
    pub fixed_back: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Derived by `with_totals`
    #[serde(default)]
    pub total_back: f64,
    /// Derived by `with_totals`
    #[serde(default)]
    pub final_price: f64,
}

impl Transaction {
    /// Fill `total_back` and `final_price` from amount and cashback terms
    pub fn with_totals(mut self) -> Self {
        let amount = self.amount.unwrap_or(0.0);
        let percent = self.percent_back.unwrap_or(0.0);
        let fixed = self.fixed_back.unwrap_or(0.0);
        self.total_back = round2(amount * percent / 100.0 + fixed);
        self.final_price = round2(amount - self.total_back);
        self
    }

    pub fn date(&self) -> Option<NaiveDate> {
        parse_date(&self.occurred_on)
    }

    pub fn has_cashback(&self) -> bool {
        self.percent_back.is_some_and(|p| p != 0.0) || self.fixed_back.is_some_and(|f| f != 0.0)
    }

    pub fn cashback_formula(&self) -> Option<String> {
        cashback_formula(
            self.amount.unwrap_or(0.0),
            self.percent_back,
            self.fixed_back,
            self.total_back,
        )
    }
}

/// Cashback breakdown such as `100.00 x 2% + 1.00 = 3.00`.
///
/// `None` when neither a percentage nor a fixed amount applies.
pub fn cashback_formula(
    amount: f64,
    percent_back: Option<f64>,
    fixed_back: Option<f64>,
    total_back: f64,
) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(percent) = percent_back.filter(|p| *p != 0.0) {
        parts.push(format!("{:.2} x {}%", amount, percent));
    }
    if let Some(fixed) = fixed_back.filter(|f| *f != 0.0) {
        parts.push(format!("{:.2}", fixed));
    }
    if parts.is_empty() {
        return None;
    }
    Some(format!("{} = {:.2}", parts.join(" + "), total_back))
}

fn text(value: &Option<String>) -> FieldValue {
    FieldValue::from(value.clone())
}

impl Record for Transaction {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, key: &str) -> FieldValue {
        match key {
            "id" => FieldValue::from(self.id.as_str()),
            "occurredOn" | "date" => FieldValue::from(self.occurred_on.as_str()),
            "type" | "kind" => FieldValue::from(self.transaction_type.to_string()),
            "amount" => FieldValue::from(self.amount),
            "person" | "owner" | "personName" => text(&self.person),
            "account" | "accountName" => text(&self.account),
            "toAccount" => text(&self.to_account),
            "category" | "categoryName" => text(&self.category),
            "shop" | "shopName" => text(&self.shop),
            "notes" => text(&self.notes),
            "debtTag" => text(&self.debt_tag),
            "percentBack" => FieldValue::from(self.percent_back),
            "fixedBack" => FieldValue::from(self.fixed_back),
            "totalBack" => FieldValue::from(self.total_back),
            "finalPrice" => FieldValue::from(self.final_price),
            "currency" => text(&self.currency),
            _ => FieldValue::Null,
        }
    }
}

/// A money account
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub account_type: AccountType,
    #[serde(default)]
    pub status: AccountStatus,
    /// Current balance; negative for money owed
    #[serde(rename = "amount", alias = "balance", default)]
    pub balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<f64>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_on: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Account {
    /// Remaining credit for accounts with a limit
    pub fn available_credit(&self) -> Option<f64> {
        self.credit_limit
            .map(|limit| round2(limit - self.balance.min(0.0).abs()))
    }
}

impl Record for Account {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, key: &str) -> FieldValue {
        match key {
            "id" => FieldValue::from(self.id.as_str()),
            "name" | "account" | "accountName" => FieldValue::from(self.name.as_str()),
            "type" => FieldValue::from(self.account_type.to_string()),
            "status" => FieldValue::from(self.status.to_string()),
            "amount" | "balance" => FieldValue::from(self.balance),
            "creditLimit" => FieldValue::from(self.credit_limit),
            "availableCredit" => FieldValue::from(self.available_credit()),
            "owner" | "person" => text(&self.owner),
            "institution" => text(&self.institution),
            "currency" => text(&self.currency),
            "openedOn" | "date" => text(&self.opened_on),
            "notes" => text(&self.notes),
            _ => FieldValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase() -> Transaction {
        Transaction {
            id: "t1".to_string(),
            occurred_on: "2024-01-15".to_string(),
            amount: Some(100.0),
            percent_back: Some(2.5),
            fixed_back: Some(1.0),
            shop: Some("Market".to_string()),
            ..Default::default()
        }
        .with_totals()
    }

    #[test]
    fn test_cashback_totals() {
        let tx = purchase();
        assert_eq!(tx.total_back, 3.5);
        assert_eq!(tx.final_price, 96.5);
        assert_eq!(tx.cashback_formula().as_deref(), Some("100.00 x 2.5% + 1.00 = 3.50"));
    }

    #[test]
    fn test_totals_round_half_away_from_zero() {
        let tx = Transaction {
            amount: Some(-0.25),
            percent_back: Some(50.0),
            ..Default::default()
        }
        .with_totals();
        assert_eq!(tx.total_back, -0.13);
        assert_eq!(tx.final_price, -0.12);
    }

    #[test]
    fn test_transaction_record_fields() {
        let tx = purchase();
        assert_eq!(tx.field("type"), FieldValue::from("Expense"));
        assert_eq!(tx.field("person"), FieldValue::Null);
        assert_eq!(tx.field("shopName"), FieldValue::from("Market"));
        assert_eq!(tx.field("finalPrice"), FieldValue::Number(96.5));
        assert_eq!(tx.date(), NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn test_transaction_json_shape() {
        let tx: Transaction = serde_json::from_value(serde_json::json!({
            "id": "t2",
            "occurredOn": "2024-02-20",
            "type": "Income",
            "amount": null,
            "debtTag": "CYCLE-02"
        }))
        .unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Income);
        assert_eq!(tx.amount, None);
        let value = serde_json::to_value(tx.with_totals()).unwrap();
        assert_eq!(value["type"], "Income");
        assert_eq!(value["totalBack"], 0.0);
    }

    #[test]
    fn test_account_available_credit() {
        let card: Account = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "name": "Visa",
            "type": "credit_card",
            "balance": -250.4,
            "creditLimit": 1000
        }))
        .unwrap();
        assert_eq!(card.available_credit(), Some(749.6));
        assert_eq!(card.field("amount"), FieldValue::Number(-250.4));
        assert_eq!(card.field("account"), FieldValue::from("Visa"));
        assert_eq!(card.field("type"), FieldValue::from("Credit Card"));
    }
}
