//! Basic enumerations for finance records

use serde::{Deserialize, Serialize};

/// Account kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Bank,
    Cash,
    CreditCard,
    Savings,
    Investment,
    Loan,
    Ewallet,
}

impl AccountType {
    /// Accounts whose balance is money owed
    pub fn is_liability(&self) -> bool {
        matches!(self, AccountType::CreditCard | AccountType::Loan)
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "bank" => Ok(AccountType::Bank),
            "cash" => Ok(AccountType::Cash),
            "credit_card" | "credit" => Ok(AccountType::CreditCard),
            "savings" | "saving" => Ok(AccountType::Savings),
            "investment" => Ok(AccountType::Investment),
            "loan" | "debt" => Ok(AccountType::Loan),
            "ewallet" | "e_wallet" | "wallet" => Ok(AccountType::Ewallet),
            _ => Err(format!("Invalid account type: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountType::Bank => write!(f, "Bank"),
            AccountType::Cash => write!(f, "Cash"),
            AccountType::CreditCard => write!(f, "Credit Card"),
            AccountType::Savings => write!(f, "Savings"),
            AccountType::Investment => write!(f, "Investment"),
            AccountType::Loan => write!(f, "Loan"),
            AccountType::Ewallet => write!(f, "E-Wallet"),
        }
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Closed,
    Paused,
}

impl std::str::FromStr for AccountStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" | "open" => Ok(AccountStatus::Active),
            "closed" => Ok(AccountStatus::Closed),
            "paused" => Ok(AccountStatus::Paused),
            _ => Err(format!("Invalid account status: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "Active"),
            AccountStatus::Closed => write!(f, "Closed"),
            AccountStatus::Paused => write!(f, "Paused"),
        }
    }
}

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
    Transfer,
}

impl std::str::FromStr for TransactionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" | "in" => Ok(TransactionType::Income),
            "expense" | "out" => Ok(TransactionType::Expense),
            "transfer" => Ok(TransactionType::Transfer),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => write!(f, "Income"),
            TransactionType::Expense => write!(f, "Expense"),
            TransactionType::Transfer => write!(f, "Transfer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_account_type() {
        assert_eq!("Credit Card".parse::<AccountType>(), Ok(AccountType::CreditCard));
        assert_eq!("e-wallet".parse::<AccountType>(), Ok(AccountType::Ewallet));
        assert!("yacht".parse::<AccountType>().is_err());
        assert!(AccountType::Loan.is_liability());
    }

    #[test]
    fn test_transaction_type_serde() {
        let json = serde_json::to_string(&TransactionType::Transfer).unwrap();
        assert_eq!(json, "\"Transfer\"");
        assert_eq!("EXPENSE".parse::<TransactionType>(), Ok(TransactionType::Expense));
    }
}
