//! Payment method catalog
//!
//! Read-only reference data telling the cash register which methods count as
//! physical cash. Classification is an explicit kind on the method; the
//! keyword matcher exists only to map legacy catalog names onto a kind when
//! reference data is loaded without one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::PaymentMethodId;

/// Bucket name used for movements without a payment method
pub const UNDEFINED_METHOD: &str = "Undefined";

/// Classification of a payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    Cash,
    Card,
    Transfer,
    Check,
    DigitalWallet,
    Other,
}

impl PaymentMethodKind {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethodKind::Cash => "cash",
            PaymentMethodKind::Card => "card",
            PaymentMethodKind::Transfer => "transfer",
            PaymentMethodKind::Check => "check",
            PaymentMethodKind::DigitalWallet => "digital_wallet",
            PaymentMethodKind::Other => "other",
        }
    }

    /// Parses the storage form; unknown values fall back to `Other`
    pub fn parse(s: &str) -> Self {
        match s {
            "cash" => PaymentMethodKind::Cash,
            "card" => PaymentMethodKind::Card,
            "transfer" => PaymentMethodKind::Transfer,
            "check" => PaymentMethodKind::Check,
            "digital_wallet" => PaymentMethodKind::DigitalWallet,
            _ => PaymentMethodKind::Other,
        }
    }

    /// Maps a legacy method name onto a kind
    ///
    /// Cash keywords ("efectivo", "cash", "contado") are matched
    /// case-insensitively to preserve the classification behavior observed in
    /// existing catalogs.
    pub fn classify(name: &str) -> Self {
        let name = name.to_lowercase();

        const CASH_KEYWORDS: [&str; 3] = ["efectivo", "cash", "contado"];
        if CASH_KEYWORDS.iter().any(|kw| name.contains(kw)) {
            return PaymentMethodKind::Cash;
        }
        if name.contains("tarjeta") || name.contains("card") {
            return PaymentMethodKind::Card;
        }
        if name.contains("transferencia") || name.contains("transfer") {
            return PaymentMethodKind::Transfer;
        }
        if name.contains("cheque") || name.contains("check") {
            return PaymentMethodKind::Check;
        }
        if name.contains("billetera") || name.contains("wallet") {
            return PaymentMethodKind::DigitalWallet;
        }

        PaymentMethodKind::Other
    }
}

/// A payment method definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    pub kind: PaymentMethodKind,
    pub is_active: bool,
}

impl PaymentMethod {
    /// Creates a method with an explicit kind
    pub fn new(name: impl Into<String>, kind: PaymentMethodKind) -> Self {
        Self {
            id: PaymentMethodId::new_v7(),
            name: name.into(),
            kind,
            is_active: true,
        }
    }

    /// Creates a method from a legacy catalog name, deriving the kind
    pub fn from_legacy_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = PaymentMethodKind::classify(&name);
        Self::new(name, kind)
    }

    /// Returns true when the method moves physical cash
    pub fn is_cash(&self) -> bool {
        self.kind == PaymentMethodKind::Cash
    }
}

/// The payment method catalog
#[derive(Debug, Clone, Default)]
pub struct PaymentMethodCatalog {
    methods: HashMap<PaymentMethodId, PaymentMethod>,
}

impl PaymentMethodCatalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the standard retail catalog
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for method in [
            PaymentMethod::new("Efectivo", PaymentMethodKind::Cash),
            PaymentMethod::new("Tarjeta de crédito", PaymentMethodKind::Card),
            PaymentMethod::new("Tarjeta de débito", PaymentMethodKind::Card),
            PaymentMethod::new("Transferencia", PaymentMethodKind::Transfer),
            PaymentMethod::new("Cheque", PaymentMethodKind::Check),
            PaymentMethod::new("Billetera virtual", PaymentMethodKind::DigitalWallet),
        ] {
            catalog.insert(method);
        }
        catalog
    }

    /// Adds a method, replacing any previous definition with the same id
    pub fn insert(&mut self, method: PaymentMethod) {
        self.methods.insert(method.id, method);
    }

    /// Looks a method up by id
    pub fn get(&self, id: PaymentMethodId) -> Option<&PaymentMethod> {
        self.methods.get(&id)
    }

    /// Finds a method by display name
    pub fn find_by_name(&self, name: &str) -> Option<&PaymentMethod> {
        self.methods.values().find(|m| m.name == name)
    }

    /// Iterates over all methods
    pub fn iter(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.methods.values()
    }
}
