//! Unit tests for the identifiers module
//!
//! Tests cover identifier creation, parsing, conversion, and display
//! formatting.

use core_kernel::{
    BranchId, CashMovementId, CashRegisterId, ChargeId, CurrentAccountId, CustomerId, MovementId,
    MovementTypeId, PaymentMethodId, SaleId, UserId,
};
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_new_generates_unique_ids() {
    let a = CurrentAccountId::new();
    let b = CurrentAccountId::new();
    assert_ne!(a, b);
}

#[test]
fn test_v7_ids_are_time_ordered() {
    let first = MovementId::new_v7();
    let second = MovementId::new_v7();
    // v7 UUIDs embed a millisecond timestamp in the most significant bits
    assert!(first.as_uuid().as_bytes() <= second.as_uuid().as_bytes());
}

#[test]
fn test_display_carries_prefix() {
    assert!(CurrentAccountId::new().to_string().starts_with("CTA-"));
    assert!(MovementId::new().to_string().starts_with("MOV-"));
    assert!(MovementTypeId::new().to_string().starts_with("MTY-"));
    assert!(CashRegisterId::new().to_string().starts_with("REG-"));
    assert!(CashMovementId::new().to_string().starts_with("CMV-"));
    assert!(PaymentMethodId::new().to_string().starts_with("PMT-"));
    assert!(SaleId::new().to_string().starts_with("SAL-"));
    assert!(ChargeId::new().to_string().starts_with("CHG-"));
    assert!(CustomerId::new().to_string().starts_with("CUS-"));
    assert!(BranchId::new().to_string().starts_with("BRN-"));
    assert!(UserId::new().to_string().starts_with("USR-"));
}

#[test]
fn test_parse_round_trip() {
    let original = SaleId::new();
    let parsed = SaleId::from_str(&original.to_string()).unwrap();
    assert_eq!(original, parsed);
}

#[test]
fn test_parse_accepts_bare_uuid() {
    let uuid = Uuid::new_v4();
    let parsed = UserId::from_str(&uuid.to_string()).unwrap();
    assert_eq!(parsed.as_uuid(), &uuid);
}

#[test]
fn test_parse_rejects_garbage() {
    assert!(UserId::from_str("not-a-uuid").is_err());
}

#[test]
fn test_uuid_conversion_round_trip() {
    let uuid = Uuid::new_v4();
    let register_id = CashRegisterId::from(uuid);
    let back: Uuid = register_id.into();
    assert_eq!(uuid, back);
}

#[test]
fn test_serde_is_transparent() {
    let id = ChargeId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    let back: ChargeId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}
