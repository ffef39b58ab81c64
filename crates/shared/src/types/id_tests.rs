use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_typed_id_is_time_ordered() {
    let first = DealId::new();
    let second = DealId::new();
    assert!(first < second);
}

#[test]
fn test_typed_id_uuid_conversions() {
    let uuid = Uuid::new_v4();
    let id = ContactId::from(uuid);
    assert_eq!(id, ContactId::from_uuid(uuid));
    assert_eq!(Uuid::from(id), uuid);
    assert_eq!(id.into_inner(), uuid);
}

#[test]
fn test_typed_id_display_and_parse() {
    let uuid = Uuid::new_v4();
    let id = InvoiceId::from_uuid(uuid);
    assert_eq!(id.to_string(), uuid.to_string());
    assert_eq!(InvoiceId::from_str(&uuid.to_string()).unwrap(), id);
}

#[test]
fn test_typed_id_parse_error() {
    assert!(TagId::from_str("not-a-uuid").is_err());
}

#[test]
fn test_typed_id_serializes_transparently() {
    let uuid = Uuid::new_v4();
    let json = serde_json::to_string(&UserId::from_uuid(uuid)).unwrap();
    assert_eq!(json, format!("\"{uuid}\""));
}
