//! Value object marker: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attributes. In this
/// workspace that covers GST identifiers (`Gstin`, `StateCode`, `HsnCode`),
/// invoice numbers and tax splits: two `StateCode("27")` are the same state no
/// matter where they came from. To "change" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
