//! Benchmark fixtures.
//!
//! Documents are generated against the EBICS key response schema bundled
//! in `schemas/keyresponse.xml` and scale with the number of repeated
//! entries, so that decode and encode costs can be compared across sizes.

use ironbind_codec::Codec;
use ironbind_core::{Document, ExtensionElement, FieldValue, QName, Record};
use ironbind_schema::SchemaError;

/// Schema description used by all benchmarks.
pub const KEYRESPONSE_SCHEMA: &str = include_str!("../schemas/keyresponse.xml");

/// Namespace of the vendor extension elements in generated documents.
pub const VENDOR_NS: &str = "urn:vendor";

const ORDER_TYPES: [&str; 6] = ["HIA", "HPB", "HTD", "HAA", "INI", "PTK"];

/// Builds a codec over the bundled schema.
///
/// # Errors
/// Returns `SchemaError` if the bundled schema does not load.
pub fn keyresponse_codec() -> Result<Codec, SchemaError> {
    Codec::from_schema_str(KEYRESPONSE_SCHEMA)
}

/// Builds an `HTDResponseOrderData` document.
///
/// # Arguments
/// * `order_infos` - Number of `OrderInfo` entries (at least one is written)
/// * `permissions` - Number of `Permission` entries (at least one is written)
/// * `extensions` - Number of vendor extension elements under `UserInfo`
#[must_use]
pub fn htd_document(order_infos: usize, permissions: usize, extensions: usize) -> Document {
    let orders = (0..order_infos.max(1))
        .map(|i| {
            let mut order = Record::new("AuthOrderInfoType")
                .with("OrderType", ORDER_TYPES[i % ORDER_TYPES.len()])
                .with("TransferType", if i % 2 == 0 { "Download" } else { "Upload" });
            if i % 3 == 0 {
                order.set("NumSigRequired", (i % 4) as u32);
            }
            FieldValue::from(order)
        })
        .collect::<Vec<_>>();

    let partner = Record::new("PartnerInfoType")
        .with(
            "AddressInfo",
            Record::new("AddressInfoType")
                .with("Name", "Example Corp")
                .with("City", "Frankfurt")
                .with("Country", "DE"),
        )
        .with("BankInfo", Record::new("BankInfoType").with("HostID", "EBIXHOST"))
        .with("OrderInfo", orders);

    let grants = (0..permissions.max(1))
        .map(|i| {
            let order_types = ORDER_TYPES
                .iter()
                .cycle()
                .skip(i)
                .take(3)
                .copied()
                .map(FieldValue::from)
                .collect::<Vec<_>>();
            FieldValue::from(
                Record::new("UserPermissionType")
                    .with("AuthorisationLevel", ["E", "A", "B", "T"][i % 4])
                    .with("OrderTypes", order_types),
            )
        })
        .collect::<Vec<_>>();

    let mut user = Record::new("UserInfoType")
        .with(
            "UserID",
            Record::new("UserIDType").with("value", "USER0001").with("Status", 1),
        )
        .with("Name", "Jane Doe")
        .with("Permission", grants);
    for i in 0..extensions {
        user.any_mut().push(
            ExtensionElement::new(QName::new(VENDOR_NS, "Audit"))
                .with_prefix("v")
                .with_attribute(QName::local("seq"), i.to_string())
                .with_child(ExtensionElement::new(QName::new(VENDOR_NS, "Entry")).with_text("created")),
        );
    }

    Document::new(
        "HTDResponseOrderData",
        Record::new("HTDReponseOrderDataType")
            .with("PartnerInfo", partner)
            .with("UserInfo", user),
    )
}

/// Builds an `HVTOrderFlags` document, the smallest in the schema.
#[must_use]
pub fn order_flags(fetch_limit: u64) -> Document {
    Document::new(
        "HVTOrderFlags",
        Record::new("HVTOrderFlagsType")
            .with("completeOrderData", true)
            .with("fetchLimit", fetch_limit)
            .with("fetchOffset", 0),
    )
}
