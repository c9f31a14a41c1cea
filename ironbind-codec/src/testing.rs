//! Shared fixtures for codec tests.

use ironbind_core::{Document, FieldValue, Record};
use ironbind_schema::{Schema, parse_schema, validate_schema};

pub const EBICS_NS: &str = "urn:org:ebics:H004";

const KEYRESPONSE_SCHEMA: &str = r###"<?xml version="1.0" encoding="UTF-8"?>
<bind:bindingSchema xmlns:bind="urn:ironbind:schema"
                    name="ebics-keyresponse"
                    version="H004"
                    targetNamespace="urn:org:ebics:H004"
                    prefix="ebics"
                    elementFormDefault="qualified">
    <complexType name="HVTOrderFlagsType">
        <attribute name="completeOrderData" type="boolean" use="required"/>
        <attribute name="fetchLimit" type="nonNegativeInteger" totalDigits="10" use="required"/>
        <attribute name="fetchOffset" type="nonNegativeInteger" totalDigits="10" use="required"/>
        <anyAttribute namespace="##targetNamespace"/>
    </complexType>
    <complexType name="HVUSigningInfoType">
        <attribute name="readyToBeSigned" type="boolean" use="required"/>
        <attribute name="NumSigRequired" type="positiveInteger" use="required"/>
    </complexType>
    <complexType name="UserIDType">
        <text type="token"/>
        <attribute name="Status" type="integer" use="required">
            <enumeration value="1"/>
            <enumeration value="2"/>
            <enumeration value="3"/>
            <enumeration value="4"/>
            <enumeration value="5"/>
        </attribute>
    </complexType>
    <complexType name="UserPermissionType">
        <attribute name="AuthorisationLevel" type="token">
            <enumeration value="E"/>
            <enumeration value="A"/>
            <enumeration value="B"/>
            <enumeration value="T"/>
        </attribute>
        <element name="OrderTypes" type="token" list="true" minOccurs="0"/>
        <any namespace="##other"/>
    </complexType>
    <complexType name="UserInfoType">
        <element name="UserID" type="UserIDType"/>
        <element name="Name" type="normalizedString" minOccurs="0"/>
        <element name="Permission" type="UserPermissionType" maxOccurs="unbounded"/>
        <any namespace="##other" processContents="lax"/>
    </complexType>
    <complexType name="AddressInfoType">
        <element name="Name" type="normalizedString" minOccurs="0"/>
        <element name="Street" type="normalizedString" minOccurs="0"/>
        <element name="PostCode" type="token" minOccurs="0"/>
        <element name="City" type="normalizedString" minOccurs="0"/>
        <element name="Country" type="token" minOccurs="0"/>
    </complexType>
    <complexType name="BankInfoType">
        <element name="HostID" type="token"/>
        <any namespace="##other" processContents="lax"/>
    </complexType>
    <complexType name="AuthOrderInfoType">
        <element name="OrderType" type="token"/>
        <element name="TransferType" type="token">
            <enumeration value="Upload"/>
            <enumeration value="Download"/>
        </element>
        <element name="Description" type="normalizedString" minOccurs="0"/>
        <element name="NumSigRequired" type="nonNegativeInteger" minOccurs="0"/>
        <any namespace="##other" processContents="lax"/>
    </complexType>
    <complexType name="PartnerInfoType">
        <element name="AddressInfo" type="AddressInfoType"/>
        <element name="BankInfo" type="BankInfoType"/>
        <element name="OrderInfo" type="AuthOrderInfoType" maxOccurs="unbounded"/>
        <any namespace="##other" processContents="lax"/>
    </complexType>
    <complexType name="HTDReponseOrderDataType">
        <element name="PartnerInfo" type="PartnerInfoType"/>
        <element name="UserInfo" type="UserInfoType"/>
        <any namespace="##other" processContents="lax"/>
    </complexType>
    <complexType name="HAAResponseOrderDataType">
        <element name="OrderTypes" type="token" list="true"/>
        <any namespace="##other" processContents="lax"/>
    </complexType>
    <element name="HTDResponseOrderData" type="HTDReponseOrderDataType"/>
    <element name="HAAResponseOrderData" type="HAAResponseOrderDataType"/>
    <element name="HVTOrderFlags" type="HVTOrderFlagsType"/>
    <element name="HVUSigningInfo" type="HVUSigningInfoType"/>
    <element name="UserInfo" type="UserInfoType"/>
</bind:bindingSchema>"###;

/// A complete user data response with one vendor extension.
pub const HTD_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<HTDResponseOrderData xmlns="urn:org:ebics:H004" xmlns:v="urn:vendor">
  <PartnerInfo>
    <AddressInfo>
      <Name>Example Corp</Name>
      <City>Frankfurt</City>
      <Country>DE</Country>
    </AddressInfo>
    <BankInfo>
      <HostID>EBIXHOST</HostID>
    </BankInfo>
    <OrderInfo>
      <OrderType>HTD</OrderType>
      <TransferType>Download</TransferType>
      <NumSigRequired>0</NumSigRequired>
    </OrderInfo>
    <OrderInfo>
      <OrderType>HAA</OrderType>
      <TransferType>Download</TransferType>
      <Description>Available order types</Description>
    </OrderInfo>
  </PartnerInfo>
  <UserInfo>
    <UserID Status="1">USER0001</UserID>
    <Name>Jane Doe</Name>
    <Permission AuthorisationLevel="E">
      <OrderTypes>HTD HAA</OrderTypes>
    </Permission>
    <v:Audit v:level="2"><v:Entry>created</v:Entry></v:Audit>
  </UserInfo>
</HTDResponseOrderData>"#;

/// Parses and validates the key response schema.
pub fn keyresponse_schema() -> Schema {
    let schema = parse_schema(KEYRESPONSE_SCHEMA).expect("fixture schema parses");
    validate_schema(&schema).expect("fixture schema is valid");
    schema
}

/// Builds the user information record of [`HTD_SAMPLE`] without extensions.
pub fn user_info() -> Record {
    Record::new("UserInfoType")
        .with(
            "UserID",
            Record::new("UserIDType").with("value", "USER0001").with("Status", 1),
        )
        .with("Name", "Jane Doe")
        .with(
            "Permission",
            vec![FieldValue::from(
                Record::new("UserPermissionType")
                    .with("AuthorisationLevel", "E")
                    .with("OrderTypes", vec![FieldValue::from("HTD"), FieldValue::from("HAA")]),
            )],
        )
}

/// Builds a minimal valid `HAAResponseOrderData` document.
pub fn haa_document(order_types: &[&str]) -> Document {
    let items = order_types.iter().copied().map(FieldValue::from).collect::<Vec<_>>();
    Document::new(
        "HAAResponseOrderData",
        Record::new("HAAResponseOrderDataType").with("OrderTypes", items),
    )
}
