//! # Invoice Model
//!
//! The input representation for an export. An invoice is a flat record:
//! meta fields, three parties, a logo, the line items, the adjustments and
//! the free-text footer fields. Only `items` and `adjustments` influence
//! pagination; everything else is carried through to the letterhead and the
//! summary footer.
//!
//! Field names follow the JSON the browser form produces (camelCase), with
//! aliases for the older `qty` / `gst*` spellings.

use crate::totals::clamp_non_negative;
use serde::{Deserialize, Serialize};

/// A complete invoice record, captured once per export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(default)]
    pub meta: InvoiceMeta,

    #[serde(default)]
    pub seller: Party,

    #[serde(default)]
    pub bill_to: Party,

    #[serde(default)]
    pub ship_to: Party,

    #[serde(default)]
    pub logo: Logo,

    /// The table rows, in final display order.
    pub items: Vec<LineItem>,

    #[serde(default)]
    pub adjustments: Adjustments,

    #[serde(default)]
    pub bank: BankDetails,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub terms: String,

    #[serde(default)]
    pub payment_instructions: String,

    #[serde(default)]
    pub signatory_name: String,
}

impl Invoice {
    /// An invoice with the given items and adjustments and empty everything else.
    pub fn new(items: Vec<LineItem>, adjustments: Adjustments) -> Self {
        Self {
            meta: InvoiceMeta::default(),
            seller: Party::default(),
            bill_to: Party::default(),
            ship_to: Party::default(),
            logo: Logo::default(),
            items,
            adjustments,
            bank: BankDetails::default(),
            notes: String::new(),
            terms: String::new(),
            payment_instructions: String::new(),
            signatory_name: String::new(),
        }
    }
}

/// Invoice meta information shown in the letterhead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceMeta {
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub invoice_date: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub payment_terms: String,
    #[serde(default)]
    pub currency: CurrencyCode,
}

/// Supported currencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Eur,
    #[default]
    Aud,
    Usd,
    Gbp,
    Nzd,
    Cad,
    Sgd,
}

/// A contact block: seller, bill-to or ship-to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub address_lines: Vec<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl Party {
    /// The non-blank lines of this party, in display order.
    pub fn lines(&self) -> Vec<&str> {
        std::iter::once(self.name.as_str())
            .chain(std::iter::once(self.company_name.as_str()))
            .chain(self.address_lines.iter().map(String::as_str))
            .chain(std::iter::once(self.phone.as_str()))
            .chain(std::iter::once(self.email.as_str()))
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// The name shown in running headers and PDF metadata.
    pub fn display_name(&self) -> &str {
        let company = self.company_name.trim();
        if company.is_empty() {
            self.name.trim()
        } else {
            company
        }
    }
}

/// Optional logo, usually a `data:image/...;base64,` URL from the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logo {
    #[serde(default)]
    pub data_url: Option<String>,
    #[serde(default)]
    pub alt: String,
}

/// A single table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "qty")]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
}

impl LineItem {
    pub fn new(description: &str, quantity: f64, unit_price: f64) -> Self {
        Self {
            id: None,
            description: description.to_string(),
            quantity,
            unit_price,
        }
    }

    /// Quantity times unit price, with malformed inputs read as zero.
    pub fn line_total(&self) -> f64 {
        clamp_non_negative(self.quantity) * clamp_non_negative(self.unit_price)
    }
}

/// Discount, tax and payment adjustments applied on top of the subtotal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adjustments {
    #[serde(default, alias = "discount")]
    pub discount_amount: f64,
    #[serde(default, alias = "gstEnabled")]
    pub tax_enabled: bool,
    #[serde(default, alias = "gstRatePercent")]
    pub tax_rate_percent: f64,
    #[serde(default)]
    pub amount_paid: f64,
}

/// Bank details entered by the user. Every field is optional; only the
/// filled ones are printed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub account_number: String,
    /// BSB, sort code or routing number.
    #[serde(default)]
    pub bsb_sort_code: String,
    #[serde(default)]
    pub swift_bic: String,
    #[serde(default)]
    pub iban: String,
    /// Free text printed after the structured fields.
    #[serde(default)]
    pub additional_details: String,
}

impl BankDetails {
    /// `(label, value)` pairs for the structured fields that are filled in.
    pub fn labelled_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("Bank Name", self.bank_name.as_str()),
            ("Account Name", self.account_name.as_str()),
            ("Account Number", self.account_number.as_str()),
            ("BSB / Sort Code", self.bsb_sort_code.as_str()),
            ("SWIFT / BIC", self.swift_bic.as_str()),
            ("IBAN", self.iban.as_str()),
        ]
        .into_iter()
        .map(|(label, value)| (label, value.trim()))
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.labelled_fields().is_empty() && self.additional_details.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_form_json_with_aliases() {
        let json = r#"{
            "meta": { "invoiceNumber": "INV-7", "currency": "EUR" },
            "items": [ { "id": "a", "description": "Design", "qty": 2, "unitPrice": 150 } ],
            "adjustments": { "discount": 10, "gstEnabled": true, "gstRatePercent": 10, "amountPaid": 5 }
        }"#;
        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.meta.invoice_number, "INV-7");
        assert_eq!(invoice.meta.currency, CurrencyCode::Eur);
        assert_eq!(invoice.items[0].quantity, 2.0);
        assert_eq!(invoice.items[0].unit_price, 150.0);
        assert_eq!(invoice.adjustments.discount_amount, 10.0);
        assert!(invoice.adjustments.tax_enabled);
        assert_eq!(invoice.adjustments.tax_rate_percent, 10.0);
        assert_eq!(invoice.adjustments.amount_paid, 5.0);
    }

    #[test]
    fn missing_optional_sections_default() {
        let invoice: Invoice = serde_json::from_str(r#"{ "items": [] }"#).unwrap();
        assert!(invoice.items.is_empty());
        assert_eq!(invoice.meta.currency, CurrencyCode::Aud);
        assert!(invoice.seller.is_empty());
        assert!(invoice.bank.is_empty());
    }

    #[test]
    fn missing_items_is_a_schema_error() {
        assert!(serde_json::from_str::<Invoice>("{}").is_err());
    }

    #[test]
    fn party_lines_skip_blanks() {
        let party = Party {
            name: "Jane Roe".to_string(),
            company_name: "  ".to_string(),
            address_lines: vec!["1 Main St".to_string(), "".to_string()],
            phone: String::new(),
            email: "jane@example.com".to_string(),
        };
        assert_eq!(party.lines(), vec!["Jane Roe", "1 Main St", "jane@example.com"]);
        assert_eq!(party.display_name(), "Jane Roe");
    }

    #[test]
    fn bank_fields_only_filled() {
        let bank = BankDetails {
            bank_name: "First Bank".to_string(),
            iban: " DE00 1234 ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            bank.labelled_fields(),
            vec![("Bank Name", "First Bank"), ("IBAN", "DE00 1234")]
        );
        assert!(!bank.is_empty());
    }

    #[test]
    fn line_total_clamps_malformed_inputs() {
        assert_eq!(LineItem::new("x", 3.0, 2.5).line_total(), 7.5);
        assert_eq!(LineItem::new("x", -3.0, 2.5).line_total(), 0.0);
        assert_eq!(LineItem::new("x", f64::NAN, 2.5).line_total(), 0.0);
        assert_eq!(LineItem::new("x", 2.0, f64::INFINITY).line_total(), 0.0);
    }
}
