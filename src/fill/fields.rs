use crate::checkout::{CardDetails, ShippingAddress};
use crate::flow::SelectorSet;
use serde::{Deserialize, Serialize};

/// ISO 3166 alpha-2 code → English country name, as most checkout selects label them
const COUNTRIES: &[(&str, &str)] = &[
    ("AE", "United Arab Emirates"),
    ("AF", "Afghanistan"),
    ("AL", "Albania"),
    ("AR", "Argentina"),
    ("AT", "Austria"),
    ("AU", "Australia"),
    ("BE", "Belgium"),
    ("BR", "Brazil"),
    ("CA", "Canada"),
    ("CH", "Switzerland"),
    ("CL", "Chile"),
    ("CN", "China"),
    ("CO", "Colombia"),
    ("CZ", "Czech Republic"),
    ("DE", "Germany"),
    ("DK", "Denmark"),
    ("DZ", "Algeria"),
    ("EG", "Egypt"),
    ("ES", "Spain"),
    ("FI", "Finland"),
    ("FR", "France"),
    ("GB", "United Kingdom"),
    ("GR", "Greece"),
    ("HK", "Hong Kong"),
    ("HU", "Hungary"),
    ("ID", "Indonesia"),
    ("IE", "Ireland"),
    ("IL", "Israel"),
    ("IN", "India"),
    ("IT", "Italy"),
    ("JP", "Japan"),
    ("KR", "South Korea"),
    ("MX", "Mexico"),
    ("MY", "Malaysia"),
    ("NL", "Netherlands"),
    ("NO", "Norway"),
    ("NZ", "New Zealand"),
    ("PE", "Peru"),
    ("PH", "Philippines"),
    ("PK", "Pakistan"),
    ("PL", "Poland"),
    ("PT", "Portugal"),
    ("RO", "Romania"),
    ("RU", "Russia"),
    ("SA", "Saudi Arabia"),
    ("SE", "Sweden"),
    ("SG", "Singapore"),
    ("TH", "Thailand"),
    ("TR", "Turkey"),
    ("TW", "Taiwan"),
    ("UA", "Ukraine"),
    ("US", "United States"),
    ("VN", "Vietnam"),
    ("ZA", "South Africa"),
];

/// Universal candidates per shipping field, most specific first
const SHIPPING_SELECTORS: &[(&str, &[&str])] = &[
    (
        "email",
        &[
            "[autocomplete=\"email\"]",
            "input[name=\"email\"]",
            "input[type=\"email\"]",
            "#email",
            "#checkout_email",
            "input[id*=\"email\"]",
        ],
    ),
    (
        "country",
        &[
            "select[autocomplete=\"country\"]",
            "select[name*=\"country\"]",
            "select[autocomplete=\"country-name\"]",
            "#country",
            "select[id*=\"country\"]",
        ],
    ),
    (
        "first_name",
        &[
            "[autocomplete=\"given-name\"]",
            "input[name*=\"first\"]",
            "input[name*=\"First\"]",
            "#firstName",
            "input[id*=\"firstName\"]",
        ],
    ),
    (
        "last_name",
        &[
            "[autocomplete=\"family-name\"]",
            "input[name*=\"last\"]",
            "input[name*=\"Last\"]",
            "#lastName",
            "input[id*=\"lastName\"]",
        ],
    ),
    (
        "address",
        &["[autocomplete=\"address-line1\"]", "input[name*=\"address1\"]", "input[name*=\"street\"]", "#address1"],
    ),
    ("city", &["[autocomplete=\"address-level2\"]", "input[name*=\"city\"]", "#city"]),
    (
        "state",
        &[
            "[autocomplete=\"address-level1\"]",
            "select[name*=\"state\"]",
            "select[name*=\"zone\"]",
            "input[name*=\"state\"]",
            "#province",
        ],
    ),
    (
        "zip_code",
        &["[autocomplete=\"postal-code\"]", "input[name*=\"zip\"]", "input[name*=\"postal\"]", "#postalCode"],
    ),
    ("phone", &["[autocomplete=\"tel\"]", "input[name*=\"phone\"]", "input[type=\"tel\"]", "#phone"]),
];

const PAYMENT_SELECTORS: &[(&str, &[&str])] = &[
    (
        "card_number",
        &[
            "[autocomplete=\"cc-number\"]",
            "input[name*=\"card_number\"]",
            "input[name*=\"cardNumber\"]",
            "input[name*=\"number\"]",
        ],
    ),
    (
        "card_expiry",
        &["[autocomplete=\"cc-exp\"]", "input[name*=\"expiry\"]", "input[name*=\"exp\"]", "input[placeholder*=\"MM\"]"],
    ),
    (
        "card_cvv",
        &["[autocomplete=\"cc-csc\"]", "input[name*=\"cvv\"]", "input[name*=\"cvc\"]", "input[name*=\"verification\"]"],
    ),
    (
        "card_name",
        &[
            "[autocomplete=\"cc-name\"]",
            "input[name*=\"cardholder\"]",
            "input[name*=\"card_name\"]",
            "input[name*=\"nameOnCard\"]",
        ],
    ),
];

/// Country name for an ISO code; unknown codes pass through unchanged
pub fn country_name(code: &str) -> String {
    let upper = code.trim().to_ascii_uppercase();
    COUNTRIES
        .binary_search_by(|(c, _)| c.cmp(&upper.as_str()))
        .map(|idx| COUNTRIES[idx].1.to_string())
        .unwrap_or_else(|_| code.to_string())
}

/// One field the fill engine should set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Logical field name, also the key under which the winning selector is saved
    pub name: String,

    pub value: String,

    /// Candidates tried in order; a saved selector comes first
    pub selectors: Vec<String>,

    pub is_select: bool,

    /// Option value preferred over `value` for selects (e.g. an ISO code)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_code: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            selectors: Vec::new(),
            is_select: false,
            select_code: None,
        }
    }

    /// Saved selector for this name first, then the universal ones
    pub fn with_candidates(mut self, saved: &SelectorSet, universal: &[&str]) -> Self {
        if let Some(selector) = saved.get(&self.name).filter(|s| !s.is_empty()) {
            self.selectors.push(selector.clone());
        }
        let rest: Vec<String> = universal
            .iter()
            .filter(|u| !self.selectors.iter().any(|s| s == *u))
            .map(|u| u.to_string())
            .collect();
        self.selectors.extend(rest);
        self
    }

    pub fn select(mut self, code: impl Into<String>) -> Self {
        self.is_select = true;
        self.select_code = Some(code.into());
        self
    }

    /// Whether there is anything to write
    pub fn has_value(&self) -> bool {
        !self.value.trim().is_empty() || self.select_code.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

fn universal(table: &[(&'static str, &'static [&'static str])], name: &str) -> &'static [&'static str] {
    table.iter().find(|(n, _)| *n == name).map(|(_, sels)| *sels).unwrap_or(&[])
}

/// Shipping/contact descriptors in page order
pub fn shipping_fields(email: &str, shipping: &ShippingAddress, saved: &SelectorSet) -> Vec<FieldDescriptor> {
    let (first_name, last_name) = shipping.split_name();
    let values = [
        ("email", email.to_string()),
        ("country", country_name(&shipping.country)),
        ("first_name", first_name),
        ("last_name", last_name),
        ("address", shipping.street.clone()),
        ("city", shipping.city.clone()),
        ("state", shipping.state.clone()),
        ("zip_code", shipping.zip_code.clone()),
        ("phone", shipping.phone.clone()),
    ];

    values
        .into_iter()
        .map(|(name, value)| {
            let field = FieldDescriptor::new(name, value).with_candidates(saved, universal(SHIPPING_SELECTORS, name));
            if name == "country" { field.select(shipping.country.trim()) } else { field }
        })
        .collect()
}

/// Card descriptors; the cardholder defaults to the shipping name
pub fn payment_fields(card: &CardDetails, shipping_name: &str, saved: &SelectorSet) -> Vec<FieldDescriptor> {
    let cardholder = if card.cardholder_name.trim().is_empty() {
        shipping_name.trim().to_string()
    } else {
        card.cardholder_name.clone()
    };

    let values = [
        ("card_number", card.number.clone()),
        ("card_expiry", card.expiry()),
        ("card_cvv", card.cvv.clone()),
        ("card_name", cardholder),
    ];

    values
        .into_iter()
        .map(|(name, value)| FieldDescriptor::new(name, value).with_candidates(saved, universal(PAYMENT_SELECTORS, name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipping() -> ShippingAddress {
        ShippingAddress {
            full_name: "Jane Doe".to_string(),
            street: "Damrak 1".to_string(),
            city: "Amsterdam".to_string(),
            state: "NH".to_string(),
            zip_code: "1012 LG".to_string(),
            country: "nl".to_string(),
            phone: "+31 6 1234 5678".to_string(),
        }
    }

    #[test]
    fn test_country_table_is_sorted() {
        assert!(COUNTRIES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_country_name() {
        assert_eq!(country_name("NL"), "Netherlands");
        assert_eq!(country_name("gb"), "United Kingdom");
        assert_eq!(country_name("XK"), "XK");
    }

    #[test]
    fn test_shipping_fields_order_and_values() {
        let fields = shipping_fields("jane@example.com", &shipping(), &SelectorSet::new());
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["email", "country", "first_name", "last_name", "address", "city", "state", "zip_code", "phone"]
        );

        let country = &fields[1];
        assert!(country.is_select);
        assert_eq!(country.value, "Netherlands");
        assert_eq!(country.select_code.as_deref(), Some("nl"));
        assert_eq!(fields[3].value, "Doe");
    }

    #[test]
    fn test_saved_selector_first() {
        let mut saved = SelectorSet::new();
        saved.insert("email".to_string(), "#checkout-mail".to_string());
        saved.insert("phone".to_string(), "[autocomplete=\"tel\"]".to_string());

        let fields = shipping_fields("jane@example.com", &shipping(), &saved);
        assert_eq!(fields[0].selectors[0], "#checkout-mail");
        assert_eq!(fields[0].selectors.len(), 7);

        // A saved selector that is also universal is not tried twice
        let phone = fields.iter().find(|f| f.name == "phone").unwrap();
        assert_eq!(phone.selectors.len(), 4);
        assert_eq!(phone.selectors[0], "[autocomplete=\"tel\"]");
    }

    #[test]
    fn test_payment_fields_use_discovery_names() {
        let card = CardDetails {
            number: "4111111111111111".to_string(),
            cvv: "123".to_string(),
            expiry_month: "4".to_string(),
            expiry_year: "2030".to_string(),
            cardholder_name: String::new(),
        };
        let mut saved = SelectorSet::new();
        saved.insert("card_cvv".to_string(), "#cvc".to_string());

        let fields = payment_fields(&card, "Jane Doe", &saved);
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["card_number", "card_expiry", "card_cvv", "card_name"]);
        assert_eq!(fields[1].value, "04/30");
        assert_eq!(fields[2].selectors[0], "#cvc");
        assert_eq!(fields[3].value, "Jane Doe");
    }

    #[test]
    fn test_has_value() {
        assert!(!FieldDescriptor::new("city", "  ").has_value());
        assert!(FieldDescriptor::new("country", "").select("NL").has_value());
    }
}
