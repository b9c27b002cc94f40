use crate::dom::ElementNode;

/// Evidence that identifies one logical checkout field
struct FieldPattern {
    field: &'static str,
    /// Exact `autocomplete` tokens
    autocomplete: &'static [&'static str],
    /// Substrings of `name` or `id`
    name: &'static [&'static str],
    /// Exact input types
    input_type: &'static [&'static str],
}

/// Checked in order; the first field with any matching evidence wins
const FIELD_TAXONOMY: &[FieldPattern] = &[
    FieldPattern { field: "email", autocomplete: &["email"], name: &["email"], input_type: &["email"] },
    FieldPattern {
        field: "first_name",
        autocomplete: &["given-name"],
        name: &["first", "firstname", "first_name"],
        input_type: &[],
    },
    FieldPattern {
        field: "last_name",
        autocomplete: &["family-name"],
        name: &["last", "lastname", "last_name"],
        input_type: &[],
    },
    FieldPattern {
        field: "address",
        autocomplete: &["address-line1", "street-address"],
        name: &["address1", "street", "address"],
        input_type: &[],
    },
    FieldPattern { field: "city", autocomplete: &["address-level2"], name: &["city"], input_type: &[] },
    FieldPattern {
        field: "state",
        autocomplete: &["address-level1"],
        name: &["state", "province", "zone", "region"],
        input_type: &[],
    },
    FieldPattern {
        field: "zip_code",
        autocomplete: &["postal-code"],
        name: &["zip", "postal", "postcode", "postalcode"],
        input_type: &[],
    },
    FieldPattern {
        field: "country",
        autocomplete: &["country", "country-name"],
        name: &["country", "countrycode"],
        input_type: &[],
    },
    FieldPattern {
        field: "phone",
        autocomplete: &["tel", "tel-national"],
        name: &["phone", "telephone"],
        input_type: &["tel"],
    },
    FieldPattern {
        field: "card_number",
        autocomplete: &["cc-number"],
        name: &["card_number", "cardnumber", "number"],
        input_type: &[],
    },
    FieldPattern {
        field: "card_expiry",
        autocomplete: &["cc-exp"],
        name: &["expiry", "exp", "expiration"],
        input_type: &[],
    },
    FieldPattern {
        field: "card_cvv",
        autocomplete: &["cc-csc"],
        name: &["cvv", "cvc", "verification", "security"],
        input_type: &[],
    },
    FieldPattern {
        field: "card_name",
        autocomplete: &["cc-name"],
        name: &["cardholder", "card_name", "nameoncard"],
        input_type: &[],
    },
];

/// Field names saved under `payment_selectors`
pub const PAYMENT_FIELDS: [&str; 4] = ["card_number", "card_expiry", "card_cvv", "card_name"];

pub fn is_payment_field(field: &str) -> bool {
    PAYMENT_FIELDS.contains(&field)
}

/// Logical field an input represents, if any
pub fn classify_field(element: &ElementNode) -> Option<&'static str> {
    let lower = |attr: &str| element.get_attribute(attr).unwrap_or_default().to_lowercase();
    let auto = lower("autocomplete");
    let name = lower("name");
    let id = lower("id");
    let kind = lower("type");

    FIELD_TAXONOMY
        .iter()
        .find(|p| {
            p.autocomplete.contains(&auto.as_str())
                || p.name.iter().any(|n| name.contains(n) || id.contains(n))
                || p.input_type.contains(&kind.as_str())
        })
        .map(|p| p.field)
}
