use crate::checkout::request::{CheckoutRequest, DECISION_NEEDED, DRY_RUN_COMPLETE};
use crate::fill::country_name;
use std::fmt::Write;

/// What the agent knows when it starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// No usable navigation cached; explore from the product page
    Learning { saved_selectors: usize },
    /// A replay script is clicking through the cached prefix
    Replay,
}

fn customer_details(request: &CheckoutRequest) -> String {
    let shipping = &request.shipping;
    let card = &request.card;
    let (first_name, last_name) = shipping.split_name();

    format!(
        "CUSTOMER DETAILS:\n\
         - Email: {}  |  Name: {} {}\n\
         - Address: {}, {}, {} {}\n\
         - Country: {} ({})  |  Phone: {}\n\
         \n\
         PAYMENT: Card {}, Exp {}/{}, CVV {}\n",
        request.email,
        first_name,
        last_name,
        shipping.street,
        shipping.city,
        shipping.state,
        shipping.zip_code,
        country_name(&shipping.country),
        shipping.country,
        shipping.phone,
        card.number,
        card.expiry_month,
        card.expiry_year,
        card.cvv,
    )
}

fn dry_run_rules() -> String {
    format!(
        "\nDRY-RUN MODE:\n\
         - DO NOT click \"Place Order\", \"Complete Purchase\", \"Pay Now\" or any final submit button.\n\
         - Go through the whole checkout and fill every form.\n\
         - Stop right before the final purchase button.\n\
         - Once the final review/payment page is filled in, output \"{}\" as your final message.\n",
        DRY_RUN_COMPLETE
    )
}

fn decision_rules() -> String {
    format!(
        "\nDECISION POINTS (report problems instead of guessing):\n\
         - Requested size/color/variant sold out: call `report_decision_needed` with decision_type=\"variant_unavailable\", \
         the available alternatives in options and the wanted variant in expected_value.\n\
         - Price more than 10% off the expected price: decision_type=\"price_mismatch\" with expected_value and actual_value.\n\
         - Several shipping options with different prices or speeds: decision_type=\"shipping_options\", list them in options.\n\
         - Payment declined or payment method unavailable: decision_type=\"payment_declined\".\n\
         - Blocked by a CAPTCHA or bot detection: decision_type=\"captcha\".\n\
         - After calling report_decision_needed, output \"{}\" as your final message.\n\
         - Never pick an alternative yourself.\n",
        DECISION_NEEDED
    )
}

/// Task prompt for one agent run
pub fn task_prompt(request: &CheckoutRequest, visit: Visit) -> String {
    let mut prompt = String::new();
    let country = country_name(&request.shipping.country);

    match visit {
        Visit::Replay => {
            prompt.push_str(
                "You are a checkout automation agent. An auto-click script is navigating through cookie \
                 banners, add-to-cart and checkout buttons. You may land on the checkout form shortly, or \
                 you may need to handle the remaining steps yourself.\n\n\
                 Assess where you are first:\n\
                 - Product page (auto-click in progress): wait 5-10 seconds, then reassess\n\
                 - Cart/checkout page: click Continue to proceed\n\
                 - Address form: call `fill_shipping_form`\n\
                 - Payment page: call `fill_payment_form`\n\n",
            );
            prompt.push_str(&customer_details(request));
            if request.dry_run {
                prompt.push_str(&dry_run_rules());
            }
            prompt.push_str(&decision_rules());
            prompt.push_str(
                "\nRULES:\n\
                 - Use fill_shipping_form and fill_payment_form, they are faster than typing\n\
                 - Type address parts the tools missed (postcode, house number, street, city)\n\
                 - Dismiss popups, use guest checkout if asked\n\
                 - On the product page, WAIT: the auto-clicks navigate for you\n",
            );
        }
        Visit::Learning { saved_selectors } => {
            let _ = write!(
                prompt,
                "You are a checkout automation agent. Complete the purchase of a product.\n\n\
                 PRODUCT URL: {}\nPRODUCT: {}\n\n",
                request.product_url, request.product_title
            );
            prompt.push_str(&customer_details(request));
            prompt.push_str(
                "\nSTEPS:\n\
                 1. On the product page call `shopify_instant_cart` first\n\
                 2. If it worked, navigate to /checkout; otherwise click the Add to Cart button\n\
                 3. Call `fill_shipping_form` to fill the address form\n\
                 4. Fix any missed fields by hand\n\
                 5. Call `fill_payment_form` when card fields appear\n\
                 6. Fix missed payment fields, then review the order\n",
            );
            if request.dry_run {
                prompt.push_str(&dry_run_rules());
            }
            if saved_selectors > 0 {
                let _ = write!(
                    prompt,
                    "\nNOTE: the form tools have {} saved selectors, most fields fill instantly.\n",
                    saved_selectors
                );
            }
            prompt.push_str(&decision_rules());
            let _ = write!(
                prompt,
                "\nRULES:\n\
                 - Always try `shopify_instant_cart` first on product pages\n\
                 - Dismiss cookie banners (\"Accept\" / \"Alles accepteren\")\n\
                 - Use guest checkout (\"Doorgaan zonder registratie\") if asked\n\
                 - Country: {}\n\
                 - Use fill_shipping_form and fill_payment_form, they are faster than typing\n",
                country
            );
        }
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::ShippingAddress;

    fn request(dry_run: bool) -> CheckoutRequest {
        let mut request = CheckoutRequest::new("https://shop.nl/products/mug");
        request.product_title = "Blue mug".to_string();
        request.dry_run = dry_run;
        request.shipping = ShippingAddress {
            full_name: "Jane Doe".to_string(),
            country: "NL".to_string(),
            ..Default::default()
        };
        request
    }

    #[test]
    fn test_learning_prompt() {
        let prompt = task_prompt(&request(true), Visit::Learning { saved_selectors: 4 });
        assert!(prompt.contains("PRODUCT URL: https://shop.nl/products/mug"));
        assert!(prompt.contains("shopify_instant_cart"));
        assert!(prompt.contains(DRY_RUN_COMPLETE));
        assert!(prompt.contains("4 saved selectors"));
        assert!(prompt.contains("Country: Netherlands"));
        assert!(prompt.contains(DECISION_NEEDED));
    }

    #[test]
    fn test_replay_prompt() {
        let prompt = task_prompt(&request(false), Visit::Replay);
        assert!(prompt.contains("auto-click script"));
        assert!(prompt.contains("Name: Jane Doe"));
        assert!(!prompt.contains(DRY_RUN_COMPLETE));
        assert!(!prompt.contains("PRODUCT URL"));
    }
}
