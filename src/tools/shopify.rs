use crate::browser::decode_script_result;
use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Detects a Shopify storefront and the variant to buy
pub const SHOPIFY_DETECT_SCRIPT: &str = include_str!("shopify_detect.js");
/// Adds one unit of `args.variantId` through the storefront cart API
pub const SHOPIFY_CART_SCRIPT: &str = include_str!("shopify_cart.js");

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ShopifyInstantCartParams {}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ShopifyDetection {
    is_shopify: bool,
    variant_id: Option<String>,
    shop_domain: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CartResponse {
    success: bool,
    item: Option<String>,
    variant: Option<String>,
    error: Option<String>,
}

/// Adds the product to the cart without clicking through the product page
#[derive(Default)]
pub struct ShopifyInstantCartTool;

impl Tool for ShopifyInstantCartTool {
    type Params = ShopifyInstantCartParams;

    fn name(&self) -> &str {
        "shopify_instant_cart"
    }

    fn description(&self) -> &str {
        "Detect if the current page is a Shopify store and instantly add the product to cart via API \
         (no clicking needed). Call this FIRST when you land on a product page. If successful, navigate \
         to /checkout to skip the cart page entirely."
    }

    fn execute_typed(&self, _params: ShopifyInstantCartParams, context: &mut ToolContext) -> Result<ToolResult> {
        let driver = context.driver;

        let detection: ShopifyDetection =
            match driver.evaluate(SHOPIFY_DETECT_SCRIPT, None).and_then(decode_script_result) {
                Ok(detection) => detection,
                Err(e) => {
                    log::warn!("Shopify detection failed: {}", e);
                    return Ok(ToolResult::failure(format!(
                        "Shopify detection failed: {}. Use normal add-to-cart flow.",
                        e
                    )));
                }
            };

        if !detection.is_shopify {
            return Ok(ToolResult::success_with(serde_json::json!({
                "shopify": false,
                "message": "Not a Shopify store. Use normal add-to-cart flow.",
            })));
        }

        let Some(variant_id) = detection.variant_id else {
            return Ok(ToolResult::failure(
                "Shopify store detected but no variant id found. Select the variant manually, or use normal add-to-cart.",
            ));
        };

        let args = serde_json::json!({ "variantId": variant_id });
        let cart: CartResponse = match driver.evaluate(SHOPIFY_CART_SCRIPT, Some(&args)).and_then(decode_script_result) {
            Ok(cart) => cart,
            Err(e) => CartResponse { error: Some(e.to_string()), ..Default::default() },
        };

        if !cart.success {
            let error = cart.error.unwrap_or_else(|| "unknown error".to_string());
            log::warn!("Shopify cart API failed: {}", error);
            return Ok(ToolResult::failure(format!(
                "Shopify cart API failed: {}. Use normal add-to-cart button instead.",
                error
            )));
        }

        let item = cart.item.unwrap_or_else(|| "product".to_string());
        let variant = cart.variant.unwrap_or_default();
        log::info!(
            "Shopify instant cart on {}: {} ({})",
            detection.shop_domain.as_deref().unwrap_or("unknown shop"),
            item,
            variant
        );

        Ok(ToolResult::success_with(serde_json::json!({
            "shopify": true,
            "variant_id": variant_id,
            "message": format!(
                "Shopify instant add-to-cart succeeded. Added: {} ({}). Now navigate to /checkout to skip the cart page.",
                item, variant
            ),
        })))
    }
}
