use crate::models::Credits;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Product {
    pub sku: &'static str,
    pub description: &'static str,
    /// Price in USD, formatted the way the payment API expects it.
    pub price: &'static str,
    pub grant: Credits,
}

pub const CURRENCY: &str = "USD";

pub const CATALOG: [Product; 4] = [
    Product { sku: "credits_10", description: "10 credits", price: "9.99", grant: Credits::Limited(10) },
    Product { sku: "credits_50", description: "50 credits", price: "39.99", grant: Credits::Limited(50) },
    Product { sku: "credits_100", description: "100 credits", price: "69.99", grant: Credits::Limited(100) },
    Product { sku: "credits_unlimited", description: "Unlimited credits", price: "199.99", grant: Credits::Unlimited },
];

pub fn product(sku: &str) -> Option<&'static Product> {
    CATALOG.iter().find(|product| product.sku == sku)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skus_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            assert!(CATALOG[i + 1..].iter().all(|b| b.sku != a.sku), "duplicate {}", a.sku);
        }
    }

    #[test]
    fn lookup() {
        assert_eq!(product("credits_50").map(|p| p.grant), Some(Credits::Limited(50)));
        assert!(product("credits_5").is_none());
    }
}
