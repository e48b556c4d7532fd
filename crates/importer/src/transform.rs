use core_types::{ExternalProduct, Product};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use std::str::FromStr;

/// Converts a catalog record into the stored representation.
pub fn transform(record: ExternalProduct) -> Product {
    Product {
        id: record.id,
        name: record.title,
        price: to_minor_units(record.price),
        description: record.description,
        category: record.category,
        image_url: Some(record.image),
    }
}

/// Major currency units to minor units, truncating toward zero.
///
/// `47.999` becomes `4799`, not `4800`. The multiplication is done on the
/// shortest decimal rendering of the float, so `19.99` becomes `1999` even
/// though `19.99 * 100.0` is `1998.999…` in binary. Values a `Decimal` or an
/// `i64` cannot hold fall back to a saturating float truncation.
pub fn to_minor_units(major: f64) -> i64 {
    Decimal::from_str(&major.to_string())
        .ok()
        .and_then(|price| price.checked_mul(dec!(100)))
        .and_then(|minor| minor.trunc().to_i64())
        .unwrap_or_else(|| (major * 100.0).trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_instead_of_rounding() {
        assert_eq!(to_minor_units(19.99), 1999);
        assert_eq!(to_minor_units(19.999), 1999);
        assert_eq!(to_minor_units(47.999), 4799);
        assert_eq!(to_minor_units(0.005), 0);
        assert_eq!(to_minor_units(9.5), 950);
        assert_eq!(to_minor_units(3.33), 333);
        assert_eq!(to_minor_units(109.95), 10995);
        assert_eq!(to_minor_units(0.0), 0);
    }

    #[test]
    fn binary_noise_does_not_leak_into_cents() {
        assert_eq!(to_minor_units(0.1 + 0.2), 30);
        assert_eq!(to_minor_units(1.15), 115);
        assert_eq!(to_minor_units(4.35), 435);
    }

    #[test]
    fn every_two_decimal_price_maps_to_its_cents() {
        for cents in 0..200_000_i64 {
            let major = cents as f64 / 100.0;
            assert_eq!(to_minor_units(major), cents, "price {major}");
        }
    }

    #[test]
    fn negative_prices_truncate_toward_zero() {
        assert_eq!(to_minor_units(-1.259), -125);
        assert_eq!(to_minor_units(-0.005), 0);
    }

    #[test]
    fn out_of_range_values_saturate() {
        assert_eq!(to_minor_units(1e30), i64::MAX);
        assert_eq!(to_minor_units(f64::NEG_INFINITY), i64::MIN);
        assert_eq!(to_minor_units(f64::NAN), 0);
    }

    #[test]
    fn transform_maps_every_field() {
        let record = ExternalProduct {
            id: 14,
            title: "Monitor".to_string(),
            price: 999.99,
            description: "49 inch".to_string(),
            category: "electronics".to_string(),
            image: String::new(),
        };

        let product = transform(record);
        assert_eq!(
            product,
            Product {
                id: 14,
                name: "Monitor".to_string(),
                price: 99999,
                description: "49 inch".to_string(),
                category: "electronics".to_string(),
                image_url: Some(String::new()),
            }
        );
    }
}
