use rand::Rng;

use crate::entities::{Business, BusinessType};
use crate::utils::cities;

struct CatalogEntry {
    id: i32,
    name: &'static str,
    business_type: BusinessType,
    address: &'static str,
}

const fn entry(
    id: i32,
    name: &'static str,
    business_type: BusinessType,
    address: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        id,
        name,
        business_type,
        address,
    }
}

const CATALOG: [CatalogEntry; 15] = [
    entry(1, "Chicken Inn", BusinessType::FastFood, "123 Leopold Takawira Avenue"),
    entry(2, "Nandos", BusinessType::FastFood, "456 Robert Mugabe Road"),
    entry(3, "Pizza Inn", BusinessType::FastFood, "789 8th Avenue"),
    entry(4, "Steers", BusinessType::FastFood, "321 George Silundika Street"),
    entry(5, "De Bonairs", BusinessType::FastFood, "654 9th Avenue"),
    entry(6, "Bulawayo Club Restaurant", BusinessType::Restaurant, "987 Leopold Takawira Avenue"),
    entry(7, "Hillside Dams Restaurant", BusinessType::Restaurant, "147 Hillside Road"),
    entry(8, "Mugabe International Airport Restaurant", BusinessType::Restaurant, "258 Airport Road"),
    entry(9, "Centenary Park Restaurant", BusinessType::Restaurant, "369 Centenary Park"),
    entry(10, "City Hall Restaurant", BusinessType::Restaurant, "741 Leopold Takawira Avenue"),
    entry(11, "Natural History Museum", BusinessType::Tourism, "852 Leopold Takawira Avenue"),
    entry(12, "Bulawayo Railway Museum", BusinessType::Tourism, "963 Railway Station"),
    entry(13, "Centenary Park", BusinessType::Tourism, "159 Centenary Park"),
    entry(14, "Hillside Dams", BusinessType::Tourism, "753 Hillside Road"),
    entry(15, "Mugabe International Airport", BusinessType::Tourism, "951 Airport Road"),
];

/// Largest jitter applied to either coordinate, in thousandths of a degree.
const JITTER_STEPS: i32 = 5;

fn jitter<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    f64::from(rng.gen_range(-JITTER_STEPS..=JITTER_STEPS)) / 1000.0
}

/// Generate sample businesses scattered around `city`.
///
/// Unknown cities are placed around Bulawayo, but `city` is still copied verbatim
/// into every record. With a type filter only that type's entries are returned, in
/// catalog order and with their catalog ids.
pub fn generate<R: Rng + ?Sized>(
    city: &str,
    business_type: Option<BusinessType>,
    rng: &mut R,
) -> Vec<Business> {
    let center = cities::lookup(city);

    CATALOG
        .iter()
        .filter(|e| business_type.is_none_or(|t| e.business_type == t))
        .map(|e| Business {
            id: e.id,
            name: e.name.to_string(),
            latitude: center.lat + jitter(rng),
            longitude: center.lng + jitter(rng),
            business_type: e.business_type,
            city: city.to_string(),
            address: e.address.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    const EPSILON: f64 = 1e-9;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_generate_restaurants_in_harare() {
        let businesses = generate("Harare", Some(BusinessType::Restaurant), &mut rng());

        assert_eq!(businesses.len(), 5);
        for b in &businesses {
            assert_eq!(b.business_type, BusinessType::Restaurant);
            assert_eq!(b.city, "Harare");
            assert!((b.latitude - -17.8292).abs() <= 0.005 + EPSILON);
            assert!((b.longitude - 31.0522).abs() <= 0.005 + EPSILON);
        }
    }

    #[test]
    fn test_generate_without_filter_returns_whole_catalog() {
        let businesses = generate("Gweru", None, &mut rng());

        assert_eq!(businesses.len(), 15);
        for t in BusinessType::ALL {
            assert_eq!(businesses.iter().filter(|b| b.business_type == t).count(), 5);
        }
        let ids: Vec<i32> = businesses.iter().map(|b| b.id).collect();
        assert_eq!(ids, (1..=15).collect::<Vec<_>>());
    }

    #[test]
    fn test_generate_keeps_catalog_order() {
        let names: Vec<String> = generate("Bulawayo", Some(BusinessType::FastFood), &mut rng())
            .into_iter()
            .map(|b| b.name)
            .collect();

        assert_eq!(
            names,
            ["Chicken Inn", "Nandos", "Pizza Inn", "Steers", "De Bonairs"]
        );
    }

    #[test]
    fn test_unknown_city_is_copied_and_placed_near_default() {
        let businesses = generate("Atlantis", Some(BusinessType::Tourism), &mut rng());

        assert_eq!(businesses.len(), 5);
        for b in &businesses {
            assert_eq!(b.city, "Atlantis");
            assert!((b.latitude - cities::DEFAULT_COORDINATE.lat).abs() <= 0.005 + EPSILON);
            assert!((b.longitude - cities::DEFAULT_COORDINATE.lng).abs() <= 0.005 + EPSILON);
        }
    }

    #[test]
    fn test_same_seed_gives_same_positions() {
        let first = generate("Mutare", None, &mut rng());
        let second = generate("Mutare", None, &mut rng());

        assert_eq!(first, second);
    }

    #[test]
    fn test_jitter_is_whole_thousandths() {
        let mut rng = rng();
        for _ in 0..200 {
            let offset = jitter(&mut rng);
            let steps = offset * 1000.0;
            assert!((steps - steps.round()).abs() < EPSILON);
            assert!(steps.round().abs() <= 5.0);
        }
    }
}
