//! In-process store for local development and tests. Data lives behind a
//! read-write lock that is only written by `seed`.

use super::{StoreError, StoreResult, TravelStore};
use std::collections::HashSet;
use tokio::sync::RwLock;
use wp_core::{City, Country, Hotel, HotelId, SeedData, SeedSummary};

#[derive(Default)]
struct Collections {
    hotels: Vec<Hotel>,
    cities: Vec<City>,
    countries: Vec<Country>,
}

#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TravelStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn search_hotels(&self, query: &str) -> StoreResult<Vec<Hotel>> {
        let data = self.data.read().await;
        Ok(data.hotels.iter().filter(|h| h.matches(query)).cloned().collect())
    }

    async fn search_cities(&self, query: &str) -> StoreResult<Vec<City>> {
        let data = self.data.read().await;
        Ok(data.cities.iter().filter(|c| c.matches(query)).cloned().collect())
    }

    async fn search_countries(&self, query: &str) -> StoreResult<Vec<Country>> {
        let data = self.data.read().await;
        Ok(data
            .countries
            .iter()
            .filter(|c| c.matches(query))
            .cloned()
            .collect())
    }

    async fn hotel_by_id(&self, id: &HotelId) -> StoreResult<Option<Hotel>> {
        let data = self.data.read().await;
        Ok(data.hotels.iter().find(|h| h.id == *id).cloned())
    }

    async fn city_by_name(&self, name: &str) -> StoreResult<Option<City>> {
        let data = self.data.read().await;
        Ok(data.cities.iter().find(|c| c.name == name).cloned())
    }

    async fn country_by_name_or_code(&self, value: &str) -> StoreResult<Option<Country>> {
        let data = self.data.read().await;
        Ok(data
            .countries
            .iter()
            .find(|c| c.is_identified_by(value))
            .cloned())
    }

    async fn is_empty(&self) -> StoreResult<bool> {
        let data = self.data.read().await;
        Ok(data.hotels.is_empty() && data.cities.is_empty() && data.countries.is_empty())
    }

    async fn seed(&self, seed: SeedData) -> StoreResult<SeedSummary> {
        let mut data = self.data.write().await;

        // Validate the whole batch before touching the collections.
        let mut taken: HashSet<HotelId> = data.hotels.iter().map(|h| h.id).collect();
        let mut hotels = Vec::with_capacity(seed.hotels.len());
        for new in seed.hotels {
            let id = match new.id {
                Some(id) => id,
                None => fresh_id(&taken),
            };
            if !taken.insert(id) {
                return Err(StoreError::DuplicateId(id));
            }
            hotels.push(new.into_hotel(id));
        }

        let summary = SeedSummary {
            hotels: hotels.len(),
            cities: seed.cities.len(),
            countries: seed.countries.len(),
        };
        data.hotels.extend(hotels);
        data.cities.extend(seed.cities);
        data.countries.extend(seed.countries);
        Ok(summary)
    }
}

fn fresh_id(taken: &HashSet<HotelId>) -> HotelId {
    loop {
        let id = HotelId::from_bytes(rand::random());
        if !taken.contains(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wp_core::NewHotel;

    fn new_hotel(name: &str, city: &str, country: &str) -> NewHotel {
        NewHotel {
            id: None,
            chain_name: "Test Chain".into(),
            hotel_name: name.into(),
            city: city.into(),
            country: country.into(),
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .seed(SeedData {
                hotels: vec![
                    new_hotel("Amba Hotel Charing Cross", "London", "United Kingdom"),
                    new_hotel("Hotel du Louvre", "Paris", "France"),
                    new_hotel("The Savoy", "London", "United Kingdom"),
                ],
                cities: vec![
                    City {
                        name: "London".into(),
                    },
                    City {
                        name: "Londonderry".into(),
                    },
                    City {
                        name: "Paris".into(),
                    },
                ],
                countries: vec![
                    Country {
                        country: "United Kingdom".into(),
                        countryisocode: "GB".into(),
                    },
                    Country {
                        country: "France".into(),
                        countryisocode: "FR".into(),
                    },
                ],
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_seed_reports_counts_and_assigns_ids() {
        let store = MemoryStore::new();
        let summary = store
            .seed(SeedData {
                hotels: vec![new_hotel("A", "B", "C"), new_hotel("D", "E", "F")],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                hotels: 2,
                cities: 0,
                countries: 0
            }
        );

        assert!(!store.is_empty().await.unwrap());
        let hotels = store.search_hotels("").await.unwrap();
        assert_eq!(hotels.len(), 2);
        assert_ne!(hotels[0].id, hotels[1].id);
    }

    #[tokio::test]
    async fn test_seed_rejects_duplicate_ids_without_partial_insert() {
        let store = MemoryStore::new();
        let id: HotelId = "000000000000000000000001".parse().unwrap();
        let mut a = new_hotel("A", "B", "C");
        a.id = Some(id);
        let mut b = new_hotel("D", "E", "F");
        b.id = Some(id);

        let err = store
            .seed(SeedData {
                hotels: vec![a, b],
                cities: vec![City { name: "X".into() }],
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(dup) if dup == id));
        assert!(store.is_empty().await.unwrap());
        assert!(store.search_hotels("").await.unwrap().is_empty());
        assert!(store.search_cities("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_hotels_across_fields() {
        let store = seeded().await;
        assert_eq!(store.search_hotels("london").await.unwrap().len(), 2);
        assert_eq!(store.search_hotels("FRANCE").await.unwrap().len(), 1);
        assert_eq!(store.search_hotels("savoy").await.unwrap().len(), 1);
        assert!(store.search_hotels("Berlin").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_cities_is_substring() {
        let store = seeded().await;
        let names: Vec<String> = store
            .search_cities("lond")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"London".to_string()));
        assert!(names.contains(&"Londonderry".to_string()));
    }

    #[tokio::test]
    async fn test_city_by_name_is_exact() {
        let store = seeded().await;
        assert!(store.city_by_name("London").await.unwrap().is_some());
        assert!(store.city_by_name("Lond").await.unwrap().is_none());
        assert!(store.city_by_name("london").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_country_by_name_or_code() {
        let store = seeded().await;
        let by_name = store
            .country_by_name_or_code("France")
            .await
            .unwrap()
            .unwrap();
        let by_code = store.country_by_name_or_code("FR").await.unwrap().unwrap();
        assert_eq!(by_name, by_code);
        assert!(store.country_by_name_or_code("fr").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_hotel_by_id_round_trip() {
        let store = seeded().await;
        let savoy = store.search_hotels("savoy").await.unwrap().remove(0);
        let found = store.hotel_by_id(&savoy.id).await.unwrap().unwrap();
        assert_eq!(found, savoy);

        let missing = HotelId::from_bytes([0; 12]);
        assert!(store.hotel_by_id(&missing).await.unwrap().is_none());
    }
}
