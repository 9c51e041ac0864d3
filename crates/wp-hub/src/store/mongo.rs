//! MongoDB backend. One [`Client`] is shared by all requests; the driver
//! checks a pooled connection out for each operation and returns it when the
//! operation future completes or is dropped.

use super::{StoreResult, TravelStore};
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use wp_core::{City, Country, Hotel, HotelId, SeedData, SeedSummary};

const HOTELS: &str = "hotels";
const CITIES: &str = "cities";
const COUNTRIES: &str = "countries";

/// Used when the connection string names no database.
const DEFAULT_DATABASE: &str = "travel";

/// Hotel as stored: the id is a native ObjectId.
#[derive(Debug, Serialize, Deserialize)]
struct HotelDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default)]
    chain_name: String,
    hotel_name: String,
    city: String,
    country: String,
}

impl From<HotelDocument> for Hotel {
    fn from(doc: HotelDocument) -> Self {
        Hotel {
            id: HotelId::from_bytes(doc.id.bytes()),
            chain_name: doc.chain_name,
            hotel_name: doc.hotel_name,
            city: doc.city,
            country: doc.country,
        }
    }
}

impl From<Hotel> for HotelDocument {
    fn from(hotel: Hotel) -> Self {
        HotelDocument {
            id: ObjectId::from_bytes(hotel.id.bytes()),
            chain_name: hotel.chain_name,
            hotel_name: hotel.hotel_name,
            city: hotel.city,
            country: hotel.country,
        }
    }
}

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(url).await?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE));
        // The driver connects lazily; ping so a bad URL fails at startup.
        db.run_command(doc! { "ping": 1 }).await?;
        tracing::info!("Connected to MongoDB database {}", db.name());
        Ok(Self { db })
    }

    fn hotels(&self) -> Collection<HotelDocument> {
        self.db.collection(HOTELS)
    }

    fn cities(&self) -> Collection<City> {
        self.db.collection(CITIES)
    }

    fn countries(&self) -> Collection<Country> {
        self.db.collection(COUNTRIES)
    }
}

/// Case-insensitive substring filter over `fields`, OR-ed together. The
/// query is escaped so it is matched literally.
fn substring_filter(fields: &[&str], query: &str) -> Document {
    let pattern = regex::escape(query);
    let mut clauses: Vec<Document> = fields
        .iter()
        .map(|field| {
            let mut clause = Document::new();
            clause.insert(*field, doc! { "$regex": pattern.as_str(), "$options": "i" });
            clause
        })
        .collect();
    if clauses.len() == 1 {
        clauses.remove(0)
    } else {
        doc! { "$or": clauses }
    }
}

/// Exact, case-sensitive city name.
fn exact_city_filter(name: &str) -> Document {
    doc! { "name": name }
}

/// Exact, case-sensitive match on either the full name or the ISO code.
fn exact_country_filter(value: &str) -> Document {
    doc! {
        "$or": [
            { "country": value },
            { "countryisocode": value },
        ]
    }
}

#[async_trait::async_trait]
impl TravelStore for MongoStore {
    fn kind(&self) -> &'static str {
        "mongodb"
    }

    async fn search_hotels(&self, query: &str) -> StoreResult<Vec<Hotel>> {
        let filter = substring_filter(&["hotel_name", "country", "city"], query);
        let docs: Vec<HotelDocument> = self.hotels().find(filter).await?.try_collect().await?;
        Ok(docs.into_iter().map(Hotel::from).collect())
    }

    async fn search_cities(&self, query: &str) -> StoreResult<Vec<City>> {
        let filter = substring_filter(&["name"], query);
        let cities: Vec<City> = self.cities().find(filter).await?.try_collect().await?;
        Ok(cities)
    }

    async fn search_countries(&self, query: &str) -> StoreResult<Vec<Country>> {
        let filter = substring_filter(&["country"], query);
        let countries: Vec<Country> = self.countries().find(filter).await?.try_collect().await?;
        Ok(countries)
    }

    async fn hotel_by_id(&self, id: &HotelId) -> StoreResult<Option<Hotel>> {
        let oid = ObjectId::from_bytes(id.bytes());
        let found = self.hotels().find_one(doc! { "_id": oid }).await?;
        Ok(found.map(Hotel::from))
    }

    async fn city_by_name(&self, name: &str) -> StoreResult<Option<City>> {
        Ok(self.cities().find_one(exact_city_filter(name)).await?)
    }

    async fn country_by_name_or_code(&self, value: &str) -> StoreResult<Option<Country>> {
        Ok(self
            .countries()
            .find_one(exact_country_filter(value))
            .await?)
    }

    async fn is_empty(&self) -> StoreResult<bool> {
        let hotels = self.hotels().estimated_document_count().await?;
        let cities = self.cities().estimated_document_count().await?;
        let countries = self.countries().estimated_document_count().await?;
        Ok(hotels == 0 && cities == 0 && countries == 0)
    }

    async fn seed(&self, data: SeedData) -> StoreResult<SeedSummary> {
        let hotels: Vec<HotelDocument> = data
            .hotels
            .into_iter()
            .map(|new| {
                let id = new
                    .id
                    .unwrap_or_else(|| HotelId::from_bytes(ObjectId::new().bytes()));
                HotelDocument::from(new.into_hotel(id))
            })
            .collect();

        let summary = SeedSummary {
            hotels: hotels.len(),
            cities: data.cities.len(),
            countries: data.countries.len(),
        };

        // insert_many rejects an empty batch.
        if !hotels.is_empty() {
            self.hotels().insert_many(hotels).await?;
        }
        if !data.cities.is_empty() {
            self.cities().insert_many(data.cities).await?;
        }
        if !data.countries.is_empty() {
            self.countries().insert_many(data.countries).await?;
        }
        Ok(summary)
    }
}
