use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use uuid::Uuid;

use fg_model::market::{MarketPrice, NewMarketPrice};
use fg_persistence::types::BigDecimalField;

use crate::db::schema::market_prices;

#[derive(Clone, Debug, Identifiable, Insertable, Queryable)]
#[table_name = "market_prices"]
pub struct Price {
    pub id: String,
    pub marketer_id: String,
    pub crop_name: String,
    pub current_price: BigDecimalField,
    pub market_location: String,
    pub price_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Price {
    pub fn from_new(new: &NewMarketPrice, marketer_id: &str) -> Price {
        let now = Utc::now().naive_utc();
        Price {
            id: Uuid::new_v4().to_simple().to_string(),
            marketer_id: marketer_id.to_string(),
            crop_name: new.crop_name.clone(),
            current_price: new.current_price.clone().into(),
            market_location: new.market_location.clone(),
            price_date: new.price_date.unwrap_or_else(|| Utc::now().date_naive()),
            notes: new.notes.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn into_client(self) -> MarketPrice {
        MarketPrice {
            id: self.id,
            marketer_id: self.marketer_id,
            crop_name: self.crop_name,
            current_price: self.current_price.into(),
            market_location: self.market_location,
            price_date: self.price_date,
            notes: self.notes,
            created_at: Utc.from_utc_datetime(&self.created_at),
        }
    }
}
