use diesel::prelude::*;

use fg_persistence::executor::{do_with_transaction, readonly_transaction, AsDao, PoolType};

use crate::db::model::Price;
use crate::db::schema::market_prices::dsl;
use crate::db::DbResult;

pub struct PriceDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for PriceDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

impl<'c> PriceDao<'c> {
    pub async fn create(&self, price: &Price) -> DbResult<()> {
        let price = price.clone();
        do_with_transaction(self.pool, move |conn| {
            diesel::insert_into(dsl::market_prices)
                .values(price)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    /// Caller's own price reports, most recent observation day first.
    pub async fn list_by_marketer(&self, marketer_id: String) -> DbResult<Vec<Price>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(dsl::market_prices
                .filter(dsl::marketer_id.eq(&marketer_id))
                .order_by((dsl::price_date.desc(), dsl::created_at.desc()))
                .load::<Price>(conn)?)
        })
        .await
    }

    /// Most recently published rows, for the public ticker.
    pub async fn latest(&self, limit: i64) -> DbResult<Vec<Price>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(dsl::market_prices
                .order_by(dsl::created_at.desc())
                .limit(limit)
                .load::<Price>(conn)?)
        })
        .await
    }

    pub async fn list(&self, crop_name: Option<String>) -> DbResult<Vec<Price>> {
        readonly_transaction(self.pool, move |conn| {
            let mut query = dsl::market_prices
                .order_by((dsl::price_date.desc(), dsl::created_at.desc()))
                .into_boxed();

            if let Some(crop_name) = crop_name {
                query = query.filter(dsl::crop_name.eq(crop_name));
            }

            Ok(query.load::<Price>(conn)?)
        })
        .await
    }
}
