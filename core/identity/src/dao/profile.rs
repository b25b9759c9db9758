use diesel::prelude::*;

use fg_persistence::executor::{readonly_transaction, AsDao, PoolType};

use crate::dao::{Error, Result};
use crate::db::models::Profile;
use crate::db::schema::profiles as profiles_dsl;

pub struct ProfileDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for ProfileDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

impl<'c> ProfileDao<'c> {
    pub async fn get_by_user_id(&self, user_id: String) -> Result<Profile> {
        readonly_transaction(self.pool, move |conn| {
            profiles_dsl::table
                .filter(profiles_dsl::user_id.eq(&user_id))
                .first(conn)
                .optional()?
                .ok_or(Error::NotFound)
        })
        .await
    }

    /// Bulk lookup used to attach farmer details to crop listings.
    pub async fn by_user_ids(&self, user_ids: Vec<String>) -> Result<Vec<Profile>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(profiles_dsl::table
                .filter(profiles_dsl::user_id.eq_any(&user_ids))
                .load(conn)?)
        })
        .await
    }
}
