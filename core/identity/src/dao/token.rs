use diesel::prelude::*;

use fg_persistence::executor::{do_with_transaction, readonly_transaction, AsDao, PoolType};

use crate::dao::Result;
use crate::db::models::{AuthToken, Profile};
use crate::db::schema::auth_tokens as tokens_dsl;
use crate::db::schema::profiles as profiles_dsl;

pub struct TokenDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for TokenDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

impl<'c> TokenDao<'c> {
    pub async fn create(&self, account_id: String) -> Result<AuthToken> {
        do_with_transaction(self.pool, move |conn| {
            let token = AuthToken::generate(&account_id);
            diesel::insert_into(tokens_dsl::table)
                .values(&token)
                .execute(conn)?;
            Ok(token)
        })
        .await
    }

    /// Maps a session token to the profile it was issued for. Unknown
    /// tokens resolve to `None`.
    pub async fn resolve(&self, token: String) -> Result<Option<Profile>> {
        readonly_transaction(self.pool, move |conn| {
            let auth_token: Option<AuthToken> = tokens_dsl::table
                .find(&token)
                .first(conn)
                .optional()?;

            match auth_token {
                Some(auth_token) => Ok(profiles_dsl::table
                    .filter(profiles_dsl::user_id.eq(&auth_token.account_id))
                    .first(conn)
                    .optional()?),
                None => Ok(None),
            }
        })
        .await
    }

    pub async fn remove(&self, token: String) -> Result<bool> {
        do_with_transaction(self.pool, move |conn| {
            let num_deleted = diesel::delete(tokens_dsl::table.find(&token)).execute(conn)?;
            Ok(num_deleted > 0)
        })
        .await
    }
}
