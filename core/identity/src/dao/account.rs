use diesel::prelude::*;

use fg_model::auth::{Credentials, NewUser};
use fg_persistence::executor::{do_with_connection, readonly_transaction, AsDao, PoolType};

use crate::dao::{Error, Result};
use crate::db::models::{Account, Profile};
use crate::db::schema::accounts as accounts_dsl;
use crate::db::schema::profiles as profiles_dsl;

pub struct AccountDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for AccountDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

impl<'c> AccountDao<'c> {
    /// Creates the account together with its marketplace profile. Password
    /// hashing runs on the blocking pool, outside the write transaction.
    pub async fn create(&self, new_user: NewUser) -> Result<(Account, Profile)> {
        do_with_connection(self.pool, move |conn| {
            let password_hash = bcrypt::hash(&new_user.password, bcrypt::DEFAULT_COST)?;
            let account = Account::from_new(&new_user.email, password_hash);
            let profile = Profile::from_new(&new_user, &account.id);

            let inserted = conn.immediate_transaction(|| {
                diesel::insert_into(accounts_dsl::table)
                    .values(&account)
                    .execute(conn)?;
                diesel::insert_into(profiles_dsl::table)
                    .values(&profile)
                    .execute(conn)
            });

            use diesel::result::DatabaseErrorKind;
            match inserted {
                Ok(_) => Ok((account, profile)),
                Err(diesel::result::Error::DatabaseError(
                    DatabaseErrorKind::UniqueViolation,
                    _,
                )) => Err(Error::AlreadyExists),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    /// Matches credentials against the stored hash. Unknown email and wrong
    /// password are indistinguishable to the caller.
    pub async fn authenticate(&self, credentials: Credentials) -> Result<Account> {
        do_with_connection(self.pool, move |conn| {
            let account: Account = accounts_dsl::table
                .filter(accounts_dsl::email.eq(&credentials.email))
                .first(conn)
                .optional()?
                .ok_or(Error::NotFound)?;

            match bcrypt::verify(&credentials.password, &account.password_hash)? {
                true => Ok(account),
                false => Err(Error::NotFound),
            }
        })
        .await
    }

    pub async fn list(&self) -> Result<Vec<(Account, Profile)>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(accounts_dsl::table
                .inner_join(profiles_dsl::table)
                .order_by(accounts_dsl::created_at.asc())
                .load(conn)?)
        })
        .await
    }
}
