use chrono::{NaiveDateTime, TimeZone, Utc};
use uuid::Uuid;

use fg_model::auth::{NewUser, UserProfile};
use fg_model::UserRole;

use crate::db::schema::{accounts, auth_tokens, profiles};

#[derive(Clone, Debug, Identifiable, Insertable, Queryable)]
#[table_name = "accounts"]
pub struct Account {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

impl Account {
    pub fn from_new(email: &str, password_hash: String) -> Account {
        Account {
            id: Uuid::new_v4().to_simple().to_string(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now().naive_utc(),
        }
    }
}

#[derive(Clone, Debug, Identifiable, Insertable, Queryable)]
#[table_name = "auth_tokens"]
#[primary_key(token)]
pub struct AuthToken {
    pub token: String,
    pub account_id: String,
    pub created_at: NaiveDateTime,
}

impl AuthToken {
    pub fn generate(account_id: &str) -> AuthToken {
        AuthToken {
            token: Uuid::new_v4().to_simple().to_string(),
            account_id: account_id.to_string(),
            created_at: Utc::now().naive_utc(),
        }
    }
}

#[derive(Clone, Debug, Identifiable, Insertable, Queryable)]
#[table_name = "profiles"]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub mobile: String,
    pub user_type: UserRole,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Profile {
    pub fn from_new(new_user: &NewUser, account_id: &str) -> Profile {
        let now = Utc::now().naive_utc();
        Profile {
            id: Uuid::new_v4().to_simple().to_string(),
            user_id: account_id.to_string(),
            name: new_user.name.clone(),
            mobile: new_user.mobile.clone(),
            user_type: new_user.user_type,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn into_client(self) -> UserProfile {
        UserProfile {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            mobile: self.mobile,
            user_type: self.user_type,
            created_at: Utc.from_utc_datetime(&self.created_at),
            updated_at: Utc.from_utc_datetime(&self.updated_at),
        }
    }
}
