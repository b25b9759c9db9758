table! {
    accounts (id) {
        id -> Text,
        email -> Text,
        password_hash -> Text,
        created_at -> Timestamp,
    }
}

table! {
    auth_tokens (token) {
        token -> Text,
        account_id -> Text,
        created_at -> Timestamp,
    }
}

table! {
    profiles (id) {
        id -> Text,
        user_id -> Text,
        name -> Text,
        mobile -> Text,
        user_type -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

joinable!(auth_tokens -> accounts (account_id));
joinable!(profiles -> accounts (user_id));

allow_tables_to_appear_in_same_query!(accounts, auth_tokens, profiles);
