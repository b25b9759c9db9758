table! {
    crop_submissions (id) {
        id -> Text,
        farmer_id -> Text,
        crop_name -> Text,
        quantity -> Integer,
        desired_price -> Text,
        notes -> Nullable<Text>,
        status -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    market_prices (id) {
        id -> Text,
        marketer_id -> Text,
        crop_name -> Text,
        current_price -> Text,
        market_location -> Text,
        price_date -> Date,
        notes -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

allow_tables_to_appear_in_same_query!(crop_submissions, market_prices);
