//! Diesel schema for the TourSync tables.

diesel::table! {
    properties (id) {
        id -> Int8,
        address -> Text,
        status -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
        deleted_at -> Nullable<Timestamp>,
    }
}

diesel::table! {
    tours (id) {
        id -> Int8,
        property_id -> Int8,
        tour_time -> Timestamp,
        end_time -> Timestamp,
        status -> Text,
        client_name -> Text,
        phone_number -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::joinable!(tours -> properties (property_id));

diesel::allow_tables_to_appear_in_same_query!(properties, tours);
