//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the migrations exactly; `diesel print-schema` can
//! regenerate them from a live database after schema changes.

diesel::table! {
    /// Local mirror of identity-provider accounts.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        display_name -> Varchar,
        avatar_url -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Events owned by users.
    events (id) {
        id -> Uuid,
        creator_id -> Uuid,
        title -> Varchar,
        description -> Text,
        categories -> Array<Text>,
        cover_image -> Nullable<Jsonb>,
        location_type -> Varchar,
        address -> Nullable<Text>,
        city -> Varchar,
        country -> Varchar,
        coordinates -> Nullable<Jsonb>,
        virtual_link -> Nullable<Text>,
        start_time -> Timestamptz,
        end_time -> Timestamptz,
        timezone -> Varchar,
        capacity -> Nullable<Int4>,
        ticket_price -> Float8,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// RSVPs; one row per user/event pair, status flips on cancel.
    registrations (id) {
        id -> Uuid,
        event_id -> Uuid,
        user_id -> Uuid,
        status -> Varchar,
        registered_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One preferences row per user.
    user_preferences (user_id) {
        user_id -> Uuid,
        interests -> Array<Text>,
        location -> Nullable<Jsonb>,
        notification_settings -> Jsonb,
        privacy_settings -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(events -> users (creator_id));
diesel::joinable!(registrations -> events (event_id));
diesel::joinable!(registrations -> users (user_id));
diesel::joinable!(user_preferences -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, events, registrations, user_preferences);
