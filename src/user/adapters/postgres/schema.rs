//! Diesel schema for user persistence.

diesel::table! {
    /// Registered users keyed by internal identifier.
    users (id) {
        /// Internal user identifier.
        #[max_length = 64]
        id -> Varchar,
        /// External identity provider open id.
        #[max_length = 128]
        open_id -> Varchar,
        /// Display name.
        nickname -> Text,
        /// Avatar URL.
        avatar_url -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
