//! Diesel schema for download token persistence.

diesel::table! {
    /// Issued download tokens.
    download_tokens (token) {
        /// Token value.
        #[max_length = 64]
        token -> Varchar,
        /// Task the token unlocks.
        task_id -> Uuid,
        /// Holder of the token.
        #[max_length = 64]
        user_id -> Varchar,
        /// Lifecycle status.
        #[max_length = 16]
        status -> Varchar,
        /// Redemption deadline.
        expires_at -> Timestamptz,
        /// Issue timestamp.
        created_at -> Timestamptz,
        /// Redemption timestamp.
        used_at -> Nullable<Timestamptz>,
    }
}
