//! Diesel schema for order persistence.

diesel::table! {
    /// Print and download orders.
    orders (id) {
        /// Internal order identifier.
        id -> Uuid,
        /// Task the order pays for.
        task_id -> Uuid,
        /// Line items as a JSON array.
        items -> Jsonb,
        /// Delivery city.
        city -> Text,
        /// Free-form remark.
        remark -> Text,
        /// Amount in minor currency units.
        amount_minor -> Int8,
        /// Payment channel.
        channel -> Text,
        /// Payment status.
        #[max_length = 32]
        status -> Varchar,
        /// Idempotency key of the first payment attempt.
        #[max_length = 128]
        payment_key -> Nullable<Varchar>,
        /// Cached payment intent.
        payment_intent -> Nullable<Jsonb>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
