//! Diesel schema for task persistence.

diesel::table! {
    /// ID-photo tasks.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Owning user identifier, if any.
        #[max_length = 64]
        owner_id -> Nullable<Varchar>,
        /// Specification code.
        spec_code -> Text,
        /// Output width in pixels.
        width_px -> Int8,
        /// Output height in pixels.
        height_px -> Int8,
        /// Output resolution.
        dpi -> Int8,
        /// Uploaded source reference.
        source_ref -> Text,
        /// Processing status.
        #[max_length = 32]
        status -> Varchar,
        /// Failure reason for failed tasks.
        error_msg -> Nullable<Text>,
        /// Baseline asset reference.
        baseline_url -> Nullable<Text>,
        /// Color variant references keyed by color.
        processed_urls -> Jsonb,
        /// Layout references keyed by layout kind.
        layout_urls -> Jsonb,
        /// Colors offered for the task.
        available_colors -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
