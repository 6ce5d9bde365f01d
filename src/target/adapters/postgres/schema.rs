//! Diesel schema for target registration persistence.

diesel::table! {
    /// Autoscaling target registration records.
    targets (id) {
        /// Internal target identifier.
        id -> Uuid,
        /// Organisation or repository scope.
        #[max_length = 255]
        scope -> Varchar,
        /// Enterprise host, null for the public platform.
        enterprise_host -> Nullable<Text>,
        /// Installation access token.
        credential -> Text,
        /// Expiry of the installation access token.
        credential_expires_at -> Timestamptz,
        /// Requested machine size.
        #[max_length = 20]
        resource_type -> Nullable<Varchar>,
        /// Provisioning provider endpoint.
        provider_url -> Nullable<Text>,
        /// Worker agent identity.
        #[max_length = 255]
        runner_user -> Nullable<Varchar>,
        /// Lifecycle status (active or deleted).
        #[max_length = 20]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Latest lifecycle timestamp.
        updated_at -> Timestamptz,
    }
}
