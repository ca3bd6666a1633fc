//! Diesel schema for the team roster.

diesel::table! {
    /// Team roster entries.
    team_members (id) {
        /// Member identifier.
        id -> Uuid,
        /// Display name, unique ignoring case.
        #[max_length = 100]
        name -> Varchar,
        /// Whether the member can be assigned new tasks.
        is_active -> Bool,
        /// Whether the member is a Head of Department.
        is_hod -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
