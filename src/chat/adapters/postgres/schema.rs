//! Diesel schema for chat persistence.

diesel::table! {
    /// Conversation records.
    conversations (id) {
        /// Store-assigned identifier.
        id -> Text,
        /// Participant identifiers as a JSON array of strings.
        user_ids -> Jsonb,
        /// Game scope; empty when unscoped.
        game_id -> Text,
        /// Creation timestamp.
        created_on -> Timestamptz,
        /// Last update timestamp.
        updated_on -> Timestamptz,
    }
}

diesel::table! {
    /// Message records, looked up by id or by conversation.
    messages (id) {
        /// Store-assigned identifier.
        id -> Text,
        /// Authoring user.
        user_id -> Text,
        /// Owning conversation.
        conversation_id -> Text,
        /// Message content.
        text -> Text,
        /// Creation timestamp.
        created_on -> Timestamptz,
        /// Last update timestamp.
        updated_on -> Timestamptz,
        /// Insertion sequence, assigned by the database.
        seq -> Int8,
    }
}
