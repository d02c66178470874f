//! Diesel schema for workflow persistence.

diesel::table! {
    /// Projects scoped to an organization.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Owning organization.
        organization_id -> Int8,
        /// Project name, unique among live projects of the organization.
        #[max_length = 124]
        name -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Soft-delete flag.
        deleted -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Kanban boards.
    boards (id) {
        /// Board identifier.
        id -> Uuid,
        /// Parent project.
        project_id -> Uuid,
        /// Board name, unique among live boards of the project.
        #[max_length = 72]
        name -> Varchar,
        /// Board title.
        #[max_length = 124]
        title -> Varchar,
        /// Active flag.
        active -> Bool,
        /// Soft-delete flag.
        deleted -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ordered workflow columns of a board.
    task_states (id) {
        /// State identifier.
        id -> Uuid,
        /// Owning board.
        board_id -> Uuid,
        /// Display name.
        #[max_length = 72]
        name -> Varchar,
        /// Stable code.
        #[max_length = 60]
        code -> Varchar,
        /// One-based position among live states of the board.
        position -> Int4,
        /// Soft-delete flag.
        deleted -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Board the task lives on.
        board_id -> Uuid,
        /// Task name, unique among live tasks of the board.
        #[max_length = 150]
        name -> Varchar,
        /// Description.
        #[max_length = 2000]
        description -> Varchar,
        /// Due date.
        due_date -> Date,
        /// Priority between one and five.
        priority -> Int4,
        /// Owning account.
        owner_id -> Int8,
        /// Current state.
        state_id -> Uuid,
        /// Soft-delete flag.
        deleted -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Account-to-task assignments.
    account_tasks (id) {
        /// Assignment identifier.
        id -> Uuid,
        /// Assigned task.
        task_id -> Uuid,
        /// Assigned account.
        account_id -> Int8,
        /// Soft-delete flag.
        deleted -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit log.
    task_actions (id) {
        /// Record identifier.
        id -> Uuid,
        /// Task the record describes.
        task_id -> Uuid,
        /// Action type in storage form.
        #[max_length = 40]
        action_type -> Varchar,
        /// Acting account.
        actor_id -> Int8,
        /// Value before the mutation.
        old_value -> Nullable<Text>,
        /// Value after the mutation.
        new_value -> Nullable<Text>,
        /// Free-text comment.
        comment -> Nullable<Text>,
        /// Recording timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Delivery bookkeeping for audit record notifications.
    notification_outbox (action_id) {
        /// Audit record to announce.
        action_id -> Uuid,
        /// Delivery attempts made so far.
        attempts -> Int4,
        /// Last delivery error.
        last_error -> Nullable<Text>,
        /// Delivery timestamp once sent.
        dispatched_at -> Nullable<Timestamptz>,
        /// Enqueue timestamp.
        created_at -> Timestamptz,
        /// Last bookkeeping update.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Storage keys of files attached to tasks.
    task_files (id) {
        /// File identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Key issued by the file-storage service.
        #[max_length = 255]
        key_name -> Varchar,
        /// Soft-delete flag.
        deleted -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(boards -> projects (project_id));
diesel::joinable!(task_states -> boards (board_id));
diesel::joinable!(tasks -> boards (board_id));
diesel::joinable!(account_tasks -> tasks (task_id));
diesel::joinable!(task_actions -> tasks (task_id));
diesel::joinable!(notification_outbox -> task_actions (action_id));
diesel::joinable!(task_files -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(
    projects,
    boards,
    task_states,
    tasks,
    account_tasks,
    task_actions,
    notification_outbox,
    task_files,
);
