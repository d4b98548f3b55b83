busgen::event_names! {
    pub USER_CREATED, USER_DELETED = "user.created", "user.deleted";
}
