pub(crate) mod models;
pub(crate) mod schema;

#[allow(dead_code)]
pub(crate) mod migrations {
    #[derive(diesel_migrations::EmbedMigrations)]
    struct _Dummy;
}
