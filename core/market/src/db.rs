pub(crate) mod dao;
pub(crate) mod model;
pub(crate) mod schema;

#[allow(dead_code)]
pub(crate) mod migrations {
    #[derive(diesel_migrations::EmbedMigrations)]
    struct _Dummy;
}

pub(crate) use fg_persistence::executor::Error as DbError;

pub(crate) type DbResult<T> = Result<T, DbError>;
