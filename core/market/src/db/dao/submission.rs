use diesel::prelude::*;

use fg_persistence::executor::{do_with_transaction, readonly_transaction, AsDao, PoolType};

use crate::db::model::{Submission, STATUS_ACTIVE};
use crate::db::schema::crop_submissions::dsl;
use crate::db::DbResult;

pub struct SubmissionDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for SubmissionDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

/// Outcome of a removal attempt, decided inside one transaction so a
/// concurrent delete cannot flip a 403 into a 404.
pub enum RemovalOutcome {
    Removed,
    NotOwner,
    NotFound,
}

impl<'c> SubmissionDao<'c> {
    pub async fn create(&self, submission: &Submission) -> DbResult<()> {
        let submission = submission.clone();
        do_with_transaction(self.pool, move |conn| {
            diesel::insert_into(dsl::crop_submissions)
                .values(submission)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn list_active(&self) -> DbResult<Vec<Submission>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(dsl::crop_submissions
                .filter(dsl::status.eq(STATUS_ACTIVE))
                .order_by(dsl::created_at.desc())
                .load::<Submission>(conn)?)
        })
        .await
    }

    pub async fn list_by_farmer(&self, farmer_id: String) -> DbResult<Vec<Submission>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(dsl::crop_submissions
                .filter(dsl::farmer_id.eq(&farmer_id))
                .order_by(dsl::created_at.desc())
                .load::<Submission>(conn)?)
        })
        .await
    }

    pub async fn get(&self, id: String) -> DbResult<Option<Submission>> {
        readonly_transaction(self.pool, move |conn| {
            Ok(dsl::crop_submissions
                .find(&id)
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn remove(&self, id: String, farmer_id: String) -> DbResult<RemovalOutcome> {
        do_with_transaction(self.pool, move |conn| {
            let owner: Option<String> = dsl::crop_submissions
                .find(&id)
                .select(dsl::farmer_id)
                .first(conn)
                .optional()?;

            match owner {
                None => Ok(RemovalOutcome::NotFound),
                Some(owner) if owner != farmer_id => Ok(RemovalOutcome::NotOwner),
                Some(_) => {
                    diesel::delete(dsl::crop_submissions.find(&id)).execute(conn)?;
                    Ok(RemovalOutcome::Removed)
                }
            }
        })
        .await
    }
}
