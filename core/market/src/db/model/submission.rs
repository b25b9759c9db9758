use chrono::{NaiveDateTime, TimeZone, Utc};
use uuid::Uuid;

use fg_model::auth::UserProfile;
use fg_model::market::{CropListing, CropSubmission, NewCropSubmission};
use fg_persistence::types::BigDecimalField;

use crate::db::schema::crop_submissions;

/// Submissions start out `Active` and keep that status until removed.
pub const STATUS_ACTIVE: &str = "Active";

#[derive(Clone, Debug, Identifiable, Insertable, Queryable)]
#[table_name = "crop_submissions"]
pub struct Submission {
    pub id: String,
    pub farmer_id: String,
    pub crop_name: String,
    pub quantity: i32,
    pub desired_price: BigDecimalField,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Submission {
    pub fn from_new(new: &NewCropSubmission, farmer_id: &str) -> Submission {
        let now = Utc::now().naive_utc();
        Submission {
            id: Uuid::new_v4().to_simple().to_string(),
            farmer_id: farmer_id.to_string(),
            crop_name: new.crop_name.clone(),
            quantity: new.quantity,
            desired_price: new.desired_price.clone().into(),
            notes: new.notes.clone(),
            status: STATUS_ACTIVE.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn into_client(self) -> CropSubmission {
        CropSubmission {
            id: self.id,
            farmer_id: self.farmer_id,
            crop_name: self.crop_name,
            quantity: self.quantity,
            desired_price: self.desired_price.into(),
            notes: self.notes,
            status: self.status,
            created_at: Utc.from_utc_datetime(&self.created_at),
            updated_at: Utc.from_utc_datetime(&self.updated_at),
        }
    }

    /// The browsing view. Farmer contact details stay `None` when the
    /// profile could not be resolved.
    pub fn into_listing(self, profile: Option<&UserProfile>) -> CropListing {
        CropListing {
            farmer_name: profile.map(|p| p.name.clone()),
            farmer_mobile: profile.map(|p| p.mobile.clone()),
            submission: self.into_client(),
        }
    }
}
