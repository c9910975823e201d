use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use utoipa::ToSchema;

/// Fixed number of display slots in the inspection photo gallery.
pub const GALLERY_SLOTS: usize = 12;

/// Photo captured during an inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Photo {
    pub id: String,
    pub inspection_id: String,
    pub url: Option<String>,
    pub category: Option<String>,
    pub angle: Option<String>,
    pub label: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub captured_at: Option<DateTime<Utc>>,
    /// Requested gallery position; photos without one go after positioned photos
    pub slot: Option<i32>,
}

impl Photo {
    pub fn has_location(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Gallery ordering: by slot, then capture time, then id. Missing values sort last.
    pub fn display_order(a: &Photo, b: &Photo) -> Ordering {
        fn none_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
            match (a, b) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }

        none_last(&a.slot, &b.slot)
            .then_with(|| none_last(&a.captured_at, &b.captured_at))
            .then_with(|| a.id.cmp(&b.id))
    }
}
