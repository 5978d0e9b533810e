use chrono::Utc;
use rand::Rng;

use crate::store::Store;
use crate::utils::AppError;

/// Booking references look like `BK202608304217`: prefix, reservation date,
/// four random digits.
pub const REFERENCE_PREFIX: &str = "BK";

const MAX_ATTEMPTS: u32 = 5;

/// Mints a reference no existing booking uses. The reference is chosen
/// before the booking row exists, so uniqueness is checked here; the unique
/// index on `booking_reference` backstops the remaining check-then-insert
/// window.
pub(crate) async fn mint<S: Store>(store: &S) -> Result<String, AppError> {
    for _ in 0..MAX_ATTEMPTS {
        let candidate = candidate();
        if !store.reference_exists(&candidate).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::ReferenceExhausted(MAX_ATTEMPTS))
}

fn candidate() -> String {
    let suffix: u32 = rand::rng().random_range(0..10_000);
    format!("{}{}{:04}", REFERENCE_PREFIX, Utc::now().format("%Y%m%d"), suffix)
}
