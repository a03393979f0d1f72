use chrono::NaiveDate;

use crate::domain::{MemberStatus, User};

/// Moves an Active, non-admin user whose expiry date has passed to
/// Expired. Returns whether the status changed. Pending and Suspended
/// users are never touched, so applying this twice equals applying it once.
pub fn apply_expiry(user: &mut User, today: NaiveDate) -> bool {
    if user.is_admin() || user.status != MemberStatus::Active || user.expiry_date >= today {
        return false;
    }

    user.status = MemberStatus::Expired;
    true
}

/// Calendar days from `today` to the expiry date, negative once lapsed.
pub fn days_until_expiry(user: &User, today: NaiveDate) -> i64 {
    (user.expiry_date - today).num_days()
}
