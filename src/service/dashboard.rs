use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{MemberStatus, Payment, PaymentStatus, User},
    service::lifecycle,
};

const EXPIRING_WINDOW_DAYS: i64 = 30;

/// Headline figures for the administrator dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_members: usize,
    pub active: usize,
    pub pending: usize,
    pub suspended: usize,
    pub expired: usize,
    pub expiring_soon: usize,
    pub pending_payments: usize,
    pub total_revenue: i64,
}

/// Tallies members (administrators excluded) and the ledger. Only
/// successful payments count towards revenue, which saturates at
/// `i64::MAX`.
pub fn compute(users: &[User], payments: &[Payment], today: NaiveDate) -> DashboardStats {
    let mut stats = DashboardStats::default();

    for user in users.iter().filter(|u| !u.is_admin()) {
        stats.total_members += 1;
        match user.status {
            MemberStatus::Active => {
                stats.active += 1;
                if lifecycle::days_until_expiry(user, today) <= EXPIRING_WINDOW_DAYS {
                    stats.expiring_soon += 1;
                }
            }
            MemberStatus::Pending => stats.pending += 1,
            MemberStatus::Suspended => stats.suspended += 1,
            MemberStatus::Expired => stats.expired += 1,
        }
    }

    for payment in payments {
        match payment.status {
            PaymentStatus::Successful => {
                stats.total_revenue = stats.total_revenue.saturating_add(payment.amount);
            }
            PaymentStatus::Pending => stats.pending_payments += 1,
            PaymentStatus::Failed => {}
        }
    }

    stats
}
