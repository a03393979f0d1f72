//! Factory defaults for a fresh store: one administrator, three sample
//! members, one payment history and three announcements.

use chrono::{Duration, Months, NaiveDate};

use crate::{
    auth::hash_password,
    domain::*,
    error::Result,
};

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@association.org";
pub const DEFAULT_ADMIN_PASSWORD: &str = "Admin@2024!";
pub const DEFAULT_MEMBER_PASSWORD: &str = "Member@2024!";

fn one_year_after(date: NaiveDate) -> NaiveDate {
    date.checked_add_months(Months::new(12)).unwrap_or(date)
}

#[allow(clippy::too_many_arguments)]
fn member(
    id: &str,
    email: &str,
    (first_name, last_name): (&str, &str),
    business_name: &str,
    category: &str,
    state: &str,
    status: MemberStatus,
    date_joined: NaiveDate,
    expiry_date: NaiveDate,
) -> User {
    User {
        id: id.to_string(),
        email: email.to_string(),
        role: Role::Member,
        status,
        category: category.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        phone: "08030000000".to_string(),
        business_name: business_name.to_string(),
        business_address: format!("Industrial Layout, {}", state),
        state: state.to_string(),
        materials: "Ferrous scrap, aluminium".to_string(),
        machinery: "Hydraulic baler".to_string(),
        monthly_volume: 50.0,
        employees: 25,
        date_joined,
        expiry_date,
        profile_image: None,
        documents: UserDocuments::default(),
    }
}

pub fn users(today: NaiveDate) -> Result<Vec<(User, String)>> {
    let admin = User {
        id: "ADM-001".to_string(),
        email: DEFAULT_ADMIN_EMAIL.to_string(),
        role: Role::Admin,
        status: MemberStatus::Active,
        category: "Secretariat".to_string(),
        first_name: "System".to_string(),
        last_name: "Administrator".to_string(),
        phone: "08000000000".to_string(),
        business_name: "Association Secretariat".to_string(),
        business_address: "Secretariat Office".to_string(),
        state: "FCT".to_string(),
        materials: String::new(),
        machinery: String::new(),
        monthly_volume: 0.0,
        employees: 0,
        date_joined: today,
        expiry_date: today.checked_add_months(Months::new(120)).unwrap_or(today),
        profile_image: None,
        documents: UserDocuments::default(),
    };

    let active_joined = today - Duration::days(200);
    let lapsed_joined = today - Duration::days(400);

    let members = vec![
        member(
            "MEM-001",
            "chinedu@okaformetals.ng",
            ("Chinedu", "Okafor"),
            "Okafor Metals Ltd",
            "Corporate",
            "Lagos",
            MemberStatus::Active,
            active_joined,
            one_year_after(active_joined),
        ),
        member(
            "MEM-002",
            "amina@bellorecycling.ng",
            ("Amina", "Bello"),
            "Bello Recycling Enterprises",
            "Associate",
            "Kano",
            MemberStatus::Pending,
            today - Duration::days(3),
            one_year_after(today - Duration::days(3)),
        ),
        // Lapsed: the first read of the user list flips this one to Expired.
        member(
            "MEM-003",
            "tunde@adeyemifoundry.ng",
            ("Tunde", "Adeyemi"),
            "Adeyemi Foundry",
            "Professional",
            "Oyo",
            MemberStatus::Active,
            lapsed_joined,
            one_year_after(lapsed_joined),
        ),
    ];

    let admin_hash = hash_password(DEFAULT_ADMIN_PASSWORD)?;
    let member_hash = hash_password(DEFAULT_MEMBER_PASSWORD)?;

    let mut seeded = vec![(admin, admin_hash)];
    seeded.extend(members.into_iter().map(|m| (m, member_hash.clone())));
    Ok(seeded)
}

pub fn payments(today: NaiveDate) -> Vec<Payment> {
    vec![Payment {
        id: "PAY-001".to_string(),
        user_id: "MEM-001".to_string(),
        amount: 150_000,
        currency: DEFAULT_CURRENCY.to_string(),
        date: today - Duration::days(200),
        description: "Annual membership dues".to_string(),
        status: PaymentStatus::Successful,
        reference: "REF-SEED00001".to_string(),
        receipt: None,
    }]
}

pub fn announcements(today: NaiveDate) -> Vec<Announcement> {
    // Listed newest first, so the most recent is inserted last.
    vec![
        Announcement {
            id: "ANN-001".to_string(),
            title: "Welcome to the member portal".to_string(),
            content: "Members can now renew dues, download certificates and message each other online.".to_string(),
            date: today - Duration::days(30),
            is_important: false,
        },
        Announcement {
            id: "ANN-002".to_string(),
            title: "Quarterly general meeting".to_string(),
            content: "The quarterly general meeting holds at the secretariat. All corporate members are expected to attend.".to_string(),
            date: today - Duration::days(10),
            is_important: false,
        },
        Announcement {
            id: "ANN-003".to_string(),
            title: "Dues renewal deadline".to_string(),
            content: "Members whose membership has lapsed should submit renewal payments for approval.".to_string(),
            date: today - Duration::days(2),
            is_important: true,
        },
    ]
}
