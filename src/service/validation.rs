//! Field rules shared by registration and profile updates. Every check
//! reports a message that starts with the camelCase field name, and all
//! violations are collected before failing.

use validator::ValidateEmail;

use crate::{
    domain::{RegisterRequest, UpdateUserRequest},
    error::{AppError, Result},
};

pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

const MIN_PHONE_DIGITS: usize = 10;
const MAX_PHONE_DIGITS: usize = 15;
const MIN_PASSWORD_LEN: usize = 8;

/// `local@domain.tld`: the validator's address check plus a dotted domain
/// with no empty labels.
pub fn is_valid_email(email: &str) -> bool {
    if !email.validate_email() {
        return false;
    }
    match email.rsplit_once('@') {
        Some((_, domain)) => {
            let labels: Vec<&str> = domain.split('.').collect();
            labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
        }
        None => false,
    }
}

pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}

pub fn password_problems(password: &str) -> Vec<&'static str> {
    let mut problems = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        problems.push("at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        problems.push("a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        problems.push("an uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("a number");
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        problems.push("a symbol");
    }
    problems
}

fn is_non_negative(value: Option<f64>) -> bool {
    matches!(value, Some(v) if v.is_finite() && v >= 0.0)
}

#[derive(Default)]
struct Violations(Vec<String>);

impl Violations {
    fn check(&mut self, ok: bool, message: impl Into<String>) {
        if !ok {
            self.0.push(message.into());
        }
    }

    fn email(&mut self, email: &str) {
        self.check(
            is_valid_email(email),
            "email must be a valid address such as name@company.com",
        );
    }

    fn phone(&mut self, phone: &str) {
        self.check(
            is_valid_phone(phone),
            "phone must contain between 10 and 15 digits",
        );
    }

    fn required(&mut self, field: &str, value: &str) {
        self.check(!value.trim().is_empty(), format!("{} is required", field));
    }

    fn non_negative(&mut self, field: &str, value: Option<f64>) {
        self.check(
            is_non_negative(value),
            format!("{} must be a non-negative number", field),
        );
    }

    fn finish(self) -> Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationFailed(self.0))
        }
    }
}

pub fn validate_registration(request: &RegisterRequest) -> Result<()> {
    let mut v = Violations::default();

    v.email(&request.email);
    v.phone(&request.phone);

    let problems = password_problems(&request.password);
    v.check(
        problems.is_empty(),
        format!("password must contain {}", problems.join(", ")),
    );

    v.required("firstName", &request.first_name);
    v.required("lastName", &request.last_name);
    v.required("businessName", &request.business_name);
    v.required("businessAddress", &request.business_address);
    v.required("businessCategory", &request.business_category);

    v.non_negative("employees", request.employees);
    v.non_negative("monthlyVolume", request.monthly_volume);

    v.finish()
}

/// Applies the registration rules to the fields an update actually sets.
pub fn validate_update(update: &UpdateUserRequest) -> Result<()> {
    let mut v = Violations::default();

    if let Some(email) = &update.email {
        v.email(email);
    }
    if let Some(phone) = &update.phone {
        v.phone(phone);
    }

    let required = [
        ("firstName", &update.first_name),
        ("lastName", &update.last_name),
        ("businessName", &update.business_name),
        ("businessAddress", &update.business_address),
        ("category", &update.category),
    ];
    for (field, value) in required {
        if let Some(value) = value {
            v.required(field, value);
        }
    }

    if update.employees.is_some() {
        v.non_negative("employees", update.employees);
    }
    if update.monthly_volume.is_some() {
        v.non_negative("monthlyVolume", update.monthly_volume);
    }

    v.finish()
}
