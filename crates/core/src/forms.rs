//! Form models for registration, login and profile editing.
//!
//! Each form validates every field at once and either produces the request
//! body the backend expects or a [`FormErrors`] listing every failing field.
//! Registration is role-conditional: [`RegistrationForm`] carries only the
//! fields of the chosen role, so a customer can never send shop details.

use core::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::models::{Address, GeoPoint, User};
use crate::types::{Email, Route, UserRole};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Wire name of the field (`shopName`, `address.city`, ...).
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every failing field of a form, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_messages(.0))]
pub struct FormErrors(Vec<FieldError>);

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|error| error.message)
        .collect::<Vec<_>>()
        .join("; ")
}

impl FormErrors {
    /// All field errors.
    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    /// The message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Default)]
struct Checks(Vec<FieldError>);

impl Checks {
    fn fail(&mut self, field: &'static str, message: &'static str) {
        self.0.push(FieldError { field, message });
    }

    /// Required text field; whitespace-only counts as missing.
    fn required<'a>(
        &mut self,
        field: &'static str,
        value: &'a str,
        message: &'static str,
    ) -> Option<&'a str> {
        let value = value.trim();
        if value.is_empty() {
            self.fail(field, message);
            None
        } else {
            Some(value)
        }
    }

    fn email(&mut self, value: &str) -> Option<Email> {
        let value = self.required("email", value, "Email is required")?;
        Email::parse(value)
            .map_err(|_| self.fail("email", "Invalid email address"))
            .ok()
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, FormErrors> {
        match value {
            Some(value) if self.0.is_empty() => Ok(value),
            _ => Err(FormErrors(self.0)),
        }
    }
}

/// Fields shared by every registration variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFields {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl AccountFields {
    fn check(&self, checks: &mut Checks) -> Option<(String, Email, String)> {
        let name = checks.required("name", &self.name, "Your name is required");
        let email = checks.email(&self.email);
        let password = if self.password.is_empty() {
            checks.fail("password", "Password is required");
            None
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            checks.fail("password", "Must be 6+ characters");
            None
        } else {
            Some(self.password.clone())
        };
        Some((name?.to_owned(), email?, password?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerForm {
    pub account: AccountFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopkeeperForm {
    pub account: AccountFields,
    pub shop_name: String,
    pub shop_category: String,
    pub pincode: String,
}

/// Registration form, one variant per self-service role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationForm {
    Customer(CustomerForm),
    Shopkeeper(ShopkeeperForm),
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self::Customer(CustomerForm::default())
    }
}

impl RegistrationForm {
    /// The role this form registers.
    #[must_use]
    pub const fn role(&self) -> UserRole {
        match self {
            Self::Customer(_) => UserRole::Customer,
            Self::Shopkeeper(_) => UserRole::Shopkeeper,
        }
    }

    #[must_use]
    pub const fn account(&self) -> &AccountFields {
        match self {
            Self::Customer(form) => &form.account,
            Self::Shopkeeper(form) => &form.account,
        }
    }

    /// Switch to `role`, keeping the shared account fields.
    ///
    /// Shop fields are discarded when switching away from shopkeeper.
    #[must_use]
    pub fn with_role(self, role: UserRole) -> Self {
        let account = match self {
            Self::Customer(form) => form.account,
            Self::Shopkeeper(form) => form.account,
        };
        match role {
            UserRole::Shopkeeper => Self::Shopkeeper(ShopkeeperForm {
                account,
                ..ShopkeeperForm::default()
            }),
            _ => Self::Customer(CustomerForm { account }),
        }
    }

    /// Validate every field of the active variant.
    ///
    /// # Errors
    ///
    /// Returns all failing fields when any field is invalid.
    pub fn validate(&self) -> Result<RegistrationRequest, FormErrors> {
        let mut checks = Checks::default();
        let account = self.account().check(&mut checks);

        let request = match self {
            Self::Customer(_) => account.map(|(name, email, password)| RegistrationRequest {
                name,
                email,
                password,
                role: UserRole::Customer,
                shop_name: None,
                shop_category: None,
                pincode: None,
            }),
            Self::Shopkeeper(form) => {
                let shop_name =
                    checks.required("shopName", &form.shop_name, "Shop name is required");
                let shop_category = checks.required(
                    "shopCategory",
                    &form.shop_category,
                    "Shop category is required",
                );
                let pincode = checks.required("pincode", &form.pincode, "Shop pincode is required");
                match (account, shop_name, shop_category, pincode) {
                    (
                        Some((name, email, password)),
                        Some(shop_name),
                        Some(shop_category),
                        Some(pincode),
                    ) => Some(RegistrationRequest {
                        name,
                        email,
                        password,
                        role: UserRole::Shopkeeper,
                        shop_name: Some(shop_name.to_owned()),
                        shop_category: Some(shop_category.to_owned()),
                        pincode: Some(pincode.to_owned()),
                    }),
                    _ => None,
                }
            }
        };

        checks.finish(request)
    }
}

/// Where a newly registered user goes: customers complete their profile
/// first, everyone else lands on the home page.
#[must_use]
pub const fn registration_landing(role: UserRole) -> Route {
    match role {
        UserRole::Customer => Route::Profile,
        _ => Route::Home,
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub name: String,
    pub email: Email,
    pub password: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .field("shop_name", &self.shop_name)
            .field("shop_category", &self.shop_category)
            .field("pincode", &self.pincode)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns all failing fields when any field is invalid.
    pub fn validate(&self) -> Result<LoginRequest, FormErrors> {
        let mut checks = Checks::default();
        let email = checks.email(&self.email);
        if self.password.is_empty() {
            checks.fail("password", "Password is required");
        }
        let request = email.map(|email| LoginRequest {
            email,
            password: self.password.clone(),
        });
        checks.finish(request)
    }
}

/// Body of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Profile edit form. The map location is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub name: String,
    pub street: String,
    pub city: String,
    pub pincode: String,
    pub location: Option<GeoPoint>,
}

impl ProfileForm {
    /// Prefill from the current user.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        let address = user.address.clone().unwrap_or_default();
        Self {
            name: user.name.clone(),
            street: address.street,
            city: address.city,
            pincode: address.pincode,
            location: address.location,
        }
    }

    /// # Errors
    ///
    /// Returns all failing fields when any field is invalid.
    pub fn validate(&self) -> Result<ProfileUpdate, FormErrors> {
        let mut checks = Checks::default();
        let name = checks.required("name", &self.name, "Name is required");
        let street = checks.required("address.street", &self.street, "Street is required");
        let city = checks.required("address.city", &self.city, "City is required");
        let pincode = checks.required("address.pincode", &self.pincode, "Pincode is required");

        let update = match (name, street, city, pincode) {
            (Some(name), Some(street), Some(city), Some(pincode)) => Some(ProfileUpdate {
                name: name.to_owned(),
                address: Address {
                    street: street.to_owned(),
                    city: city.to_owned(),
                    pincode: pincode.to_owned(),
                    location: self.location,
                },
            }),
            _ => None,
        };
        checks.finish(update)
    }
}

/// Body of `PUT /users/me`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub address: Address,
}
