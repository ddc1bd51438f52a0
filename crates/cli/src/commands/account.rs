//! Sign-in, registration and profile commands.

use bazaryo_core::forms::{
    AccountFields, CustomerForm, LoginForm, ProfileForm, RegistrationForm, ShopkeeperForm,
};
use bazaryo_core::{GeoPoint, Route, User, UserRole};
use clap::Args;

use super::CommandError;
use crate::context::Context;

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(short, long)]
    name: String,

    #[arg(short, long)]
    email: String,

    #[arg(short, long)]
    password: String,

    /// `customer` or `shopkeeper`
    #[arg(short, long, default_value = "customer")]
    role: UserRole,

    /// Shopkeepers only
    #[arg(long)]
    shop_name: Option<String>,

    /// Shopkeepers only
    #[arg(long)]
    shop_category: Option<String>,

    /// Shopkeepers only
    #[arg(long)]
    pincode: Option<String>,
}

impl RegisterArgs {
    fn into_form(self) -> Result<RegistrationForm, CommandError> {
        let account = AccountFields {
            name: self.name,
            email: self.email,
            password: self.password,
        };
        match self.role {
            UserRole::Customer => Ok(RegistrationForm::Customer(CustomerForm { account })),
            UserRole::Shopkeeper => Ok(RegistrationForm::Shopkeeper(ShopkeeperForm {
                account,
                shop_name: self.shop_name.unwrap_or_default(),
                shop_category: self.shop_category.unwrap_or_default(),
                pincode: self.pincode.unwrap_or_default(),
            })),
            role => Err(CommandError::Invalid(format!(
                "Accounts with role {role} cannot be registered here"
            ))),
        }
    }
}

/// Fields left out keep their current value.
#[derive(Args)]
pub struct ProfileArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    street: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    pincode: Option<String>,

    /// Longitude of the delivery location
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,

    /// Latitude of the delivery location
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,
}

impl ProfileArgs {
    fn apply(self, form: &mut ProfileForm) {
        let set = |field: &mut String, value: Option<String>| {
            if let Some(value) = value {
                *field = value;
            }
        };
        set(&mut form.name, self.name);
        set(&mut form.street, self.street);
        set(&mut form.city, self.city);
        set(&mut form.pincode, self.pincode);
        if let (Some(lng), Some(lat)) = (self.lng, self.lat) {
            form.location = Some(GeoPoint::new(lng, lat));
        }
    }
}

fn describe(user: &User) -> Vec<String> {
    let mut lines = vec![
        format!("{} <{}>", user.name, user.email),
        format!("Role:    {}", user.role.label()),
        format!("ID:      {}", user.id),
    ];
    if let Some(shop) = &user.shop {
        lines.push(format!("Shop:    {shop}"));
    }
    if let Some(address) = &user.address {
        lines.push(format!(
            "Address: {}, {} {}",
            address.street, address.city, address.pincode
        ));
    }
    lines
}

pub async fn login(
    ctx: &Context,
    email: String,
    password: String,
    from: Option<String>,
) -> Result<(), CommandError> {
    let form = LoginForm { email, password };
    let from = from.as_deref().map(Route::from_path);

    let signed_in = ctx.session().login(&form, from).await?;
    ctx.save_session().await?;

    ctx.out.emit(&signed_in.user, || {
        vec![
            format!("Signed in as {} ({})", signed_in.user.name, signed_in.user.role.label()),
            format!("Next: {}", signed_in.route),
        ]
    })
}

pub async fn register(ctx: &Context, args: RegisterArgs) -> Result<(), CommandError> {
    let form = args.into_form()?;

    let signed_in = ctx.session().register(&form).await?;
    ctx.save_session().await?;

    ctx.out.emit(&signed_in.user, || {
        let mut lines = vec![format!("Registered {}", signed_in.user.email)];
        if signed_in.route == Route::Profile {
            lines.push("Welcome! Please complete your profile to continue.".to_owned());
        }
        lines.push(format!("Next: {}", signed_in.route));
        lines
    })
}

pub async fn whoami(ctx: &Context) -> Result<(), CommandError> {
    let user = ctx.current_user().await?;
    ctx.out.emit(&user, || describe(&user))
}

pub async fn profile(ctx: &Context, args: ProfileArgs) -> Result<(), CommandError> {
    let session = ctx.session();
    let user = session.refresh().await?;

    let mut form = ProfileForm::from_user(&user);
    args.apply(&mut form);

    let user = session.update_profile(&form).await?;
    ctx.out.notice("Profile updated successfully!")?;
    ctx.out.emit(&user, || describe(&user))
}

pub async fn logout(ctx: &Context) -> Result<(), CommandError> {
    ctx.session().logout().await;
    ctx.forget_session().await?;
    ctx.out.notice("Signed out")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn register_args(role: UserRole) -> RegisterArgs {
        RegisterArgs {
            name: "Asha Rao".to_string(),
            email: "asha@bazaryo.in".to_string(),
            password: "mango123".to_string(),
            role,
            shop_name: Some("Fresh Market".to_string()),
            shop_category: None,
            pincode: None,
        }
    }

    #[test]
    fn test_customer_form_ignores_shop_args() {
        let form = register_args(UserRole::Customer).into_form().unwrap();
        assert!(matches!(form, RegistrationForm::Customer(_)));
    }

    #[test]
    fn test_shopkeeper_form_reports_missing_shop_fields() {
        let form = register_args(UserRole::Shopkeeper).into_form().unwrap();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("shopCategory"), Some("Shop category is required"));
        assert_eq!(errors.get("pincode"), Some("Shop pincode is required"));
        assert_eq!(errors.get("shopName"), None);
    }

    #[test]
    fn test_admin_registration_is_refused() {
        assert!(register_args(UserRole::Admin).into_form().is_err());
    }

    #[test]
    fn test_profile_args_override_only_given_fields() {
        let mut form = ProfileForm {
            name: "Asha".to_string(),
            street: "1 Old Lane".to_string(),
            city: "Pune".to_string(),
            pincode: "411001".to_string(),
            location: None,
        };
        let args = ProfileArgs {
            name: None,
            street: Some("12 MG Road".to_string()),
            city: None,
            pincode: None,
            lng: Some(73.85),
            lat: Some(18.52),
        };

        args.apply(&mut form);

        assert_eq!(form.name, "Asha");
        assert_eq!(form.street, "12 MG Road");
        assert!((form.location.unwrap().lat() - 18.52).abs() < f64::EPSILON);
    }
}
