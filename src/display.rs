//! Presentation-only formatting for users. Nothing here is ever stored or
//! submitted.

use colored::Colorize;
use tabled::Tabled;

use crate::types::User;

const COUNTRY_CODE: &str = "+56";

/// `912345678` → `+56 9 1234 5678`. Short input yields empty groups.
pub fn format_phone(phone: &str) -> String {
    let first: String = phone.chars().take(1).collect();
    let middle: String = phone.chars().skip(1).take(4).collect();
    let rest: String = phone.chars().skip(5).collect();
    format!("{COUNTRY_CODE} {first} {middle} {rest}")
}

pub fn format_location(region: &str, commune: &str) -> String {
    format!("{region}, {commune}")
}

#[derive(Tabled)]
pub struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Location")]
    location: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: format_phone(&user.phone),
            location: format_location(&user.region, &user.commune),
        }
    }
}

/// Compact one-line rendering used by `--format compact`.
pub fn compact_line(user: &User) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        user.id,
        user.name,
        user.email,
        format_phone(&user.phone),
        format_location(&user.region, &user.commune)
    )
}

/// The card shown by `users show`.
pub struct UserCard<'a> {
    user: &'a User,
}

impl<'a> UserCard<'a> {
    pub fn new(user: &'a User) -> Self {
        Self { user }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            self.user.name.clone(),
            format!("Email:    {}", self.user.email),
            format!("Phone:    {}", format_phone(&self.user.phone)),
            format!(
                "Location: {}",
                format_location(&self.user.region, &self.user.commune)
            ),
        ]
    }

    pub fn print(&self) {
        let mut lines = self.lines().into_iter();
        if let Some(title) = lines.next() {
            println!("{} {}", title.bold(), format!("({})", self.user.id).bright_black());
            println!();
        }
        for line in lines {
            println!("{line}");
        }
    }
}
