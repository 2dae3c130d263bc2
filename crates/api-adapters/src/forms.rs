//! Form DTOs and the multipart reader. Validation is deliberately thin:
//! required fields and parseable values; everything richer belongs to the
//! services.

use axum::extract::multipart::{Field, Multipart};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use domains::models::{PostStatus, ProfileFields, Upload};
use services::posts::PostInput;

use crate::error::WebError;

/// Login form (urlencoded).
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Browsers send a value only when the checkbox is ticked.
    #[serde(default)]
    pub remember_me: Option<String>,
}

impl LoginForm {
    pub fn remember(&self) -> bool {
        self.remember_me.is_some()
    }
}

/// Registration form (urlencoded).
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() || self.password.is_empty()
        {
            return Err("All fields are required.".to_owned());
        }
        if !self.email.contains('@') {
            return Err("Please enter a valid email address.".to_owned());
        }
        Ok(())
    }
}

/// Post create/edit form (multipart, may carry an image file).
#[derive(Debug, Default)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub date: String,
    pub status: String,
    pub image: Option<Upload>,
}

impl PostForm {
    /// Drain a multipart body into the form. Unknown fields are ignored;
    /// a file part with an empty filename counts as "no upload".
    pub async fn read(mut multipart: Multipart) -> Result<Self, WebError> {
        let mut form = Self::default();
        while let Some(field) = next_field(&mut multipart).await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("title") => form.title = text(field).await?,
                Some("content") => form.content = text(field).await?,
                Some("date") => form.date = text(field).await?,
                Some("status") => form.status = text(field).await?,
                Some("image") => form.image = upload(field).await?,
                _ => {}
            }
        }
        Ok(form)
    }

    /// Parse into service input; `Err` carries the user-visible warning.
    pub fn validate(&self) -> Result<PostInput, String> {
        if self.title.trim().is_empty() || self.content.trim().is_empty() {
            return Err("Title and recipe text are required.".to_owned());
        }
        let status = PostStatus::parse(&self.status).ok_or("Unknown status.".to_owned())?;
        let publish_date =
            parse_date(&self.date).ok_or("Please supply a valid publish date.".to_owned())?;
        Ok(PostInput {
            title: self.title.trim().to_owned(),
            content: self.content.clone(),
            status,
            publish_date,
        })
    }
}

/// Profile form (multipart; self-service and admin edit share it).
#[derive(Debug, Default)]
pub struct ProfileForm {
    pub name: String,
    pub address: String,
    pub bio: String,
    pub theme: String,
    pub image: Option<Upload>,
}

impl ProfileForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, WebError> {
        let mut form = Self::default();
        while let Some(field) = next_field(&mut multipart).await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("name") => form.name = text(field).await?,
                Some("address") => form.address = text(field).await?,
                Some("bio") => form.bio = text(field).await?,
                Some("theme") => form.theme = text(field).await?,
                Some("image") => form.image = upload(field).await?,
                _ => {}
            }
        }
        Ok(form)
    }

    pub fn validate(&self) -> Result<ProfileFields, String> {
        if self.name.trim().is_empty() {
            return Err("A display name is required.".to_owned());
        }
        Ok(ProfileFields {
            name: self.name.trim().to_owned(),
            address: self.address.clone(),
            bio: self.bio.clone(),
            theme: self.theme.clone(),
        })
    }
}

async fn next_field(multipart: &mut Multipart) -> Result<Option<Field<'_>>, WebError> {
    multipart
        .next_field()
        .await
        .map_err(|err| WebError::BadRequest(err.to_string()))
}

async fn text(field: Field<'_>) -> Result<String, WebError> {
    field
        .text()
        .await
        .map_err(|err| WebError::BadRequest(err.to_string()))
}

async fn upload(field: Field<'_>) -> Result<Option<Upload>, WebError> {
    let filename = field.file_name().map(str::to_owned).unwrap_or_default();
    if filename.is_empty() {
        // Browsers submit an empty file part when nothing was selected.
        return Ok(None);
    }
    let bytes = field
        .bytes()
        .await
        .map_err(|err| WebError::BadRequest(err.to_string()))?;
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(Upload { filename, bytes }))
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()?;
    Some(date.and_time(NaiveTime::MIN).and_utc())
}
