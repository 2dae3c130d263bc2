//! Askama page templates and their view models. Dates and enum labels
//! are pre-formatted here; the templates themselves only interpolate.

use askama::Template;

use domains::authz::Identity;
use domains::models::{Post, User};

use crate::flash::FlashMessage;

/// Per-page chrome: the signed-in viewer (when any) and pending flash
/// messages. Every page template carries one.
pub struct PageContext {
    pub viewer: Option<Viewer>,
    pub flash: Vec<FlashMessage>,
}

impl PageContext {
    pub fn new(identity: Option<&Identity>, flash: Vec<FlashMessage>) -> Self {
        Self {
            viewer: identity.map(Viewer::of),
            flash,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            viewer: None,
            flash: Vec::new(),
        }
    }
}

/// The navbar's view of the signed-in user.
pub struct Viewer {
    pub email: String,
    pub name: String,
    pub is_admin: bool,
    pub theme: String,
}

impl Viewer {
    fn of(identity: &Identity) -> Self {
        Self {
            email: identity.user.email.clone(),
            name: identity.user.name.clone(),
            is_admin: identity.user.is_admin,
            theme: identity.user.theme.clone(),
        }
    }
}

/// A list-page card.
pub struct PostCard {
    pub id: String,
    pub title: String,
    pub author: String,
    pub status_label: String,
    pub publish_date: String,
    pub image_id: Option<String>,
    pub pinned: bool,
}

impl PostCard {
    pub fn of(post: &Post, viewer: Option<&Identity>) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            author: post.author.clone(),
            status_label: post.status.label().to_owned(),
            publish_date: post.publish_date.format("%Y-%m-%d").to_string(),
            image_id: post.image_id.map(|id| id.to_string()),
            pinned: viewer.is_some_and(|identity| identity.user.pinned.contains(&post.id)),
        }
    }
}

#[derive(Template)]
#[template(path = "post_list.html")]
pub struct PostListTemplate {
    pub ctx: PageContext,
    pub heading: String,
    pub posts: Vec<PostCard>,
}

#[derive(Template)]
#[template(path = "post_view.html")]
pub struct PostViewTemplate {
    pub ctx: PageContext,
    pub id: String,
    pub title: String,
    pub author: String,
    pub status_label: String,
    pub publish_date: String,
    pub updated_at: Option<String>,
    pub image_id: Option<String>,
    pub paragraphs: Vec<String>,
    pub pinned: bool,
    pub can_edit: bool,
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub ctx: PageContext,
    pub heading: String,
    pub action: String,
    pub title_value: String,
    pub content_value: String,
    pub date_value: String,
    pub status_value: String,
    pub has_image: bool,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub ctx: PageContext,
    pub heading: String,
    pub action: String,
    pub name_value: String,
    pub address_value: String,
    pub bio_value: String,
    pub theme_value: String,
    pub image_id: Option<String>,
}

/// One row of the admin user listing.
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
    pub is_confirmed: bool,
}

impl UserRow {
    pub fn of(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            is_admin: user.is_admin,
            is_confirmed: user.is_confirmed,
        }
    }
}

#[derive(Template)]
#[template(path = "users.html")]
pub struct UsersTemplate {
    pub ctx: PageContext,
    pub users: Vec<UserRow>,
}

#[derive(Template)]
#[template(path = "forbidden.html")]
pub struct ForbiddenTemplate {
    pub ctx: PageContext,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::Level;

    #[test]
    fn post_list_renders_cards_and_flash() {
        let template = PostListTemplate {
            ctx: PageContext {
                viewer: None,
                flash: vec![FlashMessage::new(Level::Success, "Dish saved successfully.")],
            },
            heading: "Latest dishes".to_owned(),
            posts: vec![PostCard {
                id: "0190-demo".to_owned(),
                title: "Pumpkin soup".to_owned(),
                author: "cook@example.com".to_owned(),
                status_label: "Published".to_owned(),
                publish_date: "2026-08-01".to_owned(),
                image_id: None,
                pinned: false,
            }],
        };
        let html = template.render().unwrap();
        assert!(html.contains("Pumpkin soup"));
        assert!(html.contains("alert-success"));
        assert!(html.contains("Dish saved successfully."));
    }

    #[test]
    fn forbidden_page_shows_the_description() {
        let template = ForbiddenTemplate {
            ctx: PageContext::anonymous(),
            description: "You do not have permission to edit this dish.".to_owned(),
        };
        let html = template.render().unwrap();
        assert!(html.contains("Access denied"));
        assert!(html.contains("permission to edit this dish"));
    }

    #[test]
    fn navbar_switches_on_viewer_and_admin_flag() {
        let admin = PostListTemplate {
            ctx: PageContext {
                viewer: Some(Viewer {
                    email: "admin@example.com".to_owned(),
                    name: "Admin".to_owned(),
                    is_admin: true,
                    theme: "dark".to_owned(),
                }),
                flash: Vec::new(),
            },
            heading: "Latest dishes".to_owned(),
            posts: Vec::new(),
        };
        let html = admin.render().unwrap();
        assert!(html.contains("/users"));
        assert!(html.contains("/logout"));
        assert!(!html.contains(">Log in<"));

        let anonymous = PostListTemplate {
            ctx: PageContext::anonymous(),
            heading: "Latest dishes".to_owned(),
            posts: Vec::new(),
        };
        let html = anonymous.render().unwrap();
        assert!(html.contains(">Log in<"));
        assert!(!html.contains("/logout"));
    }
}
