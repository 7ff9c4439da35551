//! Askama template structs for the web interface.
//!
//! Each struct corresponds to an HTML template in the `templates/` directory.

use askama::Template;

/// The lookup form.
#[derive(Debug, Template)]
#[template(path = "form.html")]
pub struct FormTemplate<'a> {
    pub title: &'a str,
}

/// The answer to a submitted lookup.
#[derive(Debug, Template)]
#[template(path = "response.html")]
pub struct ResponseTemplate<'a> {
    pub title: &'a str,
    pub response: &'a str,
}

/// Static blog page.
#[derive(Debug, Template)]
#[template(path = "blog.html")]
pub struct BlogTemplate<'a> {
    pub title: &'a str,
}

/// Static products page.
#[derive(Debug, Template)]
#[template(path = "products.html")]
pub struct ProductsTemplate<'a> {
    pub title: &'a str,
}
