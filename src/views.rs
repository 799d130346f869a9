// src/views.rs

use std::sync::Arc;

use minijinja::{Environment, Value};

use crate::error::AppError;

/// Templates compiled into the binary. `.html` names get HTML auto-escaping.
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("questions_home.html", include_str!("../templates/questions_home.html")),
    ("questions_past.html", include_str!("../templates/questions_past.html")),
    ("subjects_list.html", include_str!("../templates/subjects_list.html")),
    ("subject.html", include_str!("../templates/subject.html")),
    ("question.html", include_str!("../templates/question.html")),
    ("question_result.html", include_str!("../templates/question_result.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("contact.html", include_str!("../templates/contact.html")),
    ("admin.html", include_str!("../templates/admin.html")),
    ("question_edit.html", include_str!("../templates/question_edit.html")),
    ("404.html", include_str!("../templates/404.html")),
];

/// Shared template environment.
#[derive(Clone)]
pub struct Views {
    env: Arc<Environment<'static>>,
}

impl Views {
    pub fn new(app_name: &str) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        env.add_global("app_name", app_name.to_string());

        Ok(Self { env: Arc::new(env) })
    }

    pub fn render(&self, name: &str, ctx: Value) -> Result<String, AppError> {
        let template = self.env.get_template(name)?;
        Ok(template.render(ctx)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn every_template_compiles_and_escapes() {
        let views = Views::new("Bank").unwrap();
        let html = views
            .render(
                "register.html",
                context! { user => (), flash => "<b>registration closed</b>" },
            )
            .unwrap();
        assert!(html.contains("Bank"));
        assert!(!html.contains("<b>registration closed"));
        assert!(html.contains("&lt;b&gt;registration closed&lt;&#x2f;b&gt;"));
    }

    #[test]
    fn not_found_page_renders_without_user() {
        let views = Views::new("Bank").unwrap();
        let html = views.render("404.html", context! {}).unwrap();
        assert!(html.contains("Page not found"));
    }
}
