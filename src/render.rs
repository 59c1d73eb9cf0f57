use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

use crate::registration::{FieldErrors, Registration};
use crate::table::CellView;

pub const FORM_TITLE: &str = "அ.தி.மு.க - திருவண்ணாமலை மாவட்டம் வருகை பதிவேடு";
pub const ADMIN_TITLE: &str = "நிர்வாக முகப்பு";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Toast shown at the top of a page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: &'static str,
    pub description: &'static str,
}

impl Notice {
    pub fn submitted() -> Self {
        Notice {
            kind: NoticeKind::Success,
            title: "வெற்றி!",
            description: "உங்கள் பதிவு வெற்றிகரமாக சமர்ப்பிக்கப்பட்டது.",
        }
    }

    pub fn submit_failed() -> Self {
        Notice {
            kind: NoticeKind::Error,
            title: "பிழை",
            description: "சமர்ப்பிப்பதில் தோல்வி ஏற்பட்டது. மீண்டும் முயற்சிக்கவும்.",
        }
    }

    pub fn nothing_to_export() -> Self {
        Notice {
            kind: NoticeKind::Error,
            title: "பிழை",
            description: "ஏற்றுமதி செய்ய பதிவுகள் எதுவும் இல்லை.",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub page_title: &'static str,
    pub values: Registration,
    pub errors: FieldErrors,
    pub notice: Option<Notice>,
}

impl FormView {
    pub fn new(values: Registration, errors: FieldErrors, notice: Option<Notice>) -> Self {
        FormView {
            page_title: FORM_TITLE,
            values,
            errors,
            notice,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminView {
    pub page_title: &'static str,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellView>>,
    pub colspan: usize,
    pub search: String,
    pub date: String,
    pub filtered: bool,
    pub total: usize,
    pub shown: usize,
    pub export_href: String,
    pub notice: Option<Notice>,
}

/// Handlebars registry with the embedded page templates
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();

        registry.register_partial("header", include_str!("./static/header.html"))?;
        registry.register_partial("footer", include_str!("./static/footer.html"))?;
        registry.register_template_string("form", include_str!("./static/form.html"))?;
        registry.register_template_string("admin", include_str!("./static/admin.html"))?;

        Ok(Renderer { registry })
    }

    pub fn form(&self, view: &FormView) -> Result<String, RenderError> {
        self.registry.render("form", view)
    }

    pub fn admin(&self, view: &AdminView) -> Result<String, RenderError> {
        self.registry.render("admin", view)
    }
}
