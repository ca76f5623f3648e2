use askama::Template;
use askama_web::WebTemplate;

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub observer: String,
    pub width: u32,
    pub height: u32,
    pub outline: String,
    pub alpha: f64,
    pub picked: String,
    pub poll_ms: u64,
}
