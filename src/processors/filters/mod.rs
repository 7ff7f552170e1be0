use tera::Tera;
mod markdown;

pub fn register_all(tera: &mut Tera) {
    tera.register_filter("markdown", markdown::Markdown::default());
}
