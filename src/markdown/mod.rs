pub mod html;

pub use html::{ConversionError, markdown_to_html, render_body};
