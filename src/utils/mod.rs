pub mod letters;
pub mod text;
