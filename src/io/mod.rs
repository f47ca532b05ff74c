// Purpose - host boundary, format conversions

pub mod converter;
