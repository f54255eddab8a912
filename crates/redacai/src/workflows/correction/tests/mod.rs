mod common;
mod notice;
