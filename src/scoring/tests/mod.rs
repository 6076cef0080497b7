mod common;
mod evaluation;
mod rules;
